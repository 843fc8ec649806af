//! End-to-end tests for the advisor facade with a scripted provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wayfinder::{
    Advisor, ApplicantProfile, CacheConfig, CompletionProvider, Message, ModelParams,
    RequestOptions, RetryPolicy, WayfinderError,
};

const VALID_ARRAY: &str = r#"[{
    "type": "work-visa",
    "name": "Express Entry",
    "match": 91.0,
    "description": "Federal skilled worker program.",
    "requirements": ["language test", "ECA"],
    "timeline": "6-12 months",
    "cost": "$2,300 CAD",
    "pros": ["permanent residency"],
    "cons": ["competitive cutoffs"]
}]"#;

/// Provider that replays a fixed script of responses.
///
/// `Err(msg)` entries become transient `Provider` errors. Panics if called
/// more times than scripted, which doubles as an upper bound on upstream
/// calls in cache tests.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|step| match step {
                        Ok(s) => Ok(s.to_string()),
                        Err(s) => Err(s.to_string()),
                    })
                    .collect(),
            ),
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
        _params: &ModelParams,
    ) -> wayfinder::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(WayfinderError::Provider(msg)),
            None => panic!("provider invoked more times than scripted"),
        }
    }
}

fn advisor_with(provider: Arc<ScriptedProvider>, cached: bool) -> Advisor {
    let mut builder = Advisor::builder()
        .provider(provider)
        .params(ModelParams::new("test-model").temperature(0.2))
        .retry_policy(
            RetryPolicy::new()
                .max_retries(2)
                .base_delay(Duration::from_millis(1)),
        );
    if cached {
        builder = builder.response_cache(CacheConfig::new());
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn chat_reply_round_trip() {
    let provider = ScriptedProvider::new(vec![Ok("You may qualify for a work permit.")]);
    let advisor = advisor_with(provider.clone(), false);

    let history = [Message::user("Hi"), Message::assistant("Hello!")];
    let reply = advisor
        .chat_reply("Can I work in Canada?", &history, RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(reply, "You may qualify for a work permit.");
    assert_eq!(provider.calls(), 1);
    assert_eq!(advisor.stats().total, 1);
    assert_eq!(advisor.stats().successes, 1);
}

#[tokio::test]
async fn identical_requests_hit_upstream_at_most_once() {
    // One scripted response: a second provider call would panic.
    let provider = ScriptedProvider::new(vec![Ok("Cached answer.")]);
    let advisor = advisor_with(provider.clone(), true);

    let first = advisor
        .chat_reply("What is Express Entry?", &[], RequestOptions::new())
        .await
        .unwrap();
    let second = advisor
        .chat_reply("What is Express Entry?", &[], RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.calls(), 1);
    // The cache hit produced no new attempt records.
    assert_eq!(advisor.stats().total, 1);
}

#[tokio::test]
async fn structurally_equal_profiles_share_a_cache_entry() {
    let provider = ScriptedProvider::new(vec![Ok(VALID_ARRAY)]);
    let advisor = advisor_with(provider.clone(), true);

    // Built through different call orders; same semantic content.
    let a = ApplicantProfile::new("Brazil")
        .occupation("nurse")
        .target_country("Canada");
    let b = ApplicantProfile::new("Brazil")
        .target_country("Canada")
        .occupation("nurse");

    let first = advisor.recommendations(&a, RequestOptions::new()).await.unwrap();
    let second = advisor.recommendations(&b, RequestOptions::new()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn recommendations_parse_fenced_json() {
    let fenced = format!("```json\n{VALID_ARRAY}\n```");
    let provider = ScriptedProvider::new(vec![Ok(fenced.as_str())]);
    let advisor = advisor_with(provider.clone(), false);

    let recs = advisor
        .recommendations(&ApplicantProfile::new("India"), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].name, "Express Entry");
    assert_eq!(recs[0].match_score, 91.0);
}

#[tokio::test]
async fn malformed_response_is_not_retried_and_not_cached() {
    // Array element missing the "match" field, twice: the second scripted
    // copy proves the first call did not populate the cache.
    let missing_match = r#"[{
        "type": "work-visa",
        "name": "Express Entry",
        "description": "desc",
        "requirements": [],
        "timeline": "6-12 months",
        "cost": "$2,300",
        "pros": [],
        "cons": []
    }]"#;
    let provider = ScriptedProvider::new(vec![Ok(missing_match), Ok(missing_match)]);
    let advisor = advisor_with(provider.clone(), true);
    let profile = ApplicantProfile::new("Brazil");

    let err = advisor
        .recommendations(&profile, RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WayfinderError::MalformedResponse(_)));

    // Exactly one attempt record, and it is a success: the network call
    // worked, the content did not.
    assert_eq!(provider.calls(), 1);
    let stats = advisor.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.successes, 1);

    let err = advisor
        .recommendations(&profile, RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WayfinderError::MalformedResponse(_)));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn blank_completion_is_retried_as_empty_response() {
    let provider = ScriptedProvider::new(vec![Ok("   \n"), Ok("A real narrative.")]);
    let advisor = advisor_with(provider.clone(), false);

    let text = advisor
        .narrative("move to Portugal as a freelancer", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(text, "A real narrative.");
    assert_eq!(provider.calls(), 2);

    let records = advisor.recent_attempts(10);
    assert_eq!(records.len(), 2);
    assert!(!records[0].success);
    assert!(records[0].error.as_deref().unwrap().contains("empty response"));
    assert!(records[1].success);
}

#[tokio::test]
async fn request_options_override_the_retry_budget() {
    let provider =
        ScriptedProvider::new(vec![Err("down"), Err("down"), Err("down"), Err("down")]);
    let advisor = advisor_with(provider.clone(), false);

    // Advisor default allows 3 attempts; this call allows 4.
    let opts = RequestOptions::new()
        .max_retries(3)
        .retry_delay(Duration::from_millis(1));
    let err = advisor.chat_reply("hello", &[], opts).await.unwrap_err();

    assert!(matches!(
        err,
        WayfinderError::ExhaustedRetries { attempts: 4, .. }
    ));
    assert_eq!(provider.calls(), 4);
}

#[tokio::test]
async fn hooks_fire_through_request_options() {
    let provider = ScriptedProvider::new(vec![Err("flaky"), Ok("recovered")]);
    let advisor = advisor_with(provider.clone(), false);

    let retries = Arc::new(AtomicU32::new(0));
    let successes = Arc::new(AtomicU32::new(0));
    let retries_hook = retries.clone();
    let successes_hook = successes.clone();

    let opts = RequestOptions::new()
        .retry_delay(Duration::from_millis(1))
        .on_retry(move |attempt, _err| {
            assert_eq!(attempt, 1);
            retries_hook.fetch_add(1, Ordering::SeqCst);
        })
        .on_success(move |text: &String, _ms| {
            assert_eq!(text, "recovered");
            successes_hook.fetch_add(1, Ordering::SeqCst);
        });

    let reply = advisor.chat_reply("hello", &[], opts).await.unwrap();
    assert_eq!(reply, "recovered");
    assert_eq!(retries.load(Ordering::SeqCst), 1);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clear_logs_resets_stats_but_not_cache() {
    let provider = ScriptedProvider::new(vec![Ok("answer")]);
    let advisor = advisor_with(provider.clone(), true);

    advisor
        .chat_reply("question", &[], RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(advisor.stats().total, 1);

    advisor.clear_logs();
    assert_eq!(advisor.stats().total, 0);
    assert_eq!(advisor.stats().success_rate_pct, 0.0);

    // Cache survives: a second identical call would panic the scripted
    // provider if it reached upstream.
    let reply = advisor
        .chat_reply("question", &[], RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(reply, "answer");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn empty_inputs_are_rejected_before_any_call() {
    let provider = ScriptedProvider::new(vec![]);
    let advisor = advisor_with(provider.clone(), false);

    let err = advisor.chat_reply("   ", &[], RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, WayfinderError::InvalidInput(_)));

    let err = advisor.narrative("", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, WayfinderError::InvalidInput(_)));

    let err = advisor
        .recommendations(&ApplicantProfile::new(""), RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WayfinderError::InvalidInput(_)));

    assert_eq!(provider.calls(), 0);
    assert_eq!(advisor.stats().total, 0);
}

#[tokio::test]
async fn builder_rejects_missing_provider_and_params() {
    let err = Advisor::builder()
        .params(ModelParams::new("test-model"))
        .build()
        .unwrap_err();
    assert!(matches!(err, WayfinderError::NoProvider));

    let provider = ScriptedProvider::new(vec![]);
    let err = Advisor::builder().provider(provider).build().unwrap_err();
    assert!(matches!(err, WayfinderError::Configuration(_)));
}
