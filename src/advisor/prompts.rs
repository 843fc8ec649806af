//! Prompt assembly for the advisory operations.
//!
//! Prompt text is glue, not contract — the structural requirements the
//! recommendations prompt states are enforced separately by response
//! validation in the advisor.

use crate::types::{ApplicantProfile, Message};

/// System prompt + message list for a conversational reply.
pub(crate) fn chat_reply(message: &str, history: &[Message]) -> (String, Vec<Message>) {
    let system = "You are a knowledgeable immigration consultant. Answer \
                  questions about visas, permits, and relocation clearly and \
                  concisely. If a question requires legal advice, say so and \
                  recommend speaking with a licensed professional."
        .to_string();

    let mut messages = history.to_vec();
    messages.push(Message::user(message));
    (system, messages)
}

/// System prompt + message list for structured pathway recommendations.
///
/// Instructs strict JSON-array output matching the
/// [`Recommendation`](crate::types::Recommendation) shape.
pub(crate) fn recommendations(profile: &ApplicantProfile) -> (String, Vec<Message>) {
    let system = "You are an immigration pathway analyst. Given an applicant \
                  profile, respond with ONLY a JSON array (no prose, no \
                  markdown) of 3 to 5 recommendation objects. Each object \
                  must have exactly these fields: \"type\" (string), \
                  \"name\" (string), \"match\" (number 0-100), \
                  \"description\" (string), \"requirements\" (array of \
                  strings), \"timeline\" (string), \"cost\" (string), \
                  \"pros\" (array of strings), \"cons\" (array of strings). \
                  Order by descending match."
        .to_string();

    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());
    let user = format!("Applicant profile:\n{profile_json}");
    (system, vec![Message::user(user)])
}

/// System prompt + message list for a personal-statement narrative.
pub(crate) fn narrative(goal: &str) -> (String, Vec<Message>) {
    let system = "You are a professional writer helping an immigration \
                  applicant. Write a compelling, honest first-person \
                  narrative (200-400 words) supporting their application. \
                  Avoid flowery language and unverifiable claims."
        .to_string();

    let user = format!("The applicant's goal: {goal}");
    (system, vec![Message::user(user)])
}
