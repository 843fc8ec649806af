//! Structured pathway recommendation returned by the model

use serde::{Deserialize, Serialize};

/// A single immigration-pathway recommendation.
///
/// The model is instructed to return a JSON array of these. Every field is
/// required — deserialization failure on any element means the whole
/// response is rejected as
/// [`MalformedResponse`](crate::WayfinderError::MalformedResponse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Pathway category (e.g. "work-visa", "study-permit", "investment").
    #[serde(rename = "type")]
    pub kind: String,
    /// Program name (e.g. "Express Entry — Federal Skilled Worker").
    pub name: String,
    /// Fit score for the applicant, 0–100.
    #[serde(rename = "match")]
    pub match_score: f64,
    pub description: String,
    pub requirements: Vec<String>,
    /// Expected processing timeline (free text, e.g. "6-12 months").
    pub timeline: String,
    /// Expected total cost (free text, e.g. "$2,300 CAD + settlement funds").
    pub cost: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}
