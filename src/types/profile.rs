//! Applicant profile supplied by the intake flow

use serde::{Deserialize, Serialize};

/// Structured applicant profile used to generate pathway recommendations.
///
/// Collected by the intake wizard; every populated field participates in
/// the cache fingerprint, so two applicants with identical answers share
/// one upstream call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub nationality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_funds_usd: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl ApplicantProfile {
    pub fn new(nationality: impl Into<String>) -> Self {
        Self {
            nationality: nationality.into(),
            ..Self::default()
        }
    }

    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn education(mut self, education: impl Into<String>) -> Self {
        self.education = Some(education.into());
        self
    }

    pub fn occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn years_experience(mut self, years: u32) -> Self {
        self.years_experience = Some(years);
        self
    }

    pub fn english_level(mut self, level: impl Into<String>) -> Self {
        self.english_level = Some(level.into());
        self
    }

    pub fn available_funds_usd(mut self, funds: u64) -> Self {
        self.available_funds_usd = Some(funds);
        self
    }

    pub fn family_size(mut self, size: u32) -> Self {
        self.family_size = Some(size);
        self
    }

    pub fn target_country(mut self, country: impl Into<String>) -> Self {
        self.target_country = Some(country.into());
        self
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }
}
