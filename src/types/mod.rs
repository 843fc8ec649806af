//! Core types for advisory operations

pub mod message;
pub mod options;
pub mod profile;
pub mod recommendation;

pub use message::{Message, Role};
pub use options::{ModelParams, RequestOptions};
pub use profile::ApplicantProfile;
pub use recommendation::Recommendation;
