//! Error types shared by the Coaching Platform crates

use thiserror::Error;

/// Error returned when a string does not name a known enum value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: '{value}'. Must be one of: {allowed}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: &'static str,
}
