use std::time::Duration;

use thiserror::Error;

/// Request rejected before any work is done
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} is not valid")]
    Invalid(&'static str),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Why the provider call produced no usable reply
///
/// Only ever logged; visitors see the fixed fallback text.
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI provider error: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("AI provider returned an empty completion")]
    EmptyCompletion,
}
