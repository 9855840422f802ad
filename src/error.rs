//! Unified error type.

/// The error type returned by raillog's fallible operations.
///
/// Failures of the downstream operation are never wrapped in this type:
/// [`Timeline::track`](crate::middleware::Timeline::track) hands them back
/// unchanged. This type covers configuration and log-argument problems.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An environment variable held a value that does not parse.
    #[error("invalid value `{value}` for {key}")]
    Config { key: &'static str, value: String },

    /// A structured log argument could not be serialised.
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}
