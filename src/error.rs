//! Error types for api-sign

use thiserror::Error;

/// Result type alias using the api-sign [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading declaration trees, resolving symbols
/// or materializing differences.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A symbol could not be resolved inside its universe (missing dependency)
    #[error("Unresolved symbol '{0}'")]
    Unresolved(String),

    /// The declaration tree violates a structural precondition
    #[error("Malformed declaration tree: {0}")]
    Malformed(String),

    /// No message bundle could be found for a locale
    #[error("No message bundle available for locale '{0}'")]
    MissingBundle(String),

    /// A message bundle has no text for a difference code
    #[error("No message for code '{code}' in locale '{locale}'")]
    MissingMessage { code: String, locale: String },

    /// A check id that is not in the registry
    #[error("Unknown check: {0}")]
    UnknownCheck(String),
}
