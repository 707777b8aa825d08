use thiserror::Error;

/// Top-level error type returned by the intentql front-ends.
///
/// Compilation and normalization never fail; only decoding a document,
/// joining onto a base URL and validating configuration can.
#[derive(Debug, Error)]
pub enum IntentError {
    /// The input was not valid JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but does not have the shape of a query intent.
    #[error("invalid intent shape: {message}")]
    InvalidShape { message: String },

    /// The base URL given for a compiled query does not parse.
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    /// Normalizer or compiler settings are unusable.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl IntentError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type IntentResult<T> = Result<T, IntentError>;
