use thiserror::Error;

/// Errors raised while talking to the observatory API.
#[derive(Error, Debug)]
pub enum ObservatoryError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON for the expected envelope.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Envelope decoded but an element is missing or has a bad field.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl ObservatoryError {
    pub fn api_error(status_code: u16, message: impl Into<String>) -> Self {
        ObservatoryError::Api {
            status_code,
            message: message.into(),
        }
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, ObservatoryError::Schema(_))
    }
}

/// A required field was absent or unparseable in one element of a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{record} #{index}: missing required field `{field}`")]
    MissingField {
        record: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{record} #{index}: field `{field}` has invalid value {value}")]
    InvalidField {
        record: &'static str,
        index: usize,
        field: &'static str,
        value: String,
    },
}

impl SchemaError {
    pub fn missing(record: &'static str, index: usize, field: &'static str) -> Self {
        SchemaError::MissingField {
            record,
            index,
            field,
        }
    }

    pub fn invalid(
        record: &'static str,
        index: usize,
        field: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        SchemaError::InvalidField {
            record,
            index,
            field,
            value: value.to_string(),
        }
    }
}
