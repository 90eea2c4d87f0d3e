//! Error types for the Solr bridge.
//!
//! The first group of variants is the query translation taxonomy: every one
//! of them is terminal and carries the offending fragment or parameter name.
//! The second group belongs to the adapter layer (transport, response
//! decoding, configuration).

use thiserror::Error;

/// Main error type for the Solr bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    // Query translation errors
    #[error(
        "The bridge query ({query}) appears to be a JSON object instead of a lucene query \
         because it starts and ends with curly braces, but it failed to parse as JSON: {message}"
    )]
    MalformedEnvelope { query: String, message: String },

    #[error("The specified query type \"{found}\" is not valid. Valid options are: {valid:?}")]
    UnknownQueryType {
        found: String,
        valid: Vec<&'static str>,
    },

    #[error("The JSON query value ({fragment}) did not parse successfully as JSON: {message}")]
    MalformedQuery { fragment: String, message: String },

    #[error("The {field} field is missing a value key in the Kinetic DSL JSON: {fragment}")]
    MissingFieldValue { field: String, fragment: String },

    #[error("Unable to produce a lucene query from the following Kinetic DSL structure: {fragment}")]
    EmptyQuery { fragment: String },

    #[error(
        "Unable to parse qualification, the '{name}' parameter was referenced but {}",
        missing_parameter_reason(.no_parameters)
    )]
    MissingParameter { name: String, no_parameters: bool },

    #[error("There was a problem URL encoding the bridge request: {message}")]
    Encoding { message: String },

    // Request metadata errors
    #[error("Invalid request metadata {key}={value:?}: {message}")]
    InvalidMetadata {
        key: String,
        value: String,
        message: String,
    },

    // Adapter errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("The Solr server returned a HTTP status code of {status}, 200 was expected")]
    HttpStatus { status: u16 },

    #[error("Unauthorized: the configured username/password combination is not valid")]
    Unauthorized,

    #[error("Multiple results ({count}) matched an expected single match query")]
    MultipleResults { count: u64 },

    #[error("Invalid Solr response: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn missing_parameter_reason(no_parameters: &bool) -> &'static str {
    if *no_parameters {
        "no parameters were provided"
    } else {
        "not provided"
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidResponse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Network {
            message: err.to_string(),
            cause: std::error::Error::source(&err).map(|s| s.to_string()),
        }
    }
}

impl From<url::ParseError> for BridgeError {
    fn from(err: url::ParseError) -> Self {
        BridgeError::Encoding {
            message: err.to_string(),
        }
    }
}

impl BridgeError {
    /// Create a missing parameter error for a name absent from the parameter map.
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        BridgeError::MissingParameter {
            name: name.into(),
            no_parameters: false,
        }
    }

    /// Create a missing parameter error for a query evaluated without any parameters.
    pub fn no_parameters(name: impl Into<String>) -> Self {
        BridgeError::MissingParameter {
            name: name.into(),
            no_parameters: true,
        }
    }

    /// Whether this error came from translating the bridge query or building the request.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            BridgeError::MalformedEnvelope { .. }
                | BridgeError::UnknownQueryType { .. }
                | BridgeError::MalformedQuery { .. }
                | BridgeError::MissingFieldValue { .. }
                | BridgeError::EmptyQuery { .. }
                | BridgeError::MissingParameter { .. }
                | BridgeError::Encoding { .. }
                | BridgeError::InvalidMetadata { .. }
        )
    }

    /// Check if this error could succeed on another attempt.
    ///
    /// Nothing in this crate retries; callers owning the transport decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Network { .. } => true,
            BridgeError::HttpStatus { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
