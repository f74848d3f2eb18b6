use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("blueprint fetch failed: {0}")]
    BlueprintFetch(String),

    #[error("blueprint parse error at line {line}: {message}")]
    BlueprintParse { line: usize, message: String },

    #[error("invalid URI template `{template}`: {message}")]
    UriTemplate { template: String, message: String },

    #[error("no generated method `{namespace}.{method}`")]
    UnknownMethod { namespace: String, method: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of a single HTTP exchange with the BlockCypher API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `body` is the decoded response body, or an empty
    /// object when the server sent nothing.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CoreError {
    /// The response body attached to an application-level failure, if any.
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Api(ApiError::Status { body, .. }) => Some(body),
            _ => None,
        }
    }

    /// HTTP status of an application-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(ApiError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
