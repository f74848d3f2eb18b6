//! Request model shared by the endpoint client and generated methods.

use reqwest::Method;
use serde_json::Value;

/// Query parameters. Scalar values are rendered with their JSON text, strings
/// verbatim.
pub type Query = serde_json::Map<String, Value>;

/// A fully resolved API call: verb, absolute path below the API root, query
/// and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }
}
