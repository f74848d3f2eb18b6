//! BlockCypher REST transport abstraction.
//!
//! Defines the [`Transport`] trait that every request in the crate goes
//! through, and provides the `reqwest`-backed implementation
//! ([`HttpTransport`]) plus a recording test mock (`mock::MockTransport`).

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http_adapter::{resolve_token, HttpTransport};
pub use types::{ApiRequest, Query};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreError;

/// Root of the public BlockCypher API. Request paths are appended verbatim.
pub const DEFAULT_API_ROOT: &str = "https://api.blockcypher.com";

/// A single-request channel to the API.
///
/// Implementations own status normalization: `Ok` carries the decoded body
/// of a successful response, anything else comes back as
/// [`CoreError::Api`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, CoreError>;
}
