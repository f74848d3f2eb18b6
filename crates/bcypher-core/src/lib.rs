pub mod blueprint;
pub mod callback;
pub mod client;
pub mod error;
pub mod registry;
pub mod rest;
#[cfg(test)]
mod test_util;
pub mod uri_template;

pub use client::BlockCypher;
pub use error::{ApiError, CoreError};
pub use registry::CoinRegistry;
