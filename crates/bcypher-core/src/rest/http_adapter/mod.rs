//! `reqwest` implementation of [`Transport`](super::Transport).
//!
//! Handles API root validation, token file resolution, optional client-side
//! rate limiting and the BlockCypher status/error conventions.

mod client;
mod connection;
mod protocol;

pub use client::HttpTransport;
pub use connection::resolve_token;
