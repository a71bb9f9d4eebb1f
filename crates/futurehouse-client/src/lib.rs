//! Job client for the FutureHouse platform.
//!
//! Provides the [`JobClient`] seam the dispatcher talks to, and an HTTP
//! implementation against the platform REST API.

pub mod client;
pub mod error;
pub mod http;
mod wire;

pub use client::JobClient;
pub use error::ClientError;
pub use http::{HttpJobClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
