//! FutureHouse MCP Server Library
//!
//! Exposes FutureHouse platform jobs as MCP tools. Each tool call is
//! validated, submitted through a [`futurehouse_client::JobClient`],
//! polled until it finishes, and returned as a uniform result.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod server;

#[cfg(test)]
mod testing;

pub use config::{Cli, Config, Transport};
pub use dispatcher::{ConfigOverrides, Dispatcher, PollSettings};
pub use error::{DispatchError, ToolFailure};
pub use server::{create_mcp_router, FutureHouseMcpServer};
