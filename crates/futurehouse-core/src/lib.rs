//! FutureHouse Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - MCP transport
//! - Runtime specifics
//!
//! All types here describe jobs, tasks and agent configuration as the
//! FutureHouse platform understands them.

pub mod agent;
pub mod error;
pub mod ids;
pub mod job;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use agent::{AgentConfig, AgentConfigBuilder};
pub use error::CoreError;
pub use ids::TaskId;
pub use job::{JobDescriptor, JobName};
pub use status::TaskStatus;
pub use task::{TaskAnswer, TaskRequest, TaskResult};
