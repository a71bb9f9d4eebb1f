//! The remote job client seam.

use async_trait::async_trait;

use futurehouse_core::{TaskAnswer, TaskId, TaskRequest, TaskStatus};

use crate::error::ClientError;

/// Submits tasks to the platform and observes them.
///
/// The platform owns the task lifecycle; implementors only report what it
/// says. Callers poll [`get_status`](JobClient::get_status) until a terminal
/// status and then call [`get_result`](JobClient::get_result).
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Submit a task and return the identifier the platform assigned.
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId, ClientError>;

    /// Current status of a task. Never returns `TimedOut`.
    async fn get_status(&self, task_id: &TaskId) -> Result<TaskStatus, ClientError>;

    /// Answer (or error) payload of a task.
    async fn get_result(&self, task_id: &TaskId) -> Result<TaskAnswer, ClientError>;
}
