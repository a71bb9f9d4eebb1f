//! Dispatcher error taxonomy.

use serde::Serialize;
use thiserror::Error;

use futurehouse_client::ClientError;
use futurehouse_core::{CoreError, TaskId, TaskStatus};

/// Errors a tool call can end with.
///
/// Validation variants are raised before anything is sent to the
/// platform. None of them abort the host process: the server turns every
/// variant into an error tool result.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Job name not in the known job set.
    #[error("Unknown job name '{0}'. Available jobs: crow, falcon, owl, phoenix")]
    InvalidJobName(String),

    /// Blank query.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Blank task ID passed to `continue_task`.
    #[error("Previous task ID must not be empty")]
    EmptyTaskId,

    /// Out-of-range agent configuration.
    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),

    /// No API key configured. Fatal at startup.
    #[error("FutureHouse API key is required. Set FUTUREHOUSE_API_KEY or pass --api-key")]
    MissingCredential,

    /// The platform rejected the request or reported the task as failed.
    #[error("{message}")]
    RemoteFailure {
        task_id: Option<TaskId>,
        message: String,
    },

    /// Wait budget exceeded. The task keeps running on the platform.
    ///
    /// `task_id` is `None` only when the submission itself never answered.
    #[error("{}", timeout_message(.task_id.as_ref(), .last_status, .waited_secs))]
    Timeout {
        task_id: Option<TaskId>,
        last_status: TaskStatus,
        waited_secs: u64,
    },
}

impl DispatchError {
    /// Wrap a client error raised while handling a task.
    pub fn remote(task_id: Option<TaskId>, err: ClientError) -> Self {
        match err {
            ClientError::MissingCredential => Self::MissingCredential,
            // Platform messages are passed through untouched.
            ClientError::Api { message, .. } => Self::RemoteFailure { task_id, message },
            other => Self::RemoteFailure {
                task_id,
                message: other.to_string(),
            },
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJobName(_) => "INVALID_JOB_NAME",
            Self::EmptyQuery => "EMPTY_QUERY",
            Self::EmptyTaskId => "EMPTY_TASK_ID",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::RemoteFailure { .. } => "REMOTE_FAILURE",
            Self::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Task the error relates to, if one was created.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::RemoteFailure { task_id, .. } => task_id.as_ref(),
            Self::Timeout { task_id, .. } => task_id.as_ref(),
            _ => None,
        }
    }

    /// Status to report alongside the error, if a task exists.
    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::RemoteFailure {
                task_id: Some(_), ..
            } => Some(TaskStatus::Failed),
            Self::Timeout { .. } => Some(TaskStatus::TimedOut),
            _ => None,
        }
    }

    /// Serializable form returned through the tool-call channel.
    pub fn to_failure(&self) -> ToolFailure {
        ToolFailure {
            code: self.code(),
            message: self.to_string(),
            task_id: self.task_id().cloned(),
            status: self.status(),
            answer: None,
        }
    }
}

fn timeout_message(task_id: Option<&TaskId>, last_status: &TaskStatus, waited_secs: &u64) -> String {
    match task_id {
        Some(id) => format!(
            "Task {} not finished after {}s (last status: {}); it continues on the platform",
            id, waited_secs, last_status
        ),
        None => format!("Platform did not accept the task within {}s", waited_secs),
    }
}

impl From<CoreError> for DispatchError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidJobName(name) => Self::InvalidJobName(name),
            CoreError::EmptyQuery => Self::EmptyQuery,
            CoreError::EmptyTaskId => Self::EmptyTaskId,
            CoreError::InvalidConfig(msg) => Self::InvalidConfig(msg),
        }
    }
}

impl From<ClientError> for DispatchError {
    fn from(err: ClientError) -> Self {
        Self::remote(None, err)
    }
}

/// Error payload of a failed tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFailure {
    /// Error code (e.g., "TIMEOUT").
    pub code: &'static str,

    /// Human-readable error message.
    pub message: String,

    /// Task ID, when a task was submitted before the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    /// Last known task status (`failed` or `timed_out`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Always null: failures carry no answer.
    pub answer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_passed_verbatim() {
        let err = DispatchError::remote(
            Some(TaskId::new("t")),
            ClientError::Api {
                status: 404,
                message: "trajectory not found".to_string(),
            },
        );
        assert_eq!(err.to_string(), "trajectory not found");
        assert_eq!(err.code(), "REMOTE_FAILURE");
        assert_eq!(err.status(), Some(TaskStatus::Failed));
    }

    #[test]
    fn test_timeout_failure_has_no_answer() {
        let err = DispatchError::Timeout {
            task_id: Some(TaskId::new("t-7")),
            last_status: TaskStatus::Running,
            waited_secs: 30,
        };
        let failure = err.to_failure();
        assert_eq!(failure.code, "TIMEOUT");
        assert_eq!(failure.task_id, Some(TaskId::new("t-7")));
        assert_eq!(failure.status, Some(TaskStatus::TimedOut));
        assert!(failure.answer.is_none());

        let json = serde_json::to_value(&failure).unwrap();
        assert!(json["answer"].is_null());
    }

    #[test]
    fn test_core_errors_convert() {
        let err: DispatchError = CoreError::InvalidJobName("eagle".into()).into();
        assert_eq!(err.code(), "INVALID_JOB_NAME");
        assert!(err.to_failure().task_id.is_none());
    }
}
