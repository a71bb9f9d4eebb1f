//! Task submission and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AgentConfig, JobName, TaskId, TaskStatus};

/// A request to run one query against one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Job to run.
    pub job: JobName,

    /// Question or instruction for the agent.
    pub query: String,

    /// Runtime override; platform defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AgentConfig>,

    /// Earlier task this one continues from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continued_task_id: Option<TaskId>,
}

impl TaskRequest {
    /// Create a plain request.
    pub fn new(job: JobName, query: impl Into<String>) -> Self {
        Self {
            job,
            query: query.into(),
            config: None,
            continued_task_id: None,
        }
    }

    /// Builder method to set a runtime config.
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builder method to continue from an earlier task.
    pub fn continuing(mut self, previous: TaskId) -> Self {
        self.continued_task_id = Some(previous);
        self
    }

    /// The `runtime_config` object sent with the submission, if any.
    pub fn runtime_config(&self) -> Option<Value> {
        let mut runtime = match &self.config {
            Some(config) => match config.to_runtime_config() {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };

        if let Some(previous) = &self.continued_task_id {
            runtime.insert(
                "continued_job_id".to_string(),
                Value::String(previous.as_str().to_string()),
            );
        }

        if runtime.is_empty() {
            None
        } else {
            Some(Value::Object(runtime))
        }
    }
}

/// Answer payload of a finished task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAnswer {
    /// Plain answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Answer with inline citations and a reference list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_answer: Option<String>,

    /// Whether the agent considers its answer successful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_successful_answer: Option<bool>,

    /// References backing the answer.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Error reported by the platform, if the task failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskAnswer {
    /// Plain answer if present, otherwise the formatted one.
    pub fn best_answer(&self) -> Option<String> {
        [&self.answer, &self.formatted_answer]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned()
    }
}

/// The uniform result returned by every task-running tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task identifier assigned by the platform.
    pub task_id: TaskId,

    /// Job the task ran on.
    pub job_name: JobName,

    /// Final observed status.
    pub status: TaskStatus,

    /// Answer text, if any.
    pub answer: Option<String>,

    /// Answer with inline citations and a reference list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_answer: Option<String>,

    /// Whether the agent considers its answer successful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_successful_answer: Option<bool>,

    /// References backing the answer.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Submitted query.
    pub query: String,

    /// Task this one continued from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_task_id: Option<TaskId>,

    /// Effective runtime config, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AgentConfig>,

    /// When the task was submitted.
    pub submitted_at: DateTime<Utc>,

    /// Time from submission to the terminal status, in milliseconds.
    pub elapsed_ms: u64,
}

impl TaskResult {
    /// Build a result from a request, its task ID and the fetched answer.
    pub fn new(
        request: TaskRequest,
        task_id: TaskId,
        status: TaskStatus,
        answer: TaskAnswer,
        submitted_at: DateTime<Utc>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            task_id,
            job_name: request.job,
            status,
            answer: answer.best_answer(),
            formatted_answer: answer.formatted_answer,
            has_successful_answer: answer.has_successful_answer,
            sources: answer.sources,
            query: request.query,
            previous_task_id: request.continued_task_id,
            config: request.config,
            submitted_at,
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_request_has_no_runtime_config() {
        let request = TaskRequest::new(JobName::Crow, "q");
        assert_eq!(request.runtime_config(), None);
    }

    #[test]
    fn test_continuation_sets_continued_job_id() {
        let request = TaskRequest::new(JobName::Crow, "q").continuing(TaskId::new("abc"));
        assert_eq!(
            request.runtime_config(),
            Some(json!({ "continued_job_id": "abc" }))
        );
    }

    #[test]
    fn test_config_and_continuation_merge() {
        let request = TaskRequest::new(JobName::Owl, "q")
            .with_config(AgentConfig::default())
            .continuing(TaskId::new("prev"));
        let runtime = request.runtime_config().unwrap();
        assert_eq!(runtime["continued_job_id"], json!("prev"));
        assert_eq!(runtime["max_steps"], json!(10));
    }

    #[test]
    fn test_best_answer_falls_back_to_formatted() {
        let answer = TaskAnswer {
            answer: Some("  ".to_string()),
            formatted_answer: Some("Formatted (ref 1)".to_string()),
            ..Default::default()
        };
        assert_eq!(answer.best_answer().as_deref(), Some("Formatted (ref 1)"));
        assert_eq!(TaskAnswer::default().best_answer(), None);
    }

    #[test]
    fn test_result_carries_request_context() {
        let request = TaskRequest::new(JobName::Crow, "x").continuing(TaskId::new("abc"));
        let answer = TaskAnswer {
            answer: Some("42".to_string()),
            sources: vec!["Doe 2020".to_string()],
            ..Default::default()
        };
        let result = TaskResult::new(
            request,
            TaskId::new("t-1"),
            TaskStatus::Completed,
            answer,
            Utc::now(),
            1500,
        );

        assert_eq!(result.answer.as_deref(), Some("42"));
        assert_eq!(result.previous_task_id, Some(TaskId::new("abc")));
        assert_eq!(result.sources, vec!["Doe 2020".to_string()]);
        assert_eq!(result.job_name, JobName::Crow);
    }
}
