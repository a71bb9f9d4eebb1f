//! Platform JSON shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use futurehouse_core::{TaskAnswer, TaskRequest, TaskStatus};

use crate::error::ClientError;

/// Body of `POST /v0.1/crows`.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody<'a> {
    pub name: &'a str,
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_config: Option<Value>,
}

impl<'a> SubmitBody<'a> {
    pub fn from_request(request: &'a TaskRequest) -> Self {
        Self {
            name: request.job.remote_id(),
            query: &request.query,
            runtime_config: request.runtime_config(),
        }
    }
}

/// Response of a submission. Older deployments return the bare ID string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SubmitResponse {
    Object { trajectory_id: String },
    Bare(String),
}

impl SubmitResponse {
    pub fn into_id(self) -> String {
        match self {
            Self::Object { trajectory_id } => trajectory_id,
            Self::Bare(id) => id,
        }
    }
}

/// Response of `GET /v0.1/trajectories/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct TrajectoryResponse {
    pub status: String,
    #[serde(default)]
    pub environment_frame: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

const ANSWER_POINTER: &str = "/state/state/response/answer";

impl TrajectoryResponse {
    pub fn task_status(&self) -> Result<TaskStatus, ClientError> {
        parse_status(&self.status)
    }

    pub fn answer(&self) -> TaskAnswer {
        let answer = self
            .environment_frame
            .as_ref()
            .and_then(|frame| frame.pointer(ANSWER_POINTER));

        let text = |key: &str| {
            answer
                .and_then(|a| a.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let sources = text("references")
            .map(|refs| {
                refs.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        TaskAnswer {
            answer: text("answer"),
            formatted_answer: text("formatted_answer"),
            has_successful_answer: answer
                .and_then(|a| a.get("has_successful_answer"))
                .and_then(Value::as_bool),
            sources,
            error: self.error.clone(),
        }
    }
}

/// Map a platform status string onto the task lifecycle.
pub(crate) fn parse_status(raw: &str) -> Result<TaskStatus, ClientError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "queued" | "pending" => Ok(TaskStatus::Pending),
        "in progress" | "in_progress" | "running" => Ok(TaskStatus::Running),
        "success" | "completed" => Ok(TaskStatus::Completed),
        "fail" | "failed" | "cancelled" => Ok(TaskStatus::Failed),
        _ => Err(ClientError::UnknownStatus(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futurehouse_core::{AgentConfig, JobName, TaskId};
    use serde_json::json;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("queued").unwrap(), TaskStatus::Pending);
        assert_eq!(parse_status("in progress").unwrap(), TaskStatus::Running);
        assert_eq!(parse_status("SUCCESS").unwrap(), TaskStatus::Completed);
        assert_eq!(parse_status("cancelled").unwrap(), TaskStatus::Failed);
        assert!(matches!(
            parse_status("exploded"),
            Err(ClientError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_submit_body() {
        let request = TaskRequest::new(JobName::Falcon, "why?")
            .with_config(AgentConfig::default())
            .continuing(TaskId::new("abc"));
        let body = serde_json::to_value(SubmitBody::from_request(&request)).unwrap();

        assert_eq!(body["name"], json!("job-futurehouse-paperqa2-deep"));
        assert_eq!(body["query"], json!("why?"));
        assert_eq!(body["runtime_config"]["continued_job_id"], json!("abc"));
    }

    #[test]
    fn test_plain_submit_body_omits_runtime_config() {
        let request = TaskRequest::new(JobName::Crow, "q");
        let body = serde_json::to_value(SubmitBody::from_request(&request)).unwrap();
        assert!(body.get("runtime_config").is_none());
    }

    #[test]
    fn test_submit_response_shapes() {
        let obj: SubmitResponse = serde_json::from_str(r#"{"trajectory_id":"t-1"}"#).unwrap();
        assert_eq!(obj.into_id(), "t-1");
        let bare: SubmitResponse = serde_json::from_str(r#""t-2""#).unwrap();
        assert_eq!(bare.into_id(), "t-2");
    }

    #[test]
    fn test_answer_extraction() {
        let response: TrajectoryResponse = serde_json::from_value(json!({
            "status": "success",
            "environment_frame": {
                "state": { "state": { "response": { "answer": {
                    "answer": "Water",
                    "formatted_answer": "Water (Doe 2020)",
                    "has_successful_answer": true,
                    "references": "1. Doe 2020\n\n2. Roe 2021\n"
                }}}}
            }
        }))
        .unwrap();

        let answer = response.answer();
        assert_eq!(answer.answer.as_deref(), Some("Water"));
        assert_eq!(answer.has_successful_answer, Some(true));
        assert_eq!(answer.sources, vec!["1. Doe 2020", "2. Roe 2021"]);
    }

    #[test]
    fn test_answer_missing_frame() {
        let response: TrajectoryResponse =
            serde_json::from_value(json!({ "status": "fail", "error": "boom" })).unwrap();
        let answer = response.answer();
        assert_eq!(answer.best_answer(), None);
        assert_eq!(answer.error.as_deref(), Some("boom"));
    }
}
