//! Tool dispatcher: validate, submit, wait, normalize.
//!
//! Every task-running tool goes through [`Dispatcher::run`]. The
//! per-job tools are fixed bindings of [`Dispatcher::submit_job`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use futurehouse_client::{ClientError, JobClient};
use futurehouse_core::{
    AgentConfig, CoreError, JobDescriptor, JobName, TaskId, TaskRequest, TaskResult, TaskStatus,
};

use crate::error::DispatchError;

/// How often and how long to poll a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between status polls.
    pub interval: Duration,

    /// Local wall-clock budget for reaching a terminal status.
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(20 * 60),
        }
    }
}

/// Caller-supplied agent config fields. `None` means platform default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub agent_type: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_steps: Option<i64>,
    pub agent_kwargs: Option<Map<String, Value>>,
}

impl ConfigOverrides {
    /// Validate into a full config.
    pub fn build(self) -> Result<AgentConfig, DispatchError> {
        let config = AgentConfig::builder()
            .apply(self.agent_type, self.model, self.temperature, self.max_steps)
            .kwargs(self.agent_kwargs.unwrap_or_default())
            .build()?;
        Ok(config)
    }
}

impl From<AgentConfig> for ConfigOverrides {
    fn from(config: AgentConfig) -> Self {
        Self {
            agent_type: Some(config.agent_type),
            model: Some(config.model),
            temperature: Some(config.temperature),
            max_steps: Some(i64::from(config.max_steps)),
            agent_kwargs: Some(config.agent_kwargs),
        }
    }
}

/// Runs tool calls against the platform.
///
/// Holds no per-call state; clones share the client. Concurrent calls
/// poll independently.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn JobClient>,
    poll: PollSettings,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn JobClient>, poll: PollSettings) -> Self {
        Self { client, poll }
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.poll
    }

    /// Submit a query to a job by name and wait for the answer.
    pub async fn submit_task(
        &self,
        job_name: &str,
        query: &str,
    ) -> Result<TaskResult, DispatchError> {
        let job: JobName = job_name.parse()?;
        self.submit_job(job, query).await
    }

    /// Submit a query to a known job and wait for the answer.
    pub async fn submit_job(&self, job: JobName, query: &str) -> Result<TaskResult, DispatchError> {
        let query = require_query(query)?;
        self.run(TaskRequest::new(job, query)).await
    }

    /// Like [`submit_task`](Self::submit_task) with a runtime config override.
    pub async fn submit_task_with_config(
        &self,
        job_name: &str,
        query: &str,
        overrides: ConfigOverrides,
    ) -> Result<TaskResult, DispatchError> {
        let job: JobName = job_name.parse()?;
        let query = require_query(query)?;
        let config = overrides.build()?;
        self.run(TaskRequest::new(job, query).with_config(config))
            .await
    }

    /// Ask a follow-up on an earlier task.
    ///
    /// The previous task ID is handed to the platform as-is; whether it
    /// exists or belongs to `job_name` is for the platform to decide.
    pub async fn continue_task(
        &self,
        previous_task_id: &str,
        query: &str,
        job_name: &str,
    ) -> Result<TaskResult, DispatchError> {
        let previous = TaskId::new(previous_task_id);
        if previous.is_blank() {
            return Err(DispatchError::EmptyTaskId);
        }
        let job: JobName = job_name.parse()?;
        let query = require_query(query)?;
        self.run(TaskRequest::new(job, query).continuing(previous))
            .await
    }

    /// The fixed job set. No remote call.
    pub fn list_available_jobs(&self) -> Vec<JobDescriptor> {
        JobName::ALL.iter().map(JobName::descriptor).collect()
    }

    /// Validate a config without submitting anything.
    pub fn create_agent_config(
        &self,
        overrides: ConfigOverrides,
    ) -> Result<AgentConfig, DispatchError> {
        overrides.build()
    }

    /// Submit a validated request and wait for its terminal status.
    ///
    /// Every platform call counts against the wait budget, so a call that
    /// never answers still ends in [`DispatchError::Timeout`].
    pub async fn run(&self, request: TaskRequest) -> Result<TaskResult, DispatchError> {
        info!(
            job = %request.job,
            query = %preview(&request.query),
            continued_from = ?request.continued_task_id.as_ref().map(TaskId::as_str),
            "Submitting task"
        );

        let submitted_at = Utc::now();
        let started = Instant::now();

        let task_id = self
            .bounded(started, None, TaskStatus::Pending, self.client.submit(&request))
            .await?;

        if task_id.is_blank() {
            return Err(DispatchError::RemoteFailure {
                task_id: None,
                message: "platform returned an empty task ID".to_string(),
            });
        }

        info!(task_id = %task_id, job = %request.job, "Task submitted");

        let status = self.wait_for_terminal(&task_id, started).await?;

        match status {
            TaskStatus::Completed => {
                let answer = self
                    .bounded(
                        started,
                        Some(&task_id),
                        status,
                        self.client.get_result(&task_id),
                    )
                    .await?;
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

                info!(task_id = %task_id, elapsed_ms, "Task completed");

                Ok(TaskResult::new(
                    request,
                    task_id,
                    status,
                    answer,
                    submitted_at,
                    elapsed_ms,
                ))
            }
            TaskStatus::Failed => {
                // Failure details live in the result payload; fall back to a
                // generic message if that fetch fails too.
                let message = self
                    .bounded(
                        started,
                        Some(&task_id),
                        status,
                        self.client.get_result(&task_id),
                    )
                    .await
                    .ok()
                    .and_then(|answer| answer.error)
                    .unwrap_or_else(|| format!("Task {} failed on the platform", task_id));

                warn!(task_id = %task_id, error = %message, "Task failed");

                Err(DispatchError::RemoteFailure {
                    task_id: Some(task_id),
                    message,
                })
            }
            TaskStatus::TimedOut | TaskStatus::Pending | TaskStatus::Running => {
                Err(self.timed_out(started, Some(&task_id), status))
            }
        }
    }

    /// Poll until the task is terminal or the wait budget runs out.
    ///
    /// Dropping the returned future stops polling; the remote task is not
    /// cancelled.
    async fn wait_for_terminal(
        &self,
        task_id: &TaskId,
        started: Instant,
    ) -> Result<TaskStatus, DispatchError> {
        let mut last_status = TaskStatus::Pending;
        loop {
            let status = self
                .bounded(
                    started,
                    Some(task_id),
                    last_status,
                    self.client.get_status(task_id),
                )
                .await?;

            debug!(task_id = %task_id, status = %status, "Polled task status");

            if status.is_terminal() {
                return Ok(status);
            }
            last_status = status;

            let elapsed = started.elapsed();
            if elapsed >= self.poll.max_wait {
                return Err(self.timed_out(started, Some(task_id), status));
            }

            let remaining = self.poll.max_wait - elapsed;
            tokio::time::sleep(self.poll.interval.min(remaining)).await;
        }
    }

    /// Await one platform call within what is left of the wait budget.
    async fn bounded<T, F>(
        &self,
        started: Instant,
        task_id: Option<&TaskId>,
        last_status: TaskStatus,
        call: F,
    ) -> Result<T, DispatchError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let remaining = self.poll.max_wait.saturating_sub(started.elapsed());
        match tokio::time::timeout(remaining, call).await {
            Ok(result) => result.map_err(|e| DispatchError::remote(task_id.cloned(), e)),
            Err(_) => Err(self.timed_out(started, task_id, last_status)),
        }
    }

    fn timed_out(
        &self,
        started: Instant,
        task_id: Option<&TaskId>,
        last_status: TaskStatus,
    ) -> DispatchError {
        let waited_secs = started.elapsed().as_secs();
        warn!(
            task_id = ?task_id.map(TaskId::as_str),
            status = %last_status,
            waited_secs,
            "Gave up waiting for task"
        );
        DispatchError::Timeout {
            task_id: task_id.cloned(),
            last_status,
            waited_secs,
        }
    }
}

fn require_query(query: &str) -> Result<&str, CoreError> {
    if query.trim().is_empty() {
        Err(CoreError::EmptyQuery)
    } else {
        Ok(query)
    }
}

/// Shorten a query for log fields.
pub(crate) fn preview(query: &str) -> String {
    const LIMIT: usize = 100;
    if query.chars().count() > LIMIT {
        let head: String = query.chars().take(LIMIT).collect();
        format!("{}...", head)
    } else {
        query.to_string()
    }
}
