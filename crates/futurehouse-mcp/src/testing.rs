//! Scripted job client for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use futurehouse_client::{ClientError, JobClient};
use futurehouse_core::{TaskAnswer, TaskId, TaskRequest, TaskStatus};

/// Replays a fixed status sequence, repeating the last entry forever.
pub struct ScriptedClient {
    task_id: String,
    statuses: Mutex<VecDeque<TaskStatus>>,
    answer: TaskAnswer,
    reject_with: Option<String>,
    poll_error: Option<String>,
    hang_polls: bool,
    hang_submit: bool,
    submissions: Mutex<Vec<TaskRequest>>,
    polls: AtomicUsize,
    result_fetches: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            task_id: "task-1".to_string(),
            statuses: Mutex::new(statuses.into_iter().collect()),
            answer: TaskAnswer::default(),
            reject_with: None,
            poll_error: None,
            hang_polls: false,
            hang_submit: false,
            submissions: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            result_fetches: AtomicUsize::new(0),
        }
    }

    /// Completes on the third poll: pending, running, completed.
    pub fn completing_with(answer: &str) -> Self {
        Self::new([TaskStatus::Pending, TaskStatus::Running, TaskStatus::Completed])
            .with_answer(answer)
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer.answer = Some(answer.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.answer.error = Some(error.to_string());
        self
    }

    pub fn with_task_id(mut self, task_id: &str) -> Self {
        self.task_id = task_id.to_string();
        self
    }

    /// Make every submission fail with a platform error.
    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    /// Make every status poll fail with a 503 from the platform.
    pub fn failing_polls(mut self, message: &str) -> Self {
        self.poll_error = Some(message.to_string());
        self
    }

    /// Status polls never return.
    pub fn hanging_polls(mut self) -> Self {
        self.hang_polls = true;
        self
    }

    /// Submissions never return.
    pub fn hanging_submit(mut self) -> Self {
        self.hang_submit = true;
        self
    }

    pub fn submissions(&self) -> Vec<TaskRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn result_fetch_count(&self) -> usize {
        self.result_fetches.load(Ordering::SeqCst)
    }

    /// Total calls of any kind made against the platform.
    pub fn remote_calls(&self) -> usize {
        self.submit_count() + self.poll_count() + self.result_fetch_count()
    }
}

#[async_trait]
impl JobClient for ScriptedClient {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId, ClientError> {
        self.submissions.lock().unwrap().push(request.clone());
        if self.hang_submit {
            std::future::pending::<()>().await;
        }
        match &self.reject_with {
            Some(message) => Err(ClientError::Api {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(TaskId::new(&self.task_id)),
        }
    }

    async fn get_status(&self, _task_id: &TaskId) -> Result<TaskStatus, ClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.hang_polls {
            std::future::pending::<()>().await;
        }
        if let Some(message) = &self.poll_error {
            return Err(ClientError::Api {
                status: 503,
                message: message.clone(),
            });
        }
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        };
        Ok(status.unwrap_or(TaskStatus::Running))
    }

    async fn get_result(&self, _task_id: &TaskId) -> Result<TaskAnswer, ClientError> {
        self.result_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}
