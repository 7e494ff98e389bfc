//! Lifecycle of a remote generation job.

use crate::error::AppError;
use crate::types::GenerationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a generation job stands, as last observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        };
        f.write_str(label)
    }
}

/// A submitted job and the most recent payload the service returned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    id: GenerationId,
    status: JobStatus,
    payload: Value,
}

impl GenerationJob {
    /// A freshly submitted job; nothing has been observed yet.
    pub fn pending(id: GenerationId) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            payload: Value::Null,
        }
    }

    pub fn id(&self) -> &GenerationId {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Records a newly observed status and payload.
    ///
    /// Jobs only move forward: a pending job may stay pending or settle,
    /// a terminal one never changes. Fails with
    /// [`AppError::InvalidTransition`] once the job is terminal.
    pub fn transition(&mut self, next: JobStatus, payload: Value) -> Result<(), AppError> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        log::debug!("Generation {}: {} -> {}", self.id, self.status, next);
        self.status = next;
        self.payload = payload;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> GenerationJob {
        GenerationJob::pending(GenerationId::new("gen_1").unwrap())
    }

    #[test]
    fn pending_jobs_can_settle_in_any_terminal_state() {
        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::TimedOut] {
            let mut job = job();
            job.transition(JobStatus::Pending, json!({"status": "pending"}))
                .unwrap();
            job.transition(terminal, json!({"status": "done"})).unwrap();
            assert_eq!(job.status(), terminal);
            assert!(job.status().is_terminal());
        }
    }

    #[test]
    fn terminal_jobs_never_move_again() {
        let mut job = job();
        job.transition(JobStatus::Completed, json!({"status": "completed"}))
            .unwrap();

        for next in [
            JobStatus::Pending,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::TimedOut,
        ] {
            let err = job.transition(next, Value::Null).unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.payload(), &json!({"status": "completed"}));
    }
}
