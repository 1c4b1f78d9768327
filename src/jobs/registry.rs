/// Job registry shared by submitters, background jobs and pollers
///
/// All access goes through one mutex. Status only moves forward:
/// Queued -> Processing -> Completed | Error, and terminal states stick.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Stored job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Error => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Status as seen by a poller; `NotFound` is never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Error,
    NotFound,
}

impl From<JobStatus> for JobState {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Queued => JobState::Queued,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Completed => JobState::Completed,
            JobStatus::Error => JobState::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub message: String,
    /// Package name, set once the job completes
    pub download_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly submitted job
    pub async fn insert_queued(&self, id: &str, message: impl Into<String>) {
        let now = Utc::now();
        let record = JobRecord {
            id: id.to_string(),
            status: JobStatus::Queued,
            message: message.into(),
            download_name: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.lock().await.insert(id.to_string(), record);
    }

    /// Apply a forward transition; returns false when the job is unknown or
    /// the move would regress
    pub async fn transition(
        &self,
        id: &str,
        status: JobStatus,
        message: impl Into<String>,
        download_name: Option<String>,
    ) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(record) = jobs.get_mut(id) else {
            return false;
        };

        if !record.status.can_transition_to(status) {
            tracing::debug!(
                job_id = %id,
                "Ignoring transition {:?} -> {:?}",
                record.status,
                status
            );
            return false;
        }

        record.status = status;
        record.message = message.into();
        record.download_name = download_name;
        record.updated_at = Utc::now();
        true
    }

    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }
}
