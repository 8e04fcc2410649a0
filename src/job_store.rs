use crate::models::{Job, JobStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Job state storage behind a narrow interface, so the in-memory map can be
/// swapped for a durable backing store without touching the pipeline.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, job: Job);
    async fn get(&self, job_id: &str) -> Option<Job>;
    async fn update_status(&self, job_id: &str, status: JobStatus, result: Option<Value>);
}

/// Keeps jobs in process memory only. Every job is lost on restart; that is
/// the declared durability posture of this service.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: Job) {
        self.jobs.write().await.insert(job.job_id.clone(), job);
    }

    async fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    async fn update_status(&self, job_id: &str, status: JobStatus, result: Option<Value>) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            Some(job) => {
                job.status = status;
                if result.is_some() {
                    job.result = result;
                }
            }
            None => tracing::warn!("Status update for unknown job {}", job_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn test_job(id: &str) -> Job {
        Job {
            job_id: id.to_string(),
            payment_id: "pay-1".to_string(),
            status: JobStatus::AwaitingPayment,
            created_at: Utc::now(),
            input_data: "find investors".to_string(),
            result: None,
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryJobStore::new();
        store.put(test_job("job-1")).await;

        let job = store.get("job-1").await.expect("job should exist");
        assert_eq!(job.status, JobStatus::AwaitingPayment);
        assert!(job.result.is_none());

        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn update_status_sets_result_only_when_given() {
        let store = InMemoryJobStore::new();
        store.put(test_job("job-1")).await;

        store
            .update_status("job-1", JobStatus::Running, None)
            .await;
        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.result.is_none());

        store
            .update_status("job-1", JobStatus::Completed, Some(json!({"contacts": []})))
            .await;
        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result, Some(json!({"contacts": []})));
    }
}
