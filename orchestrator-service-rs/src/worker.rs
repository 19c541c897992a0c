// orchestrator-service-rs/src/worker.rs
// Enqueue-and-poll entry point. Jobs run one at a time through the same
// orchestrator as synchronous calls; status is kept in memory by job id.
// Finished jobs stay pollable for the retention period, then drop out.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use persistence::TtlCache;
use serde::{Deserialize, Serialize};
use shared_types::{CheckIn, PipelineEvaluation};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::orchestrator::Orchestrator;

pub type JobId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed(Box<PipelineEvaluation>),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

pub struct EvaluationWorker {
    sender: mpsc::Sender<(JobId, CheckIn)>,
    active: Arc<DashMap<JobId, JobStatus>>,
    finished: Arc<TtlCache<JobStatus>>,
    handle: JoinHandle<()>,
}

impl EvaluationWorker {
    pub fn start(orchestrator: Arc<Orchestrator>, capacity: usize, retention: Duration) -> Self {
        let (sender, mut receiver) = mpsc::channel::<(JobId, CheckIn)>(capacity.max(1));
        let active: Arc<DashMap<JobId, JobStatus>> = Arc::new(DashMap::new());
        let finished: Arc<TtlCache<JobStatus>> = Arc::new(TtlCache::new(retention));
        let worker_active = Arc::clone(&active);
        let worker_finished = Arc::clone(&finished);

        let handle = tokio::spawn(async move {
            while let Some((job_id, check_in)) = receiver.recv().await {
                worker_active.insert(job_id, JobStatus::Running);
                let status = match orchestrator.evaluate_check_in(&check_in).await {
                    Ok(evaluation) => JobStatus::Completed(Box::new(evaluation)),
                    Err(e) => {
                        tracing::error!(job_id = %job_id, error = %e, "evaluation_job_failed");
                        JobStatus::Failed(e.to_string())
                    }
                };
                worker_finished.purge_expired();
                worker_finished.insert(job_id.to_string(), status);
                worker_active.remove(&job_id);
                tracing::debug!(job_id = %job_id, "evaluation_job_finished");
            }
            tracing::info!("evaluation_worker_stopped");
        });

        Self {
            sender,
            active,
            finished,
            handle,
        }
    }

    pub async fn enqueue(&self, check_in: CheckIn) -> Result<JobId, PipelineError> {
        let job_id = Uuid::new_v4();
        self.active.insert(job_id, JobStatus::Queued);
        if self.sender.send((job_id, check_in)).await.is_err() {
            self.active.remove(&job_id);
            return Err(PipelineError::WorkerStopped);
        }
        tracing::info!(job_id = %job_id, "evaluation_job_enqueued");
        Ok(job_id)
    }

    /// `None` for unknown job ids and for finished jobs past retention.
    pub fn status(&self, job_id: &JobId) -> Option<JobStatus> {
        if let Some(status) = self.active.get(job_id) {
            return Some(status.value().clone());
        }
        self.finished.get(&job_id.to_string())
    }

    /// Jobs currently held in memory, queued, running or finished.
    pub fn tracked_jobs(&self) -> usize {
        self.finished.purge_expired();
        self.active.len() + self.finished.len()
    }

    /// Stop accepting jobs and finish the ones already queued.
    pub async fn shutdown(self) {
        let Self { sender, handle, .. } = self;
        drop(sender);
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "evaluation_worker_join_failed");
        }
    }
}
