//! Deferred execution wrapper around lifecycle actions.
//!
//! One interface, two backends: `Inline` runs the action on the caller's
//! thread and returns the terminal outcome; `Queued` hands the job to a
//! background worker and returns immediately, leaving the outcome visible
//! only through the persisted operation state.
//!
//! Whatever happens inside the action — broker refusal, store error, even a
//! panic — the job boundary converts it into a terminal operation state. An
//! operation is never left `InProgress` by a fault inside the job, because
//! no other automatic process resolves a stuck in-progress state.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use provisor_broker::BrokerClient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::{ActionOutcome, LifecycleAction};
use crate::error::{ProvisorError, Result};
use crate::store::LifecycleDb;
use crate::types::OperationState;

// ---------------------------------------------------------------------------
// ExecutionMode
// ---------------------------------------------------------------------------

/// How jobs are executed, selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Inline,
    Queued,
}

impl ExecutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Inline => "inline",
            ExecutionMode::Queued => "queued",
        }
    }
}

// ---------------------------------------------------------------------------
// Job / JobOutcome
// ---------------------------------------------------------------------------

/// One action bound to the identity of the resource it mutates.
/// Created by the orchestrator, executed exactly once.
#[derive(Debug, Clone)]
pub struct Job {
    pub resource_id: Uuid,
    pub resource_name: String,
    pub action: LifecycleAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Ran inline; the operation reached this terminal state.
    Completed {
        state: OperationState,
        detail: String,
    },
    /// Handed to the background worker; outcome is visible via the store.
    Queued,
}

// ---------------------------------------------------------------------------
// JobRunner
// ---------------------------------------------------------------------------

pub struct JobRunner {
    db: Arc<LifecycleDb>,
    client: BrokerClient,
    queue: Option<mpsc::Sender<Job>>,
}

impl JobRunner {
    /// Build a runner. `Queued` mode spawns the worker thread up front; the
    /// worker exits when the runner (and its sender) is dropped.
    pub fn new(mode: ExecutionMode, db: Arc<LifecycleDb>, client: BrokerClient) -> Result<Self> {
        let queue = match mode {
            ExecutionMode::Inline => None,
            ExecutionMode::Queued => {
                let (tx, rx) = mpsc::channel::<Job>();
                let worker_db = Arc::clone(&db);
                let worker_client = client.clone();
                thread::Builder::new()
                    .name("provisor-jobs".to_string())
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            let (state, detail) = run_job(&worker_db, &worker_client, &job);
                            if state == OperationState::Failed {
                                tracing::error!(
                                    resource = %job.resource_name,
                                    %detail,
                                    "queued job failed"
                                );
                            }
                        }
                    })?;
                Some(tx)
            }
        };
        Ok(Self { db, client, queue })
    }

    /// Execute a job. Inline mode returns the terminal outcome; queued mode
    /// returns as soon as the job is enqueued.
    pub fn run(&self, job: Job) -> Result<JobOutcome> {
        match &self.queue {
            None => {
                let (state, detail) = run_job(&self.db, &self.client, &job);
                Ok(JobOutcome::Completed { state, detail })
            }
            Some(tx) => match tx.send(job) {
                Ok(()) => Ok(JobOutcome::Queued),
                Err(_) => Err(ProvisorError::JobQueueClosed),
            },
        }
    }
}

/// Run the action and reconcile the operation record with its outcome.
///
/// When the action deleted the resource, its operation record went with it;
/// there is nothing left to complete.
fn run_job(db: &LifecycleDb, client: &BrokerClient, job: &Job) -> (OperationState, String) {
    let outcome = catch_unwind(AssertUnwindSafe(|| job.action.execute(client, db)))
        .unwrap_or_else(|_| ActionOutcome::Errored("job crashed before completing".to_string()));

    match outcome {
        ActionOutcome::Done { resource_deleted } => {
            if !resource_deleted {
                if let Err(e) =
                    db.complete_operation(job.resource_id, OperationState::Succeeded, "")
                {
                    return (OperationState::Failed, e.to_string());
                }
            }
            (OperationState::Succeeded, String::new())
        }
        ActionOutcome::Errored(detail) => {
            if let Err(e) = db.complete_operation(job.resource_id, OperationState::Failed, &detail)
            {
                tracing::error!(
                    resource = %job.resource_name,
                    error = %e,
                    "failed to record job failure"
                );
            }
            (OperationState::Failed, detail)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
