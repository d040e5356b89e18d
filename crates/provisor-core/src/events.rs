//! Audit-event emission for requested mutations.
//!
//! Events record *intent*, not outcome: the orchestrator emits one per
//! accepted mutation request, regardless of how the job eventually settles.
//! Delivery is a collaborator concern; this module only defines the record
//! and the seam.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{OperationKind, ResourceKind};

#[derive(Debug, Clone, Serialize)]
pub struct MutationEvent {
    pub actor: String,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_kind: ResourceKind,
    pub kind: OperationKind,
    pub occurred_at: DateTime<Utc>,
}

pub trait EventRecorder: Send + Sync {
    fn record(&self, event: MutationEvent);
}

/// Default recorder: structured log lines via `tracing`.
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, event: MutationEvent) {
        tracing::info!(
            actor = %event.actor,
            resource = %event.resource_name,
            resource_id = %event.resource_id,
            resource_kind = event.resource_kind.as_str(),
            kind = event.kind.as_str(),
            "mutation requested"
        );
    }
}

/// In-memory recorder for embedders and tests.
#[derive(Default)]
pub struct MemoryRecorder {
    events: std::sync::Mutex<Vec<MutationEvent>>,
}

impl MemoryRecorder {
    pub fn recorded(&self) -> Vec<MutationEvent> {
        self.events.lock().expect("recorder poisoned").clone()
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event: MutationEvent) {
        self.events.lock().expect("recorder poisoned").push(event);
    }
}
