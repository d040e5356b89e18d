//! Lifecycle orchestration: the single entry point for mutating requests.
//!
//! `LifecycleManager::request_mutation` validates the request, claims the
//! resource's lock scope through the store's atomic `begin_operation`,
//! records the mutation intent, and hands a job to the runner. Conflicts
//! and validation failures are synchronous; a conflicting request is never
//! queued behind the operation already in flight.

use std::sync::Arc;

use chrono::Utc;
use provisor_broker::BrokerClient;
use uuid::Uuid;

use crate::actions::LifecycleAction;
use crate::config::Config;
use crate::error::{ProvisorError, Result};
use crate::events::{EventRecorder, MutationEvent};
use crate::flags::{Flag, FlagStore, RequestPolicy};
use crate::jobs::{Job, JobOutcome, JobRunner};
use crate::resource::{validate_description, validate_name, Resource};
use crate::store::LifecycleDb;
use crate::types::{OperationKind, OperationState, ResourceKind};

// ---------------------------------------------------------------------------
// OperationHandle
// ---------------------------------------------------------------------------

/// What the caller gets back from an accepted mutation request.
///
/// Inline execution settles before returning, so the handle carries the
/// terminal state; queued execution returns `InProgress` and the caller
/// observes the outcome by re-reading the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationHandle {
    pub resource_id: Uuid,
    pub state: OperationState,
}

// ---------------------------------------------------------------------------
// LifecycleManager
// ---------------------------------------------------------------------------

pub struct LifecycleManager {
    db: Arc<LifecycleDb>,
    runner: JobRunner,
    flags: FlagStore,
    events: Arc<dyn EventRecorder>,
}

impl LifecycleManager {
    pub fn new(
        db: Arc<LifecycleDb>,
        config: &Config,
        events: Arc<dyn EventRecorder>,
    ) -> Result<Self> {
        let client = BrokerClient::new(config.broker_timeout())?;
        let runner = JobRunner::new(config.execution_mode, Arc::clone(&db), client)?;
        let flags = FlagStore::new(Arc::clone(&db));
        Ok(Self {
            db,
            runner,
            flags,
            events,
        })
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// Request a mutation against a resource.
    ///
    /// 1. Validate the description before any state is created.
    /// 2. Claim the lock scope via `begin_operation` — on conflict this
    ///    fails synchronously with the in-progress resource's name.
    /// 3. Record the mutation intent, regardless of the job's eventual
    ///    outcome.
    /// 4. Run the job. Inline failures surface as `ActionFailed` after the
    ///    operation is marked `Failed`; queued jobs report through the
    ///    persisted operation state only.
    pub fn request_mutation(
        &self,
        resource_id: Uuid,
        kind: OperationKind,
        description: &str,
        actor: &str,
    ) -> Result<OperationHandle> {
        validate_description(description)?;

        let resource = self
            .db
            .get_resource(resource_id)?
            .ok_or_else(|| ProvisorError::ResourceNotFound(resource_id.to_string()))?;
        let broker = self
            .db
            .get_broker(resource.broker_id)?
            .ok_or_else(|| ProvisorError::BrokerNotFound(resource.broker_id.to_string()))?;

        self.db.begin_operation(resource_id, kind, description)?;

        self.events.record(MutationEvent {
            actor: actor.to_string(),
            resource_id,
            resource_name: resource.name.clone(),
            resource_kind: resource.kind,
            kind,
            occurred_at: Utc::now(),
        });

        let job = Job {
            resource_id,
            resource_name: resource.name.clone(),
            action: LifecycleAction::for_kind(kind, resource, broker),
        };
        match self.runner.run(job)? {
            JobOutcome::Completed {
                state: OperationState::Failed,
                detail,
            } => Err(ProvisorError::ActionFailed(detail)),
            JobOutcome::Completed { state, .. } => Ok(OperationHandle { resource_id, state }),
            JobOutcome::Queued => Ok(OperationHandle {
                resource_id,
                state: OperationState::InProgress,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Convenience entry points
    // -----------------------------------------------------------------------

    /// Provision a new instance with `broker_name`'s broker.
    ///
    /// The record is persisted before the broker call; if provisioning
    /// fails, the record remains with a `Failed` operation for inspection.
    pub fn create_instance(
        &self,
        name: &str,
        broker_name: &str,
        description: &str,
        actor: &str,
        policy: &RequestPolicy,
    ) -> Result<(Resource, OperationHandle)> {
        self.flags
            .ensure_enabled(Flag::ServiceInstanceCreation, policy)?;
        validate_name(name)?;
        validate_description(description)?;
        let broker = self
            .db
            .find_broker(broker_name)?
            .ok_or_else(|| ProvisorError::BrokerNotFound(broker_name.to_string()))?;

        let resource = Resource::new_instance(name, broker.id);
        self.db.insert_resource(&resource)?;
        let handle = self.request_mutation(resource.id, OperationKind::Create, description, actor)?;
        Ok((resource, handle))
    }

    pub fn update_instance(
        &self,
        name: &str,
        description: &str,
        actor: &str,
        policy: &RequestPolicy,
    ) -> Result<OperationHandle> {
        self.flags
            .ensure_enabled(Flag::ServiceInstanceUpdate, policy)?;
        let instance = self.find(name, ResourceKind::Instance)?;
        self.request_mutation(instance.id, OperationKind::Update, description, actor)
    }

    /// Deprovision an instance. Refused while the instance still has keys;
    /// delete those first.
    pub fn delete_instance(
        &self,
        name: &str,
        description: &str,
        actor: &str,
    ) -> Result<OperationHandle> {
        let instance = self.find(name, ResourceKind::Instance)?;
        if !self.db.children_of(instance.id)?.is_empty() {
            return Err(ProvisorError::InstanceHasKeys(instance.name));
        }
        self.request_mutation(instance.id, OperationKind::Delete, description, actor)
    }

    /// Bind a new key against `instance_name`'s instance.
    pub fn create_key(
        &self,
        name: &str,
        instance_name: &str,
        description: &str,
        actor: &str,
        policy: &RequestPolicy,
    ) -> Result<(Resource, OperationHandle)> {
        self.flags.ensure_enabled(Flag::ServiceKeyCreation, policy)?;
        validate_name(name)?;
        validate_description(description)?;
        let instance = self.find(instance_name, ResourceKind::Instance)?;

        let key = Resource::new_key(name, instance.broker_id, instance.id);
        self.db.insert_resource(&key)?;
        let handle = self.request_mutation(key.id, OperationKind::Create, description, actor)?;
        Ok((key, handle))
    }

    pub fn delete_key(&self, name: &str, description: &str, actor: &str) -> Result<OperationHandle> {
        let key = self.find(name, ResourceKind::Key)?;
        self.request_mutation(key.id, OperationKind::Delete, description, actor)
    }

    fn find(&self, name: &str, kind: ResourceKind) -> Result<Resource> {
        self.db
            .find_resource(name, kind)?
            .ok_or_else(|| ProvisorError::ResourceNotFound(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
