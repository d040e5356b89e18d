//! Lifecycle actions: one broker call plus its local side effect.
//!
//! An action is ephemeral — constructed per request, owned by the job that
//! executes it, never persisted. The closed variant set keeps dispatch
//! exhaustive: adding a kind means the compiler walks every match.

use provisor_broker::{BrokerClient, BrokerResponse, BrokerVerb, ServiceRoute};

use crate::resource::{Broker, Resource};
use crate::store::LifecycleDb;
use crate::types::{OperationKind, ResourceKind};

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Broker confirmed and the local side effect is applied.
    Done { resource_deleted: bool },
    /// Broker refused or was unreachable; local state is untouched so a
    /// retry is safe.
    Errored(String),
}

// ---------------------------------------------------------------------------
// LifecycleAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum LifecycleAction {
    Create { resource: Resource, broker: Broker },
    Update { resource: Resource, broker: Broker },
    Delete { resource: Resource, broker: Broker },
}

impl LifecycleAction {
    pub fn for_kind(kind: OperationKind, resource: Resource, broker: Broker) -> Self {
        match kind {
            OperationKind::Create => LifecycleAction::Create { resource, broker },
            OperationKind::Update => LifecycleAction::Update { resource, broker },
            OperationKind::Delete => LifecycleAction::Delete { resource, broker },
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            LifecycleAction::Create { .. } => OperationKind::Create,
            LifecycleAction::Update { .. } => OperationKind::Update,
            LifecycleAction::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn resource(&self) -> &Resource {
        match self {
            LifecycleAction::Create { resource, .. }
            | LifecycleAction::Update { resource, .. }
            | LifecycleAction::Delete { resource, .. } => resource,
        }
    }

    fn broker(&self) -> &Broker {
        match self {
            LifecycleAction::Create { broker, .. }
            | LifecycleAction::Update { broker, .. }
            | LifecycleAction::Delete { broker, .. } => broker,
        }
    }

    /// The broker verb this action maps onto: instances provision and
    /// deprovision, keys bind and unbind.
    pub fn verb(&self) -> BrokerVerb {
        let is_key = self.resource().kind == ResourceKind::Key;
        match self {
            LifecycleAction::Create { .. } if is_key => BrokerVerb::Bind,
            LifecycleAction::Create { .. } => BrokerVerb::Provision,
            LifecycleAction::Update { .. } => BrokerVerb::Update,
            LifecycleAction::Delete { .. } if is_key => BrokerVerb::Unbind,
            LifecycleAction::Delete { .. } => BrokerVerb::Deprovision,
        }
    }

    fn route(&self) -> Result<ServiceRoute, String> {
        let resource = self.resource();
        match resource.kind {
            ResourceKind::Instance => Ok(ServiceRoute::instance(resource.id)),
            ResourceKind::Key => {
                let instance_id = resource.parent_id.ok_or_else(|| {
                    format!("key {} has no owning instance", resource.name)
                })?;
                Ok(ServiceRoute::binding(instance_id, resource.id))
            }
        }
    }

    /// Call the broker; on `Success` or `Gone`, apply the local side effect.
    ///
    /// `Gone` counts as success — the broker already considers the resource
    /// deleted. On `Retryable`/`Rejected` the resource record is left exactly
    /// as it was.
    pub fn execute(&self, client: &BrokerClient, db: &LifecycleDb) -> ActionOutcome {
        let route = match self.route() {
            Ok(route) => route,
            Err(detail) => return ActionOutcome::Errored(detail),
        };

        let response = match client.invoke(&self.broker().endpoint(), &route, self.verb()) {
            Ok(response) => response,
            Err(e) => return ActionOutcome::Errored(e.to_string()),
        };

        match response {
            BrokerResponse::Success { .. } | BrokerResponse::Gone => {
                let resource = self.resource();
                let local = match self {
                    LifecycleAction::Delete { .. } => {
                        db.remove_resource(resource.id).map(|()| true)
                    }
                    LifecycleAction::Create { .. } | LifecycleAction::Update { .. } => {
                        db.touch_resource(resource.id).map(|()| false)
                    }
                };
                match local {
                    Ok(resource_deleted) => ActionOutcome::Done { resource_deleted },
                    Err(e) => ActionOutcome::Errored(e.to_string()),
                }
            }
            BrokerResponse::Retryable { detail } | BrokerResponse::Rejected { detail } => {
                ActionOutcome::Errored(detail)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
