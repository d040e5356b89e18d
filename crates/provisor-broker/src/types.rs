use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BrokerVerb
// ---------------------------------------------------------------------------

/// The five operations a v2 broker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerVerb {
    Provision,
    Deprovision,
    Bind,
    Unbind,
    Update,
}

impl BrokerVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            BrokerVerb::Provision => "provision",
            BrokerVerb::Deprovision => "deprovision",
            BrokerVerb::Bind => "bind",
            BrokerVerb::Unbind => "unbind",
            BrokerVerb::Update => "update",
        }
    }

    /// The HTTP method the verb maps onto.
    pub fn method(self) -> reqwest::Method {
        match self {
            BrokerVerb::Provision | BrokerVerb::Bind => reqwest::Method::PUT,
            BrokerVerb::Deprovision | BrokerVerb::Unbind => reqwest::Method::DELETE,
            BrokerVerb::Update => reqwest::Method::PATCH,
        }
    }

    /// Binding-level verbs target `/service_bindings/{binding_id}` and
    /// therefore require a binding id in the route.
    pub fn is_binding_verb(self) -> bool {
        matches!(self, BrokerVerb::Bind | BrokerVerb::Unbind)
    }
}

impl fmt::Display for BrokerVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BrokerEndpoint / ServiceRoute
// ---------------------------------------------------------------------------

/// Where a broker lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerEndpoint {
    /// Base URL without a trailing slash, e.g. `https://broker.example.com`.
    pub url: String,
    pub username: String,
    pub password: String,
}

/// Identifies the instance (and optionally the binding) a request targets.
#[derive(Debug, Clone, Copy)]
pub struct ServiceRoute {
    pub instance_id: Uuid,
    pub binding_id: Option<Uuid>,
}

impl ServiceRoute {
    pub fn instance(instance_id: Uuid) -> Self {
        Self {
            instance_id,
            binding_id: None,
        }
    }

    pub fn binding(instance_id: Uuid, binding_id: Uuid) -> Self {
        Self {
            instance_id,
            binding_id: Some(binding_id),
        }
    }
}

// ---------------------------------------------------------------------------
// BrokerResponse
// ---------------------------------------------------------------------------

/// Normalized outcome of one broker request.
///
/// `Gone` (410) means the broker considers the resource already deleted;
/// callers treat it as success for deprovision and unbind.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerResponse {
    /// Any 2xx, with the parsed body when one was returned.
    Success { body: Option<serde_json::Value> },
    /// 410.
    Gone,
    /// 5xx, timeout, or the broker was unreachable.
    Retryable { detail: String },
    /// Any other 4xx; carries the broker-supplied error detail verbatim.
    Rejected { detail: String },
}
