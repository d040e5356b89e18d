use chrono::{DateTime, Utc};
use provisor_broker::BrokerEndpoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProvisorError, Result};
use crate::types::{OperationKind, OperationState, ResourceKind};

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

/// A registered broker: where it lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub auth_username: String,
    pub auth_password: String,
    pub created_at: DateTime<Utc>,
}

impl Broker {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        auth_username: impl Into<String>,
        auth_password: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: url.into(),
            auth_username: auth_username.into(),
            auth_password: auth_password.into(),
            created_at: Utc::now(),
        }
    }

    pub fn endpoint(&self) -> BrokerEndpoint {
        BrokerEndpoint {
            url: self.url.clone(),
            username: self.auth_username.clone(),
            password: self.auth_password.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A service instance or a key derived from one.
///
/// A key's `parent_id` references its owning instance; the pair shares a
/// lock scope for conflict checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub kind: ResourceKind,
    pub broker_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn new_instance(name: impl Into<String>, broker_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: ResourceKind::Instance,
            broker_id,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_key(name: impl Into<String>, broker_id: Uuid, instance_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: ResourceKind::Key,
            broker_id,
            parent_id: Some(instance_id),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The single current operation record of a resource.
///
/// Overwritten by each accepted mutation request; not a history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub state: OperationState,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    pub fn begin(kind: OperationKind, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            kind,
            state: OperationState::InProgress,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Text validation
// ---------------------------------------------------------------------------

/// Reject control characters (newlines, escapes, ...) in operation
/// descriptions. Printable ASCII, backslashes, and Unicode letters pass.
pub fn validate_description(text: &str) -> Result<()> {
    if text.chars().any(char::is_control) {
        return Err(ProvisorError::InvalidDescription);
    }
    Ok(())
}

/// Resource and broker names: non-empty printable text.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().any(char::is_control) {
        return Err(ProvisorError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Strip control characters from text that must be stored but originates
/// outside our control (broker error bodies). Rejecting is not an option on
/// the completion path; a failed completion would strand the operation.
pub fn sanitize_description(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_allows_standard_ascii() {
        validate_description("A -_- word 2!?()''&+.").unwrap();
    }

    #[test]
    fn description_allows_backslashes() {
        validate_description(r"a\word").unwrap();
    }

    #[test]
    fn description_allows_unicode() {
        validate_description("防御力¡").unwrap();
    }

    #[test]
    fn description_allows_empty() {
        validate_description("").unwrap();
    }

    #[test]
    fn description_rejects_newlines() {
        assert!(matches!(
            validate_description("one\ntwo"),
            Err(ProvisorError::InvalidDescription)
        ));
    }

    #[test]
    fn description_rejects_escape_characters() {
        assert!(matches!(
            validate_description("a\u{1b} word"),
            Err(ProvisorError::InvalidDescription)
        ));
    }

    #[test]
    fn sanitize_replaces_control_characters() {
        assert_eq!(sanitize_description("one\ntwo"), "one two");
        assert_eq!(sanitize_description("plain text"), "plain text");
        assert_eq!(sanitize_description("防御力¡"), "防御力¡");
    }

    #[test]
    fn name_rejects_empty_and_control() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a\nb").is_err());
        validate_name("redis-prod").unwrap();
    }

    #[test]
    fn key_carries_its_parent() {
        let broker_id = Uuid::new_v4();
        let instance = Resource::new_instance("db", broker_id);
        let key = Resource::new_key("db-key", broker_id, instance.id);
        assert_eq!(key.parent_id, Some(instance.id));
        assert_eq!(key.kind, ResourceKind::Key);
        assert_eq!(instance.parent_id, None);
    }

    #[test]
    fn begin_starts_in_progress() {
        let op = Operation::begin(OperationKind::Delete, "removing");
        assert_eq!(op.state, OperationState::InProgress);
        assert_eq!(op.kind, OperationKind::Delete);
        assert_eq!(op.description, "removing");
    }
}
