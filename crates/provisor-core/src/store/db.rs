//! redb-backed store for brokers, resources, and operation records.
//!
//! # Table design
//!
//! Three uuid-keyed tables (`BROKERS`, `RESOURCES`, `OPERATIONS`) plus a
//! name-keyed `FLAGS` table. Values are JSON-encoded records. A resource's
//! operation lives under the resource's own id, so the 1:1 association is
//! the key itself.
//!
//! # Locking discipline
//!
//! `begin_operation` performs its conflict check and the operation insert
//! inside one write transaction. redb serializes write transactions, so no
//! two callers can both observe "no conflicting operation" for the same
//! resource and both proceed.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ProvisorError, Result};
use crate::flags::FlagOverride;
use crate::resource::{sanitize_description, validate_description, Broker, Operation, Resource};
use crate::types::{OperationKind, OperationState, ResourceKind};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: uuid bytes. Value: JSON-encoded Broker.
const BROKERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("brokers");
/// Key: uuid bytes. Value: JSON-encoded Resource.
const RESOURCES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("resources");
/// Key: uuid bytes of the owning resource. Value: JSON-encoded Operation.
const OPERATIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("operations");
/// Key: flag name. Value: JSON-encoded FlagOverride.
const FLAGS: TableDefinition<&str, &[u8]> = TableDefinition::new("flags");

fn store_err(e: impl std::fmt::Display) -> ProvisorError {
    ProvisorError::Store(e.to_string())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(store_err)
}

fn read_record<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static [u8], &'static [u8]>,
    id: Uuid,
) -> Result<Option<T>> {
    match table.get(id.as_bytes().as_slice()).map_err(store_err)? {
        Some(v) => Ok(Some(decode(v.value())?)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// LifecycleDb
// ---------------------------------------------------------------------------

/// Persistent store for brokers, resources, and their operation records.
pub struct LifecycleDb {
    db: Database,
}

impl LifecycleDb {
    /// Open or create the database at `path`, ensuring all tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(BROKERS).map_err(store_err)?;
        wt.open_table(RESOURCES).map_err(store_err)?;
        wt.open_table(OPERATIONS).map_err(store_err)?;
        wt.open_table(FLAGS).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // Brokers
    // -----------------------------------------------------------------------

    /// Register a broker. Names are unique.
    pub fn insert_broker(&self, broker: &Broker) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(BROKERS).map_err(store_err)?;
            for entry in table.iter().map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                let existing: Broker = decode(v.value())?;
                if existing.name == broker.name {
                    return Err(ProvisorError::BrokerExists(broker.name.clone()));
                }
            }
            table
                .insert(
                    broker.id.as_bytes().as_slice(),
                    serde_json::to_vec(broker)?.as_slice(),
                )
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn get_broker(&self, id: Uuid) -> Result<Option<Broker>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(BROKERS).map_err(store_err)?;
        read_record(&table, id)
    }

    pub fn find_broker(&self, name: &str) -> Result<Option<Broker>> {
        Ok(self.list_brokers()?.into_iter().find(|b| b.name == name))
    }

    /// Deregister a broker. Refused while any resource still references it.
    pub fn remove_broker(&self, id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut brokers = wt.open_table(BROKERS).map_err(store_err)?;
            let name = read_record::<Broker>(&brokers, id)?
                .map(|b| b.name)
                .unwrap_or_else(|| id.to_string());
            let resources = wt.open_table(RESOURCES).map_err(store_err)?;
            for entry in resources.iter().map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                let resource: Resource = decode(v.value())?;
                if resource.broker_id == id {
                    return Err(ProvisorError::BrokerInUse(name));
                }
            }
            brokers.remove(id.as_bytes().as_slice()).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn list_brokers(&self) -> Result<Vec<Broker>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(BROKERS).map_err(store_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            result.push(decode(v.value())?);
        }
        result.sort_by(|a: &Broker, b: &Broker| a.name.cmp(&b.name));
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Insert a resource. The (name, kind) pair is unique.
    pub fn insert_resource(&self, resource: &Resource) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(RESOURCES).map_err(store_err)?;
            for entry in table.iter().map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                let existing: Resource = decode(v.value())?;
                if existing.name == resource.name && existing.kind == resource.kind {
                    return Err(ProvisorError::ResourceExists(resource.name.clone()));
                }
            }
            table
                .insert(
                    resource.id.as_bytes().as_slice(),
                    serde_json::to_vec(resource)?.as_slice(),
                )
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn get_resource(&self, id: Uuid) -> Result<Option<Resource>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(RESOURCES).map_err(store_err)?;
        read_record(&table, id)
    }

    pub fn find_resource(&self, name: &str, kind: ResourceKind) -> Result<Option<Resource>> {
        Ok(self
            .list_resources()?
            .into_iter()
            .find(|r| r.name == name && r.kind == kind))
    }

    pub fn list_resources(&self) -> Result<Vec<Resource>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(RESOURCES).map_err(store_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            result.push(decode(v.value())?);
        }
        result.sort_by(|a: &Resource, b: &Resource| a.name.cmp(&b.name));
        Ok(result)
    }

    /// All resources whose `parent_id` is `id` (an instance's keys).
    pub fn children_of(&self, id: Uuid) -> Result<Vec<Resource>> {
        Ok(self
            .list_resources()?
            .into_iter()
            .filter(|r| r.parent_id == Some(id))
            .collect())
    }

    /// Remove a resource and its operation record in one transaction, so a
    /// fresh resource of the same identity starts with no stale operation.
    pub fn remove_resource(&self, id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut resources = wt.open_table(RESOURCES).map_err(store_err)?;
            resources
                .remove(id.as_bytes().as_slice())
                .map_err(store_err)?;
            let mut ops = wt.open_table(OPERATIONS).map_err(store_err)?;
            ops.remove(id.as_bytes().as_slice()).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Bump `updated_at` after a successful broker-confirmed mutation.
    pub fn touch_resource(&self, id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(RESOURCES).map_err(store_err)?;
            let mut resource: Resource = match read_record(&table, id)? {
                Some(r) => r,
                None => return Err(ProvisorError::ResourceNotFound(id.to_string())),
            };
            resource.updated_at = Utc::now();
            table
                .insert(
                    id.as_bytes().as_slice(),
                    serde_json::to_vec(&resource)?.as_slice(),
                )
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn current_operation(&self, id: Uuid) -> Result<Option<Operation>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(OPERATIONS).map_err(store_err)?;
        read_record(&table, id)
    }

    /// Atomically begin an operation on `resource_id`.
    ///
    /// Inside a single write transaction: the resource's own operation and,
    /// for a key, its parent instance's operation are checked for
    /// `InProgress`; if either holds, `OperationInProgress` carries the name
    /// of the resource owning the conflicting operation. Otherwise the
    /// resource's operation record is overwritten with a fresh `InProgress`
    /// one. Terminal records (`Succeeded`/`Failed`) never block.
    ///
    /// The escalation is one-directional: an in-progress instance operation
    /// blocks its keys, but an in-progress key operation does not block the
    /// instance.
    pub fn begin_operation(
        &self,
        resource_id: Uuid,
        kind: OperationKind,
        description: &str,
    ) -> Result<Operation> {
        validate_description(description)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        let op = {
            let resources = wt.open_table(RESOURCES).map_err(store_err)?;
            let resource: Resource = read_record(&resources, resource_id)?
                .ok_or_else(|| ProvisorError::ResourceNotFound(resource_id.to_string()))?;

            let mut ops = wt.open_table(OPERATIONS).map_err(store_err)?;
            if let Some(current) = read_record::<Operation>(&ops, resource_id)? {
                if current.state == OperationState::InProgress {
                    return Err(ProvisorError::OperationInProgress(resource.name));
                }
            }
            if let Some(parent_id) = resource.parent_id {
                if let Some(parent_op) = read_record::<Operation>(&ops, parent_id)? {
                    if parent_op.state == OperationState::InProgress {
                        let name = read_record::<Resource>(&resources, parent_id)?
                            .map(|p| p.name)
                            .unwrap_or_else(|| parent_id.to_string());
                        return Err(ProvisorError::OperationInProgress(name));
                    }
                }
            }

            let op = Operation::begin(kind, description);
            ops.insert(
                resource_id.as_bytes().as_slice(),
                serde_json::to_vec(&op)?.as_slice(),
            )
            .map_err(store_err)?;
            op
        };
        wt.commit().map_err(store_err)?;
        Ok(op)
    }

    /// Transition the current operation to a terminal state.
    ///
    /// A no-op when no operation record exists — the resource may have been
    /// deleted concurrently, and that must not raise. The description is
    /// sanitized rather than validated: broker-supplied detail may carry
    /// control characters, and failing here would strand the operation.
    pub fn complete_operation(
        &self,
        resource_id: Uuid,
        state: OperationState,
        description: &str,
    ) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut ops = wt.open_table(OPERATIONS).map_err(store_err)?;
            let mut op: Operation = match read_record(&ops, resource_id)? {
                Some(op) => op,
                None => return Ok(()),
            };
            op.state = state;
            op.description = sanitize_description(description);
            op.updated_at = Utc::now();
            ops.insert(
                resource_id.as_bytes().as_slice(),
                serde_json::to_vec(&op)?.as_slice(),
            )
            .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Drop the operation association entirely.
    pub fn clear_operation(&self, resource_id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut ops = wt.open_table(OPERATIONS).map_err(store_err)?;
            ops.remove(resource_id.as_bytes().as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Report operations stuck `InProgress` for longer than `max_age`.
    ///
    /// A crash inside a job can never leave one behind (the job boundary
    /// converts faults to `Failed`), but a crash of the whole process can.
    /// These need external reconciliation; they are never auto-resolved.
    pub fn stuck_operations(&self, max_age: Duration) -> Result<Vec<(Resource, Operation)>> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).map_err(store_err)?;
        let rt = self.db.begin_read().map_err(store_err)?;
        let ops = rt.open_table(OPERATIONS).map_err(store_err)?;
        let resources = rt.open_table(RESOURCES).map_err(store_err)?;

        let mut result = Vec::new();
        for entry in ops.iter().map_err(store_err)? {
            let (k, v) = entry.map_err(store_err)?;
            let op: Operation = decode(v.value())?;
            if op.state != OperationState::InProgress || op.updated_at >= cutoff {
                continue;
            }
            let id = Uuid::from_slice(k.value()).map_err(store_err)?;
            if let Some(resource) = read_record::<Resource>(&resources, id)? {
                result.push((resource, op));
            }
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Feature flag overrides
    // -----------------------------------------------------------------------

    pub fn flag_override(&self, name: &str) -> Result<Option<FlagOverride>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(FLAGS).map_err(store_err)?;
        match table.get(name).map_err(store_err)? {
            Some(v) => Ok(Some(decode(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn set_flag_override(&self, name: &str, value: &FlagOverride) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(FLAGS).map_err(store_err)?;
            table
                .insert(name, serde_json::to_vec(value)?.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, LifecycleDb) {
        let dir = TempDir::new().unwrap();
        let db = LifecycleDb::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn seed_instance(db: &LifecycleDb, name: &str) -> Resource {
        let broker = Broker::new("b", "http://broker.example.com", "u", "p");
        let instance = Resource::new_instance(name, broker.id);
        db.insert_resource(&instance).unwrap();
        instance
    }

    #[test]
    fn broker_roundtrip_and_name_uniqueness() {
        let (_dir, db) = open_tmp();
        let broker = Broker::new("overview", "http://broker.example.com", "u", "p");
        db.insert_broker(&broker).unwrap();

        let loaded = db.get_broker(broker.id).unwrap().unwrap();
        assert_eq!(loaded.name, "overview");
        assert_eq!(db.find_broker("overview").unwrap().unwrap().id, broker.id);

        let dup = Broker::new("overview", "http://other.example.com", "u", "p");
        assert!(matches!(
            db.insert_broker(&dup),
            Err(ProvisorError::BrokerExists(_))
        ));
    }

    #[test]
    fn remove_broker_refused_while_resources_reference_it() {
        let (_dir, db) = open_tmp();
        let broker = Broker::new("overview", "http://broker.example.com", "u", "p");
        db.insert_broker(&broker).unwrap();
        let instance = Resource::new_instance("redis", broker.id);
        db.insert_resource(&instance).unwrap();

        let err = db.remove_broker(broker.id).unwrap_err();
        assert!(matches!(err, ProvisorError::BrokerInUse(_)));
        assert!(db.get_broker(broker.id).unwrap().is_some());

        db.remove_resource(instance.id).unwrap();
        db.remove_broker(broker.id).unwrap();
        assert!(db.get_broker(broker.id).unwrap().is_none());
    }

    #[test]
    fn resource_name_unique_per_kind() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        // Same name, different kind is fine.
        let key = Resource::new_key("redis", instance.broker_id, instance.id);
        db.insert_resource(&key).unwrap();
        // Same name, same kind is not.
        let dup = Resource::new_instance("redis", instance.broker_id);
        assert!(matches!(
            db.insert_resource(&dup),
            Err(ProvisorError::ResourceExists(_))
        ));
    }

    #[test]
    fn begin_operation_rejects_when_in_progress() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");

        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();
        let err = db
            .begin_operation(instance.id, OperationKind::Delete, "")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "An operation for service instance redis is in progress."
        );
    }

    #[test]
    fn begin_operation_replaces_terminal_operation() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");

        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();
        db.complete_operation(instance.id, OperationState::Succeeded, "")
            .unwrap();

        let op = db
            .begin_operation(instance.id, OperationKind::Update, "resize")
            .unwrap();
        assert_eq!(op.kind, OperationKind::Update);
        assert_eq!(op.state, OperationState::InProgress);
        let current = db.current_operation(instance.id).unwrap().unwrap();
        assert_eq!(current.description, "resize");
    }

    #[test]
    fn in_progress_parent_blocks_key_operation() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "pg-prod");
        let key = Resource::new_key("pg-key", instance.broker_id, instance.id);
        db.insert_resource(&key).unwrap();

        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();
        let err = db
            .begin_operation(key.id, OperationKind::Delete, "")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "An operation for service instance pg-prod is in progress."
        );
        assert!(db.current_operation(key.id).unwrap().is_none());
    }

    #[test]
    fn in_progress_key_does_not_block_instance() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "pg-prod");
        let key = Resource::new_key("pg-key", instance.broker_id, instance.id);
        db.insert_resource(&key).unwrap();

        db.begin_operation(key.id, OperationKind::Delete, "").unwrap();
        // One-directional escalation: the instance is still eligible.
        db.begin_operation(instance.id, OperationKind::Update, "")
            .unwrap();
    }

    #[test]
    fn terminal_parent_operation_does_not_block_key() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "pg-prod");
        let key = Resource::new_key("pg-key", instance.broker_id, instance.id);
        db.insert_resource(&key).unwrap();

        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();
        db.complete_operation(instance.id, OperationState::Succeeded, "")
            .unwrap();

        db.begin_operation(key.id, OperationKind::Delete, "").unwrap();
    }

    #[test]
    fn begin_operation_rejects_control_characters() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        assert!(matches!(
            db.begin_operation(instance.id, OperationKind::Create, "one\ntwo"),
            Err(ProvisorError::InvalidDescription)
        ));
        assert!(db.current_operation(instance.id).unwrap().is_none());
    }

    #[test]
    fn complete_operation_sanitizes_broker_detail() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        db.begin_operation(instance.id, OperationKind::Update, "")
            .unwrap();
        db.complete_operation(instance.id, OperationState::Failed, "bad\nplan")
            .unwrap();

        let op = db.current_operation(instance.id).unwrap().unwrap();
        assert_eq!(op.description, "bad plan");
        assert_eq!(op.state, OperationState::Failed);
    }

    #[test]
    fn complete_operation_is_a_noop_without_a_record() {
        let (_dir, db) = open_tmp();
        // Resource already gone; must not raise and must not create anything.
        let ghost = Uuid::new_v4();
        db.complete_operation(ghost, OperationState::Failed, "late")
            .unwrap();
        assert!(db.current_operation(ghost).unwrap().is_none());
    }

    #[test]
    fn clear_operation_removes_the_association() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();
        db.complete_operation(instance.id, OperationState::Succeeded, "")
            .unwrap();

        db.clear_operation(instance.id).unwrap();
        assert!(db.current_operation(instance.id).unwrap().is_none());
        // Clearing twice is fine.
        db.clear_operation(instance.id).unwrap();
    }

    #[test]
    fn remove_resource_drops_the_operation_too() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        db.begin_operation(instance.id, OperationKind::Delete, "")
            .unwrap();

        db.remove_resource(instance.id).unwrap();
        assert!(db.get_resource(instance.id).unwrap().is_none());
        assert!(db.current_operation(instance.id).unwrap().is_none());
    }

    #[test]
    fn racing_begin_operations_admit_exactly_one() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(LifecycleDb::open(&dir.path().join("race.db")).unwrap());
        let instance = seed_instance(&db, "contended");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = Arc::clone(&db);
            let id = instance.id;
            handles.push(std::thread::spawn(move || {
                db.begin_operation(id, OperationKind::Delete, "").is_ok()
            }));
        }
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1, "exactly one racer may begin an operation");

        let op = db.current_operation(instance.id).unwrap().unwrap();
        assert_eq!(op.state, OperationState::InProgress);
        assert_eq!(op.kind, OperationKind::Delete);
    }

    #[test]
    fn stuck_operations_reports_only_old_in_progress() {
        let (_dir, db) = open_tmp();
        let instance = seed_instance(&db, "redis");
        db.begin_operation(instance.id, OperationKind::Create, "")
            .unwrap();

        // Fresh in-progress operation is not stuck.
        let stuck = db.stuck_operations(Duration::from_secs(60)).unwrap();
        assert!(stuck.is_empty());

        // With a zero max-age everything in progress is reported.
        let stuck = db.stuck_operations(Duration::from_secs(0)).unwrap();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].0.name, "redis");

        // Terminal operations are never reported.
        db.complete_operation(instance.id, OperationState::Failed, "boom")
            .unwrap();
        let stuck = db.stuck_operations(Duration::from_secs(0)).unwrap();
        assert!(stuck.is_empty());
    }

    #[test]
    fn flag_override_roundtrip() {
        let (_dir, db) = open_tmp();
        assert!(db.flag_override("service_key_creation").unwrap().is_none());
        db.set_flag_override(
            "service_key_creation",
            &FlagOverride {
                enabled: false,
                error_message: Some("keys are frozen".to_string()),
            },
        )
        .unwrap();
        let loaded = db.flag_override("service_key_creation").unwrap().unwrap();
        assert!(!loaded.enabled);
        assert_eq!(loaded.error_message.as_deref(), Some("keys are frozen"));
    }
}
