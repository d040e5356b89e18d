//! Feature flags gating lifecycle mutations.
//!
//! A closed set of named flags with compiled-in defaults. Operators may
//! persist an override (and a custom user-facing error message) per flag.
//! Admin bypasses are modeled through an explicit [`RequestPolicy`] passed
//! in by the caller, never through ambient lookups.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProvisorError, Result};
use crate::resource::validate_description;
use crate::store::LifecycleDb;

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    ServiceInstanceCreation,
    ServiceInstanceUpdate,
    ServiceKeyCreation,
}

impl Flag {
    pub fn all() -> &'static [Flag] {
        &[
            Flag::ServiceInstanceCreation,
            Flag::ServiceInstanceUpdate,
            Flag::ServiceKeyCreation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::ServiceInstanceCreation => "service_instance_creation",
            Flag::ServiceInstanceUpdate => "service_instance_update",
            Flag::ServiceKeyCreation => "service_key_creation",
        }
    }

    /// Compiled-in default, used when no override is persisted.
    pub fn default_enabled(self) -> bool {
        match self {
            Flag::ServiceInstanceCreation => true,
            Flag::ServiceInstanceUpdate => true,
            Flag::ServiceKeyCreation => true,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = ProvisorError;

    fn from_str(s: &str) -> Result<Self> {
        Flag::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ProvisorError::UndefinedFlag(s.to_string()))
    }
}

/// Flags an admin bypasses when disabled.
pub const ADMIN_SKIPPABLE: &[Flag] = &[Flag::ServiceInstanceCreation, Flag::ServiceKeyCreation];

/// Flags a read-only admin bypasses. None today; the mechanism stays so the
/// set can grow without touching `enabled`.
pub const ADMIN_READ_ONLY_SKIPPABLE: &[Flag] = &[];

// ---------------------------------------------------------------------------
// RequestPolicy
// ---------------------------------------------------------------------------

/// Caller-identity facts the orchestrator consults explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestPolicy {
    pub admin_override: bool,
    pub admin_read_only: bool,
}

impl RequestPolicy {
    pub fn admin() -> Self {
        Self {
            admin_override: true,
            admin_read_only: false,
        }
    }
}

// ---------------------------------------------------------------------------
// FlagOverride / FlagStatus
// ---------------------------------------------------------------------------

/// A persisted operator override for one flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagOverride {
    pub enabled: bool,
    /// Custom user-facing message shown when the flag blocks a request.
    /// Same printable-text constraint as operation descriptions.
    pub error_message: Option<String>,
}

/// Effective view of one flag, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FlagStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub overridden: bool,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// FlagStore
// ---------------------------------------------------------------------------

pub struct FlagStore {
    db: Arc<LifecycleDb>,
}

impl FlagStore {
    pub fn new(db: Arc<LifecycleDb>) -> Self {
        Self { db }
    }

    /// Effective value: admin bypasses first, then the persisted override,
    /// then the compiled-in default.
    pub fn enabled(&self, flag: Flag, policy: &RequestPolicy) -> Result<bool> {
        if policy.admin_override && ADMIN_SKIPPABLE.contains(&flag) {
            return Ok(true);
        }
        if policy.admin_read_only && ADMIN_READ_ONLY_SKIPPABLE.contains(&flag) {
            return Ok(true);
        }
        match self.db.flag_override(flag.as_str())? {
            Some(over) => Ok(over.enabled),
            None => Ok(flag.default_enabled()),
        }
    }

    /// Fail with `FeatureDisabled` unless the flag is effectively enabled.
    /// The error carries the flag's custom message when one is set.
    pub fn ensure_enabled(&self, flag: Flag, policy: &RequestPolicy) -> Result<()> {
        if self.enabled(flag, policy)? {
            return Ok(());
        }
        let message = self
            .db
            .flag_override(flag.as_str())?
            .and_then(|o| o.error_message)
            .unwrap_or_else(|| flag.as_str().to_string());
        Err(ProvisorError::FeatureDisabled(message))
    }

    /// Persist an override. The custom error message must be printable text.
    pub fn set_override(
        &self,
        flag: Flag,
        enabled: bool,
        error_message: Option<String>,
    ) -> Result<()> {
        if let Some(message) = &error_message {
            validate_description(message)?;
        }
        self.db.set_flag_override(
            flag.as_str(),
            &FlagOverride {
                enabled,
                error_message,
            },
        )
    }

    pub fn list(&self) -> Result<Vec<FlagStatus>> {
        let mut result = Vec::new();
        for flag in Flag::all() {
            let over = self.db.flag_override(flag.as_str())?;
            result.push(FlagStatus {
                name: flag.as_str(),
                enabled: over
                    .as_ref()
                    .map(|o| o.enabled)
                    .unwrap_or_else(|| flag.default_enabled()),
                overridden: over.is_some(),
                error_message: over.and_then(|o| o.error_message),
            });
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
