//! Per-operation context
//!
//! Bundles the open write transaction with the clock and time zone the
//! operation runs under. Domain modules only ever see this type, never the
//! manager, so every read they make observes the same snapshot that their
//! writes will commit against.

use super::{ClubError, ClubResult};
use crate::db::{ClubStorage, Entity};
use chrono_tz::Tz;
use redb::WriteTransaction;
use shared::models::{AuditAction, AuditEntry, ClubSettings};

pub struct ClubContext<'a> {
    pub txn: &'a WriteTransaction,
    pub storage: &'a ClubStorage,
    pub tz: Tz,
    /// Operation time (Unix millis)
    pub now: i64,
}

impl<'a> ClubContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a ClubStorage, tz: Tz, now: i64) -> Self {
        Self {
            txn,
            storage,
            tz,
            now,
        }
    }

    /// Load an entity or fail with `NotFound`
    pub fn load<T: Entity>(&self, id: i64) -> ClubResult<T> {
        self.storage
            .get::<T>(self.txn, id)?
            .ok_or_else(|| ClubError::not_found(T::NAME, id))
    }

    pub fn find<T: Entity>(&self, id: i64) -> ClubResult<Option<T>> {
        Ok(self.storage.get::<T>(self.txn, id)?)
    }

    pub fn save<T: Entity>(&self, item: &T) -> ClubResult<()> {
        Ok(self.storage.put(self.txn, item)?)
    }

    pub fn settings(&self) -> ClubResult<Option<ClubSettings>> {
        Ok(self.storage.get_settings(self.txn)?)
    }

    /// Append an audit entry inside the current transaction
    pub fn audit(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: i64,
        member_id: Option<i64>,
        details: serde_json::Value,
    ) -> ClubResult<()> {
        let entry = AuditEntry {
            id: shared::util::snowflake_id(),
            timestamp: self.now,
            action,
            resource_type: resource_type.to_string(),
            resource_id,
            member_id,
            details,
        };
        self.save(&entry)?;
        tracing::info!(
            target: "audit",
            action = ?action,
            resource_type,
            resource_id,
            member_id = ?member_id,
            "Audit entry recorded"
        );
        Ok(())
    }
}
