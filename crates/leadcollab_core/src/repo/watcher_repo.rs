//! Watcher registry: per-lead subscriber sets.
//!
//! # Invariants
//! - Membership is a set enforced by the `(lead_id, user_id)` primary key.
//! - Adding an existing watcher or removing a non-watcher changes nothing.
//! - Callers resolve the lead first; the registry assumes it exists.

use super::RepoResult;
use crate::model::lead::LeadId;
use crate::model::user::UserId;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

pub struct WatcherRegistry<'conn> {
    conn: &'conn Connection,
}

impl<'conn> WatcherRegistry<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Watcher set for a freshly created lead: exactly its creator.
    pub fn initial(owner: UserId) -> BTreeSet<UserId> {
        BTreeSet::from([owner])
    }

    /// Returns `true` when `user_id` was not watching before.
    pub fn add(&self, lead_id: LeadId, user_id: UserId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO lead_watchers (lead_id, user_id) VALUES (?1, ?2);",
            params![lead_id, user_id],
        )?;
        Ok(inserted == 1)
    }

    /// Returns `true` when `user_id` was watching and has been removed.
    pub fn remove(&self, lead_id: LeadId, user_id: UserId) -> RepoResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM lead_watchers WHERE lead_id = ?1 AND user_id = ?2;",
            params![lead_id, user_id],
        )?;
        Ok(deleted == 1)
    }

    pub fn list(&self, lead_id: LeadId) -> RepoResult<BTreeSet<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM lead_watchers WHERE lead_id = ?1 ORDER BY user_id;")?;
        let mut rows = stmt.query([lead_id])?;
        let mut watchers = BTreeSet::new();
        while let Some(row) = rows.next()? {
            watchers.insert(row.get::<_, UserId>(0)?);
        }
        Ok(watchers)
    }

    /// Writes a full watcher set for a lead that has none yet.
    pub fn seed(&self, lead_id: LeadId, watchers: &BTreeSet<UserId>) -> RepoResult<()> {
        for user_id in watchers {
            self.add(lead_id, *user_id)?;
        }
        Ok(())
    }
}
