//! Activity ledger: append-only per-lead history.
//!
//! # Invariants
//! - Entries are never updated or deleted.
//! - Queries return newest first, ties broken by id descending.

use super::{RepoError, RepoResult};
use crate::model::activity::{Activity, ActivityAction, ActivityDetails};
use crate::model::lead::LeadId;
use crate::model::user::Actor;
use crate::sequencer::{EntityKind, Stamper};
use rusqlite::{params, Connection, Row};

pub struct ActivityLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ActivityLedger<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Appends one entry and returns it.
    ///
    /// The lead and actor are caller preconditions and are not re-checked.
    pub fn record(
        &self,
        stamper: &Stamper<'_>,
        lead_id: LeadId,
        actor: &Actor,
        action: ActivityAction,
        details: ActivityDetails,
    ) -> RepoResult<Activity> {
        if !details.fits(action) {
            return Err(RepoError::InvalidData(format!(
                "details do not match activity action `{}`",
                action.as_str()
            )));
        }
        let details_json = serde_json::to_string(&details)
            .map_err(|err| RepoError::InvalidData(format!("unencodable details: {err}")))?;

        let stamp = stamper.stamp(EntityKind::Activity);
        self.conn.execute(
            "INSERT INTO activities (id, lead_id, user_id, user_name, action, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                stamp.id,
                lead_id,
                actor.user_id,
                actor.name.as_str(),
                action.as_str(),
                details_json,
                stamp.created_at,
            ],
        )?;

        Ok(Activity {
            id: stamp.id,
            lead_id,
            user_id: actor.user_id,
            user_name: actor.name.clone(),
            action,
            details,
            created_at: stamp.created_at,
        })
    }

    /// All entries for a lead, most recent first.
    pub fn query(&self, lead_id: LeadId) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, user_id, user_name, action, details, created_at
             FROM activities
             WHERE lead_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([lead_id])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let action_text: String = row.get("action")?;
    let action = ActivityAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in activities.action"))
    })?;

    let details_text: String = row.get("details")?;
    let details: ActivityDetails = serde_json::from_str(&details_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid details in activities.details: {err}"))
    })?;
    if !details.fits(action) {
        return Err(RepoError::InvalidData(format!(
            "details shape does not match action `{action_text}`"
        )));
    }

    Ok(Activity {
        id: row.get("id")?,
        lead_id: row.get("lead_id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        action,
        details,
        created_at: row.get("created_at")?,
    })
}
