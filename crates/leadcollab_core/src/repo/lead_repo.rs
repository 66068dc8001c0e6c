//! Lead persistence.
//!
//! # Invariants
//! - Deleting a lead removes its watcher set and notes (cascade), nothing else.
//! - Loaded leads always carry their current watcher set.

use super::watcher_repo::WatcherRegistry;
use super::RepoResult;
use crate::model::lead::{Lead, LeadId};
use rusqlite::{params, Connection, Row};

const LEAD_SELECT_SQL: &str = "SELECT id, name, email, phone, status, created_at FROM leads";

pub struct SqliteLeadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeadRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts the lead row and its watcher set.
    pub fn insert_lead(&self, lead: &Lead) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO leads (id, name, email, phone, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                lead.id,
                lead.name.as_str(),
                lead.email.as_str(),
                lead.phone.as_str(),
                lead.status.as_str(),
                lead.created_at,
            ],
        )?;
        WatcherRegistry::new(self.conn).seed(lead.id, &lead.watchers)
    }

    /// Overwrites the mutable scalar fields. Returns `false` when missing.
    pub fn update_fields(&self, lead: &Lead) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE leads
             SET name = ?2, email = ?3, phone = ?4, status = ?5
             WHERE id = ?1;",
            params![
                lead.id,
                lead.name.as_str(),
                lead.email.as_str(),
                lead.phone.as_str(),
                lead.status.as_str(),
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LEAD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.parse_lead_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: LeadId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Lists all leads by id ascending.
    pub fn list_leads(&self) -> RepoResult<Vec<Lead>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LEAD_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(self.parse_lead_row(row)?);
        }
        Ok(leads)
    }

    /// Removes the lead outright. Returns `false` when missing.
    pub fn delete_lead(&self, id: LeadId) -> RepoResult<bool> {
        let deleted = self.conn.execute("DELETE FROM leads WHERE id = ?1;", [id])?;
        Ok(deleted == 1)
    }

    fn parse_lead_row(&self, row: &Row<'_>) -> RepoResult<Lead> {
        let id: LeadId = row.get("id")?;
        Ok(Lead {
            id,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            watchers: WatcherRegistry::new(self.conn).list(id)?,
        })
    }
}
