//! Note persistence.
//!
//! # Invariants
//! - Notes are immutable after insert; only deletion is supported.
//! - Lookups scoped by lead never return a note owned by another lead.

use super::RepoResult;
use crate::model::lead::LeadId;
use crate::model::note::{Note, NoteId};
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str =
    "SELECT id, lead_id, author_id, author_name, content, created_at FROM notes";

pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert_note(&self, note: &Note) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, lead_id, author_id, author_name, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id,
                note.lead_id,
                note.author_id,
                note.author_name.as_str(),
                note.content.as_str(),
                note.created_at,
            ],
        )?;
        Ok(())
    }

    /// Gets a note only if it belongs to `lead_id`.
    pub fn get_note_in_lead(&self, lead_id: LeadId, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1 AND lead_id = ?2;"))?;
        let mut rows = stmt.query(params![note_id, lead_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    /// Lists a lead's notes in creation order.
    pub fn list_notes(&self, lead_id: LeadId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE lead_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([lead_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    /// Deletes a note scoped to its lead. Returns `false` when no such pair.
    pub fn delete_note(&self, lead_id: LeadId, note_id: NoteId) -> RepoResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND lead_id = ?2;",
            params![note_id, lead_id],
        )?;
        Ok(deleted == 1)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        lead_id: row.get("lead_id")?,
        author_id: row.get("author_id")?,
        author_name: row.get("author_name")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
