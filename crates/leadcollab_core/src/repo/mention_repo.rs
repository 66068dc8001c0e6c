//! Mention records, one per resolved handle occurrence.

use super::RepoResult;
use crate::model::note::{Mention, NoteId};
use crate::model::user::UserId;
use crate::sequencer::{EntityKind, Stamper};
use rusqlite::{params, Connection};

pub struct SqliteMentionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMentionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        stamper: &Stamper<'_>,
        note_id: NoteId,
        mentioned_user_id: UserId,
        mentioned_by_user_id: UserId,
    ) -> RepoResult<Mention> {
        let stamp = stamper.stamp(EntityKind::Mention);
        self.conn.execute(
            "INSERT INTO mentions (id, note_id, mentioned_user_id, mentioned_by_user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                stamp.id,
                note_id,
                mentioned_user_id,
                mentioned_by_user_id,
                stamp.created_at,
            ],
        )?;
        Ok(Mention {
            id: stamp.id,
            note_id,
            mentioned_user_id,
            mentioned_by_user_id,
            created_at: stamp.created_at,
        })
    }

    /// Mentions of one note in text order.
    pub fn list_for_note(&self, note_id: NoteId) -> RepoResult<Vec<Mention>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, note_id, mentioned_user_id, mentioned_by_user_id, created_at
             FROM mentions
             WHERE note_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([note_id])?;
        let mut mentions = Vec::new();
        while let Some(row) = rows.next()? {
            mentions.push(Mention {
                id: row.get("id")?,
                note_id: row.get("note_id")?,
                mentioned_user_id: row.get("mentioned_user_id")?,
                mentioned_by_user_id: row.get("mentioned_by_user_id")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(mentions)
    }
}
