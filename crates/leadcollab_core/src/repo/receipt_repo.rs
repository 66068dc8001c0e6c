//! Read receipt tracker.
//!
//! # Invariants
//! - At most one receipt per `(note, user)`; the first write wins.

use super::RepoResult;
use crate::model::note::{NoteId, ReadReceipt};
use crate::model::user::UserId;
use crate::sequencer::Stamper;
use rusqlite::{params, Connection, Row};

pub struct ReadReceiptTracker<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ReadReceiptTracker<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Records a first read; returns the stored receipt and whether it is new.
    ///
    /// A repeated call returns the original receipt unchanged.
    pub fn mark(
        &self,
        stamper: &Stamper<'_>,
        note_id: NoteId,
        user_id: UserId,
        user_name: &str,
    ) -> RepoResult<(ReadReceipt, bool)> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO read_receipts (note_id, user_id, user_name, read_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![note_id, user_id, user_name, stamper.now_ms()],
        )?;
        let receipt = self.conn.query_row(
            "SELECT note_id, user_id, user_name, read_at
             FROM read_receipts
             WHERE note_id = ?1 AND user_id = ?2;",
            params![note_id, user_id],
            parse_receipt_row,
        )?;
        Ok((receipt, inserted == 1))
    }

    /// Receipts of one note in creation order.
    pub fn list(&self, note_id: NoteId) -> RepoResult<Vec<ReadReceipt>> {
        let mut stmt = self.conn.prepare(
            "SELECT note_id, user_id, user_name, read_at
             FROM read_receipts
             WHERE note_id = ?1
             ORDER BY read_at ASC, rowid ASC;",
        )?;
        let receipts = stmt
            .query_map([note_id], parse_receipt_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(receipts)
    }
}

fn parse_receipt_row(row: &Row<'_>) -> rusqlite::Result<ReadReceipt> {
    Ok(ReadReceipt {
        note_id: row.get("note_id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        read_at: row.get("read_at")?,
    })
}
