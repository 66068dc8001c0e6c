//! Notes attached to leads and the records derived from them.

use super::lead::LeadId;
use super::user::UserId;
use serde::{Deserialize, Serialize};

/// Identifier of a note.
pub type NoteId = i64;
/// Identifier of a mention record.
pub type MentionId = i64;

/// Free-text note written by a user on a lead.
///
/// Immutable after creation; `author_name` is the author's display name at
/// the time of writing and is never re-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub lead_id: LeadId,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    #[serde(rename = "user_name")]
    pub author_name: String,
    pub content: String,
    pub created_at: i64,
}

/// One resolved `@handle` occurrence inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    pub note_id: NoteId,
    pub mentioned_user_id: UserId,
    pub mentioned_by_user_id: UserId,
    pub created_at: i64,
}

/// First-read marker for one `(note, user)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub note_id: NoteId,
    pub user_id: UserId,
    pub user_name: String,
    pub read_at: i64,
}
