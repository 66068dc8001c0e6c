//! Append-only audit entries describing what happened to a lead.
//!
//! # Invariants
//! - `details` always has the shape belonging to `action`.
//! - `user_name` is the actor's display name at write time.

use super::lead::LeadId;
use super::user::UserId;
use serde::{Deserialize, Serialize};

/// Identifier of an activity entry.
pub type ActivityId = i64;

/// Characters of note content kept in a `note_added` preview.
pub const NOTE_PREVIEW_CHARS: usize = 50;
const PREVIEW_ELLIPSIS: &str = "...";

/// Closed set of ledger actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    StatusChanged,
    NoteAdded,
    WatcherAdded,
    WatcherRemoved,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::NoteAdded => "note_added",
            Self::WatcherAdded => "watcher_added",
            Self::WatcherRemoved => "watcher_removed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "status_changed" => Some(Self::StatusChanged),
            "note_added" => Some(Self::NoteAdded),
            "watcher_added" => Some(Self::WatcherAdded),
            "watcher_removed" => Some(Self::WatcherRemoved),
            _ => None,
        }
    }
}

/// Action-specific payload.
///
/// Serialized without a tag: the sibling `action` field disambiguates the two
/// watcher actions, which share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityDetails {
    Created { lead_name: String, status: String },
    Updated { fields: Vec<String> },
    StatusChanged { old_status: String, new_status: String },
    NoteAdded { note_preview: String },
    Watcher { watcher_name: String },
}

impl ActivityDetails {
    /// Builds a `note_added` payload with a truncated preview.
    pub fn note_added(content: &str, max_chars: usize) -> Self {
        Self::NoteAdded {
            note_preview: note_preview(content, max_chars),
        }
    }

    /// Returns whether this payload is the shape `action` expects.
    pub fn fits(&self, action: ActivityAction) -> bool {
        matches!(
            (self, action),
            (Self::Created { .. }, ActivityAction::Created)
                | (Self::Updated { .. }, ActivityAction::Updated)
                | (Self::StatusChanged { .. }, ActivityAction::StatusChanged)
                | (Self::NoteAdded { .. }, ActivityAction::NoteAdded)
                | (Self::Watcher { .. }, ActivityAction::WatcherAdded)
                | (Self::Watcher { .. }, ActivityAction::WatcherRemoved)
        )
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub lead_id: LeadId,
    pub user_id: UserId,
    pub user_name: String,
    pub action: ActivityAction,
    pub details: ActivityDetails,
    pub created_at: i64,
}

/// Keeps the first `max_chars` characters, appending `...` only when cut.
pub fn note_preview(content: &str, max_chars: usize) -> String {
    let mut preview: String = content.chars().take(max_chars).collect();
    if content.chars().count() > max_chars {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{note_preview, ActivityAction, ActivityDetails, NOTE_PREVIEW_CHARS};

    #[test]
    fn preview_keeps_exact_limit_untouched() {
        let content = "a".repeat(NOTE_PREVIEW_CHARS);
        assert_eq!(note_preview(&content, NOTE_PREVIEW_CHARS), content);
    }

    #[test]
    fn preview_truncates_past_limit_with_ellipsis() {
        let content = "b".repeat(NOTE_PREVIEW_CHARS + 1);
        let preview = note_preview(&content, NOTE_PREVIEW_CHARS);
        assert_eq!(preview, format!("{}...", "b".repeat(NOTE_PREVIEW_CHARS)));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let content = "é".repeat(NOTE_PREVIEW_CHARS);
        assert_eq!(note_preview(&content, NOTE_PREVIEW_CHARS), content);
    }

    #[test]
    fn action_strings_roundtrip() {
        for action in [
            ActivityAction::Created,
            ActivityAction::Updated,
            ActivityAction::StatusChanged,
            ActivityAction::NoteAdded,
            ActivityAction::WatcherAdded,
            ActivityAction::WatcherRemoved,
        ] {
            assert_eq!(ActivityAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(ActivityAction::parse("deleted"), None);
    }

    #[test]
    fn watcher_details_fit_both_watcher_actions() {
        let details = ActivityDetails::Watcher {
            watcher_name: "Ravi Singh".to_string(),
        };
        assert!(details.fits(ActivityAction::WatcherAdded));
        assert!(details.fits(ActivityAction::WatcherRemoved));
        assert!(!details.fits(ActivityAction::Created));
    }

    #[test]
    fn details_deserialize_into_matching_shape() {
        let value = serde_json::json!({"old_status": "New", "new_status": "Converted"});
        let details: ActivityDetails = serde_json::from_value(value).unwrap();
        assert_eq!(
            details,
            ActivityDetails::StatusChanged {
                old_status: "New".to_string(),
                new_status: "Converted".to_string(),
            }
        );
    }
}
