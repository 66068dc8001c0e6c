//! Per-user notices produced by the notification center.

use super::lead::LeadId;
use super::user::UserId;
use serde::{Deserialize, Serialize};

/// Identifier of a notification.
pub type NotificationId = i64;

/// Reason a notification was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Fan-out to a watcher of the lead.
    WatcherUpdate,
    /// Direct `@handle` reference inside a note.
    Mention,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WatcherUpdate => "watcher_update",
            Self::Mention => "mention",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "watcher_update" => Some(Self::WatcherUpdate),
            "mention" => Some(Self::Mention),
            _ => None,
        }
    }
}

/// Notice addressed to one user. Only `read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    pub lead_id: LeadId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    /// Related entity, e.g. the note that triggered the notice.
    pub related_id: Option<i64>,
    pub read: bool,
    pub created_at: i64,
}

/// Notification enriched with the lead's current name for inbox listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    /// `None` once the lead has been deleted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lead_name: Option<String>,
}
