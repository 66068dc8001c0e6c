//! Notification center: per-user notices and watcher fan-out.
//!
//! # Responsibility
//! - Create notification records (`notify`) without deduplication.
//! - Fan one message out to every watcher of a lead except the actor.
//! - Track the read flag per recipient.
//!
//! # Invariants
//! - `fanout` never addresses the actor.
//! - Read flags only ever move from unread to read.

use super::watcher_repo::WatcherRegistry;
use super::{bool_to_int, int_to_bool, RepoError, RepoResult};
use crate::model::lead::LeadId;
use crate::model::notification::{
    Notification, NotificationId, NotificationKind, NotificationView,
};
use crate::model::user::UserId;
use crate::sequencer::{EntityKind, Stamper};
use rusqlite::{params, Connection, Row};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    n.id,
    n.user_id,
    n.lead_id,
    n.type,
    n.message,
    n.related_id,
    n.is_read,
    n.created_at
FROM notifications n";

pub struct NotificationCenter<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NotificationCenter<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates one unread notification for `recipient`.
    pub fn notify(
        &self,
        stamper: &Stamper<'_>,
        recipient: UserId,
        lead_id: LeadId,
        kind: NotificationKind,
        message: &str,
        related_id: Option<i64>,
    ) -> RepoResult<Notification> {
        let stamp = stamper.stamp(EntityKind::Notification);
        self.conn.execute(
            "INSERT INTO notifications (id, user_id, lead_id, type, message, related_id, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                stamp.id,
                recipient,
                lead_id,
                kind.as_str(),
                message,
                related_id,
                bool_to_int(false),
                stamp.created_at,
            ],
        )?;
        Ok(Notification {
            id: stamp.id,
            user_id: recipient,
            lead_id,
            kind,
            message: message.to_string(),
            related_id,
            read: false,
            created_at: stamp.created_at,
        })
    }

    /// Sends a `watcher_update` to every current watcher except `actor`.
    ///
    /// Returns the created records in watcher id order.
    pub fn fanout(
        &self,
        stamper: &Stamper<'_>,
        lead_id: LeadId,
        message: &str,
        actor: UserId,
        related_id: Option<i64>,
    ) -> RepoResult<Vec<Notification>> {
        let watchers = WatcherRegistry::new(self.conn).list(lead_id)?;
        watchers
            .into_iter()
            .filter(|watcher| *watcher != actor)
            .map(|watcher| {
                self.notify(
                    stamper,
                    watcher,
                    lead_id,
                    NotificationKind::WatcherUpdate,
                    message,
                    related_id,
                )
            })
            .collect()
    }

    /// Marks one of `user_id`'s notifications read.
    ///
    /// Returns `None` when no notification with that id belongs to the user.
    pub fn mark_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> RepoResult<Option<Notification>> {
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2;",
            params![notification_id, user_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_for_user(notification_id, user_id)
    }

    /// Marks every notification of `user_id` read.
    ///
    /// Returns how many were unread before the call.
    pub fn mark_all_read(&self, user_id: UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0;",
            [user_id],
        )?;
        Ok(changed)
    }

    pub fn get_for_user(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> RepoResult<Option<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL} WHERE n.id = ?1 AND n.user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![notification_id, user_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_notification_row(row)?)),
            None => Ok(None),
        }
    }

    /// Inbox for one user, newest first, with the lead's current name.
    pub fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<NotificationView>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                n.id,
                n.user_id,
                n.lead_id,
                n.type,
                n.message,
                n.related_id,
                n.is_read,
                n.created_at,
                l.name AS lead_name
             FROM notifications n
             LEFT JOIN leads l ON l.id = n.lead_id
             WHERE n.user_id = ?1
             ORDER BY n.created_at DESC, n.id DESC;",
        )?;
        let mut rows = stmt.query([user_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(NotificationView {
                notification: parse_notification_row(row)?,
                lead_name: row.get("lead_name")?,
            });
        }
        Ok(items)
    }

    pub fn unread_count(&self, user_id: UserId) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0;",
            [user_id],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative unread count {count}")))
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let kind_text: String = row.get("type")?;
    let kind = NotificationKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid notification type `{kind_text}` in notifications.type"
        ))
    })?;

    Ok(Notification {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        lead_id: row.get("lead_id")?,
        kind,
        message: row.get("message")?,
        related_id: row.get("related_id")?,
        read: int_to_bool(row.get("is_read")?, "notifications.is_read")?,
        created_at: row.get("created_at")?,
    })
}
