//! Collaboration orchestrator.
//!
//! # Responsibility
//! - Run each lead/note mutation as one atomic unit: store change, mention
//!   derivation, ledger entry and notification fan-out.
//! - Serve consistent read snapshots of activities, notifications and receipts.
//!
//! # Invariants
//! - Every mutation runs in a single SQLite transaction under the store mutex;
//!   a failure rolls back every write of that operation.
//! - Readers never observe a partially applied operation.
//! - No notification is ever addressed to the actor who caused it.
//! - Watcher and receipt no-ops leave the ledger untouched.

use crate::config::{CollabConfig, ConfigError};
use crate::db::{open_db_in_memory, DbError};
use crate::directory::UserDirectory;
use crate::model::activity::{Activity, ActivityAction, ActivityDetails};
use crate::model::lead::{Lead, LeadDraft, LeadId, LeadPatch};
use crate::model::note::{Mention, Note, NoteId, ReadReceipt};
use crate::model::notification::{
    Notification, NotificationId, NotificationKind, NotificationView,
};
use crate::model::user::{Actor, UserId, UserRef};
use crate::model::ValidationError;
use crate::repo::activity_repo::ActivityLedger;
use crate::repo::lead_repo::SqliteLeadRepository;
use crate::repo::mention_repo::SqliteMentionRepository;
use crate::repo::note_repo::SqliteNoteRepository;
use crate::repo::notification_repo::NotificationCenter;
use crate::repo::receipt_repo::ReadReceiptTracker;
use crate::repo::watcher_repo::WatcherRegistry;
use crate::repo::RepoError;
use crate::sequencer::{EntityKind, IdSequencer, MonotonicClock, Stamper};
use crate::service::mention_parser::extract_mentions;
use log::{debug, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::Instant;

/// Display name recorded when a removed watcher is no longer in the directory.
const UNKNOWN_USER_NAME: &str = "Unknown";

/// Errors surfaced by collaboration operations.
#[derive(Debug)]
pub enum CollabError {
    /// Referenced lead, note or notification does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// Caller bug: unknown actor or target user.
    PreconditionViolation(String),
    /// Input rejected before touching state.
    Validation(ValidationError),
    /// Invalid configuration passed at construction.
    Config(ConfigError),
    /// Storage failure.
    Repo(RepoError),
    /// A previous operation panicked while holding the store.
    LockPoisoned,
}

impl CollabError {
    fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for CollabError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::PreconditionViolation(details) => write!(f, "precondition violated: {details}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "collaboration store lock poisoned"),
        }
    }
}

impl Error for CollabError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CollabError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for CollabError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for CollabError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

impl From<ValidationError> for CollabError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConfigError> for CollabError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

pub type CollabResult<T> = Result<T, CollabError>;

/// Result of a lead update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadUpdate {
    pub lead: Lead,
    /// `None` when the patch changed nothing.
    pub activity: Option<Activity>,
    pub notifications: Vec<Notification>,
}

/// Everything derived from one new note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteOutcome {
    pub note: Note,
    pub mentions: Vec<Mention>,
    pub mention_notifications: Vec<Notification>,
    pub activity: Activity,
    pub watcher_notifications: Vec<Notification>,
}

/// Orchestrates lead/note mutations over the shared volatile store.
///
/// Share it across request handlers behind an `Arc`.
pub struct CollabService<D: UserDirectory> {
    conn: Mutex<Connection>,
    sequencer: IdSequencer,
    clock: MonotonicClock,
    directory: D,
    config: CollabConfig,
}

impl<D: UserDirectory> CollabService<D> {
    /// Creates a service with default configuration.
    pub fn new(directory: D) -> CollabResult<Self> {
        Self::with_config(directory, CollabConfig::default())
    }

    /// Creates a service over a fresh in-memory store.
    pub fn with_config(directory: D, config: CollabConfig) -> CollabResult<Self> {
        config.validate()?;
        let conn = open_db_in_memory()?;
        let sequencer = IdSequencer::with_floors(&config.id_floors);
        info!(
            "event=collab_init module=collab status=ok users={} lead_floor={}",
            directory.list_users().len(),
            sequencer.peek(EntityKind::Lead)
        );
        Ok(Self {
            conn: Mutex::new(conn),
            sequencer,
            clock: MonotonicClock::new(),
            directory,
            config,
        })
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    // --- leads -------------------------------------------------------------

    /// Creates a lead watched by its creator and logs `created`.
    pub fn create_lead(&self, actor: &Actor, draft: LeadDraft) -> CollabResult<Lead> {
        self.ensure_actor(actor)?;
        let draft = draft.normalized();
        draft.validate()?;

        self.write("lead_create", |conn, stamper| {
            let stamp = stamper.stamp(EntityKind::Lead);
            let lead = Lead {
                id: stamp.id,
                name: draft.name,
                email: draft.email,
                phone: draft.phone.unwrap_or_default(),
                status: draft
                    .status
                    .unwrap_or_else(|| self.config.default_status.clone()),
                created_at: stamp.created_at,
                watchers: WatcherRegistry::initial(actor.user_id),
            };
            SqliteLeadRepository::new(conn).insert_lead(&lead)?;
            ActivityLedger::new(conn).record(
                stamper,
                lead.id,
                actor,
                ActivityAction::Created,
                ActivityDetails::Created {
                    lead_name: lead.name.clone(),
                    status: lead.status.clone(),
                },
            )?;
            info!(
                "event=lead_create module=collab status=ok lead_id={} actor_id={}",
                lead.id, actor.user_id
            );
            Ok(lead)
        })
    }

    /// Applies a patch, logging either `status_changed` or `updated`.
    ///
    /// Watchers other than the actor are notified. A status change never
    /// also produces the generic update message. A patch that changes
    /// nothing writes nothing. Patch values are trimmed before comparison,
    /// the same way create input is.
    pub fn update_lead(
        &self,
        actor: &Actor,
        lead_id: LeadId,
        patch: &LeadPatch,
    ) -> CollabResult<LeadUpdate> {
        self.ensure_actor(actor)?;
        let patch = patch.normalized();
        patch.validate()?;

        self.write("lead_update", |conn, stamper| {
            let leads = SqliteLeadRepository::new(conn);
            let mut lead = leads
                .get_lead(lead_id)?
                .ok_or_else(|| CollabError::not_found(EntityKind::Lead, lead_id))?;

            let changes = lead.apply_patch(&patch);
            if changes.is_empty() {
                debug!(
                    "event=lead_update module=collab status=noop lead_id={} actor_id={}",
                    lead_id, actor.user_id
                );
                return Ok(LeadUpdate {
                    lead,
                    activity: None,
                    notifications: Vec::new(),
                });
            }
            leads.update_fields(&lead)?;

            let ledger = ActivityLedger::new(conn);
            let center = NotificationCenter::new(conn);
            let (activity, message) = match changes.status_transition.clone() {
                Some((old_status, new_status)) => {
                    let message = format!("Status changed from {old_status} to {new_status}");
                    let activity = ledger.record(
                        stamper,
                        lead_id,
                        actor,
                        ActivityAction::StatusChanged,
                        ActivityDetails::StatusChanged {
                            old_status,
                            new_status,
                        },
                    )?;
                    (activity, message)
                }
                None => {
                    let activity = ledger.record(
                        stamper,
                        lead_id,
                        actor,
                        ActivityAction::Updated,
                        ActivityDetails::Updated {
                            fields: changes.field_names(),
                        },
                    )?;
                    (activity, format!("Lead updated by {}", actor.name))
                }
            };
            let notifications = center.fanout(stamper, lead_id, &message, actor.user_id, None)?;

            info!(
                "event=lead_update module=collab status=ok lead_id={} action={} notified={}",
                lead_id,
                activity.action.as_str(),
                notifications.len()
            );
            Ok(LeadUpdate {
                lead,
                activity: Some(activity),
                notifications,
            })
        })
    }

    /// Removes a lead with its watchers and notes. History stays.
    pub fn delete_lead(&self, actor: &Actor, lead_id: LeadId) -> CollabResult<()> {
        self.ensure_actor(actor)?;
        self.write("lead_delete", |conn, _| {
            if !SqliteLeadRepository::new(conn).delete_lead(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }
            info!(
                "event=lead_delete module=collab status=ok lead_id={} actor_id={}",
                lead_id, actor.user_id
            );
            Ok(())
        })
    }

    pub fn get_lead(&self, lead_id: LeadId) -> CollabResult<Lead> {
        self.read(|conn| {
            SqliteLeadRepository::new(conn)
                .get_lead(lead_id)?
                .ok_or_else(|| CollabError::not_found(EntityKind::Lead, lead_id))
        })
    }

    /// All leads by id ascending.
    pub fn list_leads(&self) -> CollabResult<Vec<Lead>> {
        self.read(|conn| Ok(SqliteLeadRepository::new(conn).list_leads()?))
    }

    // --- notes -------------------------------------------------------------

    /// Adds a note and derives mentions, ledger entry and watcher fan-out.
    ///
    /// Mentions reach the mentioned user even when they do not watch the
    /// lead. Unresolvable handles are dropped.
    ///
    /// Self-mentions are dropped as well: an author who writes their own
    /// handle gets neither a Mention record nor a `mention` notification,
    /// so no notification is ever addressed to its actor.
    pub fn add_note(
        &self,
        actor: &Actor,
        lead_id: LeadId,
        content: &str,
    ) -> CollabResult<NoteOutcome> {
        self.ensure_actor(actor)?;
        if content.trim().is_empty() {
            return Err(ValidationError::BlankNoteContent.into());
        }

        self.write("note_add", |conn, stamper| {
            if !SqliteLeadRepository::new(conn).exists(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }

            let stamp = stamper.stamp(EntityKind::Note);
            let note = Note {
                id: stamp.id,
                lead_id,
                author_id: actor.user_id,
                author_name: actor.name.clone(),
                content: content.to_string(),
                created_at: stamp.created_at,
            };
            SqliteNoteRepository::new(conn).insert_note(&note)?;

            let center = NotificationCenter::new(conn);
            let mention_repo = SqliteMentionRepository::new(conn);
            let mention_message = format!("{} mentioned you in a note", actor.name);
            let mut mentions = Vec::new();
            let mut mention_notifications = Vec::new();
            for handle in extract_mentions(&note.content) {
                let Some(user) = self.directory.resolve_handle(&handle) else {
                    debug!(
                        "event=mention_drop module=collab status=noop note_id={} reason=unresolved",
                        note.id
                    );
                    continue;
                };
                if user.id == actor.user_id {
                    debug!(
                        "event=mention_drop module=collab status=noop note_id={} reason=self",
                        note.id
                    );
                    continue;
                }
                mentions.push(mention_repo.insert(stamper, note.id, user.id, actor.user_id)?);
                mention_notifications.push(center.notify(
                    stamper,
                    user.id,
                    lead_id,
                    NotificationKind::Mention,
                    &mention_message,
                    Some(note.id),
                )?);
            }

            let activity = ActivityLedger::new(conn).record(
                stamper,
                lead_id,
                actor,
                ActivityAction::NoteAdded,
                ActivityDetails::note_added(&note.content, self.config.note_preview_chars),
            )?;
            let watcher_notifications = center.fanout(
                stamper,
                lead_id,
                &format!("{} added a note", actor.name),
                actor.user_id,
                Some(note.id),
            )?;

            info!(
                "event=note_add module=collab status=ok lead_id={} note_id={} mentions={} watchers_notified={}",
                lead_id,
                note.id,
                mentions.len(),
                watcher_notifications.len()
            );
            Ok(NoteOutcome {
                note,
                mentions,
                mention_notifications,
                activity,
                watcher_notifications,
            })
        })
    }

    /// Deletes a note; it must belong to `lead_id`.
    pub fn delete_note(&self, actor: &Actor, lead_id: LeadId, note_id: NoteId) -> CollabResult<()> {
        self.ensure_actor(actor)?;
        self.write("note_delete", |conn, _| {
            if !SqliteNoteRepository::new(conn).delete_note(lead_id, note_id)? {
                return Err(CollabError::not_found(EntityKind::Note, note_id));
            }
            info!(
                "event=note_delete module=collab status=ok lead_id={} note_id={}",
                lead_id, note_id
            );
            Ok(())
        })
    }

    /// Notes of a lead in creation order.
    pub fn list_notes(&self, lead_id: LeadId) -> CollabResult<Vec<Note>> {
        self.read(|conn| {
            if !SqliteLeadRepository::new(conn).exists(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }
            Ok(SqliteNoteRepository::new(conn).list_notes(lead_id)?)
        })
    }

    pub fn list_mentions(&self, note_id: NoteId) -> CollabResult<Vec<Mention>> {
        self.read(|conn| Ok(SqliteMentionRepository::new(conn).list_for_note(note_id)?))
    }

    // --- watchers ----------------------------------------------------------

    /// Subscribes `user_id` to a lead. Returns `false` if already watching.
    ///
    /// Only an actual addition writes `watcher_added`; nobody is notified.
    pub fn add_watcher(
        &self,
        actor: &Actor,
        lead_id: LeadId,
        user_id: UserId,
    ) -> CollabResult<bool> {
        self.ensure_actor(actor)?;
        let watcher = self.directory.get_user(user_id).ok_or_else(|| {
            CollabError::PreconditionViolation(format!("watcher {user_id} is not a known user"))
        })?;

        self.write("watcher_add", |conn, stamper| {
            if !SqliteLeadRepository::new(conn).exists(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }
            let added = WatcherRegistry::new(conn).add(lead_id, user_id)?;
            if added {
                ActivityLedger::new(conn).record(
                    stamper,
                    lead_id,
                    actor,
                    ActivityAction::WatcherAdded,
                    ActivityDetails::Watcher {
                        watcher_name: watcher.name.clone(),
                    },
                )?;
            }
            debug!(
                "event=watcher_add module=collab status={} lead_id={} user_id={}",
                if added { "ok" } else { "noop" },
                lead_id,
                user_id
            );
            Ok(added)
        })
    }

    /// Unsubscribes `user_id`. Returns `false` if they were not watching.
    pub fn remove_watcher(
        &self,
        actor: &Actor,
        lead_id: LeadId,
        user_id: UserId,
    ) -> CollabResult<bool> {
        self.ensure_actor(actor)?;
        let watcher_name = self
            .directory
            .get_user(user_id)
            .map_or_else(|| UNKNOWN_USER_NAME.to_string(), |user| user.name);

        self.write("watcher_remove", |conn, stamper| {
            if !SqliteLeadRepository::new(conn).exists(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }
            let removed = WatcherRegistry::new(conn).remove(lead_id, user_id)?;
            if removed {
                ActivityLedger::new(conn).record(
                    stamper,
                    lead_id,
                    actor,
                    ActivityAction::WatcherRemoved,
                    ActivityDetails::Watcher { watcher_name },
                )?;
            }
            debug!(
                "event=watcher_remove module=collab status={} lead_id={} user_id={}",
                if removed { "ok" } else { "noop" },
                lead_id,
                user_id
            );
            Ok(removed)
        })
    }

    /// Current watchers resolved through the directory.
    ///
    /// Watcher ids the directory no longer knows are omitted.
    pub fn list_watchers(&self, lead_id: LeadId) -> CollabResult<Vec<UserRef>> {
        let watcher_ids = self.read(|conn| {
            if !SqliteLeadRepository::new(conn).exists(lead_id)? {
                return Err(CollabError::not_found(EntityKind::Lead, lead_id));
            }
            Ok(WatcherRegistry::new(conn).list(lead_id)?)
        })?;
        Ok(watcher_ids
            .into_iter()
            .filter_map(|user_id| self.directory.get_user(user_id))
            .collect())
    }

    // --- activity ----------------------------------------------------------

    /// Ledger entries of a lead, newest first. Survives lead deletion.
    pub fn list_activities(&self, lead_id: LeadId) -> CollabResult<Vec<Activity>> {
        self.read(|conn| Ok(ActivityLedger::new(conn).query(lead_id)?))
    }

    // --- notifications -----------------------------------------------------

    /// Inbox of one user, newest first.
    pub fn list_notifications(&self, user_id: UserId) -> CollabResult<Vec<NotificationView>> {
        self.read(|conn| Ok(NotificationCenter::new(conn).list_for_user(user_id)?))
    }

    pub fn unread_count(&self, user_id: UserId) -> CollabResult<usize> {
        self.read(|conn| Ok(NotificationCenter::new(conn).unread_count(user_id)?))
    }

    /// Marks one notification read; it must belong to `user_id`.
    pub fn mark_notification_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> CollabResult<Notification> {
        self.write("notification_read", |conn, _| {
            NotificationCenter::new(conn)
                .mark_read(notification_id, user_id)?
                .ok_or_else(|| CollabError::not_found(EntityKind::Notification, notification_id))
        })
    }

    /// Marks all of `user_id`'s notifications read.
    ///
    /// Returns how many were unread.
    pub fn mark_all_notifications_read(&self, user_id: UserId) -> CollabResult<usize> {
        self.write("notification_read_all", |conn, _| {
            let marked = NotificationCenter::new(conn).mark_all_read(user_id)?;
            debug!(
                "event=notification_read_all module=collab status=ok user_id={} marked={}",
                user_id, marked
            );
            Ok(marked)
        })
    }

    // --- read receipts -----------------------------------------------------

    /// Records that `actor` has read a note of `lead_id`.
    ///
    /// Returns the receipt and whether it was newly created; a repeat call
    /// returns the original receipt.
    pub fn mark_note_read(
        &self,
        actor: &Actor,
        lead_id: LeadId,
        note_id: NoteId,
    ) -> CollabResult<(ReadReceipt, bool)> {
        self.ensure_actor(actor)?;
        self.write("note_read", |conn, stamper| {
            ensure_note_in_lead(conn, lead_id, note_id)?;
            Ok(ReadReceiptTracker::new(conn).mark(stamper, note_id, actor.user_id, &actor.name)?)
        })
    }

    /// Receipts of a note in creation order.
    pub fn list_read_receipts(
        &self,
        lead_id: LeadId,
        note_id: NoteId,
    ) -> CollabResult<Vec<ReadReceipt>> {
        self.read(|conn| {
            ensure_note_in_lead(conn, lead_id, note_id)?;
            Ok(ReadReceiptTracker::new(conn).list(note_id)?)
        })
    }

    // --- users -------------------------------------------------------------

    /// Directory listing used for mention autocomplete.
    pub fn list_users(&self) -> Vec<UserRef> {
        self.directory.list_users()
    }

    // --- plumbing ----------------------------------------------------------

    fn ensure_actor(&self, actor: &Actor) -> CollabResult<()> {
        if self.directory.get_user(actor.user_id).is_none() {
            warn!(
                "event=actor_check module=collab status=error actor_id={} error_code=unknown_actor",
                actor.user_id
            );
            return Err(CollabError::PreconditionViolation(format!(
                "actor {} is not a known user",
                actor.user_id
            )));
        }
        Ok(())
    }

    /// Runs `op` inside one transaction; commits only on success.
    fn write<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&Connection, &Stamper<'_>) -> CollabResult<T>,
    ) -> CollabResult<T> {
        let started_at = Instant::now();
        let mut conn = self.conn.lock().map_err(|_| CollabError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let stamper = Stamper::new(&self.sequencer, &self.clock);

        match op(&*tx, &stamper) {
            Ok(value) => {
                tx.commit()?;
                debug!(
                    "event={} module=collab status=committed duration_ms={}",
                    event,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={} module=collab status=error duration_ms={} error={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn read<T>(&self, op: impl FnOnce(&Connection) -> CollabResult<T>) -> CollabResult<T> {
        let conn = self.conn.lock().map_err(|_| CollabError::LockPoisoned)?;
        op(&*conn)
    }
}

fn ensure_note_in_lead(conn: &Connection, lead_id: LeadId, note_id: NoteId) -> CollabResult<()> {
    match SqliteNoteRepository::new(conn).get_note_in_lead(lead_id, note_id)? {
        Some(_) => Ok(()),
        None => Err(CollabError::not_found(EntityKind::Note, note_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::{CollabError, CollabService};
    use crate::directory::demo_directory;
    use crate::model::activity::{ActivityAction, ActivityDetails};
    use crate::model::lead::{Lead, LeadDraft};
    use crate::model::user::Actor;
    use crate::repo::activity_repo::ActivityLedger;
    use crate::repo::lead_repo::SqliteLeadRepository;
    use crate::repo::notification_repo::NotificationCenter;
    use crate::repo::watcher_repo::WatcherRegistry;
    use crate::sequencer::EntityKind;

    #[test]
    fn failed_write_rolls_back_every_row() {
        let service = CollabService::new(demo_directory()).unwrap();
        let admin = Actor::new(1, "Admin User");
        let lead = service
            .create_lead(&admin, LeadDraft::new("John Doe", "john@example.com"))
            .unwrap();
        service.add_watcher(&admin, lead.id, 2).unwrap();
        let activities_before = service.list_activities(lead.id).unwrap();

        let result: Result<(), CollabError> = service.write("rollback_check", |conn, stamper| {
            let stamp = stamper.stamp(EntityKind::Lead);
            SqliteLeadRepository::new(conn).insert_lead(&Lead {
                id: stamp.id,
                name: "Ghost".to_string(),
                email: "ghost@example.com".to_string(),
                phone: String::new(),
                status: "New".to_string(),
                created_at: stamp.created_at,
                watchers: WatcherRegistry::initial(admin.user_id),
            })?;
            ActivityLedger::new(conn).record(
                stamper,
                lead.id,
                &admin,
                ActivityAction::NoteAdded,
                ActivityDetails::note_added("never committed", 50),
            )?;
            NotificationCenter::new(conn).fanout(stamper, lead.id, "never sent", 1, None)?;
            Err(CollabError::PreconditionViolation("forced failure".to_string()))
        });

        assert!(matches!(result, Err(CollabError::PreconditionViolation(_))));
        let ids: Vec<_> = service.list_leads().unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![lead.id]);
        assert_eq!(service.list_activities(lead.id).unwrap(), activities_before);
        assert!(service.list_notifications(2).unwrap().is_empty());
    }

    #[test]
    fn store_stays_usable_after_rollback() {
        let service = CollabService::new(demo_directory()).unwrap();
        let admin = Actor::new(1, "Admin User");

        let failed: Result<(), CollabError> = service.write("rollback_check", |conn, stamper| {
            let stamp = stamper.stamp(EntityKind::Lead);
            SqliteLeadRepository::new(conn).insert_lead(&Lead {
                id: stamp.id,
                name: "Ghost".to_string(),
                email: "ghost@example.com".to_string(),
                phone: String::new(),
                status: "New".to_string(),
                created_at: stamp.created_at,
                watchers: WatcherRegistry::initial(admin.user_id),
            })?;
            Err(CollabError::not_found(EntityKind::Note, 9))
        });
        assert!(failed.is_err());

        let lead = service
            .create_lead(&admin, LeadDraft::new("Jane Roe", "jane@example.com"))
            .unwrap();
        assert_eq!(service.list_leads().unwrap(), vec![lead]);
    }
}
