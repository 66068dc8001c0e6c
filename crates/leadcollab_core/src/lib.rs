//! Collaboration fan-out core for shared sales-lead tracking.
//! This crate owns mention derivation, notifications, the activity ledger and
//! read receipts; HTTP, auth and persistence live with the host.

pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sequencer;
pub mod service;

pub use config::{CollabConfig, ConfigError, LoggingConfig};
pub use directory::{demo_directory, DirectoryError, InMemoryUserDirectory, UserDirectory};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::activity::{note_preview, Activity, ActivityAction, ActivityDetails};
pub use model::lead::{Lead, LeadDraft, LeadField, LeadId, LeadPatch};
pub use model::note::{Mention, Note, NoteId, ReadReceipt};
pub use model::notification::{Notification, NotificationId, NotificationKind, NotificationView};
pub use model::user::{Actor, UserId, UserRef};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use sequencer::{EntityKind, IdSequencer, MonotonicClock};
pub use service::collab_service::{
    CollabError, CollabResult, CollabService, LeadUpdate, NoteOutcome,
};
pub use service::mention_parser::extract_mentions;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
