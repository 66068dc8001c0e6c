//! Runtime configuration for the collaboration core.
//!
//! # Responsibility
//! - Parse optional JSON configuration supplied by the host process.
//! - Reject values that would break identity or preview invariants.
//!
//! # Invariants
//! - Every field has a default; an empty object is a valid config.
//! - Identifier floors are strictly positive.

use crate::model::activity::NOTE_PREVIEW_CHARS;
use crate::model::lead::DEFAULT_LEAD_STATUS;
use crate::sequencer::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// File logging settings forwarded to `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: String,
}

/// Collaboration core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollabConfig {
    /// Starting identifier per entity kind, for hosts that pre-seed records.
    pub id_floors: BTreeMap<EntityKind, i64>,
    /// Status given to leads created without one.
    pub default_status: String,
    /// Characters of note content kept in `note_added` previews.
    pub note_preview_chars: usize,
    /// File logging; `None` leaves logging to the host.
    pub logging: Option<LoggingConfig>,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            id_floors: BTreeMap::new(),
            default_status: DEFAULT_LEAD_STATUS.to_string(),
            note_preview_chars: NOTE_PREVIEW_CHARS,
            logging: None,
        }
    }
}

impl CollabConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, floor) in &self.id_floors {
            if *floor < 1 {
                return Err(ConfigError::InvalidIdFloor {
                    kind: *kind,
                    floor: *floor,
                });
            }
        }
        if self.default_status.trim().is_empty() {
            return Err(ConfigError::BlankDefaultStatus);
        }
        if self.note_preview_chars == 0 {
            return Err(ConfigError::ZeroPreviewLength);
        }
        Ok(())
    }
}

/// Configuration parse/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidIdFloor { kind: EntityKind, floor: i64 },
    BlankDefaultStatus,
    ZeroPreviewLength,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidIdFloor { kind, floor } => {
                write!(f, "id floor for {kind} must be >= 1, got {floor}")
            }
            Self::BlankDefaultStatus => write!(f, "default_status must not be blank"),
            Self::ZeroPreviewLength => write!(f, "note_preview_chars must be > 0"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
