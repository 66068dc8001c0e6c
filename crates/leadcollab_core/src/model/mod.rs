//! Collaboration domain records.
//!
//! # Responsibility
//! - Define the plain structured records exchanged with the API layer.
//! - Hold input validation that does not need storage access.
//!
//! # Invariants
//! - Identifiers are sequencer-assigned `i64` values, unique per kind.
//! - Timestamps are epoch milliseconds and never decrease in allocation order.
//! - Display names are frozen at write time (`author_name`, `user_name`).

pub mod activity;
pub mod lead;
pub mod note;
pub mod notification;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input validation failures raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Lead name is missing or blank.
    BlankName,
    /// Lead email is missing or blank.
    BlankEmail,
    /// Lead status was set to a blank label.
    BlankStatus,
    /// Note content is empty after trimming.
    BlankNoteContent,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "lead name is required"),
            Self::BlankEmail => write!(f, "lead email is required"),
            Self::BlankStatus => write!(f, "lead status must not be blank"),
            Self::BlankNoteContent => write!(f, "note content is required"),
        }
    }
}

impl Error for ValidationError {}
