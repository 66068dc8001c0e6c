//! Lead records and field-level change detection.
//!
//! # Responsibility
//! - Define the tracked sales prospect and its create/update inputs.
//! - Compute which fields a patch actually changes.
//!
//! # Invariants
//! - `watchers` is a set: no duplicates, order is irrelevant.
//! - A patch that writes the current value does not count as a change.

use super::user::UserId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a lead.
pub type LeadId = i64;

/// Status assigned when a create request carries none.
pub const DEFAULT_LEAD_STATUS: &str = "New";

/// Sales prospect tracked by the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Free-form label such as `New`, `In Progress` or `Converted`.
    pub status: String,
    pub created_at: i64,
    pub watchers: BTreeSet<UserId>,
}

/// Create input for a lead, already parsed by the API layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl LeadDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            status: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Trims surrounding whitespace from every field.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: trim_field(self.phone),
            status: trim_field(self.status),
        }
    }

    /// Rejects drafts missing a required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::BlankEmail);
        }
        if matches!(self.status.as_deref(), Some(status) if status.trim().is_empty()) {
            return Err(ValidationError::BlankStatus);
        }
        Ok(())
    }
}

/// Partial update input; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

impl LeadPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Trims surrounding whitespace so values compare like stored ones.
    pub fn normalized(&self) -> Self {
        Self {
            name: trim_field(self.name.clone()),
            email: trim_field(self.email.clone()),
            phone: trim_field(self.phone.clone()),
            status: trim_field(self.status.clone()),
        }
    }

    /// Rejects patches that would blank a required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::BlankName);
        }
        if matches!(self.email.as_deref(), Some(email) if email.trim().is_empty()) {
            return Err(ValidationError::BlankEmail);
        }
        if matches!(self.status.as_deref(), Some(status) if status.trim().is_empty()) {
            return Err(ValidationError::BlankStatus);
        }
        Ok(())
    }
}

/// Fields of a lead that a patch may change, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    Name,
    Email,
    Phone,
    Status,
}

impl LeadField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Status => "status",
        }
    }
}

/// Result of applying a patch to a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChanges {
    pub fields: Vec<LeadField>,
    /// `(old, new)` when the status label changed.
    pub status_transition: Option<(String, String)>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.as_str().to_string())
            .collect()
    }
}

impl Lead {
    /// Applies `patch` in place and reports what changed.
    pub fn apply_patch(&mut self, patch: &LeadPatch) -> LeadChanges {
        let mut changes = LeadChanges::default();

        if replace_if_changed(&mut self.name, patch.name.as_deref()).is_some() {
            changes.fields.push(LeadField::Name);
        }
        if replace_if_changed(&mut self.email, patch.email.as_deref()).is_some() {
            changes.fields.push(LeadField::Email);
        }
        if replace_if_changed(&mut self.phone, patch.phone.as_deref()).is_some() {
            changes.fields.push(LeadField::Phone);
        }
        if let Some(old_status) = replace_if_changed(&mut self.status, patch.status.as_deref()) {
            changes.fields.push(LeadField::Status);
            changes.status_transition = Some((old_status, self.status.clone()));
        }

        changes
    }
}

fn trim_field(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string())
}

/// Writes `next` into `slot` when it differs; returns the previous value.
fn replace_if_changed(slot: &mut String, next: Option<&str>) -> Option<String> {
    match next {
        Some(value) if value != slot.as_str() => Some(std::mem::replace(slot, value.to_string())),
        _ => None,
    }
}
