//! User references owned by the auth/directory collaborators.

use serde::{Deserialize, Serialize};

/// Identifier of a user in the external directory.
pub type UserId = i64;

/// Read-only view of one directory user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    /// Unique mention handle, matched case-sensitively.
    pub username: String,
    /// Display name used for denormalized snapshots.
    pub name: String,
}

impl UserRef {
    pub fn new(id: UserId, username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: name.into(),
        }
    }
}

/// Authenticated caller of a mutating operation.
///
/// Supplied by the auth collaborator and trusted as-is; only the id is checked
/// against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub name: String,
}

impl Actor {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

impl From<&UserRef> for Actor {
    fn from(user: &UserRef) -> Self {
        Self::new(user.id, user.name.clone())
    }
}
