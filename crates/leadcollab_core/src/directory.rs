//! User directory seam.
//!
//! # Responsibility
//! - Resolve mention handles and user ids to display data.
//! - Keep user ownership outside the collaboration core (read-only access).
//!
//! # Invariants
//! - Usernames are unique and matched case-sensitively.

use crate::model::user::{UserId, UserRef};
use crate::service::mention_parser::is_mentionable_handle;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Read-only lookup contract implemented by the host's user store.
pub trait UserDirectory: Send + Sync {
    /// Resolves an `@handle` (without the `@`) to a user.
    fn resolve_handle(&self, handle: &str) -> Option<UserRef>;
    /// Looks up one user by id.
    fn get_user(&self, user_id: UserId) -> Option<UserRef>;
    /// Lists all users sorted by id.
    fn list_users(&self) -> Vec<UserRef>;
}

/// Directory registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    DuplicateUserId(UserId),
    DuplicateUsername(String),
    InvalidUsername(String),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateUserId(id) => write!(f, "user id already registered: {id}"),
            Self::DuplicateUsername(name) => write!(f, "username already registered: {name}"),
            Self::InvalidUsername(name) => write!(f, "username is not a valid handle: `{name}`"),
        }
    }
}

impl Error for DirectoryError {}

/// `BTreeMap`-backed directory for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: BTreeMap<UserId, UserRef>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one user.
    pub fn insert(&mut self, user: UserRef) -> Result<(), DirectoryError> {
        if !is_mentionable_handle(&user.username) {
            return Err(DirectoryError::InvalidUsername(user.username));
        }
        if self.users.contains_key(&user.id) {
            return Err(DirectoryError::DuplicateUserId(user.id));
        }
        if self.users.values().any(|known| known.username == user.username) {
            return Err(DirectoryError::DuplicateUsername(user.username));
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Builds a directory from a user list, failing on the first conflict.
    pub fn from_users(users: impl IntoIterator<Item = UserRef>) -> Result<Self, DirectoryError> {
        let mut directory = Self::new();
        for user in users {
            directory.insert(user)?;
        }
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn resolve_handle(&self, handle: &str) -> Option<UserRef> {
        self.users
            .values()
            .find(|user| user.username == handle)
            .cloned()
    }

    fn get_user(&self, user_id: UserId) -> Option<UserRef> {
        self.users.get(&user_id).cloned()
    }

    fn list_users(&self) -> Vec<UserRef> {
        self.users.values().cloned().collect()
    }
}

/// Directory pre-populated with the three demo accounts.
pub fn demo_directory() -> InMemoryUserDirectory {
    let users = [
        UserRef::new(1, "admin", "Admin User"),
        UserRef::new(2, "mohan", "Mohan Kumar"),
        UserRef::new(3, "ravi", "Ravi Singh"),
    ];
    InMemoryUserDirectory {
        users: users.into_iter().map(|user| (user.id, user)).collect(),
    }
}
