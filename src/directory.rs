//! User directory.
//!
//! The directory is owned by an external collaborator (the account system);
//! this crate only reads it. An in-memory implementation is provided for the
//! binary and for tests, seeded from the `[[users]]` config section.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A user account, read-only from this crate's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique; the join key for agent-name linking.
    pub username: String,
    pub role: Role,
}

/// Read-only lookup operations over user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Option<User>;
    async fn find_by_id(&self, id: Uuid) -> Option<User>;
    async fn list_all(&self) -> Vec<User>;
}

/// In-memory directory backed by a concurrent map.
#[derive(Default)]
pub struct MemoryDirectory {
    users: DashMap<Uuid, User>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with a generated id, returning the stored entry.
    pub fn add_user(&self, username: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        };
        self.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|e| e.value().username == username)
            .map(|e| e.value().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|e| e.value().clone())
    }

    async fn list_all(&self) -> Vec<User> {
        self.users.iter().map(|e| e.value().clone()).collect()
    }
}
