// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! User directory.
//!
//! The engine only needs to know whether a user exists, expressed by
//! [`UserDirectory`]. [`UserRegistry`] is an in-memory directory that also
//! handles registration with unique emails.
//!
//! # Example
//!
//! ```
//! use statement_ledger::{UserDirectory, UserRegistry};
//!
//! let users = UserRegistry::new();
//! let paul = users.register("paul", "paul@email.com", "$argon2id$...").unwrap();
//! assert!(users.exists(paul.id()));
//! ```

use crate::LedgerError;
use crate::base::UserId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use serde::Serialize;

/// Existence check used before any statement operation.
pub trait UserDirectory: Send + Sync {
    fn exists(&self, user_id: UserId) -> bool;
}

/// A registered user.
///
/// The credential hash is produced outside this crate and stored as-is. It is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    #[serde(skip)]
    password_hash: String,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// In-memory user directory.
#[derive(Debug)]
pub struct UserRegistry {
    users: DashMap<UserId, User>,
    /// Lowercased email to owning user.
    emails: DashMap<String, UserId>,
    /// Serializes registration so id and email claims are taken together.
    next_id: Mutex<u32>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            next_id: Mutex::new(1),
        }
    }

    /// Registers a new user under the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EmailAlreadyRegistered`] if the email (compared
    /// case-insensitively) belongs to another user.
    pub fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<User, LedgerError> {
        let mut next_id = self.next_id.lock();
        while self.users.contains_key(&UserId(*next_id)) {
            *next_id += 1;
        }
        let user = User::new(UserId(*next_id), name, email, password_hash);
        self.claim(user.clone())?;
        *next_id += 1;
        Ok(user)
    }

    /// Registers a user with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserAlreadyExists`] - The id is taken.
    /// - [`LedgerError::EmailAlreadyRegistered`] - The email is taken.
    pub fn insert(&self, user: User) -> Result<(), LedgerError> {
        let _guard = self.next_id.lock();
        self.claim(user)
    }

    /// Returns a copy of the user, if registered.
    pub fn get(&self, user_id: UserId) -> Option<User> {
        self.users.get(&user_id).map(|user| user.value().clone())
    }

    /// Registered user ids in ascending order.
    pub fn ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.iter().map(|user| *user.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Takes the id and email for `user`. Caller must hold `next_id`.
    fn claim(&self, user: User) -> Result<(), LedgerError> {
        if self.users.contains_key(&user.id) {
            return Err(LedgerError::UserAlreadyExists(user.id));
        }
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => Err(LedgerError::EmailAlreadyRegistered),
            Entry::Vacant(entry) => {
                entry.insert(user.id);
                self.users.insert(user.id, user);
                Ok(())
            }
        }
    }
}

impl UserDirectory for UserRegistry {
    fn exists(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
