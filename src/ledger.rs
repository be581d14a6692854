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

//! Append-only statement storage.
//!
//! [`StatementRepository`] is the storage seam the engine depends on;
//! [`StatementLedger`] is the in-memory implementation.

use crate::base::{StatementId, UserId};
use crate::statement::{NewStatement, Statement};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Storage for statements.
///
/// Implementations are append-only: there is no way to update or remove a
/// statement once it has been appended.
pub trait StatementRepository: Send + Sync {
    /// Assigns an id and creation timestamp, then stores the statement.
    ///
    /// Never rejects; validation belongs to the caller.
    fn append(&self, statement: NewStatement) -> Statement;

    /// Statements whose `user_id` is `user_id`, in insertion order.
    fn list_by_user(&self, user_id: UserId) -> Vec<Statement>;

    /// Like [`list_by_user`](Self::list_by_user), but also includes transfers
    /// sent by `user_id`.
    fn list_involving(&self, user_id: UserId) -> Vec<Statement>;

    /// Looks up a statement visible to `user_id` (as owner or transfer sender).
    fn get_by_id(&self, statement_id: StatementId, user_id: UserId) -> Option<Statement>;
}

/// In-memory statement ledger.
///
/// Combines a [`DashMap`] keyed by statement id for O(1) detail lookups with a
/// per-user index that preserves insertion order. A transfer is indexed under
/// both its receiver and its sender.
///
/// Readers do not take the append lock. A transfer becomes visible to its
/// receiver's listing slightly before its sender's, so a concurrent reader of
/// both users can briefly observe the credit without the debit.
#[derive(Debug)]
pub struct StatementLedger {
    /// All statements by id.
    statements: DashMap<StatementId, Arc<Statement>>,

    /// Statements involving each user, in insertion order.
    by_user: DashMap<UserId, Vec<Arc<Statement>>>,

    /// Next id to assign. Held for the whole append so ids and index order agree.
    next_id: Mutex<u64>,
}

impl StatementLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self {
            statements: DashMap::new(),
            by_user: DashMap::new(),
            next_id: Mutex::new(1),
        }
    }

    /// Number of stored statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn index(&self, user_id: UserId, statement: &Arc<Statement>) {
        self.by_user
            .entry(user_id)
            .or_default()
            .push(Arc::clone(statement));
    }
}

impl StatementRepository for StatementLedger {
    fn append(&self, statement: NewStatement) -> Statement {
        let mut next_id = self.next_id.lock();
        let id = StatementId(*next_id);
        *next_id += 1;

        let statement = Arc::new(statement.into_statement(id, Utc::now()));
        self.statements.insert(id, Arc::clone(&statement));
        self.index(statement.user_id(), &statement);
        if let Some(sender_id) = statement.sender_id().filter(|&id| id != statement.user_id()) {
            self.index(sender_id, &statement);
        }

        Statement::clone(&statement)
    }

    fn list_by_user(&self, user_id: UserId) -> Vec<Statement> {
        self.by_user
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|statement| statement.user_id() == user_id)
                    .map(|statement| Statement::clone(statement))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn list_involving(&self, user_id: UserId) -> Vec<Statement> {
        self.by_user
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|statement| Statement::clone(statement))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_by_id(&self, statement_id: StatementId, user_id: UserId) -> Option<Statement> {
        self.statements
            .get(&statement_id)
            .filter(|statement| statement.involves(user_id))
            .map(|statement| Statement::clone(&statement))
    }
}

impl Default for StatementLedger {
    fn default() -> Self {
        Self::new()
    }
}
