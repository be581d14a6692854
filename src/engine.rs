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

//! Balance and transfer engine.
//!
//! The [`Engine`] computes balances from the statement ledger and mediates the
//! creation of new statements.
//!
//! # Statement Processing
//!
//! - **Deposits**: Accepted once the user exists, unless the balance would
//!   overflow.
//! - **Withdrawals**: Rejected if the amount exceeds the user's balance.
//! - **Transfers**: Rejected if the amount exceeds the sender's balance. One
//!   statement is recorded on the receiver's side; the sender's debit follows
//!   from the balance reduction. A transfer to oneself follows the same rules
//!   and nets to zero.
//!
//! # Thread Safety
//!
//! Statement creation is serialized by a writer lock held across the balance
//! check and the append, so concurrent withdrawals cannot both pass on a stale
//! balance. Reads never take the writer lock, so a balance read racing a
//! transfer may see the receiver credited before the sender is debited. Each
//! side is individually valid: neither view is ever negative.

use crate::balance::Balance;
use crate::base::{StatementId, UserId};
use crate::ledger::{StatementLedger, StatementRepository};
use crate::statement::{NewStatement, Statement, StatementKind};
use crate::user::{UserDirectory, UserRegistry};
use crate::LedgerError;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Statement engine over a statement repository and a user directory.
///
/// # Invariants
///
/// - A user's balance never goes negative through this engine.
/// - A rejected statement leaves the repository untouched.
/// - Every accepted statement results in exactly one append.
pub struct Engine<S = StatementLedger, U = UserRegistry> {
    statements: Arc<S>,
    users: Arc<U>,
    /// Held across check-then-append in [`Engine::create_statement`].
    writer: Mutex<()>,
}

impl Engine {
    /// Creates an engine over a fresh in-memory ledger and user registry.
    pub fn in_memory() -> Self {
        Engine::new(
            Arc::new(StatementLedger::new()),
            Arc::new(UserRegistry::new()),
        )
    }
}

impl<S, U> Engine<S, U>
where
    S: StatementRepository,
    U: UserDirectory,
{
    pub fn new(statements: Arc<S>, users: Arc<U>) -> Self {
        Engine {
            statements,
            users,
            writer: Mutex::new(()),
        }
    }

    pub fn statements(&self) -> &Arc<S> {
        &self.statements
    }

    pub fn users(&self) -> &Arc<U> {
        &self.users
    }

    /// Computes the current balance of `user_id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] - The user does not exist.
    /// - [`LedgerError::AmountOverflow`] - The stored history does not fit a
    ///   [`Decimal`]. Only reachable with a repository not written by this engine.
    pub fn balance(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        self.ensure_user(user_id)?;
        Balance::from_statements(user_id, self.statements.list_involving(user_id))
    }

    /// Validates and records a statement.
    ///
    /// | Kind | Balance check |
    /// |------|---------------|
    /// | Deposit | none |
    /// | Withdraw | `amount <= balance(user_id)` |
    /// | Transfer | `amount <= balance(sender_id)` |
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] - Receiver or sender does not exist.
    /// - [`LedgerError::InsufficientFunds`] - Amount exceeds the payer's balance.
    /// - [`LedgerError::AmountOverflow`] - Crediting the amount would overflow
    ///   the receiver's balance.
    pub fn create_statement(&self, statement: NewStatement) -> Result<Statement, LedgerError> {
        let _writer = self.writer.lock();

        let user_id = statement.user_id();
        let amount = statement.amount();
        let kind = statement.kind();

        self.ensure_user(user_id)?;
        match kind {
            StatementKind::Deposit => self.ensure_headroom(user_id, amount)?,
            StatementKind::Withdraw => self.ensure_funds(user_id, amount)?,
            StatementKind::Transfer { sender_id } => {
                self.ensure_user(sender_id)?;
                self.ensure_funds(sender_id, amount)?;
                if sender_id != user_id {
                    self.ensure_headroom(user_id, amount)?;
                }
            }
        }

        let statement = self.statements.append(statement);
        debug!(
            statement_id = %statement.id(),
            user_id = %user_id,
            kind = %kind.operation_type(),
            %amount,
            "statement recorded"
        );
        Ok(statement)
    }

    /// Fetches a single statement visible to `user_id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] - The user does not exist.
    /// - [`LedgerError::StatementNotFound`] - No such statement for this user.
    pub fn statement(
        &self,
        user_id: UserId,
        statement_id: StatementId,
    ) -> Result<Statement, LedgerError> {
        self.ensure_user(user_id)?;
        self.statements
            .get_by_id(statement_id, user_id)
            .ok_or(LedgerError::StatementNotFound)
    }

    fn ensure_user(&self, user_id: UserId) -> Result<(), LedgerError> {
        if self.users.exists(user_id) {
            Ok(())
        } else {
            warn!(%user_id, "user not found");
            Err(LedgerError::UserNotFound(user_id))
        }
    }

    fn current_balance(&self, user_id: UserId) -> Result<Decimal, LedgerError> {
        Balance::from_statements(user_id, self.statements.list_involving(user_id))
            .map(|balance| balance.balance())
    }

    fn ensure_funds(&self, payer: UserId, amount: Decimal) -> Result<(), LedgerError> {
        let available = self.current_balance(payer)?;
        if amount > available {
            warn!(user_id = %payer, %amount, %available, "insufficient funds");
            return Err(LedgerError::InsufficientFunds);
        }
        Ok(())
    }

    fn ensure_headroom(&self, payee: UserId, amount: Decimal) -> Result<(), LedgerError> {
        let current = self.current_balance(payee)?;
        if current.checked_add(amount).is_none() {
            warn!(user_id = %payee, %amount, %current, "balance would overflow");
            return Err(LedgerError::AmountOverflow);
        }
        Ok(())
    }
}
