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

//! Statement records.
//!
//! A statement is one financial event against a user's account. Statements are
//! immutable: the ledger hands out clones and there is no mutating accessor.
//!
//! A transfer is stored once, on the receiver's side, tagged with the sender.
//! Its debit is applied when the sender's balance is reduced (see
//! [`Statement::balance_effect`]).

use crate::LedgerError;
use crate::base::{StatementId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use std::fmt;

/// Flat statement tag, as shown to callers and written to CSV/JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Transfer => "transfer",
        };
        f.write_str(tag)
    }
}

/// Statement variant with its type-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Deposit,
    Withdraw,
    /// Funds debited from `sender_id` and credited to the statement's user.
    Transfer { sender_id: UserId },
}

impl StatementKind {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Deposit => OperationType::Deposit,
            Self::Withdraw => OperationType::Withdraw,
            Self::Transfer { .. } => OperationType::Transfer,
        }
    }

    pub fn sender_id(&self) -> Option<UserId> {
        match self {
            Self::Transfer { sender_id } => Some(*sender_id),
            _ => None,
        }
    }
}

/// A validated request to record a statement.
///
/// Construction rejects non-positive amounts, so every `NewStatement` is
/// well-formed before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatement {
    user_id: UserId,
    kind: StatementKind,
    amount: Decimal,
    description: String,
}

impl NewStatement {
    pub fn new(
        user_id: UserId,
        kind: StatementKind,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self {
            user_id,
            kind,
            amount,
            description: description.into(),
        })
    }

    pub fn deposit(
        user_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        Self::new(user_id, StatementKind::Deposit, amount, description)
    }

    pub fn withdraw(
        user_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        Self::new(user_id, StatementKind::Withdraw, amount, description)
    }

    /// Transfer of `amount` from `sender_id` to `receiver_id`.
    pub fn transfer(
        sender_id: UserId,
        receiver_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        Self::new(
            receiver_id,
            StatementKind::Transfer { sender_id },
            amount,
            description,
        )
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Materializes the request as a stored statement.
    ///
    /// Called by statement repositories once they have assigned an id.
    pub fn into_statement(self, id: StatementId, created_at: DateTime<Utc>) -> Statement {
        Statement {
            id,
            user_id: self.user_id,
            kind: self.kind,
            amount: self.amount,
            description: self.description,
            created_at,
        }
    }
}

/// A recorded statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    id: StatementId,
    user_id: UserId,
    kind: StatementKind,
    amount: Decimal,
    description: String,
    created_at: DateTime<Utc>,
}

impl Statement {
    const DECIMAL_PRECISION: u32 = 4;

    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn operation_type(&self) -> OperationType {
        self.kind.operation_type()
    }

    pub fn sender_id(&self) -> Option<UserId> {
        self.kind.sender_id()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` if the statement affects `user_id` as receiver or sender.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.user_id == user_id || self.sender_id() == Some(user_id)
    }

    /// Signed contribution of this statement to `user_id`'s balance.
    ///
    /// | Kind | Receiver | Sender |
    /// |------|----------|--------|
    /// | Deposit | `+amount` | - |
    /// | Withdraw | `-amount` | - |
    /// | Transfer | `+amount` | `-amount` |
    ///
    /// A transfer to oneself nets to zero. Statements that do not involve the
    /// user contribute zero.
    pub fn balance_effect(&self, user_id: UserId) -> Decimal {
        let receives = self.user_id == user_id;
        match self.kind {
            StatementKind::Deposit if receives => self.amount,
            StatementKind::Withdraw if receives => -self.amount,
            StatementKind::Transfer { sender_id } => match (receives, sender_id == user_id) {
                (true, false) => self.amount,
                (false, true) => -self.amount,
                _ => Decimal::ZERO,
            },
            _ => Decimal::ZERO,
        }
    }
}

impl Serialize for Statement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Statement", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("type", &self.operation_type())?;
        state.serialize_field(
            "amount",
            &self.amount.round_dp(Statement::DECIMAL_PRECISION),
        )?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("sender_id", &self.sender_id())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.end()
    }
}
