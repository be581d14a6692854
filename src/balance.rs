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

//! Balance snapshots.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use statement_ledger::{Balance, UserId};
//!
//! let balance = Balance::from_statements(UserId(1), Vec::new()).unwrap();
//! assert_eq!(balance.balance(), dec!(0));
//! ```

use crate::LedgerError;
use crate::base::UserId;
use crate::statement::Statement;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A user's balance at a point in time, together with the statements it was
/// derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    user_id: UserId,
    balance: Decimal,
    statements: Vec<Statement>,
}

impl Balance {
    const DECIMAL_PRECISION: u32 = 4;

    /// Reduces `statements` into a balance for `user_id`.
    ///
    /// Deposits and received transfers add, withdrawals and sent transfers
    /// subtract. Statements not involving the user are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if the running balance leaves the
    /// range of [`Decimal`].
    pub fn from_statements(
        user_id: UserId,
        statements: Vec<Statement>,
    ) -> Result<Self, LedgerError> {
        let balance = statements
            .iter()
            .try_fold(Decimal::ZERO, |balance, statement| {
                balance.checked_add(statement.balance_effect(user_id))
            })
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(Self {
            user_id,
            balance,
            statements,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Statements involving the user, in insertion order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl Serialize for Balance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Balance", 3)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field(
            "balance",
            &self.balance.round_dp(Balance::DECIMAL_PRECISION),
        )?;
        state.serialize_field("statements", &self.statements)?;
        state.end()
    }
}
