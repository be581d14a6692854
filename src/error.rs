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

//! Error types for statement processing.

use crate::base::UserId;
use thiserror::Error;

/// Ledger errors.
///
/// Every error is terminal for the operation that raised it: a rejected
/// statement leaves the ledger untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced user (receiver or sender) does not exist
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Withdrawal or transfer exceeds the payer's balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Statement does not exist for the requesting user
    #[error("statement not found")]
    StatementNotFound,

    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Crediting the amount would exceed the representable balance
    #[error("amount overflows the balance")]
    AmountOverflow,

    /// Email is already bound to another user
    #[error("email already registered")]
    EmailAlreadyRegistered,

    /// User ID is already taken
    #[error("user {0} already exists")]
    UserAlreadyExists(UserId),
}
