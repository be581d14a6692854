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

//! # Statement Ledger
//!
//! This library tracks per-user balances derived from an append-only ledger
//! of statements: deposits, withdrawals and transfers between users.
//!
//! ## Core Components
//!
//! - [`Engine`]: Computes balances and validates new statements
//! - [`StatementLedger`]: In-memory append-only statement store
//! - [`UserRegistry`]: In-memory user directory
//! - [`NewStatement`] / [`Statement`]: Statement requests and recorded statements
//! - [`LedgerError`]: Error types for rejected operations
//!
//! Balances are never stored. Every balance query reduces the user's full
//! statement history, so a balance is always consistent with the ledger.
//!
//! ## Example
//!
//! ```
//! use statement_ledger::{Engine, LedgerError, NewStatement};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::in_memory();
//! let paul = engine.users().register("paul", "paul@email.com", "hash").unwrap();
//! let jhon = engine.users().register("jhon", "jhon@email.com", "hash").unwrap();
//!
//! engine
//!     .create_statement(NewStatement::deposit(paul.id(), dec!(200), "salary").unwrap())
//!     .unwrap();
//! engine
//!     .create_statement(NewStatement::transfer(paul.id(), jhon.id(), dec!(50), "rent").unwrap())
//!     .unwrap();
//!
//! assert_eq!(engine.balance(paul.id()).unwrap().balance(), dec!(150));
//! assert_eq!(engine.balance(jhon.id()).unwrap().balance(), dec!(50));
//!
//! let overdraft = NewStatement::withdraw(jhon.id(), dec!(51), "too much").unwrap();
//! assert_eq!(engine.create_statement(overdraft), Err(LedgerError::InsufficientFunds));
//! ```

mod balance;
mod base;
mod engine;
pub mod error;
pub mod ledger;
mod statement;
pub mod user;

pub use balance::Balance;
pub use base::{StatementId, UserId};
pub use engine::Engine;
pub use error::LedgerError;
pub use ledger::{StatementLedger, StatementRepository};
pub use statement::{NewStatement, OperationType, Statement, StatementKind};
pub use user::{User, UserDirectory, UserRegistry};
