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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statement_ledger::{Engine, NewStatement, StatementKind, User, UserId, UserRegistry};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Statement Ledger - Apply statement CSV files
///
/// Loads users, applies deposits, withdrawals and transfers in file order,
/// and writes every user's resulting balance to stdout.
#[derive(Parser, Debug)]
#[command(name = "statement-ledger")]
#[command(about = "Computes user balances from a statement CSV", long_about = None)]
struct Args {
    /// Path to CSV file with users
    ///
    /// Expected format: id,name,email,password_hash
    #[arg(long, value_name = "FILE")]
    users: PathBuf,

    /// Path to CSV file with statements
    ///
    /// Expected format: type,user,sender,amount,description
    /// Example: cargo run -- --users users.csv statements.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let users = match open(&args.users).and_then(load_users) {
        Ok(users) => users,
        Err(e) => {
            eprintln!("Error loading users from '{}': {}", args.users.display(), e);
            process::exit(1);
        }
    };
    info!(users = users.len(), "users loaded");

    let engine = Engine::new(Arc::default(), Arc::new(users));

    if let Err(e) = open(&args.input).and_then(|reader| process_statements(&engine, reader)) {
        eprintln!("Error processing statements: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_balances(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays valid CSV. Level from `RUST_LOG`, default `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open(path: &Path) -> Result<BufReader<File>, csv::Error> {
    Ok(BufReader::new(File::open(path)?))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader)
}

/// Raw user CSV record.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: u32,
    name: String,
    email: String,
    password_hash: String,
}

/// Raw statement CSV record.
///
/// Fields: `type, user, sender, amount, description`
#[derive(Debug, Deserialize)]
struct StatementRecord {
    #[serde(rename = "type")]
    statement_type: String,
    user: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sender: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default)]
    description: String,
}

impl StatementRecord {
    /// Converts the record to a statement request.
    ///
    /// Returns `None` for unknown types, missing required fields, a sender on a
    /// non-transfer, or an amount that is not positive.
    fn into_statement(self) -> Option<NewStatement> {
        let user_id = UserId(self.user);
        let amount = self.amount?;

        let kind = match (self.statement_type.to_lowercase().as_str(), self.sender) {
            ("deposit", None) => StatementKind::Deposit,
            ("withdraw", None) => StatementKind::Withdraw,
            ("transfer", Some(sender)) => StatementKind::Transfer {
                sender_id: UserId(sender),
            },
            _ => return None,
        };

        NewStatement::new(user_id, kind, amount, self.description).ok()
    }
}

/// Loads users from a CSV reader.
///
/// Rows that fail to parse or clash with an existing id or email are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn load_users<R: Read>(reader: R) -> Result<UserRegistry, csv::Error> {
    let registry = UserRegistry::new();

    for result in csv_reader(reader).deserialize::<UserRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed user row");
                continue;
            }
        };
        let user = User::new(
            UserId(record.id),
            record.name,
            record.email,
            record.password_hash,
        );
        if let Err(e) = registry.insert(user) {
            warn!(user_id = record.id, error = %e, "skipping user");
        }
    }

    Ok(registry)
}

/// Applies statements from a CSV reader in file order.
///
/// Malformed rows and rejected statements are logged and skipped; a rejected
/// statement never stops processing.
///
/// # CSV Format
///
/// ```csv
/// type,user,sender,amount,description
/// deposit,1,,200.0,salary
/// withdraw,1,,30.0,groceries
/// transfer,2,1,50.0,rent
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_statements<R: Read>(engine: &Engine, reader: R) -> Result<(), csv::Error> {
    for (row, result) in csv_reader(reader).deserialize::<StatementRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "skipping malformed statement row");
                continue;
            }
        };

        let Some(statement) = record.into_statement() else {
            warn!(row, "skipping invalid statement record");
            continue;
        };

        if let Err(e) = engine.create_statement(statement) {
            warn!(row, error = %e, "statement rejected");
        }
    }

    Ok(())
}

/// Balance output row.
#[derive(Debug, Serialize)]
struct BalanceRecord {
    user: UserId,
    balance: Decimal,
}

/// Writes every registered user's balance as CSV, ordered by user id.
///
/// # CSV Format
///
/// ```csv
/// user,balance
/// 1,220.0000
/// 2,50.0000
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_balances<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    const DECIMAL_PRECISION: u32 = 4;
    let mut wtr = Writer::from_writer(writer);

    for user_id in engine.users().ids() {
        let balance = match engine.balance(user_id) {
            Ok(balance) => balance,
            Err(e) => {
                warn!(%user_id, error = %e, "skipping balance");
                continue;
            }
        };
        let mut amount = balance.balance().round_dp(DECIMAL_PRECISION);
        amount.rescale(DECIMAL_PRECISION);
        wtr.serialize(BalanceRecord {
            user: user_id,
            balance: amount,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
