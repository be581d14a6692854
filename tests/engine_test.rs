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

//! Engine public API integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use statement_ledger::{
    Engine, LedgerError, NewStatement, OperationType, Statement, StatementId, UserId,
};

// === Helper Functions ===

fn engine_with_users(count: u32) -> (Engine, Vec<UserId>) {
    let engine = Engine::in_memory();
    let ids = (1..=count)
        .map(|i| {
            engine
                .users()
                .register(format!("user{i}"), format!("user{i}@email.com"), "hash")
                .unwrap()
                .id()
        })
        .collect();
    (engine, ids)
}

fn deposit(engine: &Engine, user: UserId, amount: Decimal) -> Result<Statement, LedgerError> {
    engine.create_statement(NewStatement::deposit(user, amount, "deposit").unwrap())
}

fn withdraw(engine: &Engine, user: UserId, amount: Decimal) -> Result<Statement, LedgerError> {
    engine.create_statement(NewStatement::withdraw(user, amount, "withdraw").unwrap())
}

fn transfer(
    engine: &Engine,
    sender: UserId,
    receiver: UserId,
    amount: Decimal,
) -> Result<Statement, LedgerError> {
    engine.create_statement(NewStatement::transfer(sender, receiver, amount, "transfer").unwrap())
}

fn balance(engine: &Engine, user: UserId) -> Decimal {
    engine.balance(user).unwrap().balance()
}

// === Balance Scenario ===

#[test]
fn balance_scenario_reproduces_exact_values() {
    let (engine, ids) = engine_with_users(2);
    let (a, b) = (ids[0], ids[1]);

    deposit(&engine, a, dec!(200)).unwrap();
    withdraw(&engine, a, dec!(30)).unwrap();
    assert_eq!(balance(&engine, a), dec!(170));

    deposit(&engine, b, dec!(100)).unwrap();
    transfer(&engine, a, b, dec!(50)).unwrap();
    assert_eq!(balance(&engine, a), dec!(120));
    assert_eq!(balance(&engine, b), dec!(150));

    transfer(&engine, b, a, dec!(100)).unwrap();
    assert_eq!(balance(&engine, a), dec!(220));
    assert_eq!(balance(&engine, b), dec!(50));
}

#[test]
fn balance_is_idempotent() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(12.34)).unwrap();

    let first = engine.balance(ids[0]).unwrap();
    let second = engine.balance(ids[0]).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn balance_lists_statements_in_insertion_order() {
    let (engine, ids) = engine_with_users(2);
    let (a, b) = (ids[0], ids[1]);

    deposit(&engine, a, dec!(100)).unwrap();
    deposit(&engine, b, dec!(5)).unwrap();
    transfer(&engine, a, b, dec!(10)).unwrap();
    withdraw(&engine, a, dec!(1)).unwrap();

    let history = engine.balance(a).unwrap();
    let types: Vec<OperationType> = history
        .statements()
        .iter()
        .map(|s| s.operation_type())
        .collect();
    assert_eq!(
        types,
        vec![
            OperationType::Deposit,
            OperationType::Transfer,
            OperationType::Withdraw
        ]
    );
    let ids: Vec<StatementId> = history.statements().iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![StatementId(1), StatementId(3), StatementId(4)]);
}

#[test]
fn balance_of_new_user_is_zero() {
    let (engine, ids) = engine_with_users(1);
    let result = engine.balance(ids[0]).unwrap();
    assert_eq!(result.balance(), Decimal::ZERO);
    assert!(result.statements().is_empty());
}

#[test]
fn balance_of_unknown_user_fails() {
    let (engine, _) = engine_with_users(1);
    let result = engine.balance(UserId(404));
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(404))));
    assert!(engine.statements().is_empty());
}

// === Deposits ===

#[test]
fn deposit_at_zero_balance_succeeds() {
    let (engine, ids) = engine_with_users(1);
    let statement = deposit(&engine, ids[0], dec!(0.01)).unwrap();

    assert_eq!(statement.operation_type(), OperationType::Deposit);
    assert_eq!(statement.user_id(), ids[0]);
    assert_eq!(statement.amount(), dec!(0.01));
    assert_eq!(statement.description(), "deposit");
    assert_eq!(statement.sender_id(), None);
}

#[test]
fn deposit_for_unknown_user_fails() {
    let (engine, _) = engine_with_users(0);
    let result = deposit(&engine, UserId(1), dec!(10));
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(1))));
    assert!(engine.statements().is_empty());
}

// === Withdrawals ===

#[test]
fn withdraw_exact_balance_leaves_zero() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(75.50)).unwrap();

    withdraw(&engine, ids[0], dec!(75.50)).unwrap();
    assert_eq!(balance(&engine, ids[0]), Decimal::ZERO);
}

#[test]
fn withdraw_one_unit_over_balance_fails() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(75.50)).unwrap();

    let result = withdraw(&engine, ids[0], dec!(75.51));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(balance(&engine, ids[0]), dec!(75.50));
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn withdraw_from_empty_account_fails() {
    let (engine, ids) = engine_with_users(1);
    let result = withdraw(&engine, ids[0], dec!(1));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert!(engine.statements().is_empty());
}

// === Transfers ===

#[test]
fn transfer_is_recorded_once_on_receiver_side() {
    let (engine, ids) = engine_with_users(2);
    let (a, b) = (ids[0], ids[1]);
    deposit(&engine, a, dec!(100)).unwrap();

    let statement = transfer(&engine, a, b, dec!(40)).unwrap();

    assert_eq!(statement.user_id(), b);
    assert_eq!(statement.sender_id(), Some(a));
    assert_eq!(engine.statements().len(), 2);
    assert_eq!(balance(&engine, a), dec!(60));
    assert_eq!(balance(&engine, b), dec!(40));
}

#[test]
fn transfer_exact_balance_leaves_sender_at_zero() {
    let (engine, ids) = engine_with_users(2);
    deposit(&engine, ids[0], dec!(20)).unwrap();

    transfer(&engine, ids[0], ids[1], dec!(20)).unwrap();
    assert_eq!(balance(&engine, ids[0]), Decimal::ZERO);
    assert_eq!(balance(&engine, ids[1]), dec!(20));
}

#[test]
fn transfer_over_sender_balance_fails() {
    let (engine, ids) = engine_with_users(2);
    deposit(&engine, ids[0], dec!(20)).unwrap();
    deposit(&engine, ids[1], dec!(1000)).unwrap();

    // Receiver's balance is irrelevant to the check.
    let result = transfer(&engine, ids[0], ids[1], dec!(20.0001));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(balance(&engine, ids[0]), dec!(20));
    assert_eq!(balance(&engine, ids[1]), dec!(1000));
    assert_eq!(engine.statements().len(), 2);
}

#[test]
fn transfer_to_unknown_receiver_fails() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(20)).unwrap();

    let result = transfer(&engine, ids[0], UserId(99), dec!(5));
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(99))));
    assert_eq!(balance(&engine, ids[0]), dec!(20));
}

#[test]
fn transfer_from_unknown_sender_fails() {
    let (engine, ids) = engine_with_users(1);

    let result = transfer(&engine, UserId(99), ids[0], dec!(5));
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(99))));
    assert!(engine.statements().is_empty());
}

#[test]
fn transfer_to_self_with_funds_leaves_balance_unchanged() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(30)).unwrap();

    let statement = transfer(&engine, ids[0], ids[0], dec!(30)).unwrap();

    assert_eq!(statement.sender_id(), Some(ids[0]));
    assert_eq!(balance(&engine, ids[0]), dec!(30));
    assert_eq!(engine.balance(ids[0]).unwrap().statements().len(), 2);
}

#[test]
fn transfer_to_self_over_balance_fails() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], dec!(30)).unwrap();

    let result = transfer(&engine, ids[0], ids[0], dec!(31));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn transfer_to_self_for_unknown_user_reports_missing_user() {
    let (engine, _) = engine_with_users(1);

    let result = transfer(&engine, UserId(99), UserId(99), dec!(1));
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(99))));
    assert!(engine.statements().is_empty());
}

#[test]
fn received_transfer_funds_can_be_withdrawn() {
    let (engine, ids) = engine_with_users(2);
    deposit(&engine, ids[0], dec!(50)).unwrap();
    transfer(&engine, ids[0], ids[1], dec!(50)).unwrap();

    withdraw(&engine, ids[1], dec!(50)).unwrap();
    assert_eq!(balance(&engine, ids[1]), Decimal::ZERO);
    assert_eq!(withdraw(&engine, ids[0], dec!(1)), Err(LedgerError::InsufficientFunds));
}

// === Range Limits ===

#[test]
fn deposit_past_decimal_max_is_rejected() {
    let (engine, ids) = engine_with_users(1);
    deposit(&engine, ids[0], Decimal::MAX).unwrap();

    let result = deposit(&engine, ids[0], Decimal::MAX);
    assert_eq!(result, Err(LedgerError::AmountOverflow));
    assert_eq!(deposit(&engine, ids[0], dec!(1)), Err(LedgerError::AmountOverflow));

    assert_eq!(balance(&engine, ids[0]), Decimal::MAX);
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn accumulated_deposits_reach_decimal_max() {
    let (engine, ids) = engine_with_users(1);
    let most = Decimal::MAX - Decimal::from(1_000_000u64);

    deposit(&engine, ids[0], most).unwrap();
    deposit(&engine, ids[0], Decimal::from(1_000_000u64)).unwrap();
    assert_eq!(balance(&engine, ids[0]), Decimal::MAX);

    withdraw(&engine, ids[0], dec!(1)).unwrap();
    deposit(&engine, ids[0], dec!(1)).unwrap();
    assert_eq!(balance(&engine, ids[0]), Decimal::MAX);

    withdraw(&engine, ids[0], Decimal::MAX).unwrap();
    assert_eq!(balance(&engine, ids[0]), Decimal::ZERO);
}

#[test]
fn transfer_overflowing_receiver_is_rejected() {
    let (engine, ids) = engine_with_users(2);
    let (a, b) = (ids[0], ids[1]);
    deposit(&engine, a, Decimal::MAX).unwrap();
    deposit(&engine, b, dec!(10)).unwrap();

    let result = transfer(&engine, b, a, dec!(10));
    assert_eq!(result, Err(LedgerError::AmountOverflow));
    assert_eq!(balance(&engine, a), Decimal::MAX);
    assert_eq!(balance(&engine, b), dec!(10));
    assert_eq!(engine.statements().len(), 2);

    // The large side can still pay out.
    transfer(&engine, a, b, dec!(10)).unwrap();
    assert_eq!(balance(&engine, b), dec!(20));
}

// === Statement Lookup ===

#[test]
fn statement_lookup_by_owner() {
    let (engine, ids) = engine_with_users(1);
    let created = deposit(&engine, ids[0], dec!(10)).unwrap();

    let fetched = engine.statement(ids[0], created.id()).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn statement_lookup_by_transfer_sender() {
    let (engine, ids) = engine_with_users(2);
    deposit(&engine, ids[0], dec!(10)).unwrap();
    let created = transfer(&engine, ids[0], ids[1], dec!(10)).unwrap();

    assert_eq!(engine.statement(ids[0], created.id()).unwrap(), created);
    assert_eq!(engine.statement(ids[1], created.id()).unwrap(), created);
}

#[test]
fn statement_lookup_scoped_to_user() {
    let (engine, ids) = engine_with_users(2);
    let created = deposit(&engine, ids[0], dec!(10)).unwrap();

    let result = engine.statement(ids[1], created.id());
    assert_eq!(result, Err(LedgerError::StatementNotFound));
}

#[test]
fn statement_lookup_unknown_id() {
    let (engine, ids) = engine_with_users(1);
    let result = engine.statement(ids[0], StatementId(42));
    assert_eq!(result, Err(LedgerError::StatementNotFound));
}

#[test]
fn statement_lookup_unknown_user() {
    let (engine, ids) = engine_with_users(1);
    let created = deposit(&engine, ids[0], dec!(10)).unwrap();

    let result = engine.statement(UserId(77), created.id());
    assert_eq!(result, Err(LedgerError::UserNotFound(UserId(77))));
}

// === Immutability ===

#[test]
fn statements_are_unchanged_by_later_operations() {
    let (engine, ids) = engine_with_users(2);
    let first = deposit(&engine, ids[0], dec!(100)).unwrap();

    withdraw(&engine, ids[0], dec!(40)).unwrap();
    transfer(&engine, ids[0], ids[1], dec!(60)).unwrap();
    let _ = withdraw(&engine, ids[0], dec!(1));

    let stored = engine.statement(ids[0], first.id()).unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.amount(), dec!(100));
    assert_eq!(stored.operation_type(), OperationType::Deposit);
    assert_eq!(stored.user_id(), ids[0]);
}
