//! Running account balances computed on demand from the cached transactions.
//!
//! Every figure is computed with checked arithmetic; a total that leaves the
//! decimal range is reported as [`LedgerError::Overflow`].

use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::{convert, round_display};
use crate::domain::{Account, Transaction};
use crate::errors::{LedgerError, Result};
use crate::filters::{transactions, Filter};
use crate::store::{Store, Tables};

/// Balance of `account` over the top-level transactions accepted by `filter`.
///
/// Crediting transactions add their converted amount, debiting ones subtract
/// the raw amount. A transfer from an account to itself therefore nets to
/// zero. The result is rounded half-up to two fraction digits.
pub fn balance(
    store: &Store,
    account: &Account,
    include_opening: bool,
    filter: &Filter<Transaction>,
) -> Result<Decimal> {
    store.read(|tables| balance_in(tables, account, include_opening, filter))
}

pub fn total_balance(store: &Store, account: &Account) -> Result<Decimal> {
    balance(store, account, true, &Filter::always())
}

/// Balance including only transactions not yet reconciled with a statement.
pub fn waiting_balance(store: &Store, account: &Account) -> Result<Decimal> {
    balance(store, account, true, &transactions::unchecked())
}

pub fn reconciled_balance(store: &Store, account: &Account) -> Result<Decimal> {
    balance(store, account, true, &transactions::checked())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub total: Decimal,
    pub waiting: Decimal,
    pub reconciled: Decimal,
}

/// All three account balances from a single snapshot.
pub fn summary(store: &Store, account: &Account) -> Result<AccountSummary> {
    store.read(|tables| {
        Ok(AccountSummary {
            total: balance_in(tables, account, true, &Filter::always())?,
            waiting: balance_in(tables, account, true, &transactions::unchecked())?,
            reconciled: balance_in(tables, account, true, &transactions::checked())?,
        })
    })
}

/// Sum of the converted amounts of a selection, ignoring detail rows.
pub fn sum_credit_amounts(store: &Store, selection: &[Transaction]) -> Result<Decimal> {
    store.read(|tables| {
        let sum = selection
            .iter()
            .filter(|txn| txn.parent_id.is_none())
            .try_fold(Decimal::ZERO, |sum, txn| {
                add(sum, converted_amount(tables, txn)?)
            })?;
        Ok(round_display(sum))
    })
}

/// Amount as seen by the credited account. The rate applies only when the
/// two accounts are kept in different currencies.
pub fn converted_amount(tables: &Tables, txn: &Transaction) -> Result<Decimal> {
    if same_currency(tables, txn) {
        Ok(txn.amount)
    } else {
        convert(txn.amount, txn.rate, txn.rate_direction)
    }
}

fn same_currency(tables: &Tables, txn: &Transaction) -> bool {
    match (
        tables.accounts().get(txn.debited_account_id),
        tables.accounts().get(txn.credited_account_id),
    ) {
        (Some(debited), Some(credited)) => debited.currency_id == credited.currency_id,
        _ => false,
    }
}

fn balance_in(
    tables: &Tables,
    account: &Account,
    include_opening: bool,
    filter: &Filter<Transaction>,
) -> Result<Decimal> {
    let opening = if include_opening {
        account.opening_balance
    } else {
        Decimal::ZERO
    };
    let total = tables
        .transactions()
        .iter()
        .filter(|txn| txn.parent_id.is_none() && txn.references(account.id))
        .filter(|txn| filter.test(txn))
        .try_fold(opening, |mut running, txn| {
            if txn.credited_account_id == account.id {
                running = add(running, converted_amount(tables, txn)?)?;
            }
            if txn.debited_account_id == account.id {
                running = running.checked_sub(txn.amount).ok_or_else(|| {
                    LedgerError::Overflow(format!("balance of `{}`", account.name))
                })?;
            }
            Ok::<_, LedgerError>(running)
        })?;
    Ok(round_display(total))
}

fn add(running: Decimal, amount: Decimal) -> Result<Decimal> {
    running
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Overflow(format!("{} + {}", running, amount)))
}
