//! Matching of imported statement lines against recorded transactions.

pub mod statement;

use rust_decimal::Decimal;

use crate::currency::round_display;
use crate::domain::{Account, Transaction};
use crate::store::Store;

pub use statement::{normalise_amount, parse_amount, StatementRecord, StatementRecordBuilder};

/// Top-level transactions of `account` that correspond to `record`, in
/// store order. Detail rows are never proposed; their parent stands for them
/// on the statement.
///
/// A transaction matches when its date equals the record's actual date, its
/// statement date equals the execution date (unless `ignore_execution_date`),
/// and its amount signed from the account's point of view equals the
/// record's account amount at two fraction digits. Records without a usable
/// amount never match.
pub fn match_record(
    store: &Store,
    account: &Account,
    record: &StatementRecord,
    ignore_execution_date: bool,
) -> Vec<Transaction> {
    let expected = match record.account_amount {
        Some(amount) => round_display(amount),
        None => return Vec::new(),
    };
    store.read(|tables| {
        tables
            .transactions()
            .iter()
            .filter(|txn| txn.parent_id.is_none() && txn.references(account.id))
            .filter(|txn| txn.date == record.actual)
            .filter(|txn| ignore_execution_date || txn.statement_date() == record.execution)
            .filter(|txn| signed_amount(txn, account) == expected)
            .cloned()
            .collect()
    })
}

/// Fills every record's matched transactions. Returns how many records found
/// at least one match.
pub fn reconcile_statement(
    store: &Store,
    account: &Account,
    records: &mut [StatementRecord],
    ignore_execution_date: bool,
) -> usize {
    let mut matched = 0;
    for record in records.iter_mut() {
        let found = match_record(store, account, record, ignore_execution_date);
        if !found.is_empty() {
            matched += 1;
        }
        record.set_matched(found);
    }
    tracing::debug!(
        account = %account.name,
        records = records.len(),
        matched,
        "statement reconciled"
    );
    matched
}

fn signed_amount(txn: &Transaction, account: &Account) -> Decimal {
    let amount = round_display(txn.amount);
    if txn.debited_account_id == account.id {
        -amount
    } else {
        amount
    }
}
