use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::currency::round_display;
use crate::domain::{Currency, Transaction};
use crate::store::Store;

const NO_BREAK_SPACE: char = '\u{a0}';

/// One normalized line of an imported bank statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord {
    pub actual: NaiveDate,
    /// Date the bank executed the operation; equals `actual` unless the statement says otherwise.
    pub execution: NaiveDate,
    pub description: String,
    pub counterparty: String,
    pub place: String,
    pub country: String,
    pub currency: String,
    pub currency_id: Option<Uuid>,
    /// Operation amount, `None` when the statement text was not a number.
    pub amount: Option<Decimal>,
    pub account_currency: String,
    pub account_currency_id: Option<Uuid>,
    /// Amount in the account's currency, signed as the bank reports it.
    pub account_amount: Option<Decimal>,
    #[serde(skip)]
    matched: Vec<Transaction>,
}

impl StatementRecord {
    pub fn builder(actual: NaiveDate) -> StatementRecordBuilder {
        StatementRecordBuilder {
            actual,
            execution: None,
            description: String::new(),
            counterparty: String::new(),
            place: String::new(),
            country: String::new(),
            currency: String::new(),
            amount: "0.00".into(),
            account_currency: String::new(),
            account_amount: None,
        }
    }

    /// Transactions found for this line by the last reconciliation run.
    pub fn matched(&self) -> &[Transaction] {
        &self.matched
    }

    pub fn set_matched(&mut self, matched: Vec<Transaction>) {
        self.matched = matched;
    }

    pub fn is_matched(&self) -> bool {
        !self.matched.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StatementRecordBuilder {
    actual: NaiveDate,
    execution: Option<NaiveDate>,
    description: String,
    counterparty: String,
    place: String,
    country: String,
    currency: String,
    amount: String,
    account_currency: String,
    account_amount: Option<String>,
}

impl StatementRecordBuilder {
    pub fn execution(mut self, execution: NaiveDate) -> Self {
        self.execution = Some(execution);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = counterparty.into();
        self
    }

    pub fn place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn account_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = currency.into();
        self
    }

    pub fn account_amount(mut self, amount: impl Into<String>) -> Self {
        self.account_amount = Some(amount.into());
        self
    }

    /// Resolves currency hints against the store and parses both amounts.
    pub fn build(self, store: &Store) -> StatementRecord {
        let currencies = store.all::<Currency>();
        let resolve = |hint: &str| {
            currencies
                .iter()
                .find(|currency| currency.matches_hint(hint))
                .map(|currency| currency.id)
        };
        let account_amount = self.account_amount.as_deref().unwrap_or(&self.amount);

        StatementRecord {
            actual: self.actual,
            execution: self.execution.unwrap_or(self.actual),
            currency_id: resolve(&self.currency),
            account_currency_id: resolve(&self.account_currency),
            amount: parse_amount(&self.amount),
            account_amount: parse_amount(account_amount),
            description: self.description,
            counterparty: self.counterparty,
            place: self.place,
            country: self.country,
            currency: self.currency,
            account_currency: self.account_currency,
            matched: Vec::new(),
        }
    }
}

/// Turns bank-formatted amounts such as `-1 234,50` into `-1234.50`: commas
/// become decimal points, regular and no-break spaces are dropped.
pub fn normalise_amount(text: &str) -> String {
    text.chars()
        .filter(|ch| *ch != ' ' && *ch != NO_BREAK_SPACE)
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect()
}

/// Parses a statement amount at two fraction digits, half-up.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let normalised = normalise_amount(text);
    if normalised.is_empty() {
        return None;
    }
    Decimal::from_str(&normalised).ok().map(round_display)
}
