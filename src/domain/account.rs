use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category::{Category, CategoryType};
use crate::domain::common::*;

/// Represents a financial account tracked by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub account_number: String,
    pub opening_balance: Decimal,
    #[serde(default)]
    pub credit_limit: Decimal,
    pub category_type: CategoryType,
    pub category_id: Uuid,
    /// `None` means the default currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<Uuid>,
    pub enabled: bool,
    #[serde(default)]
    pub interest: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<Uuid>,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub card_number: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Account {
    /// Creates an enabled account filed under `category` with a zero opening balance.
    pub fn new(name: impl Into<String>, category: &Category) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize(name),
            comment: String::new(),
            account_number: String::new(),
            opening_balance: Decimal::ZERO,
            credit_limit: Decimal::ZERO,
            category_type: category.category_type,
            category_id: category.id,
            currency_id: None,
            enabled: true,
            interest: Decimal::ZERO,
            closing_date: None,
            icon_id: None,
            card_type: CardType::None,
            card_number: String::new(),
            created: now,
            modified: now,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    pub fn with_credit_limit(mut self, credit_limit: Decimal) -> Self {
        self.credit_limit = credit_limit;
        self
    }

    pub fn with_currency(mut self, currency_id: Uuid) -> Self {
        self.currency_id = Some(currency_id);
        self
    }

    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = normalize(account_number);
        self
    }

    pub fn with_card(mut self, card_type: CardType, card_number: impl Into<String>) -> Self {
        self.card_type = card_type;
        self.card_number = normalize(card_number);
        self
    }

    pub fn with_closing_date(mut self, closing_date: NaiveDate) -> Self {
        self.closing_date = Some(closing_date);
        self
    }

    /// Moves the account to another category, keeping the cached type in step.
    pub fn with_category(mut self, category: &Category) -> Self {
        self.category_id = category.id;
        self.category_type = category.category_type;
        self
    }

    pub fn enable(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Account number as printed on bank statements, without grouping spaces.
    pub fn account_number_no_spaces(&self) -> String {
        self.account_number.replace(' ', "")
    }

    pub fn card_number_no_spaces(&self) -> String {
        self.card_number.replace(' ', "")
    }

    /// True while `date` falls before the closing date, or when none is set.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.closing_date.map_or(true, |closing| date < closing)
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Account {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    None,
    Visa,
    Mastercard,
    Mir,
    Amex,
}
