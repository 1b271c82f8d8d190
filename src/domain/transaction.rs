use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::category::CategoryType;
use crate::domain::common::*;
use crate::domain::currency::RateDirection;

/// Money moved from the debited account to the credited account.
///
/// The category references and types of both accounts are copied when the
/// transaction is built and are not refreshed if an account later changes
/// category; reports therefore show the classification in force at the time
/// the transaction was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Execution date on the bank side, when it differs from `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<NaiveDate>,
    pub amount: Decimal,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub checked: bool,
    pub debited_account_id: Uuid,
    pub credited_account_id: Uuid,
    pub debited_category_id: Uuid,
    pub credited_category_id: Uuid,
    pub debited_type: CategoryType,
    pub credited_type: CategoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Uuid>,
    pub rate: Decimal,
    #[serde(default)]
    pub rate_direction: RateDirection,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub detailed: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction between two accounts, copying their category data.
    pub fn new(date: NaiveDate, amount: Decimal, debited: &Account, credited: &Account) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            statement_date: None,
            amount,
            transaction_type: TransactionType::Undefined,
            comment: String::new(),
            checked: false,
            debited_account_id: debited.id,
            credited_account_id: credited.id,
            debited_category_id: debited.category_id,
            credited_category_id: credited.category_id,
            debited_type: debited.category_type,
            credited_type: credited.category_type,
            contact_id: None,
            rate: Decimal::ONE,
            rate_direction: RateDirection::Multiply,
            invoice_number: String::new(),
            parent_id: None,
            detailed: false,
            created: now,
            modified: now,
        }
    }

    pub fn with_rate(mut self, rate: Decimal, direction: RateDirection) -> Self {
        self.rate = rate;
        self.rate_direction = direction;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize(comment);
        self
    }

    pub fn with_contact(mut self, contact_id: Uuid) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = normalize(invoice_number);
        self
    }

    pub fn with_statement_date(mut self, statement_date: NaiveDate) -> Self {
        self.statement_date = Some(statement_date);
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn as_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Returns a copy with the reconciliation flag set to `checked`.
    pub fn check(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn statement_date(&self) -> NaiveDate {
        self.statement_date.unwrap_or(self.date)
    }

    pub fn references(&self, account_id: Uuid) -> bool {
        self.debited_account_id == account_id || self.credited_account_id == account_id
    }

    pub fn is_detail(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Timestamped for Transaction {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    CardPayment,
    CashPurchase,
    Cheque,
    Withdrawal,
    Cashier,
    Deposit,
    Transfer,
    Interest,
    Dividend,
    DirectBilling,
    Charge,
    Fee,
    Income,
    Sale,
    Refund,
    #[default]
    Undefined,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;

    fn accounts() -> (Account, Account) {
        let banks = Category::new("Banks", CategoryType::BanksAndCash);
        let food = Category::new("Food", CategoryType::Expenses);
        (Account::new("Card", &banks), Account::new("Grocer", &food))
    }

    #[test]
    fn new_transaction_freezes_category_data() {
        let (card, grocer) = accounts();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let txn = Transaction::new(date, Decimal::new(1250, 2), &card, &grocer);

        assert_eq!(txn.debited_category_id, card.category_id);
        assert_eq!(txn.credited_type, CategoryType::Expenses);
        assert_eq!(txn.rate, Decimal::ONE);
        assert!(txn.references(card.id));
        assert!(txn.references(grocer.id));
        assert!(!txn.references(Uuid::new_v4()));
    }

    #[test]
    fn statement_date_defaults_to_transaction_date() {
        let (card, grocer) = accounts();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let txn = Transaction::new(date, Decimal::ONE, &card, &grocer);
        assert_eq!(txn.statement_date(), date);

        let executed = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let txn = txn.with_statement_date(executed);
        assert_eq!(txn.statement_date(), executed);
    }
}
