use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Groups accounts for budgeting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub category_type: CategoryType,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<Uuid>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize(name),
            category_type,
            comment: String::new(),
            icon_id: None,
            created: now,
            modified: now,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize(comment);
        self
    }

    pub fn with_icon(mut self, icon_id: Uuid) -> Self {
        self.icon_id = Some(icon_id);
        self
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Category {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

/// Fixed set of category classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    BanksAndCash,
    Incomes,
    Expenses,
    Debts,
    Assets,
    Portfolio,
}

impl CategoryType {
    pub const ALL: [CategoryType; 6] = [
        CategoryType::BanksAndCash,
        CategoryType::Incomes,
        CategoryType::Expenses,
        CategoryType::Debts,
        CategoryType::Assets,
        CategoryType::Portfolio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryType::BanksAndCash => "Banks and Cash",
            CategoryType::Incomes => "Incomes",
            CategoryType::Expenses => "Expenses",
            CategoryType::Debts => "Debts",
            CategoryType::Assets => "Assets",
            CategoryType::Portfolio => "Portfolio",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
