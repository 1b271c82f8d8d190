use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Counterparty of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub contact_type: ContactType,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub web: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<Uuid>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Contact {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize(name),
            contact_type: ContactType::Personal,
            phone: String::new(),
            mobile: String::new(),
            email: String::new(),
            web: String::new(),
            comment: String::new(),
            street: String::new(),
            city: String::new(),
            country: String::new(),
            zip: String::new(),
            icon_id: None,
            created: now,
            modified: now,
        }
    }

    pub fn with_type(mut self, contact_type: ContactType) -> Self {
        self.contact_type = contact_type;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = normalize(email);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = normalize(phone);
        self
    }
}

impl Identifiable for Contact {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Contact {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Contact {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    #[default]
    Personal,
    Client,
    Supplier,
    Employer,
    Employee,
    Service,
}
