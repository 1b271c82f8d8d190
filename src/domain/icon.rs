use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Small image referenced by categories, accounts and contacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Icon {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub bytes: Vec<u8>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Icon {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize(name),
            bytes,
            created: now,
            modified: now,
        }
    }
}

impl Identifiable for Icon {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Icon {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Icon {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}
