use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A currency together with its conversion rate against the default one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Currency {
    pub id: Uuid,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format_symbol: String,
    #[serde(default)]
    pub symbol_position: SymbolPosition,
    #[serde(default)]
    pub show_format_symbol: bool,
    #[serde(default)]
    pub is_default: bool,
    pub rate: Decimal,
    pub direction: RateDirection,
    #[serde(default)]
    pub use_thousand_separator: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            symbol: normalize(symbol),
            description: String::new(),
            format_symbol: String::new(),
            symbol_position: SymbolPosition::Before,
            show_format_symbol: false,
            is_default: false,
            rate: Decimal::ONE,
            direction: RateDirection::Multiply,
            use_thousand_separator: false,
            created: now,
            modified: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize(description);
        self
    }

    pub fn with_rate(mut self, rate: Decimal, direction: RateDirection) -> Self {
        self.rate = rate;
        self.direction = direction;
        self
    }

    /// Display symbol shown next to formatted amounts, e.g. `$` before or `₽` after.
    pub fn with_format_symbol(
        mut self,
        format_symbol: impl Into<String>,
        position: SymbolPosition,
    ) -> Self {
        self.format_symbol = format_symbol.into();
        self.symbol_position = position;
        self.show_format_symbol = true;
        self
    }

    pub fn with_thousand_separator(mut self, enabled: bool) -> Self {
        self.use_thousand_separator = enabled;
        self
    }

    pub fn as_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Matches statement hints such as `usd` or `US Dollar`.
    pub fn matches_hint(&self, hint: &str) -> bool {
        let hint = hint.trim();
        !hint.is_empty()
            && (self.symbol.eq_ignore_ascii_case(hint)
                || self.description.eq_ignore_ascii_case(hint))
    }
}

impl Identifiable for Currency {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Currency {
    fn name(&self) -> &str {
        &self.symbol
    }
}

impl Timestamped for Currency {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

/// How a rate is applied: stored as 0 (divide) or 1 (multiply) by legacy data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateDirection {
    Divide,
    #[default]
    Multiply,
}

impl RateDirection {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RateDirection::Divide),
            1 => Some(RateDirection::Multiply),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            RateDirection::Divide => 0,
            RateDirection::Multiply => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}
