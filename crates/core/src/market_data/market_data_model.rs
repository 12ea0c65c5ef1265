//! Market data domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A live (or last-known) price observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub as_of: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: Decimal, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            as_of,
        }
    }
}
