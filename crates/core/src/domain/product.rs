use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::PricingError;

/// Product identifier. Numeric ids from upstream sources are kept in their
/// canonical decimal form so `1` and `"1"` address the same product.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Unsigned(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(value) => Self::from(value),
            RawId::Unsigned(value) => Self(value.to_string()),
            RawId::Text(value) => Self(value),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub original_price: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub date_added: DateTime<Utc>,
    pub category: String,
}

/// Product as handed over by an upstream product source, before its
/// timestamps have been interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub original_price: Decimal,
    pub expiry_date: String,
    pub date_added: String,
    pub category: String,
}

impl ProductRecord {
    pub fn into_product(self) -> Result<Product, PricingError> {
        let expiry_date = parse_instant(&self.id, "expiryDate", &self.expiry_date)?;
        let date_added = parse_instant(&self.id, "dateAdded", &self.date_added)?;

        Ok(Product {
            id: self.id,
            original_price: self.original_price,
            expiry_date,
            date_added,
            category: self.category,
        })
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            original_price: product.original_price,
            expiry_date: product.expiry_date.to_rfc3339(),
            date_added: product.date_added.to_rfc3339(),
            category: product.category,
        }
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC, or a bare
/// date read as midnight UTC.
pub fn parse_instant(
    product_id: &ProductId,
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, PricingError> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    let midnight = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0));
    if let Some(midnight) = midnight {
        return Ok(midnight.and_utc());
    }

    Err(PricingError::MalformedInput {
        product_id: product_id.clone(),
        field,
        value: raw.to_string(),
    })
}
