use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::PricingError;

/// Sales-rate signals supplied by an analytics feed. Every stored rate is
/// non-negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSalesRateTable")]
pub struct SalesRateTable {
    by_product: BTreeMap<ProductId, Decimal>,
    by_category: BTreeMap<String, Decimal>,
}

impl SalesRateTable {
    pub fn new(
        by_product: impl IntoIterator<Item = (ProductId, Decimal)>,
        by_category: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Result<Self, PricingError> {
        let mut table = Self::default();
        for (id, rate) in by_product {
            table.insert_product_rate(id, rate)?;
        }
        for (category, rate) in by_category {
            table.insert_category_rate(category, rate)?;
        }
        Ok(table)
    }

    /// Rates the original batch job shipped with.
    pub fn builtin() -> Self {
        let by_product = [
            (ProductId::from(1), Decimal::new(52, 1)),
            (ProductId::from(2), Decimal::ZERO),
            (ProductId::from(3), Decimal::new(27, 1)),
        ];
        let by_category = [
            ("Snacks".to_string(), Decimal::new(40, 1)),
            ("Drinks".to_string(), Decimal::new(35, 1)),
            ("Bakery".to_string(), Decimal::new(30, 1)),
        ];

        Self {
            by_product: by_product.into_iter().collect(),
            by_category: by_category.into_iter().collect(),
        }
    }

    pub fn insert_product_rate(
        &mut self,
        id: ProductId,
        rate: Decimal,
    ) -> Result<(), PricingError> {
        ensure_non_negative(id.as_str(), rate)?;
        self.by_product.insert(id, rate);
        Ok(())
    }

    pub fn insert_category_rate(
        &mut self,
        category: impl Into<String>,
        rate: Decimal,
    ) -> Result<(), PricingError> {
        let category = category.into();
        ensure_non_negative(&category, rate)?;
        self.by_category.insert(category, rate);
        Ok(())
    }

    pub fn product_rate(&self, id: &ProductId) -> Option<Decimal> {
        self.by_product.get(id).copied()
    }

    pub fn category_rate(&self, category: &str) -> Option<Decimal> {
        self.by_category.get(category).copied()
    }
}

fn ensure_non_negative(key: &str, rate: Decimal) -> Result<(), PricingError> {
    if rate < Decimal::ZERO {
        return Err(PricingError::NegativeSalesRate { key: key.to_string(), rate });
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct RawSalesRateTable {
    #[serde(default)]
    by_product: BTreeMap<ProductId, Decimal>,
    #[serde(default)]
    by_category: BTreeMap<String, Decimal>,
}

impl TryFrom<RawSalesRateTable> for SalesRateTable {
    type Error = PricingError;

    fn try_from(raw: RawSalesRateTable) -> Result<Self, Self::Error> {
        Self::new(raw.by_product, raw.by_category)
    }
}
