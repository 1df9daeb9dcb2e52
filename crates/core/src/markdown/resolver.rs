use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::sales_rate::SalesRateTable;

/// Which signal supplied the sales rate used for a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Product,
    Category,
    None,
}

impl RateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
            Self::None => "none",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSalesRate {
    pub rate: Decimal,
    pub source: RateSource,
}

/// A per-product rate of exactly zero carries no signal and falls through to
/// the category; a category rate of zero is a real answer.
pub fn resolve_sales_rate(
    product_id: &ProductId,
    category: &str,
    table: &SalesRateTable,
) -> ResolvedSalesRate {
    if let Some(rate) = table.product_rate(product_id).filter(|rate| *rate > Decimal::ZERO) {
        return ResolvedSalesRate { rate, source: RateSource::Product };
    }

    match table.category_rate(category) {
        Some(rate) => ResolvedSalesRate { rate, source: RateSource::Category },
        None => ResolvedSalesRate { rate: Decimal::ZERO, source: RateSource::None },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{resolve_sales_rate, RateSource, ResolvedSalesRate};
    use crate::domain::product::ProductId;
    use crate::domain::sales_rate::SalesRateTable;

    fn table() -> SalesRateTable {
        SalesRateTable::new(
            [
                (ProductId::from(1), Decimal::new(52, 1)),
                (ProductId::from(2), Decimal::ZERO),
            ],
            [
                ("Snacks".to_string(), Decimal::new(40, 1)),
                ("Frozen".to_string(), Decimal::ZERO),
            ],
        )
        .expect("valid table")
    }

    #[test]
    fn positive_product_rate_wins_over_category() {
        let resolved = resolve_sales_rate(&ProductId::from(1), "Snacks", &table());
        assert_eq!(
            resolved,
            ResolvedSalesRate { rate: Decimal::new(52, 1), source: RateSource::Product }
        );
    }

    #[test]
    fn zero_product_rate_falls_back_to_category() {
        let resolved = resolve_sales_rate(&ProductId::from(2), "Snacks", &table());
        assert_eq!(
            resolved,
            ResolvedSalesRate { rate: Decimal::new(40, 1), source: RateSource::Category }
        );
    }

    #[test]
    fn zero_category_rate_is_kept() {
        let resolved = resolve_sales_rate(&ProductId::from(9), "Frozen", &table());
        assert_eq!(
            resolved,
            ResolvedSalesRate { rate: Decimal::ZERO, source: RateSource::Category }
        );
    }

    #[test]
    fn missing_everywhere_resolves_to_zero() {
        let resolved = resolve_sales_rate(&ProductId::from(9), "Dairy", &table());
        assert_eq!(resolved, ResolvedSalesRate { rate: Decimal::ZERO, source: RateSource::None });
    }
}
