use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::domain::sales_rate::SalesRateTable;
use crate::errors::PricingError;
use crate::markdown::resolver::{resolve_sales_rate, RateSource, ResolvedSalesRate};
use crate::markdown::settings::PricingConfig;
use crate::markdown::time_metrics::TimeMetrics;

/// Normalized signals before weighting. None of them is clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountFactors {
    pub expiry: Decimal,
    pub demand: Decimal,
    pub shelf_time: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub product_id: ProductId,
    pub category: String,
    pub original_price: Decimal,
    pub days_to_expiry: i64,
    pub shelf_time_days: i64,
    pub resolved_sales_rate: Decimal,
    pub rate_source: RateSource,
    pub factors: DiscountFactors,
    pub discount: Decimal,
    pub floor_price: Decimal,
    pub new_price: Decimal,
    pub floor_applied: bool,
}

impl DiscountFactors {
    pub fn compute(
        metrics: TimeMetrics,
        sales_rate: Decimal,
        config: &PricingConfig,
    ) -> Option<Self> {
        let expiry = Decimal::ONE.checked_sub(
            Decimal::from(metrics.days_to_expiry).checked_div(config.max_shelf_life())?,
        )?;
        let demand = Decimal::ONE.checked_sub(sales_rate.checked_div(config.max_sales_rate())?)?;
        let shelf_time =
            Decimal::from(metrics.shelf_time_days).checked_div(config.max_shelf_time())?;

        Some(Self { expiry, demand, shelf_time })
    }

    /// Weighted sum `α·expiry + β·demand + γ·shelf_time`.
    pub fn weighted(&self, config: &PricingConfig) -> Option<Decimal> {
        config
            .alpha()
            .checked_mul(self.expiry)?
            .checked_add(config.beta().checked_mul(self.demand)?)?
            .checked_add(config.gamma().checked_mul(self.shelf_time)?)
    }
}

/// Prices a single product against an already resolved sales rate.
pub fn apply_discount(
    product: &Product,
    metrics: TimeMetrics,
    sales_rate: ResolvedSalesRate,
    config: &PricingConfig,
) -> Result<PricingResult, PricingError> {
    let overflow = || PricingError::ArithmeticOverflow { product_id: product.id.clone() };

    let factors = DiscountFactors::compute(metrics, sales_rate.rate, config).ok_or_else(overflow)?;
    let discount = factors.weighted(config).ok_or_else(overflow)?;

    let floor_price =
        product.original_price.checked_mul(config.min_price_ratio()).ok_or_else(overflow)?;
    let discounted = Decimal::ONE
        .checked_sub(discount)
        .and_then(|remaining| product.original_price.checked_mul(remaining))
        .ok_or_else(overflow)?;
    let floor_applied = discounted < floor_price;

    Ok(PricingResult {
        product_id: product.id.clone(),
        category: product.category.clone(),
        original_price: product.original_price,
        days_to_expiry: metrics.days_to_expiry,
        shelf_time_days: metrics.shelf_time_days,
        resolved_sales_rate: sales_rate.rate,
        rate_source: sales_rate.source,
        factors,
        discount,
        floor_price,
        new_price: if floor_applied { floor_price } else { discounted },
        floor_applied,
    })
}

/// Full per-product pipeline: time metrics, sales-rate fallback, discount and
/// price floor, all against the same `now`.
pub fn price_product(
    product: &Product,
    sales_rates: &SalesRateTable,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> Result<PricingResult, PricingError> {
    let metrics = TimeMetrics::compute(product.expiry_date, product.date_added, now);
    let sales_rate = resolve_sales_rate(&product.id, &product.category, sales_rates);
    apply_discount(product, metrics, sales_rate, config)
}
