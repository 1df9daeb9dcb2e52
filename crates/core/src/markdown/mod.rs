pub mod discount;
pub mod resolver;
pub mod settings;
pub mod time_metrics;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::product::{Product, ProductId, ProductRecord};
use crate::domain::sales_rate::SalesRateTable;
use crate::errors::PricingError;

use self::{discount::PricingResult, settings::PricingConfig};

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        product: &Product,
        sales_rates: &SalesRateTable,
        config: &PricingConfig,
        now: DateTime<Utc>,
    ) -> Result<PricingResult, PricingError>;

    /// Parses and prices every record in input order. A record that fails only
    /// fails its own slot.
    fn price_batch(
        &self,
        records: Vec<ProductRecord>,
        sales_rates: &SalesRateTable,
        config: &PricingConfig,
        now: DateTime<Utc>,
    ) -> PricingBatch {
        let outcomes = records
            .into_iter()
            .map(|record| {
                let product_id = record.id.clone();
                let priced = record
                    .into_product()
                    .and_then(|product| self.price(&product, sales_rates, config, now));
                match priced {
                    Ok(result) => PricingOutcome::Priced(result),
                    Err(error) => PricingOutcome::Failed(PricingFailure { product_id, error }),
                }
            })
            .collect();

        PricingBatch { now, outcomes }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        product: &Product,
        sales_rates: &SalesRateTable,
        config: &PricingConfig,
        now: DateTime<Utc>,
    ) -> Result<PricingResult, PricingError> {
        discount::price_product(product, sales_rates, config, now)
    }
}

/// One result per product, in input order, with no side effects.
pub fn price_products(
    products: &[Product],
    sales_rates: &SalesRateTable,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> Vec<Result<PricingResult, PricingError>> {
    products
        .iter()
        .map(|product| DeterministicPricingEngine.price(product, sales_rates, config, now))
        .collect()
}

pub fn price_records(
    records: Vec<ProductRecord>,
    sales_rates: &SalesRateTable,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> PricingBatch {
    DeterministicPricingEngine.price_batch(records, sales_rates, config, now)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingFailure {
    pub product_id: ProductId,
    pub error: PricingError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PricingOutcome {
    Priced(PricingResult),
    Failed(PricingFailure),
}

impl PricingOutcome {
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Priced(result) => &result.product_id,
            Self::Failed(failure) => &failure.product_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingBatch {
    pub now: DateTime<Utc>,
    pub outcomes: Vec<PricingOutcome>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub priced: usize,
    pub failed: usize,
    pub floor_applied: usize,
}

impl PricingBatch {
    pub fn priced(&self) -> impl Iterator<Item = &PricingResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            PricingOutcome::Priced(result) => Some(result),
            PricingOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &PricingFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            PricingOutcome::Failed(failure) => Some(failure),
            PricingOutcome::Priced(_) => None,
        })
    }

    pub fn summary(&self) -> BatchSummary {
        let priced = self.priced().count();
        BatchSummary {
            total: self.outcomes.len(),
            priced,
            failed: self.outcomes.len() - priced,
            floor_applied: self.priced().filter(|result| result.floor_applied).count(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}
