use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PricingError;

/// Raw tuning values as an operator writes them. Only [`PricingConfig`] is
/// accepted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingParameters {
    pub alpha: Decimal,
    pub beta: Decimal,
    pub gamma: Decimal,
    pub max_shelf_life: Decimal,
    pub max_sales_rate: Decimal,
    pub max_shelf_time: Decimal,
    pub min_price_ratio: Decimal,
}

impl Default for PricingParameters {
    fn default() -> Self {
        Self {
            alpha: Decimal::new(4, 1),
            beta: Decimal::new(3, 1),
            gamma: Decimal::new(3, 1),
            max_shelf_life: Decimal::from(30),
            max_sales_rate: Decimal::from(10),
            max_shelf_time: Decimal::from(30),
            min_price_ratio: Decimal::new(5, 1),
        }
    }
}

/// Validated, immutable weights and bounds for one pricing run.
///
/// The three weights are deliberately unconstrained: zero disables a factor
/// and a negative weight inverts it. The normalizers are divisors and must be
/// positive; the price floor ratio must lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PricingConfig {
    alpha: Decimal,
    beta: Decimal,
    gamma: Decimal,
    max_shelf_life: Decimal,
    max_sales_rate: Decimal,
    max_shelf_time: Decimal,
    min_price_ratio: Decimal,
}

impl PricingConfig {
    pub fn new(parameters: PricingParameters) -> Result<Self, PricingError> {
        ensure_positive("max_shelf_life", parameters.max_shelf_life)?;
        ensure_positive("max_sales_rate", parameters.max_sales_rate)?;
        ensure_positive("max_shelf_time", parameters.max_shelf_time)?;

        if parameters.min_price_ratio < Decimal::ZERO || parameters.min_price_ratio > Decimal::ONE {
            return Err(PricingError::InvalidConfiguration {
                field: "min_price_ratio",
                reason: format!("must be within [0, 1], got {}", parameters.min_price_ratio),
            });
        }

        Ok(Self {
            alpha: parameters.alpha,
            beta: parameters.beta,
            gamma: parameters.gamma,
            max_shelf_life: parameters.max_shelf_life,
            max_sales_rate: parameters.max_sales_rate,
            max_shelf_time: parameters.max_shelf_time,
            min_price_ratio: parameters.min_price_ratio,
        })
    }

    pub fn alpha(&self) -> Decimal {
        self.alpha
    }

    pub fn beta(&self) -> Decimal {
        self.beta
    }

    pub fn gamma(&self) -> Decimal {
        self.gamma
    }

    pub fn max_shelf_life(&self) -> Decimal {
        self.max_shelf_life
    }

    pub fn max_sales_rate(&self) -> Decimal {
        self.max_sales_rate
    }

    pub fn max_shelf_time(&self) -> Decimal {
        self.max_shelf_time
    }

    pub fn min_price_ratio(&self) -> Decimal {
        self.min_price_ratio
    }

    pub fn parameters(&self) -> PricingParameters {
        PricingParameters {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            max_shelf_life: self.max_shelf_life,
            max_sales_rate: self.max_sales_rate,
            max_shelf_time: self.max_shelf_time,
            min_price_ratio: self.min_price_ratio,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        let parameters = PricingParameters::default();
        Self {
            alpha: parameters.alpha,
            beta: parameters.beta,
            gamma: parameters.gamma,
            max_shelf_life: parameters.max_shelf_life,
            max_sales_rate: parameters.max_sales_rate,
            max_shelf_time: parameters.max_shelf_time,
            min_price_ratio: parameters.min_price_ratio,
        }
    }
}

fn ensure_positive(field: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value <= Decimal::ZERO {
        return Err(PricingError::InvalidConfiguration {
            field,
            reason: format!("must be greater than zero, got {value}"),
        });
    }
    Ok(())
}
