pub mod config;
pub mod domain;
pub mod errors;
pub mod markdown;

pub use domain::product::{Product, ProductId, ProductRecord};
pub use domain::sales_rate::SalesRateTable;
pub use errors::PricingError;
pub use markdown::discount::{DiscountFactors, PricingResult};
pub use markdown::resolver::{resolve_sales_rate, RateSource, ResolvedSalesRate};
pub use markdown::settings::{PricingConfig, PricingParameters};
pub use markdown::time_metrics::TimeMetrics;
pub use markdown::{
    price_products, price_records, BatchSummary, DeterministicPricingEngine, PricingBatch,
    PricingEngine, PricingFailure, PricingOutcome,
};
