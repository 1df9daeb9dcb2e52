use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shelfmark_core::config::AppConfig;
use shelfmark_core::{
    BatchSummary, DeterministicPricingEngine, PricingBatch, PricingConfig, PricingEngine,
    PricingResult, ProductRecord, SalesRateTable,
};

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_OK, EXIT_PARTIAL};

const COMMAND: &str = "reprice";

#[derive(Debug, Clone, Default)]
pub struct RepriceArgs {
    pub products: PathBuf,
    pub sales_rates: Option<PathBuf>,
    pub now: Option<DateTime<Utc>>,
    pub json: bool,
}

/// Where the sales-rate table for a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesRateOrigin {
    Argument,
    Config,
    Builtin,
}

pub fn run(config: &AppConfig, args: &RepriceArgs) -> CommandResult {
    let pricing = match config.pricing_config() {
        Ok(pricing) => pricing,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let records = match load_products(&args.products) {
        Ok(records) => records,
        Err(error) => {
            return CommandResult::failure(COMMAND, "input", format!("{error:#}"), EXIT_INPUT);
        }
    };
    let (sales_rates, origin) = match load_sales_rates(config, args) {
        Ok(loaded) => loaded,
        Err(error) => {
            return CommandResult::failure(COMMAND, "input", format!("{error:#}"), EXIT_INPUT);
        }
    };

    let now = args.now.unwrap_or_else(Utc::now);
    tracing::info!(
        event_name = "reprice.run.started",
        products = records.len(),
        sales_rate_origin = ?origin,
        now = %now.to_rfc3339(),
        "repricing products"
    );

    let batch = reprice(records, &sales_rates, &pricing, now);
    let summary = batch.summary();
    tracing::info!(
        event_name = "reprice.run.completed",
        priced = summary.priced,
        failed = summary.failed,
        floor_applied = summary.floor_applied,
        "repricing completed"
    );

    let exit_code = if batch.is_complete() { EXIT_OK } else { EXIT_PARTIAL };
    let output = if args.json {
        render_json(&batch, origin)
    } else {
        render_text(&batch, &config.pricing.currency_symbol)
    };
    CommandResult::rendered(output, exit_code)
}

fn reprice(
    records: Vec<ProductRecord>,
    sales_rates: &SalesRateTable,
    pricing: &PricingConfig,
    now: DateTime<Utc>,
) -> PricingBatch {
    let batch = DeterministicPricingEngine.price_batch(records, sales_rates, pricing, now);

    for result in batch.priced() {
        tracing::debug!(
            event_name = "reprice.product.priced",
            product_id = %result.product_id,
            rate_source = result.rate_source.as_str(),
            discount = %result.discount,
            new_price = %result.new_price,
            floor_applied = result.floor_applied,
            "product priced"
        );
    }
    for failure in batch.failures() {
        tracing::warn!(
            event_name = "reprice.product.failed",
            product_id = %failure.product_id,
            error_class = failure.error.error_class(),
            error = %failure.error,
            "product could not be priced"
        );
    }

    batch
}

fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read products file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse products file `{}`", path.display()))
}

fn load_sales_rates(
    config: &AppConfig,
    args: &RepriceArgs,
) -> Result<(SalesRateTable, SalesRateOrigin)> {
    let (path, origin) = match (&args.sales_rates, &config.inputs.sales_rates) {
        (Some(path), _) => (path, SalesRateOrigin::Argument),
        (None, Some(path)) => (path, SalesRateOrigin::Config),
        (None, None) => return Ok((SalesRateTable::builtin(), SalesRateOrigin::Builtin)),
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read sales-rate file `{}`", path.display()))?;
    let table = toml::from_str::<SalesRateTable>(&raw)
        .with_context(|| format!("could not parse sales-rate file `{}`", path.display()))?;
    Ok((table, origin))
}

fn render_text(batch: &PricingBatch, currency: &str) -> String {
    let mut out = String::new();

    for result in batch.priced() {
        let _ = writeln!(out, "Product {} ({}):", result.product_id, result.category);
        let _ = writeln!(out, "  Original Price: {currency}{}", result.original_price.normalize());
        let _ = writeln!(out, "  Days to Expiry: {}", result.days_to_expiry);
        let _ = writeln!(out, "  Shelf Time: {} days", result.shelf_time_days);
        let _ = writeln!(
            out,
            "  Sales Rate: {} ({})",
            result.resolved_sales_rate.normalize(),
            result.rate_source.as_str()
        );
        let floor_note = if result.floor_applied { " (price floor)" } else { "" };
        let _ = writeln!(out, "  New Price: {currency}{}{floor_note}\n", money(result.new_price));
    }

    for failure in batch.failures() {
        let _ = writeln!(out, "Product {}: not priced ({})", failure.product_id, failure.error);
    }

    let summary = batch.summary();
    let _ = write!(
        out,
        "Repricing completed: {} priced, {} failed, {} at price floor.",
        summary.priced, summary.failed, summary.floor_applied
    );
    out
}

#[derive(Debug, Serialize)]
struct RepriceReport<'a> {
    command: &'static str,
    status: &'static str,
    now: DateTime<Utc>,
    sales_rate_origin: SalesRateOrigin,
    summary: BatchSummary,
    results: Vec<ResultView<'a>>,
    failures: Vec<FailureView>,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    #[serde(flatten)]
    result: &'a PricingResult,
    new_price_rounded: Decimal,
}

#[derive(Debug, Serialize)]
struct FailureView {
    product_id: String,
    error_class: &'static str,
    message: String,
}

fn render_json(batch: &PricingBatch, origin: SalesRateOrigin) -> String {
    let report = RepriceReport {
        command: COMMAND,
        status: if batch.is_complete() { "ok" } else { "partial" },
        now: batch.now,
        sales_rate_origin: origin,
        summary: batch.summary(),
        results: batch
            .priced()
            .map(|result| ResultView { result, new_price_rounded: money(result.new_price) })
            .collect(),
        failures: batch
            .failures()
            .map(|failure| FailureView {
                product_id: failure.product_id.to_string(),
                error_class: failure.error.error_class(),
                message: failure.error.to_string(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        CommandResult::failure(COMMAND, "serialization", error.to_string(), EXIT_PARTIAL).output
    })
}

/// Rounds half away from zero to two decimals and pins the scale so `50`
/// renders as `50.00`.
fn money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
