pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use shelfmark_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use crate::commands::reprice::RepriceArgs;
use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "shelfmark",
    about = "Markdown pricing for perishable inventory",
    long_about = "Reprice perishable products from expiry proximity, sales velocity and shelf time.",
    after_help = "Examples:\n  shelfmark reprice --products products.json\n  shelfmark reprice --products products.json --sales-rates rates.toml --json\n  shelfmark config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a shelfmark.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the configured log level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override the currency symbol used in text reports")]
    currency_symbol: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute markdown prices for a batch of products")]
    Reprice {
        #[arg(long, help = "JSON array of product records")]
        products: PathBuf,
        #[arg(long, help = "TOML sales-rate table with [by_product] and [by_category]")]
        sales_rates: Option<PathBuf>,
        #[arg(long, value_parser = parse_now, help = "Pricing instant (RFC 3339), defaults to now")]
        now: Option<DateTime<Utc>>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Reprice { .. } => "reprice",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn execute(cli: Cli) -> CommandResult {
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        overrides: ConfigOverrides {
            log_level: cli.log_level,
            currency_symbol: cli.currency_symbol,
        },
    };

    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                cli.command.name(),
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };
    logging::init(&config.logging);

    match cli.command {
        Command::Reprice { products, sales_rates, now, json } => {
            commands::reprice::run(&config, &RepriceArgs { products, sales_rates, now, json })
        }
        Command::Config => {
            commands::config::run(&config, options.config_path.as_deref(), &options.overrides)
        }
    }
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
