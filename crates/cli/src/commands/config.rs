use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shelfmark_core::config::{resolve_config_path, AppConfig, ConfigOverrides};
use toml::Value;

use crate::commands::{CommandResult, EXIT_OK};

pub fn run(
    config: &AppConfig,
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> CommandResult {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let parameters = &config.pricing.parameters;
    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string()
    ];

    let decimal_fields = [
        ("pricing.alpha", parameters.alpha, "SHELFMARK_PRICING_ALPHA"),
        ("pricing.beta", parameters.beta, "SHELFMARK_PRICING_BETA"),
        ("pricing.gamma", parameters.gamma, "SHELFMARK_PRICING_GAMMA"),
        ("pricing.max_shelf_life", parameters.max_shelf_life, "SHELFMARK_PRICING_MAX_SHELF_LIFE"),
        ("pricing.max_sales_rate", parameters.max_sales_rate, "SHELFMARK_PRICING_MAX_SALES_RATE"),
        ("pricing.max_shelf_time", parameters.max_shelf_time, "SHELFMARK_PRICING_MAX_SHELF_TIME"),
        (
            "pricing.min_price_ratio",
            parameters.min_price_ratio,
            "SHELFMARK_PRICING_MIN_PRICE_RATIO",
        ),
    ];
    for (key, value, env_key) in decimal_fields {
        lines.push(render_line(key, &value.normalize().to_string(), source(key, &[env_key])));
    }

    lines.push(render_line(
        "pricing.currency_symbol",
        &config.pricing.currency_symbol,
        override_source(overrides.currency_symbol.as_ref(), "--currency-symbol").unwrap_or_else(
            || source("pricing.currency_symbol", &["SHELFMARK_PRICING_CURRENCY_SYMBOL"]),
        ),
    ));
    lines.push(render_line(
        "inputs.sales_rates",
        &config
            .inputs
            .sales_rates
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<builtin table>".to_string()),
        source("inputs.sales_rates", &["SHELFMARK_INPUTS_SALES_RATES"]),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        override_source(overrides.log_level.as_ref(), "--log-level").unwrap_or_else(|| {
            source("logging.level", &["SHELFMARK_LOGGING_LEVEL", "SHELFMARK_LOG_LEVEL"])
        }),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SHELFMARK_LOGGING_FORMAT", "SHELFMARK_LOG_FORMAT"]),
    ));

    CommandResult::rendered(lines.join("\n"), EXIT_OK)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn override_source(value: Option<&String>, flag: &str) -> Option<String> {
    value.map(|_| format!("override ({flag})"))
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_value_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

/// Blank values are ignored by the loader, so they do not count as a source.
fn env_value_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
