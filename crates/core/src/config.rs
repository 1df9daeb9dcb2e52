use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::PricingError;
use crate::markdown::settings::{PricingConfig, PricingParameters};

pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["shelfmark.toml", "config/shelfmark.toml"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub pricing: PricingSettings,
    pub inputs: InputsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingSettings {
    pub parameters: PricingParameters,
    pub currency_symbol: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputsConfig {
    pub sales_rates: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub currency_symbol: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingSettings {
                parameters: PricingParameters::default(),
                currency_symbol: "₹".to_string(),
            },
            inputs: InputsConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATHS[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Builds the engine configuration from the `[pricing]` section.
    pub fn pricing_config(&self) -> Result<PricingConfig, PricingError> {
        PricingConfig::new(self.pricing.parameters)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            let parameters = &mut self.pricing.parameters;
            if let Some(alpha) = pricing.alpha {
                parameters.alpha = alpha;
            }
            if let Some(beta) = pricing.beta {
                parameters.beta = beta;
            }
            if let Some(gamma) = pricing.gamma {
                parameters.gamma = gamma;
            }
            if let Some(max_shelf_life) = pricing.max_shelf_life {
                parameters.max_shelf_life = max_shelf_life;
            }
            if let Some(max_sales_rate) = pricing.max_sales_rate {
                parameters.max_sales_rate = max_sales_rate;
            }
            if let Some(max_shelf_time) = pricing.max_shelf_time {
                parameters.max_shelf_time = max_shelf_time;
            }
            if let Some(min_price_ratio) = pricing.min_price_ratio {
                parameters.min_price_ratio = min_price_ratio;
            }
            if let Some(currency_symbol) = pricing.currency_symbol {
                self.pricing.currency_symbol = currency_symbol;
            }
        }

        if let Some(inputs) = patch.inputs {
            if let Some(sales_rates) = inputs.sales_rates {
                self.inputs.sales_rates = Some(sales_rates);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let parameters = &mut self.pricing.parameters;
        let decimal_fields: [(&str, &mut Decimal); 7] = [
            ("SHELFMARK_PRICING_ALPHA", &mut parameters.alpha),
            ("SHELFMARK_PRICING_BETA", &mut parameters.beta),
            ("SHELFMARK_PRICING_GAMMA", &mut parameters.gamma),
            ("SHELFMARK_PRICING_MAX_SHELF_LIFE", &mut parameters.max_shelf_life),
            ("SHELFMARK_PRICING_MAX_SALES_RATE", &mut parameters.max_sales_rate),
            ("SHELFMARK_PRICING_MAX_SHELF_TIME", &mut parameters.max_shelf_time),
            ("SHELFMARK_PRICING_MIN_PRICE_RATIO", &mut parameters.min_price_ratio),
        ];
        for (key, slot) in decimal_fields {
            if let Some(value) = read_env(key) {
                *slot = parse_decimal(key, &value)?;
            }
        }

        if let Some(value) = read_env("SHELFMARK_PRICING_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = value;
        }

        if let Some(value) = read_env("SHELFMARK_INPUTS_SALES_RATES") {
            self.inputs.sales_rates = Some(PathBuf::from(value));
        }

        let log_level =
            read_env("SHELFMARK_LOGGING_LEVEL").or_else(|| read_env("SHELFMARK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHELFMARK_LOGGING_FORMAT").or_else(|| read_env("SHELFMARK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(currency_symbol) = overrides.currency_symbol {
            self.pricing.currency_symbol = currency_symbol;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing_config()?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file: the explicit path, else the default locations.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_PATHS.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    inputs: Option<InputsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    alpha: Option<Decimal>,
    beta: Option<Decimal>,
    gamma: Option<Decimal>,
    max_shelf_life: Option<Decimal>,
    max_sales_rate: Option<Decimal>,
    max_shelf_time: Option<Decimal>,
    min_price_ratio: Option<Decimal>,
    currency_symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InputsPatch {
    sales_rates: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
