// src/config.rs
use crate::desk::DeskSettings;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::models::{Platform, RefreshInterval};
use crate::trading::calculator::{ExchangeCalculator, ValidationPolicy};
use dotenv::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Coin desk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Settlement and execution settings
    pub desk: DeskConfig,

    /// Exchange form tolerances
    pub validation: ValidationConfig,

    /// Balance refresh settings
    pub refresh: RefreshConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Currency transaction values are recorded in (e.g., "NGN")
    pub ledger_currency: String,

    /// Currency coin rates are quoted in (e.g., "USD")
    pub quote_currency: String,

    /// Quote-to-ledger FX multiplier
    pub conversion_factor: Decimal,

    /// Platform recorded on desk trades
    pub default_platform: Platform,

    /// Simulated settlement delay in milliseconds
    pub execution_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Multiple of excess coin above which an amount is flagged
    pub excess_guidance_factor: Decimal,

    /// Allowed manual rate deviation from market, as a fraction
    pub rate_tolerance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Initial refresh selection (e.g., "Every 5 minutes")
    pub interval: RefreshInterval,

    /// Maximum simulated rate move per refresh, as a fraction
    pub max_rate_drift: Decimal,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

// Read an env var, falling back on missing or unparsable values
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value for {}: {}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();
        let defaults = Config::default();

        let desk = DeskConfig {
            ledger_currency: env_or("DESK_LEDGER_CURRENCY", defaults.desk.ledger_currency),
            quote_currency: env_or("DESK_QUOTE_CURRENCY", defaults.desk.quote_currency),
            conversion_factor: env_or("DESK_CONVERSION_FACTOR", defaults.desk.conversion_factor),
            default_platform: env_or("DESK_DEFAULT_PLATFORM", defaults.desk.default_platform),
            execution_latency_ms: env_or(
                "DESK_EXECUTION_LATENCY_MS",
                defaults.desk.execution_latency_ms,
            ),
        };

        let validation = ValidationConfig {
            excess_guidance_factor: env_or(
                "EXCESS_GUIDANCE_FACTOR",
                defaults.validation.excess_guidance_factor,
            ),
            rate_tolerance: env_or("RATE_TOLERANCE", defaults.validation.rate_tolerance),
        };

        let refresh = RefreshConfig {
            interval: env_or("REFRESH_INTERVAL", defaults.refresh.interval),
            max_rate_drift: env_or("MAX_RATE_DRIFT", defaults.refresh.max_rate_drift),
        };

        let logging = LoggingConfig {
            level: env_or("LOG_LEVEL", defaults.logging.level),
            to_file: env_or("LOG_TO_FILE", defaults.logging.to_file),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            desk,
            validation,
            refresh,
            logging,
        };
        config.validation_policy()?;

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path).map_err(|e| {
            AppError::Config(format!("Failed to open config file: {}", e))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validation_policy()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents).map_err(|e| {
            AppError::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Tolerances for the exchange calculator
    pub fn validation_policy(&self) -> AppResult<ValidationPolicy> {
        let policy = ValidationPolicy {
            excess_guidance_factor: self.validation.excess_guidance_factor,
            rate_tolerance: self.validation.rate_tolerance,
        };

        if !policy.is_valid() {
            return Err(AppError::Config(format!(
                "Invalid validation policy: excess factor {}, rate tolerance {}",
                policy.excess_guidance_factor, policy.rate_tolerance
            )));
        }

        Ok(policy)
    }

    /// Calculator with the configured tolerances and quote currency
    pub fn calculator(&self) -> AppResult<ExchangeCalculator> {
        Ok(ExchangeCalculator::new(self.validation_policy()?)
            .with_quote_currency(self.desk.quote_currency.clone()))
    }

    pub fn desk_settings(&self) -> DeskSettings {
        DeskSettings {
            conversion_factor: self.desk.conversion_factor,
            ledger_currency: self.desk.ledger_currency.clone(),
            default_platform: self.desk.default_platform,
            execution_latency: Duration::from_millis(self.desk.execution_latency_ms),
        }
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            desk: DeskConfig {
                ledger_currency: "NGN".to_string(),
                quote_currency: "USD".to_string(),
                conversion_factor: dec!(1000),
                default_platform: Platform::Binance,
                execution_latency_ms: 1500,
            },
            validation: ValidationConfig {
                excess_guidance_factor: dec!(1.2),
                rate_tolerance: dec!(0.2),
            },
            refresh: RefreshConfig {
                interval: RefreshInterval::Now,
                max_rate_drift: dec!(0.01),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
