// In crates/app-config/src/lib.rs

use std::path::Path;

use config::{Config, Environment, File, FileFormat};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, OptionDefaults, Settings};

/// Loads the application settings from the `config/` directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from("config")
}

/// Loads the application settings from `dir`.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables (e.g., `APP_BACKTEST__CAPITAL=5000`).
pub fn load_settings_from(dir: impl AsRef<Path>) -> Result<Settings> {
    let dir = dir.as_ref();
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::from(dir.join("base")))
        .add_source(File::from(dir.join(&environment)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

/// Parses settings from a single in-memory TOML document, without file or environment layers.
pub fn parse_settings(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let backtest = &settings.backtest;
    if !(backtest.capital.is_finite() && backtest.capital > 0.0) {
        return Err(Error::Invalid(format!(
            "backtest.capital must be positive, got {}",
            backtest.capital
        )));
    }
    if backtest.periods_per_year == 0 {
        return Err(Error::Invalid("backtest.periods_per_year must be at least 1".to_string()));
    }
    if backtest.commission_per_trade < 0.0 || backtest.commission_pct < 0.0 {
        return Err(Error::Invalid("backtest commissions must not be negative".to_string()));
    }
    if settings.app.worker_threads == 0 {
        return Err(Error::Invalid("app.worker_threads must be at least 1".to_string()));
    }
    if settings.options.fallback_volatility <= 0.0 {
        return Err(Error::Invalid(format!(
            "options.fallback_volatility must be positive, got {}",
            settings.options.fallback_volatility
        )));
    }
    Ok(())
}
