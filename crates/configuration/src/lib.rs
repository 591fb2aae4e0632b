use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Analysis, Config, Rebalancing, Risk};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, validates it, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations that would make downstream math meaningless.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analysis.crypto_periods_per_year == 0 || config.analysis.equity_periods_per_year == 0
    {
        return Err(ConfigError::ValidationError(
            "periods_per_year must be positive".to_string(),
        ));
    }
    if config.analysis.default_rolling_window < 2 {
        return Err(ConfigError::ValidationError(
            "default_rolling_window must be at least 2".to_string(),
        ));
    }
    if !(config.risk.var_confidence > 0.0 && config.risk.var_confidence < 1.0) {
        return Err(ConfigError::ValidationError(
            "var_confidence must lie strictly between 0 and 1".to_string(),
        ));
    }
    if config.risk.risk_free_rate < 0.0 {
        return Err(ConfigError::ValidationError(
            "risk_free_rate must be >= 0".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&config.rebalancing.materiality_threshold) {
        return Err(ConfigError::ValidationError(
            "materiality_threshold must lie in [0, 1)".to_string(),
        ));
    }
    Ok(())
}
