//! Configuration
//!
//! Settings are read from CLI arguments with environment fallbacks. A `.env`
//! file in the working directory is honoured by the binary.

use std::path::PathBuf;

use clap::Args;

use crate::{
    cart::{CartReducer, HOME_CURRENCY},
    discounts::{DiscountError, DiscountTable},
    persistence::{CartPersistence, DEFAULT_STORAGE_KEY, FileStorage},
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Cart storage and pricing settings.
#[derive(Debug, Args)]
pub struct CartConfig {
    /// Directory the cart is stored in
    #[arg(long, env = "WANDERKART_STORAGE_DIR", default_value = ".wanderkart")]
    pub storage_dir: PathBuf,

    /// Key the cart is stored under
    #[arg(long, env = "WANDERKART_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Currency of an empty cart
    #[arg(long, env = "WANDERKART_CURRENCY", default_value = HOME_CURRENCY)]
    pub home_currency: String,

    /// YAML file of discount codes; the built-in codes are used when absent
    #[arg(long, env = "WANDERKART_DISCOUNTS")]
    pub discounts: Option<PathBuf>,
}

impl CartConfig {
    /// Reducer using the configured home currency.
    #[must_use]
    pub fn reducer(&self) -> CartReducer {
        CartReducer::new(self.home_currency.trim().to_ascii_uppercase())
    }

    /// File-backed persistence in the configured directory and slot.
    #[must_use]
    pub fn persistence(&self) -> CartPersistence<FileStorage> {
        CartPersistence::with_key(
            FileStorage::new(self.storage_dir.clone()),
            self.storage_key.clone(),
        )
    }

    /// The discount code table.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a configured table file cannot be loaded.
    pub fn discount_table(&self) -> Result<DiscountTable, DiscountError> {
        self.discounts
            .as_ref()
            .map_or_else(|| Ok(DiscountTable::builtin()), DiscountTable::from_yaml_file)
    }
}
