//! Default file locations.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the exchange rates file.
pub const RATES_FILE_ENV: &str = "FAIRVALUE_RATES_FILE";

/// Get the default exchange rates file path.
///
/// Default path: `~/.fairvalue/rates.json`
/// Can be overridden with the `FAIRVALUE_RATES_FILE` environment variable.
pub fn default_rates_path() -> PathBuf {
    if let Ok(path) = env::var(RATES_FILE_ENV) {
        return PathBuf::from(path);
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".fairvalue/rates.json"))
        .unwrap_or_else(|| PathBuf::from("rates.json"))
}
