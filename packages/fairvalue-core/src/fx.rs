//! Exchange rates against the base currency.
//!
//! Rates are stored as "local currency units per 1 base-currency unit", so
//! dividing a local amount by its rate converts it into the base currency.

use crate::constants::DEFAULT_BASE_CURRENCY;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Source of exchange rates, usually backed by a rate-fetching service.
pub trait RateProvider {
    /// Rate for a single currency, if known.
    fn rate(&self, currency: &str) -> Option<f64>;

    /// All known rates keyed by currency code.
    fn rates_map(&self) -> HashMap<String, f64>;
}

/// One tracked currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateEntry {
    pub currency: String,
    /// Local units per 1 base unit
    pub rate: f64,
    /// Whether the rate was entered by hand rather than fetched
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// On-disk shapes accepted by [`RateTable::from_json`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RatesFile {
    Map(HashMap<String, f64>),
    Entries(Vec<RateEntry>),
}

/// In-memory exchange rate table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateTable {
    base_currency: String,
    rates: BTreeMap<String, RateEntry>,
}

impl RateTable {
    /// Create a table with the default base currency.
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE_CURRENCY)
    }

    /// Create a table with a custom base currency. The base always has rate 1.
    pub fn with_base(base_currency: &str) -> Self {
        let base_currency = base_currency.to_uppercase();
        let mut rates = BTreeMap::new();
        rates.insert(
            base_currency.clone(),
            RateEntry {
                currency: base_currency.clone(),
                rate: 1.0,
                is_manual: false,
                updated_at: None,
            },
        );
        Self {
            base_currency,
            rates,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Insert or replace the rate for a currency.
    pub fn set_rate(&mut self, currency: &str, rate: f64, is_manual: bool) {
        let currency = currency.to_uppercase();
        self.rates.insert(
            currency.clone(),
            RateEntry {
                currency,
                rate,
                is_manual,
                updated_at: Some(Utc::now()),
            },
        );
    }

    /// Stop tracking a currency. The base currency cannot be removed.
    pub fn remove(&mut self, currency: &str) -> Result<RateEntry> {
        let currency = currency.to_uppercase();
        if currency == self.base_currency {
            return Err(Error::InvalidInput(format!(
                "cannot remove base currency {}",
                currency
            )));
        }
        self.rates
            .remove(&currency)
            .ok_or(Error::UnknownCurrency(currency))
    }

    /// All entries ordered by currency code.
    pub fn entries(&self) -> impl Iterator<Item = &RateEntry> {
        self.rates.values()
    }

    fn usable_rate(&self, currency: &str) -> Result<f64> {
        let currency = currency.to_uppercase();
        let entry = self
            .rates
            .get(&currency)
            .ok_or_else(|| Error::UnknownCurrency(currency.clone()))?;
        if entry.rate <= 0.0 || !entry.rate.is_finite() {
            return Err(Error::InvalidRate {
                currency,
                rate: entry.rate,
            });
        }
        Ok(entry.rate)
    }

    /// Convert a local amount into the base currency.
    pub fn convert_to_base(&self, amount: f64, from_currency: &str) -> Result<f64> {
        if from_currency.eq_ignore_ascii_case(&self.base_currency) {
            return Ok(amount);
        }
        Ok(amount / self.usable_rate(from_currency)?)
    }

    /// Convert a base-currency amount into a local currency.
    pub fn convert_from_base(&self, amount: f64, to_currency: &str) -> Result<f64> {
        if to_currency.eq_ignore_ascii_case(&self.base_currency) {
            return Ok(amount);
        }
        Ok(amount * self.usable_rate(to_currency)?)
    }

    /// Parse rates from JSON: either `{"USD": 1.08, ...}` or a list of entries.
    ///
    /// The base currency is always present with rate 1.
    pub fn from_json(base_currency: &str, json: &str) -> Result<Self> {
        let mut table = Self::with_base(base_currency);
        match serde_json::from_str::<RatesFile>(json)? {
            RatesFile::Map(map) => {
                for (currency, rate) in map {
                    table.set_rate(&currency, rate, false);
                }
            }
            RatesFile::Entries(entries) => {
                for mut entry in entries {
                    entry.currency = entry.currency.to_uppercase();
                    table.rates.insert(entry.currency.clone(), entry);
                }
            }
        }
        table.rates.insert(
            table.base_currency.clone(),
            RateEntry {
                currency: table.base_currency.clone(),
                rate: 1.0,
                is_manual: false,
                updated_at: None,
            },
        );
        Ok(table)
    }

    /// Load rates from a JSON file. A missing file yields a base-only table.
    pub fn load(base_currency: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "rates file not found, using base currency only");
            return Ok(Self::with_base(base_currency));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(base_currency, &content)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RateProvider for RateTable {
    fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.to_uppercase()).map(|e| e.rate)
    }

    fn rates_map(&self) -> HashMap<String, f64> {
        self.rates
            .iter()
            .map(|(currency, entry)| (currency.clone(), entry.rate))
            .collect()
    }
}
