//! Core data types for the valuation engine.

use crate::constants::DEFAULT_BASE_CURRENCY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A tracked stock with its raw inputs and the metrics derived from them.
///
/// Input fields are supplied by the caller. Derived fields are written by
/// [`crate::metrics::calculate_metrics`] and are always recomputed from the
/// inputs, never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Position {
    /// Stock ticker symbol (uppercase)
    pub ticker: String,
    /// Sector used for portfolio sector weights
    pub sector: String,
    /// ISO currency code the price is quoted in
    pub currency: String,
    /// Latest market price in local currency
    pub current_price: f64,
    /// Estimated fair value in local currency
    pub fair_value: f64,
    /// Systematic risk coefficient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// Annualized volatility percentage
    pub volatility: f64,
    /// Probability of the upside scenario, in (0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_positive: Option<f64>,
    /// Downside scenario in percent (negative). `None` means not calibrated yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downside_risk: Option<f64>,
    /// Number of shares owned
    pub shares_owned: f64,
    /// Average entry price in local currency
    pub avg_price_local: f64,

    /// Upside to fair value in percent
    pub upside_potential: f64,
    /// Reward to risk ratio (upside / |downside|)
    pub b_ratio: f64,
    /// Probability-weighted expected value in percent
    pub expected_value: f64,
    /// Full Kelly fraction in percent
    pub kelly_fraction: f64,
    /// Half-Kelly suggested portfolio weight in percent
    pub half_kelly_suggested: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    pub buy_zone_min: f64,
    pub buy_zone_max: f64,
    pub sell_zone_lower_bound: f64,
    pub sell_zone_upper_bound: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_zone_status: Option<SellZoneStatus>,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            sector: String::new(),
            currency: DEFAULT_BASE_CURRENCY.to_string(),
            current_price: 0.0,
            fair_value: 0.0,
            beta: None,
            volatility: 0.0,
            probability_positive: None,
            downside_risk: None,
            shares_owned: 0.0,
            avg_price_local: 0.0,
            upside_potential: 0.0,
            b_ratio: 0.0,
            expected_value: 0.0,
            kelly_fraction: 0.0,
            half_kelly_suggested: 0.0,
            assessment: None,
            buy_zone_min: 0.0,
            buy_zone_max: 0.0,
            sell_zone_lower_bound: 0.0,
            sell_zone_upper_bound: 0.0,
            sell_zone_status: None,
        }
    }
}

impl Position {
    /// Create a position with the given ticker, current price and fair value.
    pub fn new(ticker: &str, current_price: f64, fair_value: f64) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            current_price,
            fair_value,
            ..Default::default()
        }
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn with_probability(mut self, probability_positive: f64) -> Self {
        self.probability_positive = Some(probability_positive);
        self
    }

    pub fn with_downside_risk(mut self, downside_risk: f64) -> Self {
        self.downside_risk = Some(downside_risk);
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Set the holding: shares owned and average entry price.
    pub fn with_holding(mut self, shares_owned: f64, avg_price_local: f64) -> Self {
        self.shares_owned = shares_owned;
        self.avg_price_local = avg_price_local;
        self
    }

    pub fn with_sector(mut self, sector: &str) -> Self {
        self.sector = sector.to_string();
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_uppercase();
        self
    }

    /// Whether the position takes part in portfolio aggregation.
    pub fn is_owned(&self) -> bool {
        self.shares_owned > 0.0
    }

    /// Market value in local currency.
    pub fn market_value_local(&self) -> f64 {
        self.shares_owned * self.current_price
    }

    /// Total entry cost in local currency.
    pub fn total_cost_local(&self) -> f64 {
        self.shares_owned * self.avg_price_local
    }

    /// Unrealized gain/loss in local currency and as a percentage of cost.
    pub fn unrealized_gain_loss(&self) -> (f64, f64) {
        let total_cost = self.total_cost_local();
        let gain_loss = self.market_value_local() - total_cost;
        let gain_loss_percent = if total_cost > 0.0 {
            (gain_loss / total_cost) * 100.0
        } else {
            0.0
        };
        (gain_loss, gain_loss_percent)
    }
}

/// Categorical recommendation derived from expected value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Assessment {
    Add,
    Hold,
    Trim,
    Sell,
}

impl Assessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Add => "Add",
            Assessment::Hold => "Hold",
            Assessment::Trim => "Trim",
            Assessment::Sell => "Sell",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current expected value sits relative to the sell zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SellZoneStatus {
    #[serde(rename = "Below sell zone")]
    BelowSellZone,
    #[serde(rename = "In trim zone")]
    InTrimZone,
    #[serde(rename = "In sell zone")]
    InSellZone,
    #[serde(rename = "no sell zone")]
    NoSellZone,
}

impl SellZoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellZoneStatus::BelowSellZone => "Below sell zone",
            SellZoneStatus::InTrimZone => "In trim zone",
            SellZoneStatus::InSellZone => "In sell zone",
            SellZoneStatus::NoSellZone => "no sell zone",
        }
    }
}

impl fmt::Display for SellZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current price sits relative to the buy zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BuyZoneStatus {
    /// Price is below the lower bound, so EV exceeds the strong-buy threshold
    #[serde(rename = "EV >> 15%")]
    BelowBuyZone,
    #[serde(rename = "within buy zone")]
    WithinBuyZone,
    #[serde(rename = "outside buy zone")]
    OutsideBuyZone,
    #[serde(rename = "no buy zone available")]
    NoBuyZone,
}

impl BuyZoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuyZoneStatus::BelowBuyZone => "EV >> 15%",
            BuyZoneStatus::WithinBuyZone => "within buy zone",
            BuyZoneStatus::OutsideBuyZone => "outside buy zone",
            BuyZoneStatus::NoBuyZone => "no buy zone available",
        }
    }
}

impl fmt::Display for BuyZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price band with a lower and upper bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PriceZone {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Result of a standalone buy-zone query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyZoneResult {
    pub ticker: String,
    pub fair_value: f64,
    pub probability_positive: f64,
    pub downside_risk: f64,
    pub buy_zone: PriceZone,
    /// EV at the supplied current price (0 when no price was given)
    pub current_expected_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_status: Option<BuyZoneStatus>,
}

/// Result of a standalone sell-zone query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellZoneResult {
    pub ticker: String,
    pub fair_value: f64,
    pub probability_positive: f64,
    pub downside_risk: f64,
    pub sell_zone: PriceZone,
    /// EV at the supplied current price (0 when no price was given)
    pub current_expected_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_zone_status: Option<SellZoneStatus>,
}

/// Portfolio-level aggregates, expressed in the base currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortfolioSummary {
    /// Total value of owned positions in the base currency
    pub total_value: f64,
    /// Value-weighted expected value in percent
    pub overall_ev: f64,
    /// Value-weighted volatility in percent
    pub weighted_volatility: f64,
    /// (overall EV - risk-free rate) / weighted volatility
    pub sharpe_ratio: f64,
    /// Sum of position weights in percent
    pub kelly_utilization: f64,
    /// Sector name to weight in percent
    pub sector_weights: BTreeMap<String, f64>,
}

/// Base-currency value and weight of one owned position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionValuation {
    pub ticker: String,
    pub value_base: f64,
    pub weight_percent: f64,
    /// Unrealized gain/loss in local currency
    pub unrealized_gain_loss: f64,
    pub unrealized_gain_loss_percent: f64,
    /// Unrealized gain/loss converted into the base currency
    pub unrealized_gain_loss_base: f64,
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
