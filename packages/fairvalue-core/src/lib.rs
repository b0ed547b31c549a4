//! Fairvalue Core - Investment decision engine for portfolio tracking.
//!
//! This crate turns a stock's raw inputs into the numbers a portfolio
//! tracker displays:
//!
//! - **Position metrics**: upside, b-ratio, expected value, Kelly and half-Kelly sizing
//! - **Assessment**: Add / Hold / Trim / Sell bands on expected value
//! - **Zones**: buy and sell zone price bounds solved from EV thresholds
//! - **Alerts**: EV-change and buy-zone rules on recalculated positions
//! - **Portfolio metrics**: value-weighted EV, volatility and sector weights across currencies
//!
//! # Example
//!
//! ```rust
//! use fairvalue_core::{calculate_portfolio_metrics, Assessment, Position, RateProvider, RateTable};
//!
//! let position = Position::new("AAPL", 100.0, 120.0)
//!     .with_beta(1.2)
//!     .with_currency("USD")
//!     .with_holding(10.0, 90.0)
//!     .with_metrics();
//! assert_eq!(position.assessment, Some(Assessment::Hold));
//!
//! let mut rates = RateTable::new();
//! rates.set_rate("USD", 1.25, false);
//!
//! let summary = calculate_portfolio_metrics(&[position], &rates.rates_map());
//! assert!((summary.total_value - 800.0).abs() < 1e-9);
//! ```

pub mod alerts;
pub mod config;
pub mod constants;
pub mod fx;
pub mod metrics;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use alerts::{detect_alerts, Alert, AlertKind};
pub use fx::{RateEntry, RateProvider, RateTable};
pub use types::{
    ApiResponse, Assessment, BuyZoneResult, BuyZoneStatus, PortfolioSummary, Position,
    PositionValuation, PriceZone, SellZoneResult, SellZoneStatus,
};

// Re-export main functionality
pub use metrics::{
    calculate_buy_zone, calculate_metrics, calculate_sell_zone, expected_value_at_price,
    solve_price_for_ev_threshold,
};
pub use portfolio::{calculate_portfolio_metrics, value_positions};

/// Error types for fairvalue-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid exchange rate for {currency}: {rate}")]
    InvalidRate { currency: String, rate: f64 },
}

/// Result type for fairvalue-core operations.
pub type Result<T> = std::result::Result<T, Error>;
