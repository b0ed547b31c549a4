//! Portfolio management module.
//!
//! Rolls enriched positions into value-weighted portfolio metrics under
//! multi-currency normalization.

mod aggregate;
mod valuation;

pub use aggregate::calculate_portfolio_metrics;
pub use valuation::value_positions;
