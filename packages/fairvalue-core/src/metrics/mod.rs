//! Position-level valuation metrics.
//!
//! Turns a position's raw inputs (price, fair value, beta, probability) into
//! expected value, Kelly sizing, an Add/Hold/Trim/Sell assessment and buy/sell
//! zone price bounds.

mod position;
mod zones;

pub use position::{assess, calculate_metrics, calibrate_downside_risk, kelly_fraction};
pub use zones::{
    calculate_buy_zone, calculate_sell_zone, expected_value_at_price, solve_price_for_ev_threshold,
};
