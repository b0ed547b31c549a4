//! Per-position values and weights in the base currency.

use super::aggregate::position_rate;
use crate::types::{PortfolioSummary, Position, PositionValuation};
use std::collections::HashMap;

/// Value and weight of every owned position, relative to `summary.total_value`.
///
/// Positions left out of the aggregation (no shares, no usable rate) are
/// omitted. Gain/loss is reported both in the position's local currency and
/// converted into the base currency.
pub fn value_positions(
    positions: &[Position],
    fx_rates: &HashMap<String, f64>,
    summary: &PortfolioSummary,
) -> Vec<PositionValuation> {
    positions
        .iter()
        .filter_map(|position| {
            let rate = position_rate(position, fx_rates)?;
            let value_base = position.market_value_local() / rate;
            let cost_base = position.total_cost_local() / rate;
            let weight_percent = if summary.total_value > 0.0 {
                (value_base / summary.total_value) * 100.0
            } else {
                0.0
            };
            let (unrealized_gain_loss, unrealized_gain_loss_percent) =
                position.unrealized_gain_loss();

            Some(PositionValuation {
                ticker: position.ticker.clone(),
                value_base,
                weight_percent,
                unrealized_gain_loss,
                unrealized_gain_loss_percent,
                unrealized_gain_loss_base: value_base - cost_base,
            })
        })
        .collect()
}
