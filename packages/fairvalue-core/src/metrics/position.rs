//! Per-position expected value, Kelly sizing and zone bounds.

use super::zones::{sell_zone_bounds, sell_zone_status, solve_price_for_ev_threshold};
use crate::constants::{
    ADD_EV_THRESHOLD, BETA_DOWNSIDE_BREAKPOINTS, BUY_ZONE_BAND, DEFAULT_PROBABILITY_POSITIVE,
    FALLBACK_BUY_ZONE_MAX, FALLBACK_BUY_ZONE_MIN, FALLBACK_DOWNSIDE_RISK, HIGH_BETA_DOWNSIDE_RISK,
    MAX_HALF_KELLY_PERCENT, MIN_DOWNSIDE_MAGNITUDE, SELL_EV_THRESHOLD, TRIM_EV_THRESHOLD,
};
use crate::types::{Assessment, Position, SellZoneStatus};

/// Downside risk in percent implied by a beta.
///
/// Absent or non-positive betas fall back to -20%.
pub fn calibrate_downside_risk(beta: Option<f64>) -> f64 {
    let beta = match beta {
        Some(beta) if beta > 0.0 => beta,
        _ => return FALLBACK_DOWNSIDE_RISK,
    };

    BETA_DOWNSIDE_BREAKPOINTS
        .iter()
        .find(|(breakpoint, _)| beta < *breakpoint)
        .map(|(_, downside)| *downside)
        .unwrap_or(HIGH_BETA_DOWNSIDE_RISK)
}

/// Map an expected value onto the Add/Hold/Trim/Sell bands.
///
/// EV > 7 is Add, 3..=7 is Hold, 0..3 is Trim and anything negative is Sell.
pub fn assess(expected_value: f64) -> Assessment {
    if expected_value > ADD_EV_THRESHOLD {
        Assessment::Add
    } else if expected_value >= TRIM_EV_THRESHOLD {
        Assessment::Hold
    } else if expected_value >= SELL_EV_THRESHOLD {
        Assessment::Trim
    } else {
        Assessment::Sell
    }
}

/// Kelly fraction in percent for a b-ratio and win probability, clamped at zero.
pub fn kelly_fraction(b_ratio: f64, probability_positive: f64) -> f64 {
    if b_ratio <= 0.0 {
        return 0.0;
    }
    let kelly = ((b_ratio * probability_positive) - (1.0 - probability_positive)) / b_ratio * 100.0;
    kelly.max(0.0)
}

/// Recompute every derived field of `position` from its inputs.
///
/// This never fails. Degenerate inputs such as a zero price or a missing
/// fair value leave the affected fields at zero. A missing downside risk is
/// calibrated from beta and a missing or out-of-range probability is
/// replaced by the default; both are written back to the position.
pub fn calculate_metrics(position: &mut Position) {
    reset_derived(position);

    let beta = position.beta;
    let downside_risk = *position
        .downside_risk
        .get_or_insert_with(|| calibrate_downside_risk(beta));

    if position.current_price > 0.0 && position.fair_value > 0.0 {
        position.upside_potential =
            ((position.fair_value - position.current_price) / position.current_price) * 100.0;
    }
    let upside = position.upside_potential;

    let p = match position.probability_positive {
        Some(p) if p > 0.0 && p <= 1.0 => p,
        _ => DEFAULT_PROBABILITY_POSITIVE,
    };
    position.probability_positive = Some(p);

    position.b_ratio = upside / downside_risk.abs().max(MIN_DOWNSIDE_MAGNITUDE);
    position.expected_value = (p * upside) + ((1.0 - p) * downside_risk);
    position.kelly_fraction = kelly_fraction(position.b_ratio, p);
    position.half_kelly_suggested = (position.kelly_fraction / 2.0).min(MAX_HALF_KELLY_PERCENT);
    position.assessment = Some(assess(position.expected_value));

    if position.fair_value > 0.0 {
        match solve_price_for_ev_threshold(position.fair_value, p, downside_risk, ADD_EV_THRESHOLD) {
            Some(max) => {
                position.buy_zone_max = max;
                position.buy_zone_min = max * BUY_ZONE_BAND;
            }
            None => {
                tracing::warn!(
                    ticker = %position.ticker,
                    "buy zone solve infeasible, falling back to price band"
                );
                position.buy_zone_min = position.current_price * FALLBACK_BUY_ZONE_MIN;
                position.buy_zone_max = position.current_price * FALLBACK_BUY_ZONE_MAX;
            }
        }
    }

    match sell_zone_bounds(position.fair_value, p, downside_risk) {
        Some(zone) => {
            position.sell_zone_lower_bound = zone.lower_bound;
            position.sell_zone_upper_bound = zone.upper_bound;
            position.sell_zone_status = Some(sell_zone_status(position.expected_value));
        }
        None => position.sell_zone_status = Some(SellZoneStatus::NoSellZone),
    }

    tracing::trace!(
        ticker = %position.ticker,
        expected_value = position.expected_value,
        kelly = position.kelly_fraction,
        assessment = ?position.assessment,
        "position metrics calculated"
    );
}

fn reset_derived(position: &mut Position) {
    position.upside_potential = 0.0;
    position.b_ratio = 0.0;
    position.expected_value = 0.0;
    position.kelly_fraction = 0.0;
    position.half_kelly_suggested = 0.0;
    position.assessment = None;
    position.buy_zone_min = 0.0;
    position.buy_zone_max = 0.0;
    position.sell_zone_lower_bound = 0.0;
    position.sell_zone_upper_bound = 0.0;
    position.sell_zone_status = None;
}

impl Position {
    /// Return a copy of this position with all derived metrics calculated.
    pub fn with_metrics(mut self) -> Self {
        calculate_metrics(&mut self);
        self
    }
}
