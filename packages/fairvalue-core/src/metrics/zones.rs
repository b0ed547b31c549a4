//! Buy and sell zone price bounds.
//!
//! Zones are price bands whose edges are the prices at which expected value
//! would equal a fixed threshold. Inverting
//! `EV = p * ((FV - P) / P * 100) + (1 - p) * D` for the price gives
//!
//! ```text
//! P = (100 * p * FV) / (EV_target + 100 * p + (1 - p) * |D|)
//! ```

use crate::constants::{
    ADD_EV_THRESHOLD, SELL_EV_THRESHOLD, STRONG_BUY_EV_THRESHOLD, TRIM_EV_THRESHOLD,
};
use crate::types::{BuyZoneResult, BuyZoneStatus, PriceZone, SellZoneResult, SellZoneStatus};
use crate::{Error, Result};

/// Solve for the price at which expected value equals `ev_threshold`.
///
/// Returns `None` when the solve is infeasible: a non-positive denominator,
/// or a resulting price that is not a positive finite number.
pub fn solve_price_for_ev_threshold(
    fair_value: f64,
    probability_positive: f64,
    downside_risk: f64,
    ev_threshold: f64,
) -> Option<f64> {
    let downside_magnitude = downside_risk.abs();
    let denominator =
        ev_threshold + (100.0 * probability_positive) + ((1.0 - probability_positive) * downside_magnitude);
    if denominator.is_nan() || denominator <= 0.0 {
        return None;
    }

    let price = (100.0 * probability_positive * fair_value) / denominator;
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    Some(price)
}

/// Expected value in percent if the stock traded at `price`.
///
/// Returns 0 for a non-positive price.
pub fn expected_value_at_price(
    fair_value: f64,
    probability_positive: f64,
    downside_risk: f64,
    price: f64,
) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    let upside_percent = ((fair_value - price) / price) * 100.0;
    (probability_positive * upside_percent) + ((1.0 - probability_positive) * downside_risk)
}

/// Sell zone shared by the position calculator and [`calculate_sell_zone`].
///
/// The lower bound is the EV = 3% price and the upper bound the EV = 0% price.
/// `None` when either solve fails or the bounds are not strictly ordered.
pub(crate) fn sell_zone_bounds(
    fair_value: f64,
    probability_positive: f64,
    downside_risk: f64,
) -> Option<PriceZone> {
    let lower = solve_price_for_ev_threshold(
        fair_value,
        probability_positive,
        downside_risk,
        TRIM_EV_THRESHOLD,
    )?;
    let upper = solve_price_for_ev_threshold(
        fair_value,
        probability_positive,
        downside_risk,
        SELL_EV_THRESHOLD,
    )?;
    (lower < upper).then_some(PriceZone {
        lower_bound: lower,
        upper_bound: upper,
    })
}

/// Classify an expected value against the trim and sell thresholds.
pub(crate) fn sell_zone_status(expected_value: f64) -> SellZoneStatus {
    if expected_value > TRIM_EV_THRESHOLD {
        SellZoneStatus::BelowSellZone
    } else if expected_value > SELL_EV_THRESHOLD {
        SellZoneStatus::InTrimZone
    } else {
        SellZoneStatus::InSellZone
    }
}

fn validate_zone_inputs(fair_value: f64, probability_positive: f64, downside_risk: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&probability_positive) {
        return Err(Error::InvalidInput(
            "probability_positive must be between 0 and 1".to_string(),
        ));
    }
    if downside_risk.is_nan() || downside_risk >= 0.0 {
        return Err(Error::InvalidInput(
            "downside_risk must be negative".to_string(),
        ));
    }
    if fair_value.is_nan() || fair_value <= 0.0 {
        return Err(Error::InvalidInput(
            "fair_value must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Compute the buy zone for explicit inputs and classify `current_price` against it.
///
/// The lower bound is the price where EV reaches 15%, the upper bound the
/// price where EV reaches 7%. A non-positive `current_price` skips the
/// classification and leaves `zone_status` empty.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `probability_positive` is outside
/// `[0, 1]`, `downside_risk` is not negative, or `fair_value` is not positive.
pub fn calculate_buy_zone(
    ticker: &str,
    fair_value: f64,
    probability_positive: f64,
    downside_risk: f64,
    current_price: f64,
) -> Result<BuyZoneResult> {
    validate_zone_inputs(fair_value, probability_positive, downside_risk)?;

    let mut result = BuyZoneResult {
        ticker: ticker.to_string(),
        fair_value,
        probability_positive,
        downside_risk,
        buy_zone: PriceZone::default(),
        current_expected_value: 0.0,
        zone_status: None,
    };

    let lower = solve_price_for_ev_threshold(
        fair_value,
        probability_positive,
        downside_risk,
        STRONG_BUY_EV_THRESHOLD,
    );
    let upper =
        solve_price_for_ev_threshold(fair_value, probability_positive, downside_risk, ADD_EV_THRESHOLD);
    let (lower, upper) = match (lower, upper) {
        (Some(lower), Some(upper)) if lower <= upper => (lower, upper),
        _ => {
            result.zone_status = Some(BuyZoneStatus::NoBuyZone);
            return Ok(result);
        }
    };

    result.buy_zone = PriceZone {
        lower_bound: lower,
        upper_bound: upper,
    };

    if current_price > 0.0 {
        result.current_expected_value =
            expected_value_at_price(fair_value, probability_positive, downside_risk, current_price);
        result.zone_status = Some(if current_price < lower {
            BuyZoneStatus::BelowBuyZone
        } else if current_price <= upper {
            BuyZoneStatus::WithinBuyZone
        } else {
            BuyZoneStatus::OutsideBuyZone
        });
    }

    Ok(result)
}

/// Compute the sell zone for explicit inputs and classify the EV at `current_price`.
///
/// # Errors
///
/// Same validation as [`calculate_buy_zone`].
pub fn calculate_sell_zone(
    ticker: &str,
    fair_value: f64,
    probability_positive: f64,
    downside_risk: f64,
    current_price: f64,
) -> Result<SellZoneResult> {
    validate_zone_inputs(fair_value, probability_positive, downside_risk)?;

    let mut result = SellZoneResult {
        ticker: ticker.to_string(),
        fair_value,
        probability_positive,
        downside_risk,
        sell_zone: PriceZone::default(),
        current_expected_value: 0.0,
        sell_zone_status: None,
    };

    let Some(zone) = sell_zone_bounds(fair_value, probability_positive, downside_risk) else {
        result.sell_zone_status = Some(SellZoneStatus::NoSellZone);
        return Ok(result);
    };
    result.sell_zone = zone;

    if current_price > 0.0 {
        result.current_expected_value =
            expected_value_at_price(fair_value, probability_positive, downside_risk, current_price);
        result.sell_zone_status = Some(sell_zone_status(result.current_expected_value));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_solve_matches_closed_form() {
        // 100 * 0.65 * 120 / (7 + 65 + 0.35 * 25) = 7800 / 80.75
        let price = solve_price_for_ev_threshold(120.0, 0.65, -25.0, 7.0).unwrap();
        assert_abs_diff_eq!(price, 96.5944, epsilon = 0.001);
    }

    #[test]
    fn test_solve_infeasible_denominator() {
        // 100 * p collapses to zero and the threshold drags the denominator negative
        assert!(solve_price_for_ev_threshold(100.0, 0.0, -10.0, -20.0).is_none());
    }

    #[test]
    fn test_solve_rejects_non_positive_price() {
        assert!(solve_price_for_ev_threshold(0.0, 0.65, -20.0, 7.0).is_none());
        assert!(solve_price_for_ev_threshold(100.0, 0.0, -20.0, 7.0).is_none());
    }

    #[test]
    fn test_expected_value_at_price() {
        assert_abs_diff_eq!(expected_value_at_price(120.0, 0.65, -25.0, 100.0), 4.25, epsilon = 1e-9);
        assert_eq!(expected_value_at_price(120.0, 0.65, -25.0, 0.0), 0.0);
    }

    #[test]
    fn test_buy_zone_valid_input() {
        let result = calculate_buy_zone("UNH", 380.0, 0.65, -15.0, 284.37).unwrap();

        assert_eq!(result.ticker, "UNH");
        assert_abs_diff_eq!(result.buy_zone.lower_bound, 289.7361, epsilon = 0.02);
        assert_abs_diff_eq!(result.buy_zone.upper_bound, 319.7411, epsilon = 0.02);
        assert_abs_diff_eq!(result.current_expected_value, 16.6087, epsilon = 0.02);
        assert_eq!(result.zone_status, Some(BuyZoneStatus::BelowBuyZone));
    }

    #[test]
    fn test_buy_zone_validation_errors() {
        let err = calculate_buy_zone("X", 100.0, 1.2, -20.0, 90.0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("probability_positive"));

        let err = calculate_buy_zone("X", 100.0, 0.65, 20.0, 90.0).unwrap_err();
        assert!(err.to_string().contains("downside_risk"));

        let err = calculate_buy_zone("X", 100.0, 0.65, 0.0, 90.0).unwrap_err();
        assert!(err.to_string().contains("downside_risk"));

        let err = calculate_buy_zone("X", 0.0, 0.65, -20.0, 90.0).unwrap_err();
        assert!(err.to_string().contains("fair_value"));
    }

    #[test]
    fn test_buy_zone_status_classifications() {
        let result = calculate_buy_zone("ABC", 120.0, 0.65, -25.0, 80.0).unwrap();
        assert_eq!(result.zone_status, Some(BuyZoneStatus::BelowBuyZone));

        let result = calculate_buy_zone("ABC", 120.0, 0.65, -25.0, 90.0).unwrap();
        assert_eq!(result.zone_status, Some(BuyZoneStatus::WithinBuyZone));

        let result = calculate_buy_zone("ABC", 120.0, 0.65, -25.0, 110.0).unwrap();
        assert_eq!(result.zone_status, Some(BuyZoneStatus::OutsideBuyZone));
    }

    #[test]
    fn test_buy_zone_without_price() {
        let result = calculate_buy_zone("ABC", 120.0, 0.65, -25.0, 0.0).unwrap();
        assert!(result.buy_zone.upper_bound > 0.0);
        assert_eq!(result.current_expected_value, 0.0);
        assert!(result.zone_status.is_none());
    }

    #[test]
    fn test_buy_zone_unavailable_for_zero_probability() {
        let result = calculate_buy_zone("ABC", 120.0, 0.0, -25.0, 100.0).unwrap();
        assert_eq!(result.zone_status, Some(BuyZoneStatus::NoBuyZone));
        assert_eq!(result.buy_zone, PriceZone::default());
    }

    #[test]
    fn test_sell_zone_bounds_and_status() {
        let result = calculate_sell_zone("ABC", 120.0, 0.65, -25.0, 100.0).unwrap();

        // EV = 3 at 7800 / 76.75, EV = 0 at 7800 / 73.75
        assert_abs_diff_eq!(result.sell_zone.lower_bound, 101.6287, epsilon = 0.001);
        assert_abs_diff_eq!(result.sell_zone.upper_bound, 105.7627, epsilon = 0.001);
        assert_eq!(result.sell_zone_status, Some(SellZoneStatus::BelowSellZone));

        let result = calculate_sell_zone("ABC", 120.0, 0.65, -25.0, 103.0).unwrap();
        assert_eq!(result.sell_zone_status, Some(SellZoneStatus::InTrimZone));

        let result = calculate_sell_zone("ABC", 120.0, 0.65, -25.0, 110.0).unwrap();
        assert_eq!(result.sell_zone_status, Some(SellZoneStatus::InSellZone));
    }

    #[test]
    fn test_sell_zone_validation_errors() {
        assert!(calculate_sell_zone("X", 100.0, -0.1, -20.0, 90.0).is_err());
        assert!(calculate_sell_zone("X", 100.0, 0.65, 5.0, 90.0).is_err());
        assert!(calculate_sell_zone("X", -1.0, 0.65, -20.0, 90.0).is_err());
    }

    #[test]
    fn test_no_sell_zone_for_zero_probability() {
        let result = calculate_sell_zone("X", 100.0, 0.0, -20.0, 90.0).unwrap();
        assert_eq!(result.sell_zone_status, Some(SellZoneStatus::NoSellZone));
        assert_eq!(result.sell_zone, PriceZone::default());
        assert_eq!(result.current_expected_value, 0.0);
    }

    #[test]
    fn test_sell_zone_status_boundaries() {
        assert_eq!(sell_zone_status(3.0001), SellZoneStatus::BelowSellZone);
        assert_eq!(sell_zone_status(3.0), SellZoneStatus::InTrimZone);
        assert_eq!(sell_zone_status(0.0001), SellZoneStatus::InTrimZone);
        assert_eq!(sell_zone_status(0.0), SellZoneStatus::InSellZone);
    }

    proptest! {
        #[test]
        fn solved_price_reproduces_threshold(
            fair_value in 1.0f64..10_000.0,
            probability in 0.05f64..=1.0,
            downside in -60.0f64..-0.5,
            threshold in 0.0f64..30.0,
        ) {
            let price = solve_price_for_ev_threshold(fair_value, probability, downside, threshold)
                .expect("positive inputs always solve");
            let ev = expected_value_at_price(fair_value, probability, downside, price);
            prop_assert!((ev - threshold).abs() < 1e-6);
        }
    }
}
