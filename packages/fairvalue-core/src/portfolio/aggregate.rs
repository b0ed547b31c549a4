//! Value-weighted portfolio aggregates.

use crate::constants::RISK_FREE_RATE_PERCENT;
use crate::types::{PortfolioSummary, Position};
use std::collections::HashMap;

/// Exchange rate for an owned position's currency.
///
/// Currency codes are matched case-insensitively. `None` when the position
/// is not owned or its currency has no positive rate.
pub(crate) fn position_rate(position: &Position, fx_rates: &HashMap<String, f64>) -> Option<f64> {
    if !position.is_owned() {
        return None;
    }
    let rate = fx_rates
        .get(&position.currency)
        .or_else(|| fx_rates.get(&position.currency.to_uppercase()));
    match rate {
        Some(&rate) if rate > 0.0 => Some(rate),
        _ => {
            tracing::debug!(
                ticker = %position.ticker,
                currency = %position.currency,
                "no usable exchange rate, excluding position from portfolio"
            );
            None
        }
    }
}

/// Base-currency value of an owned position.
pub(crate) fn position_value_base(position: &Position, fx_rates: &HashMap<String, f64>) -> Option<f64> {
    position_rate(position, fx_rates).map(|rate| position.market_value_local() / rate)
}

/// Aggregate enriched positions into portfolio-level metrics.
///
/// `fx_rates` maps currency codes to local units per 1 base-currency unit.
/// Positions with no shares, or whose currency has no positive rate, are
/// left out of every aggregate. The total value is computed in a first pass
/// so that every weight is taken against the final total.
pub fn calculate_portfolio_metrics(
    positions: &[Position],
    fx_rates: &HashMap<String, f64>,
) -> PortfolioSummary {
    let values: Vec<Option<f64>> = positions
        .iter()
        .map(|p| position_value_base(p, fx_rates))
        .collect();
    let total_value = values.iter().flatten().fold(0.0_f64, |acc, &value| acc + value);

    let mut summary = PortfolioSummary {
        total_value,
        ..Default::default()
    };
    if total_value <= 0.0 {
        return summary;
    }

    for (position, value) in positions.iter().zip(&values) {
        let Some(value) = *value else { continue };
        if value <= 0.0 {
            continue;
        }

        let weight = value / total_value;
        summary.overall_ev += position.expected_value * weight;
        summary.weighted_volatility += position.volatility * weight;
        *summary
            .sector_weights
            .entry(position.sector.clone())
            .or_insert(0.0) += weight * 100.0;
        summary.kelly_utilization += weight * 100.0;
    }

    if summary.weighted_volatility > 0.0 {
        summary.sharpe_ratio =
            (summary.overall_ev - RISK_FREE_RATE_PERCENT) / summary.weighted_volatility;
    }

    tracing::debug!(
        positions = positions.len(),
        total_value = summary.total_value,
        overall_ev = summary.overall_ev,
        "portfolio metrics calculated"
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn rates(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    fn holding(sector: &str, currency: &str, shares: f64, price: f64) -> Position {
        Position::new("T", price, 0.0)
            .with_sector(sector)
            .with_currency(currency)
            .with_holding(shares, price)
    }

    #[test]
    fn test_two_currency_portfolio() {
        let mut tech = holding("Tech", "USD", 10.0, 100.0).with_volatility(10.0);
        tech.expected_value = 5.0;
        let mut health = holding("Health", "EUR", 5.0, 200.0).with_volatility(20.0);
        health.expected_value = 1.0;
        let ignored = holding("Ignored", "USD", 0.0, 999.0);

        let summary = calculate_portfolio_metrics(
            &[tech, health, ignored],
            &rates(&[("USD", 1.0), ("EUR", 2.0)]),
        );

        assert_abs_diff_eq!(summary.total_value, 1500.0, epsilon = 0.01);
        assert_abs_diff_eq!(summary.overall_ev, 3.6667, epsilon = 0.01);
        assert_abs_diff_eq!(summary.weighted_volatility, 13.3333, epsilon = 0.01);
        assert_abs_diff_eq!(summary.sharpe_ratio, -0.025, epsilon = 0.01);
        assert_abs_diff_eq!(summary.kelly_utilization, 100.0, epsilon = 0.01);

        assert_abs_diff_eq!(summary.sector_weights["Tech"], 66.6667, epsilon = 0.05);
        assert_abs_diff_eq!(summary.sector_weights["Health"], 33.3333, epsilon = 0.05);
        assert!(!summary.sector_weights.contains_key("Ignored"));
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = calculate_portfolio_metrics(&[], &rates(&[("EUR", 1.0)]));
        assert_eq!(summary, PortfolioSummary::default());
    }

    #[test]
    fn test_all_positions_excluded() {
        let positions = vec![
            holding("Tech", "USD", 0.0, 100.0),
            holding("Energy", "NOK", 10.0, 50.0),
            holding("Energy", "GBP", 10.0, 50.0),
        ];
        let summary =
            calculate_portfolio_metrics(&positions, &rates(&[("USD", 1.1), ("GBP", -1.0)]));

        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.overall_ev, 0.0);
        assert_eq!(summary.kelly_utilization, 0.0);
        assert!(summary.sector_weights.is_empty());
    }

    #[test]
    fn test_empty_total_is_positive_zero() {
        let summary = calculate_portfolio_metrics(&[], &HashMap::new());
        assert!(!summary.total_value.is_sign_negative());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""total_value":0.0"#));
        assert!(!json.contains("-0.0"));
    }

    #[test]
    fn test_negative_shares_excluded() {
        let positions = vec![
            holding("Tech", "EUR", -5.0, 100.0),
            holding("Health", "EUR", 2.0, 50.0),
        ];
        let summary = calculate_portfolio_metrics(&positions, &rates(&[("EUR", 1.0)]));

        assert_abs_diff_eq!(summary.total_value, 100.0, epsilon = 1e-9);
        assert!(!summary.sector_weights.contains_key("Tech"));
        assert_abs_diff_eq!(summary.sector_weights["Health"], 100.0, epsilon = 1e-9);

        let only_short = calculate_portfolio_metrics(&positions[..1], &rates(&[("EUR", 1.0)]));
        assert_eq!(only_short.total_value, 0.0);
        assert!(!only_short.total_value.is_sign_negative());
        assert!(only_short.sector_weights.is_empty());
    }

    #[test]
    fn test_lowercase_currency_matches_rate() {
        let position: Position = serde_json::from_str(
            r#"{"ticker":"AAPL","currency":"usd","current_price":100,"shares_owned":10}"#,
        )
        .unwrap();
        let summary = calculate_portfolio_metrics(&[position], &rates(&[("USD", 1.25)]));

        assert_abs_diff_eq!(summary.total_value, 800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_rate_excluded_not_renormalized() {
        let positions = vec![
            holding("Tech", "EUR", 10.0, 100.0),
            holding("Tech", "JPY", 10.0, 100.0),
        ];
        let summary = calculate_portfolio_metrics(&positions, &rates(&[("EUR", 1.0)]));

        assert_abs_diff_eq!(summary.total_value, 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.sector_weights["Tech"], 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.kelly_utilization, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sectors_merge() {
        let positions = vec![
            holding("Tech", "EUR", 1.0, 100.0),
            holding("Tech", "EUR", 1.0, 100.0),
            holding("Utilities", "EUR", 2.0, 100.0),
        ];
        let summary = calculate_portfolio_metrics(&positions, &rates(&[("EUR", 1.0)]));

        assert_eq!(summary.sector_weights.len(), 2);
        assert_abs_diff_eq!(summary.sector_weights["Tech"], 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.sector_weights["Utilities"], 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_volatility_ratio_is_zero() {
        let mut pos = holding("Tech", "EUR", 1.0, 100.0);
        pos.expected_value = 12.0;
        let summary = calculate_portfolio_metrics(&[pos], &rates(&[("EUR", 1.0)]));

        assert_abs_diff_eq!(summary.overall_ev, 12.0, epsilon = 1e-9);
        assert_eq!(summary.sharpe_ratio, 0.0);
    }

    proptest! {
        #[test]
        fn sector_weights_sum_to_hundred(
            holdings in prop::collection::vec(
                (0usize..4, 0.5f64..500.0, 1.0f64..1000.0, 0usize..3),
                1..20,
            )
        ) {
            let sectors = ["Tech", "Health", "Energy", "Financials"];
            let currencies = [("EUR", 1.0), ("USD", 1.08), ("DKK", 7.46)];
            let positions: Vec<Position> = holdings
                .iter()
                .map(|&(s, shares, price, c)| holding(sectors[s], currencies[c].0, shares, price))
                .collect();

            let summary = calculate_portfolio_metrics(&positions, &rates(&currencies));
            let total: f64 = summary.sector_weights.values().sum();

            prop_assert!(summary.total_value > 0.0);
            prop_assert!((total - 100.0).abs() <= 0.1);
            prop_assert!((summary.kelly_utilization - 100.0).abs() <= 0.1);
        }
    }
}
