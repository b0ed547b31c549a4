//! Alert rules evaluated after a position is recalculated.

use crate::types::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of alert raised for a position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Expected value moved by more than the configured threshold
    EvChange,
    /// Current price sits inside the buy zone
    BuyZone,
}

/// An alert raised for a single position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub ticker: String,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert.
    pub fn new(ticker: &str, kind: AlertKind, message: String) -> Self {
        Self {
            ticker: ticker.to_string(),
            kind,
            message,
            created_at: Utc::now(),
        }
    }
}

/// Evaluate the alert rules for a freshly recalculated position.
///
/// `previous_ev` is the expected value before the recalculation. An EV change
/// alert fires when the move is strictly larger than `threshold_ev` in either
/// direction. A buy zone alert fires when the current price lies within
/// `[buy_zone_min, buy_zone_max]`; positions without a buy zone never match.
pub fn detect_alerts(previous_ev: f64, position: &Position, threshold_ev: f64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let ev_change = position.expected_value - previous_ev;
    if ev_change.abs() > threshold_ev {
        alerts.push(Alert::new(
            &position.ticker,
            AlertKind::EvChange,
            format!(
                "EV changed from {:.2}% to {:.2}%",
                previous_ev, position.expected_value
            ),
        ));
    }

    if position.buy_zone_max > 0.0
        && position.current_price >= position.buy_zone_min
        && position.current_price <= position.buy_zone_max
    {
        alerts.push(Alert::new(
            &position.ticker,
            AlertKind::BuyZone,
            format!(
                "{} is in buy zone at {:.2}",
                position.ticker, position.current_price
            ),
        ));
    }

    if !alerts.is_empty() {
        tracing::debug!(ticker = %position.ticker, count = alerts.len(), "alerts raised");
    }

    alerts
}
