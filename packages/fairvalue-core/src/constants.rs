//! Policy constants for the valuation engine.
//!
//! All percentages are expressed in percent units (7.0 means 7%).

/// Probability of a positive outcome used when none (or an invalid one) is supplied.
pub const DEFAULT_PROBABILITY_POSITIVE: f64 = 0.65;

/// Risk-free rate subtracted from portfolio EV in the risk-adjusted ratio.
pub const RISK_FREE_RATE_PERCENT: f64 = 4.0;

/// Floor applied to |downside| when computing the b-ratio.
pub const MIN_DOWNSIDE_MAGNITUDE: f64 = 0.1;

/// Downside used when beta is absent or non-positive.
pub const FALLBACK_DOWNSIDE_RISK: f64 = -20.0;

/// Hard cap on the half-Kelly suggested weight.
pub const MAX_HALF_KELLY_PERCENT: f64 = 15.0;

/// EV above which a position is rated "Add"; also the buy-zone upper bound target.
pub const ADD_EV_THRESHOLD: f64 = 7.0;

/// EV at or above which a position is rated "Hold"; also the sell-zone lower bound target.
pub const TRIM_EV_THRESHOLD: f64 = 3.0;

/// EV below which a position is rated "Sell"; also the sell-zone upper bound target.
pub const SELL_EV_THRESHOLD: f64 = 0.0;

/// EV target for the lower bound of the standalone buy-zone query.
pub const STRONG_BUY_EV_THRESHOLD: f64 = 15.0;

/// Buy-zone lower bound as a fraction of the upper bound.
pub const BUY_ZONE_BAND: f64 = 0.90;

/// Fallback buy zone as fractions of the current price when the solve is infeasible.
pub const FALLBACK_BUY_ZONE_MIN: f64 = 0.85;
pub const FALLBACK_BUY_ZONE_MAX: f64 = 0.95;

/// Beta breakpoints and the downside risk assigned below each one.
///
/// Betas at or above the last breakpoint get [`HIGH_BETA_DOWNSIDE_RISK`].
pub const BETA_DOWNSIDE_BREAKPOINTS: [(f64, f64); 3] = [(0.5, -15.0), (1.0, -20.0), (1.5, -25.0)];

/// Downside risk for beta at or above 1.5.
pub const HIGH_BETA_DOWNSIDE_RISK: f64 = -30.0;

/// Currency that portfolio aggregates are expressed in.
pub const DEFAULT_BASE_CURRENCY: &str = "EUR";
