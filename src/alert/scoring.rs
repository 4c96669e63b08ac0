//! Weighted risk score for one hour.
//!
//! Each satisfied condition adds its configured points and records one
//! reason. Conditions are evaluated in a fixed order and the reasons keep
//! that order, because the display only shows the first few.

use crate::config::ScoreWeights;
use crate::model::Reason;

/// Indicators the scorer looks at for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreInputs {
    pub humidity_pct: f64,
    pub temperature_c: f64,
    /// Temperature last seen for this location, if any.
    pub prior_temperature_c: Option<f64>,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    pub uv_index: f64,
    /// Local hour of day, 0-23.
    pub hour: u32,
    pub probability_pct: f64,
    pub rain_mm: f64,
}

/// Score and the reasons that produced it, in evaluation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskScore {
    pub score: u32,
    pub reasons: Vec<Reason>,
}

impl RiskScore {
    fn add(&mut self, points: u32, reason: Reason) {
        self.score += points;
        self.reasons.push(reason);
    }
}

/// Scores one hour.
///
/// A temperature drop only counts when a prior temperature exists and fell
/// by at least `temp_drop_c` since. Probability and rain each contribute at
/// most one of their two tiers.
pub fn score_hour(inputs: &ScoreInputs, weights: &ScoreWeights) -> RiskScore {
    let mut risk = RiskScore::default();

    if inputs.humidity_pct > weights.humid_above_pct {
        risk.add(weights.humid_points, Reason::Humid);
    }
    if (weights.temp_min_c..=weights.temp_max_c).contains(&inputs.temperature_c) {
        risk.add(weights.temp_points, Reason::TempOk);
    }
    if let Some(prior) = inputs.prior_temperature_c {
        if prior - inputs.temperature_c >= weights.temp_drop_c {
            risk.add(weights.temp_drop_points, Reason::TempDrop);
        }
    }
    if (weights.wind_min_kmh..=weights.wind_max_kmh).contains(&inputs.wind_speed_kmh) {
        risk.add(weights.wind_points, Reason::WindOk);
    }
    if inputs.wind_gust_kmh > weights.gust_above_kmh {
        risk.add(weights.gust_points, Reason::Gust);
    }
    if (weights.uv_start_hour..=weights.uv_end_hour).contains(&inputs.hour) && inputs.uv_index >= weights.uv_min {
        risk.add(weights.uv_points, Reason::UvHigh);
    }

    if inputs.probability_pct >= weights.probability_high_pct {
        risk.add(weights.probability_high_points, Reason::ProbabilityHigh);
    } else if inputs.probability_pct >= weights.probability_moderate_pct {
        risk.add(weights.probability_moderate_points, Reason::ProbabilityModerate);
    }

    if inputs.rain_mm >= weights.rained_now_mm {
        risk.add(weights.rained_now_points, Reason::RainedNow);
    } else if inputs.rain_mm >= weights.drizzle_mm {
        risk.add(weights.drizzle_points, Reason::Drizzle);
    }

    risk
}
