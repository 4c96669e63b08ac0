//! Status resolution: score cut-offs followed by an ordered override chain.
//!
//! The initial status comes from the score. The rules below then run in a
//! strict order and may only raise the status:
//!
//! 1. Advisory keyword match: Rawan, thunder hour.
//! 2. Current-hour rain: Rawan, or Waspada.
//! 3. Near-term accumulation: Waspada.
//! 4. Heat and humid-rain side flags (no status change).
//! 5. Sustained wind: Rawan, or Waspada.
//! 6. Gusts: Rawan, or Waspada.
//! 7. Probability + wind heuristic: thunder hour (no status change).
//! 8. Informational overlays: rain/accumulation and gust waspada hours.
//!
//! Deviation flags are recorded by the caller. They never touch the status,
//! so where they sit in the chain does not change the outcome.
//!
//! Once Rawan, nothing can lower the status; "warn" rules therefore only
//! record a reason when the status is still below Rawan.

use crate::config::StatusThresholds;
use crate::model::{HourFlags, Reason, RiskStatus};

/// Indicators the resolver looks at for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusInputs<'a> {
    pub rain_mm: f64,
    pub acc3_mm: f64,
    pub acc6_mm: f64,
    pub temperature_c: f64,
    pub uv_index: f64,
    pub humidity_pct: f64,
    pub probability_pct: f64,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    /// Free-text advisory for the location; empty when none.
    pub advisory: &'a str,
}

/// Final status, the flags raised on the way, and the override reasons.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResolution {
    pub status: RiskStatus,
    pub flags: HourFlags,
    pub reasons: Vec<Reason>,
}

/// Maps a score to the starting status.
pub fn initial_status(score: u32, thresholds: &StatusThresholds) -> RiskStatus {
    if score >= thresholds.rawan_score {
        RiskStatus::Rawan
    } else if score >= thresholds.waspada_score {
        RiskStatus::Waspada
    } else {
        RiskStatus::Aman
    }
}

/// True when the advisory contains any keyword, ignoring case.
pub fn advisory_matches(advisory: &str, keywords: &[String]) -> bool {
    if advisory.trim().is_empty() {
        return false;
    }
    let lower = advisory.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| lower.contains(&k.to_lowercase()))
}

/// Runs the full rule chain for one hour.
pub fn resolve_status(
    score: u32,
    inputs: &StatusInputs<'_>,
    thresholds: &StatusThresholds,
    advisory_keywords: &[String],
) -> StatusResolution {
    let mut chain = RuleChain {
        status: initial_status(score, thresholds),
        flags: HourFlags::default(),
        reasons: Vec::new(),
        inputs,
        thresholds,
    };

    chain.advisory(advisory_keywords);
    chain.current_rain();
    chain.accumulation();
    chain.side_flags();
    chain.sustained_wind();
    chain.gusts();
    chain.thunder_heuristic();
    chain.overlays();

    StatusResolution {
        status: chain.status,
        flags: chain.flags,
        reasons: chain.reasons,
    }
}

struct RuleChain<'i, 'a> {
    status: RiskStatus,
    flags: HourFlags,
    reasons: Vec<Reason>,
    inputs: &'i StatusInputs<'a>,
    thresholds: &'i StatusThresholds,
}

impl RuleChain<'_, '_> {
    fn raise(&mut self, to: RiskStatus, reason: Reason) {
        self.status = self.status.escalate(to);
        self.reasons.push(reason);
    }

    fn is_rawan(&self) -> bool {
        self.status == RiskStatus::Rawan
    }

    fn advisory(&mut self, keywords: &[String]) {
        if advisory_matches(self.inputs.advisory, keywords) {
            self.flags.thunder_advisory = true;
            self.raise(RiskStatus::Rawan, Reason::AdvisoryWarning);
        }
    }

    fn current_rain(&mut self) {
        if self.is_rawan() {
            return;
        }
        let rain = self.inputs.rain_mm;
        if rain >= self.thresholds.rain_rawan_mm {
            self.raise(RiskStatus::Rawan, Reason::RainRawan);
        } else if rain >= self.thresholds.rain_waspada_mm {
            self.raise(RiskStatus::Waspada, Reason::RainWaspada);
        }
    }

    fn accumulation(&mut self) {
        if self.is_rawan() {
            return;
        }
        if self.accumulation_exceeded() {
            self.raise(RiskStatus::Waspada, Reason::AccumulatedRain);
        }
    }

    fn accumulation_exceeded(&self) -> bool {
        self.inputs.acc3_mm >= self.thresholds.acc3_waspada_mm
            || self.inputs.acc6_mm >= self.thresholds.acc6_waspada_mm
    }

    fn side_flags(&mut self) {
        let i = self.inputs;
        let t = self.thresholds;
        if i.temperature_c >= t.heat_temp_c && i.uv_index >= t.heat_uv_min {
            self.flags.heat_waspada = true;
        }
        if i.humidity_pct >= t.humid_rain_humidity_pct && i.probability_pct >= t.humid_rain_probability_pct {
            self.flags.rain_waspada = true;
        }
    }

    fn sustained_wind(&mut self) {
        let wind = self.inputs.wind_speed_kmh;
        self.flags.wind_warn = wind >= self.thresholds.wind_warn_kmh;
        self.flags.wind_danger = wind >= self.thresholds.wind_danger_kmh;
        if self.flags.wind_danger {
            self.raise(RiskStatus::Rawan, Reason::WindSustainedDanger);
        } else if !self.is_rawan() && self.flags.wind_warn {
            self.raise(RiskStatus::Waspada, Reason::WindWarn);
        }
    }

    fn gusts(&mut self) {
        let gust = self.inputs.wind_gust_kmh;
        self.flags.gust_warn = gust >= self.thresholds.gust_warn_kmh;
        self.flags.gust_danger = gust >= self.thresholds.gust_danger_kmh;
        if self.flags.gust_danger {
            self.raise(RiskStatus::Rawan, Reason::GustDanger);
        } else if !self.is_rawan() && self.flags.gust_warn {
            self.raise(RiskStatus::Waspada, Reason::GustWarn);
        }
    }

    fn thunder_heuristic(&mut self) {
        if self.inputs.probability_pct >= self.thresholds.thunder_probability_pct
            && self.inputs.wind_speed_kmh >= self.thresholds.thunder_wind_kmh
        {
            self.flags.thunder_heuristic = true;
            self.reasons.push(Reason::ThunderHeuristic);
        }
    }

    fn overlays(&mut self) {
        if self.inputs.rain_mm >= self.thresholds.rain_waspada_mm || self.accumulation_exceeded() {
            self.flags.rain_waspada = true;
        }
        if self.flags.gust_warn {
            self.flags.gust_waspada = true;
        }
        self.flags.real_rain = self.inputs.rain_mm >= self.thresholds.real_rain_mm;
    }
}
