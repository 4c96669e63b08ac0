//! Hour classification: score, status and flags for one slot.
//!
//! `classify_hour` is the pure per-hour pipeline. Everything that depends on
//! neighbouring hours (accumulations, deviations) or on earlier runs (prior
//! temperature) is computed by the caller and handed in through
//! [`HourContext`], so the same context always yields the same
//! [`ClassifiedHour`].

pub mod scoring;
pub mod status;

use crate::analysis::finite_or_zero;
use crate::analysis::rain::{category_reference_mm, classify_rain};
use crate::analysis::sky::{SkyInputs, classify_sky};
use crate::config::Thresholds;
use crate::model::{ClassifiedHour, Deviation, HourlySample, RainCategory, Reason};

use scoring::{ScoreInputs, score_hour};
use status::{StatusInputs, resolve_status};

/// Probability below which an hour may be considered quiet.
const QUIET_PROBABILITY_BELOW_PCT: f64 = 10.0;

/// Everything `classify_hour` needs besides the thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourContext<'a> {
    pub sample: HourlySample,
    pub acc3_mm: f64,
    pub acc6_mm: f64,
    pub deterministic_deviation: Deviation,
    pub ensemble_deviation: Option<Deviation>,
    pub prior_temperature_c: Option<f64>,
    /// Location advisory text; empty when none was supplied.
    pub advisory: &'a str,
}

/// Classifies one hour. Pure and total.
pub fn classify_hour(ctx: &HourContext<'_>, thresholds: &Thresholds) -> ClassifiedHour {
    let sample = sanitize(ctx.sample);
    let acc3 = finite_or_zero(ctx.acc3_mm);
    let acc6 = finite_or_zero(ctx.acc6_mm);
    let hour = sample.hour_of_day();

    let reference = category_reference_mm(sample.precip_mm, acc3, acc6, &thresholds.rain);
    let rain_category = classify_rain(Some(reference), &thresholds.rain);

    let sky = classify_sky(
        &SkyInputs {
            probability_pct: sample.precip_probability_pct,
            rain_mm: sample.precip_mm,
            acc3_mm: acc3,
            acc6_mm: acc6,
            humidity_pct: sample.humidity_pct,
            uv_index: sample.uv_index,
            hour: Some(hour),
        },
        &thresholds.sky,
        &thresholds.rain,
    );

    let risk = score_hour(
        &ScoreInputs {
            humidity_pct: sample.humidity_pct,
            temperature_c: sample.temperature_c,
            prior_temperature_c: ctx.prior_temperature_c.filter(|t| t.is_finite()),
            wind_speed_kmh: sample.wind_speed_kmh,
            wind_gust_kmh: sample.wind_gust_kmh,
            uv_index: sample.uv_index,
            hour,
            probability_pct: sample.precip_probability_pct,
            rain_mm: sample.precip_mm,
        },
        &thresholds.score,
    );

    let resolution = resolve_status(
        risk.score,
        &StatusInputs {
            rain_mm: sample.precip_mm,
            acc3_mm: acc3,
            acc6_mm: acc6,
            temperature_c: sample.temperature_c,
            uv_index: sample.uv_index,
            humidity_pct: sample.humidity_pct,
            probability_pct: sample.precip_probability_pct,
            wind_speed_kmh: sample.wind_speed_kmh,
            wind_gust_kmh: sample.wind_gust_kmh,
            advisory: ctx.advisory,
        },
        &thresholds.status,
        &thresholds.advisory_keywords,
    );

    let mut reasons = Vec::with_capacity(2 + risk.reasons.len() + resolution.reasons.len());
    reasons.push(Reason::Sky(sky));
    if rain_category != RainCategory::None {
        reasons.push(Reason::Rain(rain_category));
    }
    reasons.extend(risk.reasons);
    reasons.extend(resolution.reasons);
    let shown_reasons = reasons.iter().take(thresholds.reasons_shown).map(Reason::token).collect();

    let quiet = is_quiet(&sample, risk.score, thresholds);

    ClassifiedHour {
        sample,
        acc3_mm: acc3,
        acc6_mm: acc6,
        rain_category,
        sky,
        deterministic_deviation: ctx.deterministic_deviation,
        ensemble_deviation: ctx.ensemble_deviation,
        score: risk.score,
        reasons,
        shown_reasons,
        status: resolution.status,
        flags: resolution.flags,
        quiet,
    }
}

fn sanitize(sample: HourlySample) -> HourlySample {
    HourlySample {
        time: sample.time,
        temperature_c: finite_or_zero(sample.temperature_c),
        humidity_pct: finite_or_zero(sample.humidity_pct),
        precip_probability_pct: finite_or_zero(sample.precip_probability_pct),
        precip_mm: finite_or_zero(sample.precip_mm),
        wind_speed_kmh: finite_or_zero(sample.wind_speed_kmh),
        wind_direction_deg: finite_or_zero(sample.wind_direction_deg),
        wind_gust_kmh: finite_or_zero(sample.wind_gust_kmh),
        uv_index: finite_or_zero(sample.uv_index),
    }
}

/// An hour with nothing worth showing: no score and every indicator calm.
fn is_quiet(sample: &HourlySample, score: u32, thresholds: &Thresholds) -> bool {
    let status = &thresholds.status;
    score == 0
        && sample.precip_mm < status.real_rain_mm
        && sample.precip_probability_pct < QUIET_PROBABILITY_BELOW_PCT
        && sample.wind_speed_kmh < status.wind_warn_kmh
        && sample.wind_gust_kmh < status.gust_warn_kmh
        && sample.uv_index < status.heat_uv_min
        && sample.humidity_pct < thresholds.score.humid_above_pct
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviationLevel, RiskStatus, SkyCondition};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn calm_deviation() -> Deviation {
        Deviation { std_dev_mm: 0.0, level: DeviationLevel::None }
    }

    fn context(sample: HourlySample) -> HourContext<'static> {
        HourContext {
            sample,
            acc3_mm: sample.precip_mm,
            acc6_mm: sample.precip_mm,
            deterministic_deviation: calm_deviation(),
            ensemble_deviation: None,
            prior_temperature_c: None,
            advisory: "",
        }
    }

    fn humid_warm_hour() -> HourlySample {
        HourlySample {
            temperature_c: 30.0,
            humidity_pct: 85.0,
            precip_probability_pct: 40.0,
            wind_speed_kmh: 20.0,
            wind_gust_kmh: 10.0,
            uv_index: 3.0,
            ..HourlySample::empty(at(10))
        }
    }

    #[test]
    fn test_scored_waspada_hour_end_to_end() {
        let hour = classify_hour(&context(humid_warm_hour()), &Thresholds::default());

        assert_eq!(hour.score, 4);
        assert_eq!(hour.status, RiskStatus::Waspada, "wind 20 is a warn but score already Waspada");
        assert_eq!(hour.sky, SkyCondition::Mendung);
        assert_eq!(hour.rain_category, RainCategory::None);
        assert_eq!(
            hour.reasons,
            vec![
                Reason::Sky(SkyCondition::Mendung),
                Reason::Humid,
                Reason::TempOk,
                Reason::WindOk,
                Reason::WindWarn,
            ]
        );
        assert_eq!(hour.display_reasons(2), vec!["sky_mendung", "humid"]);
        assert_eq!(hour.shown_reasons, vec!["sky_mendung", "humid"]);
    }

    #[test]
    fn test_shown_reasons_follow_configured_limit() {
        let thresholds = Thresholds { reasons_shown: 3, ..Thresholds::default() };
        let hour = classify_hour(&context(humid_warm_hour()), &thresholds);
        assert_eq!(hour.shown_reasons, vec!["sky_mendung", "humid", "temp_ok"]);
        assert_eq!(hour.reasons.len(), 5, "full list is kept alongside");

        let none = Thresholds { reasons_shown: 0, ..Thresholds::default() };
        assert!(classify_hour(&context(humid_warm_hour()), &none).shown_reasons.is_empty());
    }

    #[test]
    fn test_rain_reason_follows_sky_reason() {
        let sample = HourlySample {
            precip_mm: 3.0,
            humidity_pct: 70.0,
            ..HourlySample::empty(at(14))
        };
        let hour = classify_hour(&context(sample), &Thresholds::default());

        assert_eq!(hour.rain_category, RainCategory::Sedang);
        assert_eq!(hour.sky, SkyCondition::HujanSedang);
        assert_eq!(hour.display_reasons(2), vec!["sky_hujan_sedang", "rain_sedang"]);
        assert_eq!(hour.status, RiskStatus::Waspada);
        assert!(hour.flags.real_rain);
    }

    #[test]
    fn test_rain_category_falls_back_to_accumulation() {
        let sample = HourlySample::empty(at(3));
        let ctx = HourContext { acc3_mm: 0.0, acc6_mm: 1.2, ..context(sample) };
        let hour = classify_hour(&ctx, &Thresholds::default());

        assert_eq!(hour.rain_category, RainCategory::Ringan, "acc6 is the category reference");
        assert_eq!(hour.sky, SkyCondition::HujanRingan);
        assert!(!hour.flags.real_rain, "real rain only counts the current hour");
    }

    #[test]
    fn test_temperature_drop_uses_prior() {
        let sample = HourlySample { temperature_c: 25.0, ..HourlySample::empty(at(20)) };
        let ctx = HourContext { prior_temperature_c: Some(28.0), ..context(sample) };
        let hour = classify_hour(&ctx, &Thresholds::default());
        assert!(hour.reasons.contains(&Reason::TempDrop));
        assert_eq!(hour.score, 2);
    }

    #[test]
    fn test_advisory_thunder_flag() {
        let ctx = HourContext { advisory: "Potensi hujan lebat dan petir", ..context(HourlySample::empty(at(5))) };
        let hour = classify_hour(&ctx, &Thresholds::default());
        assert_eq!(hour.status, RiskStatus::Rawan);
        assert!(hour.flags.thunder());
    }

    #[test]
    fn test_non_finite_inputs_are_zeroed() {
        let sample = HourlySample {
            precip_mm: f64::NAN,
            wind_speed_kmh: f64::INFINITY,
            ..HourlySample::empty(at(2))
        };
        let ctx = HourContext { acc3_mm: f64::NAN, ..context(sample) };
        let hour = classify_hour(&ctx, &Thresholds::default());
        assert_eq!(hour.sample.precip_mm, 0.0);
        assert_eq!(hour.sample.wind_speed_kmh, 0.0);
        assert_eq!(hour.acc3_mm, 0.0);
        assert_eq!(hour.status, RiskStatus::Aman);
    }

    #[test]
    fn test_quiet_hour() {
        let calm = HourlySample { humidity_pct: 60.0, temperature_c: 24.0, ..HourlySample::empty(at(2)) };
        assert!(classify_hour(&context(calm), &Thresholds::default()).quiet);

        let breezy = HourlySample { wind_speed_kmh: 16.0, ..calm };
        assert!(!classify_hour(&context(breezy), &Thresholds::default()).quiet);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let sample = HourlySample { precip_mm: 0.4, ..humid_warm_hour() };
        let ctx = HourContext {
            prior_temperature_c: Some(32.5),
            ensemble_deviation: Some(Deviation { std_dev_mm: 0.8, level: DeviationLevel::Warn }),
            ..context(sample)
        };
        let thresholds = Thresholds::default();

        let first = serde_json::to_string(&classify_hour(&ctx, &thresholds)).unwrap();
        let second = serde_json::to_string(&classify_hour(&ctx, &thresholds)).unwrap();
        assert_eq!(first, second, "same inputs must serialize byte-identically");
    }
}
