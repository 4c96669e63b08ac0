//! Sky condition classification.
//!
//! Rain evidence always wins: if the current hour or the near-term
//! accumulations show measurable rain, the label is one of the HUJAN_*
//! intensities regardless of probability, UV or humidity. Only dry hours
//! fall through to the probability / sunshine / humidity rules.

use super::finite_or_zero;
use super::rain::classify_rain;
use crate::config::{RainBreakpoints, SkyThresholds};
use crate::model::{RainCategory, SkyCondition};

/// Indicators the sky classifier looks at for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkyInputs {
    pub probability_pct: f64,
    pub rain_mm: f64,
    pub acc3_mm: f64,
    pub acc6_mm: f64,
    pub humidity_pct: f64,
    pub uv_index: f64,
    /// Local hour of day, 0-23. `None` disables the daytime sunshine rule.
    pub hour: Option<u32>,
}

/// Picks the rain amount that drives a HUJAN_* label, or 0.0 for a dry hour.
pub fn reference_rain_mm(inputs: &SkyInputs, sky: &SkyThresholds) -> f64 {
    let rain = finite_or_zero(inputs.rain_mm);
    let acc3 = finite_or_zero(inputs.acc3_mm);
    let acc6 = finite_or_zero(inputs.acc6_mm);
    if rain >= sky.real_rain_mm {
        rain
    } else if acc3 >= sky.acc3_rain_mm {
        acc3
    } else if acc6 >= sky.acc6_rain_mm {
        acc6
    } else {
        0.0
    }
}

/// Classifies one hour into a sky condition label. Total; never fails.
pub fn classify_sky(inputs: &SkyInputs, sky: &SkyThresholds, rain: &RainBreakpoints) -> SkyCondition {
    let reference = reference_rain_mm(inputs, sky);
    if reference > 0.0 {
        return match classify_rain(Some(reference), rain) {
            RainCategory::Deras => SkyCondition::HujanDeras,
            RainCategory::Sedang => SkyCondition::HujanSedang,
            RainCategory::Ringan => SkyCondition::HujanRingan,
            RainCategory::Gerimis | RainCategory::None => SkyCondition::HujanGerimis,
        };
    }

    let probability = finite_or_zero(inputs.probability_pct);
    let humidity = finite_or_zero(inputs.humidity_pct);
    let uv = finite_or_zero(inputs.uv_index);

    if probability >= sky.potential_probability_pct {
        return SkyCondition::HujanPotensial;
    }

    let daytime = inputs
        .hour
        .map(|h| (sky.day_start_hour..=sky.day_end_hour).contains(&h))
        .unwrap_or(false);
    if daytime && uv >= sky.clear_uv_min && humidity < sky.clear_humidity_below {
        return SkyCondition::Cerah;
    }

    if (sky.cloudy_humidity_min..=sky.cloudy_humidity_max).contains(&humidity)
        && probability < sky.cloudy_probability_below
    {
        return SkyCondition::Berawan;
    }

    if humidity > sky.overcast_humidity_above
        || (sky.overcast_probability_min..sky.potential_probability_pct).contains(&probability)
    {
        return SkyCondition::Mendung;
    }

    SkyCondition::Berawan
}
