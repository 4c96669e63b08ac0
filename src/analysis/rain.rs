//! Rain intensity classification.

use crate::config::RainBreakpoints;
use crate::model::RainCategory;

/// Maps a millimetre amount to a rain intensity category.
///
/// Breakpoints are lower bounds: with the defaults, anything below
/// 0.0001 mm is NONE, then GERIMIS < 1.0 <= RINGAN < 2.5 <= SEDANG < 7.6 <= DERAS.
/// `None` and NaN amounts are treated as 0.0.
pub fn classify_rain(mm: Option<f64>, breakpoints: &RainBreakpoints) -> RainCategory {
    let mm = mm.filter(|v| v.is_finite()).unwrap_or(0.0);
    if mm < breakpoints.gerimis_min {
        RainCategory::None
    } else if mm < breakpoints.ringan_min {
        RainCategory::Gerimis
    } else if mm < breakpoints.sedang_min {
        RainCategory::Ringan
    } else if mm < breakpoints.deras_min {
        RainCategory::Sedang
    } else {
        RainCategory::Deras
    }
}

/// Reference amount used to file an hour under a rain category.
///
/// Current-hour rain when it exceeds the drizzle floor, else the 3-hour
/// accumulation when it does, else the 6-hour accumulation. A value sitting
/// exactly on the floor does not count.
pub fn category_reference_mm(rain_mm: f64, acc3_mm: f64, acc6_mm: f64, breakpoints: &RainBreakpoints) -> f64 {
    if rain_mm > breakpoints.gerimis_min {
        rain_mm
    } else if acc3_mm > breakpoints.gerimis_min {
        acc3_mm
    } else {
        acc6_mm
    }
}
