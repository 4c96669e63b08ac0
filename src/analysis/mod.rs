/// Per-hour weather classification.
///
/// These are the pure building blocks consumed by `alert::classify_hour`.
/// None of them can fail: every input is already a coerced `f64`.
///
/// Submodules:
/// - `rain`: millimetre amount to rain intensity category.
/// - `sky`: hourly indicators to a sky condition label.
/// - `window`: forward-looking accumulations and value windows.
/// - `deviation`: short-horizon precipitation volatility.

pub mod deviation;
pub mod rain;
pub mod sky;
pub mod window;

/// Coerces NaN and infinities to 0.0, the crate-wide default for bad numbers.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
