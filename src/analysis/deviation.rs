//! Short-horizon precipitation volatility.
//!
//! Two independent sources measure how uncertain the next few hours of rain
//! are:
//!
//! - **Deterministic**: population standard deviation of the single forecast's
//!   hourly amounts over `[t, t + window)`.
//! - **Ensemble**: each member's rain is summed over the same window, and the
//!   population standard deviation is taken across members.
//!
//! Both use the population form (divisor = sample count) to keep the scale
//! stable for tiny windows. Both are classified with the same warn/danger
//! levels, and callers count them independently: one hour may be flagged by
//! both sources.

use super::window::{accumulate, forward_window};
use crate::config::DeviationThresholds;
use crate::model::{Deviation, DeviationLevel, EnsembleMember};

/// Population standard deviation. `None` when fewer than two values.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Classifies a standard deviation in mm.
pub fn classify_deviation(std_dev_mm: f64, thresholds: &DeviationThresholds) -> DeviationLevel {
    if std_dev_mm >= thresholds.danger_mm {
        DeviationLevel::Danger
    } else if std_dev_mm >= thresholds.warn_mm {
        DeviationLevel::Warn
    } else {
        DeviationLevel::None
    }
}

/// Deterministic deviation at `index` of a single rain column.
///
/// 0.0 when fewer than two values fall inside the clipped window.
pub fn deterministic_deviation(rain_mm: &[f64], index: usize, thresholds: &DeviationThresholds) -> Deviation {
    let window = forward_window(rain_mm, index, thresholds.window_hours);
    let std_dev_mm = population_std_dev(&window).unwrap_or(0.0);
    Deviation {
        std_dev_mm,
        level: classify_deviation(std_dev_mm, thresholds),
    }
}

/// Ensemble deviation at `index`: spread of per-member window sums.
///
/// Returns `None` when fewer than two members are available, which disables
/// the ensemble source for the hour.
pub fn ensemble_deviation(
    members: &[EnsembleMember],
    index: usize,
    thresholds: &DeviationThresholds,
) -> Option<Deviation> {
    let sums: Vec<f64> = members
        .iter()
        .map(|m| accumulate(&m.precip_mm, index, thresholds.window_hours))
        .collect();
    population_std_dev(&sums).map(|std_dev_mm| Deviation {
        std_dev_mm,
        level: classify_deviation(std_dev_mm, thresholds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, values: &[f64]) -> EnsembleMember {
        EnsembleMember {
            name: name.to_string(),
            precip_mm: values.to_vec(),
        }
    }

    #[test]
    fn test_population_std_dev_uses_count_divisor() {
        let sd = population_std_dev(&[0.0, 0.0, 6.0]).expect("three values");
        assert!((sd - 8.0_f64.sqrt()).abs() < 1e-9, "expected ~2.828, got {}", sd);
        assert_eq!(population_std_dev(&[4.0]), None);
        assert_eq!(population_std_dev(&[]), None);
    }

    #[test]
    fn test_deterministic_spike_is_danger() {
        let d = deterministic_deviation(&[0.0, 0.0, 6.0, 0.0], 0, &DeviationThresholds::default());
        assert!((d.std_dev_mm - 2.828).abs() < 0.001);
        assert_eq!(d.level, DeviationLevel::Danger);
    }

    #[test]
    fn test_deterministic_levels_at_boundaries() {
        let t = DeviationThresholds::default();
        assert_eq!(classify_deviation(0.69, &t), DeviationLevel::None);
        assert_eq!(classify_deviation(0.7, &t), DeviationLevel::Warn);
        assert_eq!(classify_deviation(0.99, &t), DeviationLevel::Warn);
        assert_eq!(classify_deviation(1.0, &t), DeviationLevel::Danger);
    }

    #[test]
    fn test_deterministic_single_value_window_is_zero() {
        let d = deterministic_deviation(&[0.0, 0.0, 9.0], 2, &DeviationThresholds::default());
        assert_eq!(d.std_dev_mm, 0.0);
        assert_eq!(d.level, DeviationLevel::None);
    }

    #[test]
    fn test_deterministic_two_value_window_at_end() {
        // [0, 2] -> mean 1, variance 1, sd 1.0
        let d = deterministic_deviation(&[5.0, 0.0, 2.0], 1, &DeviationThresholds::default());
        assert!((d.std_dev_mm - 1.0).abs() < 1e-9);
        assert_eq!(d.level, DeviationLevel::Danger);
    }

    #[test]
    fn test_ensemble_spread_of_window_sums() {
        // Sums over [0,3): 0.0 and 1.6 -> sd 0.8 -> warn.
        let members = vec![
            member("rain_member01", &[0.0, 0.0, 0.0, 9.0]),
            member("rain_member02", &[0.5, 0.5, 0.6, 0.0]),
        ];
        let d = ensemble_deviation(&members, 0, &DeviationThresholds::default()).expect("two members");
        assert!((d.std_dev_mm - 0.8).abs() < 1e-9, "got {}", d.std_dev_mm);
        assert_eq!(d.level, DeviationLevel::Warn);
    }

    #[test]
    fn test_ensemble_requires_two_members() {
        let members = vec![member("rain_member01", &[3.0, 3.0, 3.0])];
        assert!(ensemble_deviation(&members, 0, &DeviationThresholds::default()).is_none());
        assert!(ensemble_deviation(&[], 0, &DeviationThresholds::default()).is_none());
    }

    #[test]
    fn test_ensemble_members_of_different_lengths() {
        // Second member ends early; its sum is clipped, not an error.
        let members = vec![
            member("a", &[1.0, 1.0, 1.0]),
            member("b", &[1.0]),
        ];
        let d = ensemble_deviation(&members, 0, &DeviationThresholds::default()).expect("two members");
        // sums 3.0 and 1.0 -> sd 1.0
        assert!((d.std_dev_mm - 1.0).abs() < 1e-9);
    }
}
