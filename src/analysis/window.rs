//! Forward-looking windows over an hourly column.
//!
//! All windows start at the current index and extend forward, clipped at the
//! end of the series. Non-finite values are read as 0.0.

use super::finite_or_zero;

/// Values at `[index, index + len)`, clipped to the series length.
pub fn forward_window(values: &[f64], index: usize, len: usize) -> Vec<f64> {
    if index >= values.len() {
        return Vec::new();
    }
    let end = index.saturating_add(len).min(values.len());
    values[index..end].iter().copied().map(finite_or_zero).collect()
}

/// Sum of `[index, index + hours)`, clipped to the series length.
pub fn accumulate(values: &[f64], index: usize, hours: usize) -> f64 {
    forward_window(values, index, hours).iter().sum()
}

/// Trailing 3-hour accumulation (current hour and the next two).
pub fn acc3(values: &[f64], index: usize) -> f64 {
    accumulate(values, index, 3)
}

/// Trailing 6-hour accumulation (current hour and the next five).
pub fn acc6(values: &[f64], index: usize) -> f64 {
    accumulate(values, index, 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_clipped_at_series_end() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(forward_window(&values, 0, 3), vec![1.0, 2.0, 3.0]);
        assert_eq!(forward_window(&values, 2, 3), vec![3.0, 4.0]);
        assert_eq!(forward_window(&values, 3, 3), vec![4.0]);
        assert!(forward_window(&values, 4, 3).is_empty());
    }

    #[test]
    fn test_accumulations() {
        let values = [0.5, 1.0, 0.0, 2.0, 0.0, 0.5, 10.0];
        assert_eq!(acc3(&values, 0), 1.5);
        assert_eq!(acc6(&values, 0), 4.0);
        assert_eq!(acc3(&values, 5), 10.5);
        assert_eq!(acc6(&values, 6), 10.0);
    }

    #[test]
    fn test_non_finite_values_count_as_zero() {
        let values = [1.0, f64::NAN, 2.0];
        assert_eq!(acc3(&values, 0), 3.0);
    }
}
