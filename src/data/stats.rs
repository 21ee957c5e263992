//! Missing-aware descriptive statistics. Missing values are `NaN`; every
//! reduction returns `None` when nothing valid is left.

/// Mean of the non-`NaN` values.
pub fn mean_valid(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Maximum of the non-`NaN` values.
pub fn max_valid(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}

/// Minimum of the non-`NaN` values.
pub fn min_valid(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
}

/// `true` for every value that is present.
pub fn validity_mask(values: &[f64]) -> Vec<bool> {
    values.iter().map(|v| !v.is_nan()).collect()
}

/// Keep the elements of `items` whose mask entry is `true`.
pub fn apply_mask<T: Copy>(items: &[T], mask: &[bool]) -> Vec<T> {
    items
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(&item, _)| item)
        .collect()
}

/// Larger of two optional maxima.
pub fn max_of(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_ignores_missing() {
        assert_eq!(mean_valid(&[1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(mean_valid(&[f64::NAN, f64::NAN]), None);
        assert_eq!(mean_valid(&[]), None);
    }

    #[test]
    fn zero_is_not_missing() {
        assert_eq!(mean_valid(&[0.0, f64::NAN]), Some(0.0));
        assert_eq!(max_valid(&[0.0]), Some(0.0));
    }

    #[test]
    fn extrema() {
        let v = [2.0, f64::NAN, -1.0, 5.5];
        assert_eq!(max_valid(&v), Some(5.5));
        assert_eq!(min_valid(&v), Some(-1.0));
        assert_eq!(max_valid(&[f64::NAN]), None);
    }

    #[test]
    fn mask_applies_to_parallel_arrays() {
        let values = [1.0, f64::NAN, 3.0];
        let times = [10.0, 11.0, 12.0];
        let mask = validity_mask(&values);
        assert_eq!(mask, vec![true, false, true]);
        assert_eq!(apply_mask(&times, &mask), vec![10.0, 12.0]);
        assert_eq!(apply_mask(&values, &mask), vec![1.0, 3.0]);
    }

    #[test]
    fn max_of_options() {
        assert_eq!(max_of(Some(1.0), Some(2.0)), Some(2.0));
        assert_eq!(max_of(None, Some(2.0)), Some(2.0));
        assert_eq!(max_of(Some(1.0), None), Some(1.0));
        assert_eq!(max_of(None, None), None);
    }

    #[test]
    fn rounds_to_five_places() {
        assert_eq!(round_to(1.234_567_89, 5), 1.234_57);
        assert_eq!(round_to(2.0, 5), 2.0);
    }
}
