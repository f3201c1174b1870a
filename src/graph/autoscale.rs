//! src/graph/autoscale.rs
//!
//! Y range from the visible samples with a one-sample spike filter.
//!
//! The lowest value is skipped when it occurs exactly once, likewise the
//! highest. Ties at either boundary are never trimmed. This only removes an
//! isolated spike; it is not a statistical outlier test.

use super::data::SeriesStore;

/// Compute the Y range for the samples with x in `[min, max]`.
///
/// Returns `None` when nothing is visible, in which case the caller keeps
/// its current Y range.
pub fn autoscale_y(store: &SeriesStore, min: f64, max: f64) -> Option<(f64, f64)> {
    let values: Vec<f64> = store.visible(min, max).map(|s| s.value).collect();
    trimmed_bounds(values)
}

/// Sorted min/max with the single-spike rule applied.
pub fn trimmed_bounds(mut values: Vec<f64>) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mut start = 0;
    let mut end = values.len() - 1;
    if end > start {
        if values[0] != values[1] {
            start += 1;
        }
        if values[end] != values[end - 1] {
            end -= 1;
        }
    }
    if start > end {
        // two distinct values: trimming both would invert the range
        return Some((values[0], values[values.len() - 1]));
    }
    Some((values[start], values[end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_high_spike_is_trimmed() {
        assert_eq!(trimmed_bounds(vec![5.0, 5.0, 5.0, 9.0]), Some((5.0, 5.0)));
    }

    #[test]
    fn repeated_boundaries_are_kept() {
        assert_eq!(trimmed_bounds(vec![1.0, 5.0, 5.0, 9.0, 9.0]), Some((5.0, 9.0)));
        assert_eq!(trimmed_bounds(vec![2.0, 2.0, 7.0, 7.0]), Some((2.0, 7.0)));
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(
            trimmed_bounds(vec![9.0, 5.0, -40.0, 5.0, 6.0]),
            Some((5.0, 6.0))
        );
    }

    #[test]
    fn tiny_inputs() {
        assert_eq!(trimmed_bounds(vec![]), None);
        assert_eq!(trimmed_bounds(vec![3.0]), Some((3.0, 3.0)));
        assert_eq!(trimmed_bounds(vec![4.0, 1.0]), Some((1.0, 4.0)));
        assert_eq!(trimmed_bounds(vec![1.0, 2.0, 3.0]), Some((2.0, 2.0)));
    }

    #[test]
    fn only_visible_samples_count() {
        let mut s = SeriesStore::new();
        s.replace([100.0, 1.0, 1.0, 2.0, 2.0, -50.0]);
        assert_eq!(autoscale_y(&s, 1.0, 4.0), Some((1.0, 2.0)));
        assert_eq!(autoscale_y(&s, 10.0, 20.0), None);
    }
}
