//! Banded dynamic time warping.

/// Number of boundary cells seeded at zero cost for a sequence of `len`
/// elements: `ceil(tolerance * len)`, with `tolerance` clamped to `[0, 1]`.
#[inline]
pub fn band_width(tolerance: f64, len: usize) -> usize {
    let tolerance = if tolerance.is_nan() {
        0.0
    } else {
        tolerance.clamp(0.0, 1.0)
    };
    (tolerance * len as f64).ceil() as usize
}

/// Dynamic time warping distance between two sequences.
///
/// Computes the minimal-cost elastic alignment of `s` against `t`:
///
/// ```text
/// cost(i, j) = element_distance(s[i-1], t[j-1])
///            + min(cost(i-1, j), cost(i, j-1), cost(i-1, j-1))
/// ```
///
/// and returns `cost(n, m)`. The first `band_width(tolerance, n)` cells of
/// column 0 and the first `band_width(tolerance, m)` cells of row 0 are seeded
/// at zero instead of `f64::MAX`, so an alignment may skip a bounded number of
/// leading elements of either sequence for free. With `tolerance == 0` this
/// is plain DTW.
///
/// Runs in `O(n·m)` time using two rows of the cost matrix. There is no early
/// termination; pre-filter candidates when that matters.
///
/// # Example
///
/// ```rust
/// use phonmatch::distance::sequence_distance;
///
/// let s = [0.0, 0.5, 1.0];
/// let t = [0.0, 0.5, 0.5, 1.0];
/// let d = sequence_distance(&s, &t, |a: &f64, b: &f64| (a - b).abs(), 0.0);
/// assert_eq!(d, 0.0);
/// ```
pub fn sequence_distance<T, F>(s: &[T], t: &[T], mut element_distance: F, tolerance: f64) -> f64
where
    F: FnMut(&T, &T) -> f64,
{
    let n = s.len();
    let m = t.len();
    let band_s = band_width(tolerance, n);
    let band_t = band_width(tolerance, m);

    let mut prev_row: Vec<f64> = (0..=m)
        .map(|j| if j <= band_t { 0.0 } else { f64::MAX })
        .collect();
    let mut curr_row = vec![f64::MAX; m + 1];

    for i in 1..=n {
        curr_row[0] = if i <= band_s { 0.0 } else { f64::MAX };

        for j in 1..=m {
            let cost = element_distance(&s[i - 1], &t[j - 1]);
            let best = prev_row[j].min(curr_row[j - 1]).min(prev_row[j - 1]);
            curr_row[j] = (cost + best).min(f64::MAX);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    #[test]
    fn test_band_width() {
        assert_eq!(band_width(0.0, 10), 0);
        assert_eq!(band_width(0.1, 10), 1);
        assert_eq!(band_width(0.15, 10), 2);
        assert_eq!(band_width(5.0, 4), 4);
        assert_eq!(band_width(-1.0, 4), 0);
        assert_eq!(band_width(f64::NAN, 4), 0);
    }

    #[test]
    fn test_identical_sequences() {
        let s = [0.0, 0.5, 1.0, 0.5, 0.0];
        assert_eq!(sequence_distance(&s, &s, abs, 0.0), 0.0);
        assert_eq!(sequence_distance(&s, &s, abs, 0.5), 0.0);
    }

    #[test]
    fn test_warping_is_cheaper_than_shape_change() {
        let seq1 = [0.0, 0.5, 1.0, 0.5, 0.0];
        let seq2 = [0.0, 0.5, 0.75, 0.5, 0.0];
        let seq3 = [0.0, 0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25, 0.0];
        let seq4 = [-0.5, -1.0, -1.5, -1.0, -0.5];

        let d1 = sequence_distance(&seq1, &seq2, abs, 0.0);
        let d2 = sequence_distance(&seq1, &seq3, abs, 0.0);
        let d3 = sequence_distance(&seq1, &seq4, abs, 0.0);

        assert!(d1 < d2, "{} < {}", d1, d2);
        assert!(d2 < 1.5, "{} < 1.5", d2);
        assert!(d3 > d2);
        assert!(d3 > 5.0);
    }

    #[test]
    fn test_tolerance_allows_leading_skip() {
        let s = [9.0, 1.0, 2.0, 3.0];
        let t = [1.0, 2.0, 3.0];

        let strict = sequence_distance(&s, &t, abs, 0.0);
        assert_eq!(strict, 8.0);

        // band on s is ceil(0.25 * 4) = 1, enough to skip the leading 9
        let tolerant = sequence_distance(&s, &t, abs, 0.25);
        assert_eq!(tolerant, 0.0);
    }

    #[test]
    fn test_empty_sequences() {
        let empty: [f64; 0] = [];
        assert_eq!(sequence_distance(&empty, &empty, abs, 0.0), 0.0);
        assert_eq!(sequence_distance(&empty, &[1.0], abs, 0.0), f64::MAX);
        assert_eq!(sequence_distance(&[1.0], &empty, abs, 0.0), f64::MAX);
        // the whole of a one-element sequence fits in the band
        assert_eq!(sequence_distance(&empty, &[1.0], abs, 1.0), 0.0);
    }

    #[test]
    fn test_saturates_at_max() {
        let s = [0.0, 0.0, 0.0];
        let t = [1.0, 1.0];
        let d = sequence_distance(&s, &t, |_: &f64, _: &f64| f64::MAX, 0.0);
        assert!(d.is_finite());
        assert_eq!(d, f64::MAX);
    }

    #[test]
    fn test_symmetric() {
        let s = [0.0, 1.0, 3.0, 2.0];
        let t = [1.0, 1.0, 2.5];
        for tol in [0.0, 0.3, 1.0] {
            assert_eq!(
                sequence_distance(&s, &t, abs, tol),
                sequence_distance(&t, &s, abs, tol)
            );
        }
    }
}
