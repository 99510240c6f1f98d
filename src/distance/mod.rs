//! Distance functions over phones and phone sequences.
//!
//! - [`euclidean_distance`] compares two feature vectors position by position.
//! - [`sequence_distance`] aligns two phone sequences elastically with banded
//!   dynamic time warping, using any element distance.

mod dtw;

pub use dtw::{band_width, sequence_distance};

/// Euclidean distance between two feature vectors.
///
/// When the lengths differ, each missing position is filled with a numeric
/// extreme (the minimum on the left side, the maximum on the right), so a
/// length mismatch inflates the distance instead of being ignored. The result
/// saturates at `f64::MAX` rather than becoming infinite.
///
/// # Example
///
/// ```rust
/// use phonmatch::distance::euclidean_distance;
///
/// assert_eq!(euclidean_distance(&[0.0, 3.0], &[4.0, 0.0]), 5.0);
/// assert_eq!(euclidean_distance(&[1.0], &[1.0, 0.0]), f64::MAX);
/// ```
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().max(b.len());
    let mut sum = 0.0;
    for i in 0..n {
        let x = a.get(i).copied().unwrap_or(f64::MIN);
        let y = b.get(i).copied().unwrap_or(f64::MAX);
        let d = x - y;
        sum += d * d;
    }

    let distance = sum.sqrt();
    if distance.is_finite() {
        distance
    } else {
        f64::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_identity() {
        assert_eq!(euclidean_distance(&[1.0, -1.0, 0.0], &[1.0, -1.0, 0.0]), 0.0);
        assert_eq!(euclidean_distance(&[], &[]), 0.0);
    }

    #[test]
    fn test_euclidean_symmetric() {
        let a = [1.0, 0.0, -1.0];
        let b = [0.0, 0.0, 1.0];
        assert_eq!(euclidean_distance(&a, &b), euclidean_distance(&b, &a));
    }

    #[test]
    fn test_euclidean_length_mismatch_is_maximal() {
        assert_eq!(euclidean_distance(&[], &[0.0]), f64::MAX);
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[0.0]), f64::MAX);
    }
}
