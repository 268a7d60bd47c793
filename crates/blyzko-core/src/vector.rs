//! Vector math: normalization, similarity, and storage quantization.

/// Decimal digits kept by [`quantize`]. Roughly halves the serialized
/// artifact at a per-component error of at most [`QUANT_MAX_ERROR`].
pub const QUANT_DECIMALS: u32 = 4;

/// Upper bound on `|stored - original|` after quantization.
pub const QUANT_MAX_ERROR: f32 = 5e-5;

const QUANT_SCALE: f64 = 10_000.0;

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in-place. Zero vectors remain zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of two equal-length vectors.
///
/// For unit-length inputs this is their cosine similarity; the ranking
/// pass relies on that to skip the norm division.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal dimensions");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Round a component to [`QUANT_DECIMALS`] decimal digits.
///
/// Rounding happens in f64 so the error bound holds; rounding the scaled
/// value in f32 can flip at half-way boundaries and exceed it.
#[allow(clippy::cast_possible_truncation)]
pub fn quantize_component(x: f32) -> f32 {
    ((f64::from(x) * QUANT_SCALE).round() / QUANT_SCALE) as f32
}

/// Quantize every component of a vector for storage.
///
/// Lossy by design: rank order of near-tied words is not guaranteed to
/// survive quantization. That is an accepted approximation, bounded by
/// [`QUANT_MAX_ERROR`] per component.
pub fn quantize(v: &[f32]) -> Vec<f32> {
    v.iter().copied().map(quantize_component).collect()
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn l2_norm_known() {
        assert!(approx_eq(l2_norm(&[3.0, 4.0]), 5.0));
    }

    #[test]
    fn l2_norm_empty() {
        assert!(approx_eq(l2_norm(&[]), 0.0));
    }

    #[test]
    fn l2_normalize_known_vector() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!(approx_eq(v[0], 0.6));
        assert!(approx_eq(v[1], 0.8));
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert!(v.iter().all(|x| *x == 0.0), "zero vector stays zero");
        assert!(!v.iter().any(|x| x.is_nan()), "no NaN");
    }

    #[test]
    fn dot_identical_unit() {
        let v = vec![0.6, 0.8];
        assert!(approx_eq(dot(&v, &v), 1.0));
    }

    #[test]
    fn dot_orthogonal() {
        assert!(approx_eq(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn dot_opposite() {
        assert!(approx_eq(dot(&[1.0, 0.0], &[-1.0, 0.0]), -1.0));
    }

    #[test]
    #[should_panic(expected = "equal dimensions")]
    fn dot_mismatched_lengths_panics() {
        let _ = dot(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    fn quantize_component_rounds() {
        assert!(approx_eq(quantize_component(0.123_44), 0.1234));
        assert!(approx_eq(quantize_component(0.123_46), 0.1235));
        assert!(approx_eq(quantize_component(-0.987_654), -0.9877));
    }

    #[test]
    fn quantize_component_exact_values_unchanged() {
        assert!(approx_eq(quantize_component(0.25), 0.25));
        assert!(approx_eq(quantize_component(0.0), 0.0));
        assert!(approx_eq(quantize_component(1.0), 1.0));
    }

    #[test]
    fn quantize_error_bounded() {
        for i in 0..10_000 {
            let x = (i as f32).sin();
            let q = quantize_component(x);
            assert!(
                (q - x).abs() <= QUANT_MAX_ERROR,
                "error for {x} exceeded bound: {q}"
            );
        }
    }

    #[test]
    fn quantize_vector_preserves_length() {
        let v: Vec<f32> = (0..384).map(|i| (i as f32 * 0.7).cos()).collect();
        assert_eq!(quantize(&v).len(), 384);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_produces_unit(v in proptest::collection::vec(-100.0f32..100.0, 1..64)) {
                let has_nonzero = v.iter().any(|x| *x != 0.0);
                let mut v = v;
                l2_normalize(&mut v);
                if has_nonzero {
                    prop_assert!((l2_norm(&v) - 1.0).abs() < 1e-4);
                }
            }

            #[test]
            fn quantize_within_bound(v in proptest::collection::vec(-1.0f32..1.0, 1..64)) {
                let q = quantize(&v);
                for (orig, stored) in v.iter().zip(q.iter()) {
                    prop_assert!((stored - orig).abs() <= QUANT_MAX_ERROR);
                }
            }

            #[test]
            fn quantize_idempotent(v in proptest::collection::vec(-1.0f32..1.0, 1..64)) {
                let once = quantize(&v);
                let twice = quantize(&once);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn dot_symmetry(
                a in proptest::collection::vec(-100.0f32..100.0, 4..16),
                b in proptest::collection::vec(-100.0f32..100.0, 4..16),
            ) {
                let len = a.len().min(b.len());
                let a = &a[..len];
                let b = &b[..len];
                prop_assert!((dot(a, b) - dot(b, a)).abs() < 1e-3);
            }
        }
    }
}
