//! Content-size conversions
//!
//! Hosts report content volume in whatever numeric type they have at hand:
//! element counts as `usize`, scroll heights as `f64`, script results as
//! `i64`. Everything is funnelled into a `u64` through [`IntoSize`] so the
//! detector only ever compares non-negative integers.

use num_traits::ToPrimitive;

/// Conversion of a raw measurement into a clamped content size
///
/// Negative and non-finite values clamp to `0`. Finite values beyond the
/// `u64` range saturate at `u64::MAX`. Fractional values truncate.
pub trait IntoSize: Copy {
    fn into_size(self) -> u64;
}

impl<T: ToPrimitive + Copy> IntoSize for T {
    fn into_size(self) -> u64 {
        if let Some(size) = self.to_u64() {
            return size;
        }
        match self.to_f64() {
            Some(value) if value.is_finite() && value > 0.0 => u64::MAX,
            _ => 0,
        }
    }
}

/// Clamp any numeric measurement to a content size
#[inline]
pub fn clamp_size<S: IntoSize>(raw: S) -> u64 {
    raw.into_size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integer_sizes() {
        assert_eq!(clamp_size(0u32), 0);
        assert_eq!(clamp_size(42usize), 42);
        assert_eq!(clamp_size(-7i64), 0);
        assert_eq!(clamp_size(i32::MIN), 0);
        assert_eq!(clamp_size(u128::MAX), u64::MAX);
    }

    #[test]
    fn test_float_sizes() {
        assert_eq!(clamp_size(1234.9f64), 1234);
        assert_eq!(clamp_size(-0.5f64), 0);
        assert_eq!(clamp_size(-250.0f32), 0);
        assert_eq!(clamp_size(f64::NAN), 0);
        assert_eq!(clamp_size(f64::INFINITY), 0);
        assert_eq!(clamp_size(f64::NEG_INFINITY), 0);
        assert_eq!(clamp_size(1e30f64), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_non_negative_integers_pass_through(value in 0i64..i64::MAX) {
            prop_assert_eq!(clamp_size(value), value as u64);
        }

        #[test]
        fn prop_negative_values_clamp_to_zero(value in i64::MIN..0) {
            prop_assert_eq!(clamp_size(value), 0);
            prop_assert_eq!(clamp_size(value as f64), 0);
        }
    }
}
