//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Truncate a f64 toward negative infinity and clamp it to the i64 range,
/// returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Truncate a f64 and clamp it to the u32 range, returning 0 for non-finite
/// or negative values.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).floor();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert u32 to f64 losslessly through the shared cast path.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    cast::<u32, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_truncates_toward_zero_for_positives() {
        assert_eq!(floor_f64_to_i64(7.9), 7);
        assert_eq!(floor_f64_to_i64(0.999), 0);
        assert_eq!(floor_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn u32_floor_rejects_negatives() {
        assert_eq!(floor_f64_to_u32(-3.0), 0);
        assert_eq!(floor_f64_to_u32(3.7), 3);
    }
}
