//! Output-only rounding helpers.
//!
//! Internal computation always keeps full `f64` precision. These helpers are
//! applied once, when wire documents are built, purely for compactness.

/// Decimal places used on the wire.
pub mod places {
    pub const PROBABILITY: u32 = 4;
    pub const RATE: u32 = 2;
    pub const VALUE: u32 = 1;
    pub const HISTORY_RATE: u32 = 4;
}

/// Round half away from zero to `dp` decimal places. Non-finite input is returned as-is.
#[inline]
pub fn round_dp(x: f64, dp: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let scale = 10f64.powi(dp as i32);
    let r = (x * scale).round() / scale;
    // Normalize -0.0 so it serializes as 0.0.
    if r == 0.0 { 0.0 } else { r }
}

#[inline]
pub fn round_opt(x: Option<f64>, dp: u32) -> Option<f64> {
    x.filter(|v| v.is_finite()).map(|v| round_dp(v, dp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_places() {
        assert_eq!(round_dp(0.123_456, places::PROBABILITY), 0.1235);
        assert_eq!(round_dp(1.0 / 3.0, places::RATE), 0.33);
        assert_eq!(round_dp(12.25, places::VALUE), 12.3);
        assert_eq!(round_dp(7.0, places::VALUE), 7.0);
    }

    #[test]
    fn negative_zero_is_normalized() {
        let r = round_dp(-0.000_01, 2);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
    }

    #[test]
    fn round_opt_drops_non_finite() {
        assert_eq!(round_opt(Some(f64::NAN), 1), None);
        assert_eq!(round_opt(None, 1), None);
        assert_eq!(round_opt(Some(2.04), 1), Some(2.0));
    }
}
