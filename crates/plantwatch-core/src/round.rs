//! Presentation rounding helpers.
//!
//! Telemetry values are rounded before they enter a [`Reading`] so the
//! wire format carries stable two/three-decimal values. The rule engine
//! operates on the rounded values; the rounding is cosmetic relative to
//! every rule boundary (thresholds sit far from any rounding epsilon).
//!
//! [`Reading`]: plantwatch_types::Reading

/// Round a value to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a value to three decimal places.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_truncates_to_cents() {
        assert!((round2(1.234_567) - 1.23).abs() < 1e-12);
        assert!((round2(1.235) - 1.24).abs() < 1e-12);
        assert!((round2(-0.005) - -0.01).abs() < 1e-12);
    }

    #[test]
    fn round3_keeps_three_places() {
        assert!((round3(0.123_456) - 0.123).abs() < 1e-12);
        assert!((round3(0.999_9) - 1.0).abs() < 1e-12);
    }
}
