//! Shared numeric helpers: fractional quantization and note easing.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// Round `value` to the nearest `1/denominator` step.
pub fn round_to(value: f64, denominator: f64) -> f64 {
    (value * denominator).round() / denominator
}

/// Floor `value` down to the nearest `1/denominator` step.
pub fn floor_to(value: f64, denominator: f64) -> f64 {
    (value * denominator).floor() / denominator
}

/// Linear blend between `from` and `to` at progress `p`.
pub fn lerp(from: f64, to: f64, p: f64) -> f64 {
    from + (to - from) * p
}

/// Center of two edge positions.
pub fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

/// Absolute distance between two positions.
pub fn distance(a: f64, b: f64) -> f64 {
    (b - a).abs()
}

/// Easing curve between two placed notes of a slide or guide chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Ease {
    #[default]
    Linear,
    In,
    Out,
}

impl Ease {
    /// Interpolate between `from` and `to` with this curve at progress `p`.
    ///
    /// `In` squares the progress before blending, `Out` mirrors it with
    /// `1 - (1 - p)^2`.
    pub fn interpolate(self, from: f64, to: f64, p: f64) -> f64 {
        match self {
            Ease::Linear => lerp(from, to, p),
            Ease::In => lerp(from, to, p * p),
            Ease::Out => lerp(from, to, 1.0 - (1.0 - p) * (1.0 - p)),
        }
    }
}

impl std::fmt::Display for Ease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_millis() {
        assert_eq!(round_to(1.23456, 1000.0), 1.235);
        assert_eq!(round_to(-0.0004, 1000.0), -0.0);
    }

    #[test]
    fn test_floor_to_eighths() {
        assert_eq!(floor_to(2.99, 8.0), 2.875);
        assert_eq!(floor_to(3.0, 8.0), 3.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    }

    #[test]
    fn test_ease_in_biases_toward_start() {
        let v = Ease::In.interpolate(0.0, 10.0, 0.5);
        assert_eq!(v, 2.5); // p^2 = 0.25
    }

    #[test]
    fn test_ease_out_biases_toward_end() {
        let v = Ease::Out.interpolate(0.0, 10.0, 0.5);
        assert_eq!(v, 7.5); // 1 - (1 - p)^2 = 0.75
    }

    #[test]
    fn test_ease_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Ease::Linear).unwrap(), "\"linear\"");
        assert_eq!(serde_json::to_string(&Ease::In).unwrap(), "\"in\"");
        assert_eq!(serde_json::to_string(&Ease::Out).unwrap(), "\"out\"");
    }

    #[test]
    fn test_midpoint_and_distance() {
        assert_eq!(midpoint(-1.0, 3.0), 1.0);
        assert_eq!(distance(3.0, -1.0), 4.0);
    }
}
