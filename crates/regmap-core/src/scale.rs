// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Linear engineering-unit scaling.
//!
//! This module maps between the raw integer domain a device reports and the
//! engineering-unit domain callers work in, in both directions, with optional
//! clamping after the forward transform.
//!
//! # Examples
//!
//! ```
//! use regmap_core::scale::{ClampPolicy, LinearScale};
//!
//! // 0..1000 raw counts map to 0..100 percent.
//! let scale = LinearScale::new(0.0, 1000.0, 0.0, 100.0, true);
//! let policy = ClampPolicy::respect_tag_flag();
//!
//! assert_eq!(scale.to_engineering(500.0, &policy), 50.0);
//! assert_eq!(scale.to_engineering(1500.0, &policy), 100.0); // clamped
//! assert_eq!(scale.to_raw(50.0), 500.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// LinearScale
// =============================================================================

/// A linear transform between the raw and engineering domains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    /// Low end of the raw domain.
    pub raw_low: f64,

    /// High end of the raw domain.
    pub raw_high: f64,

    /// Engineering value at `raw_low`.
    pub eng_low: f64,

    /// Engineering value at `raw_high`.
    pub eng_high: f64,

    /// Per-tag clamp request, honored under [`ClampPolicy::respect_tag_flag`].
    #[serde(default)]
    pub clamp: bool,
}

impl LinearScale {
    /// Creates a new linear scale.
    pub const fn new(raw_low: f64, raw_high: f64, eng_low: f64, eng_high: f64, clamp: bool) -> Self {
        Self {
            raw_low,
            raw_high,
            eng_low,
            eng_high,
            clamp,
        }
    }

    /// Validates the scale bounds.
    ///
    /// Non-finite bounds are a configuration error. A degenerate raw span
    /// (`raw_high == raw_low`) is deliberately not an error: the forward
    /// transform yields `eng_low` for it.
    pub fn validate(&self, tag: &str) -> Result<(), ConfigError> {
        for (name, v) in [
            ("raw_low", self.raw_low),
            ("raw_high", self.raw_high),
            ("eng_low", self.eng_low),
            ("eng_high", self.eng_high),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::invalid_scale(
                    tag,
                    format!("{} is not finite", name),
                ));
            }
        }
        Ok(())
    }

    /// Transforms a raw value into the engineering domain.
    ///
    /// When the raw span is degenerate the result is `eng_low`. Clamping is
    /// applied afterwards when the policy resolves to clamp; the bounds are
    /// order-independent of which end is declared low or high.
    pub fn to_engineering(&self, raw: f64, policy: &ClampPolicy) -> f64 {
        if self.raw_high == self.raw_low {
            return self.eng_low;
        }
        let eng = self.eng_low
            + (raw - self.raw_low) / (self.raw_high - self.raw_low) * (self.eng_high - self.eng_low);
        if policy.resolves(self.clamp) {
            eng.clamp(
                self.eng_low.min(self.eng_high),
                self.eng_low.max(self.eng_high),
            )
        } else {
            eng
        }
    }

    /// Transforms an engineering value back into the raw domain.
    ///
    /// The inverse applies no clamping: out-of-range raw results are clamped
    /// to the register width by the codec's encode step. A degenerate raw or
    /// engineering span passes the value through unchanged.
    pub fn to_raw(&self, eng: f64) -> f64 {
        if self.raw_high == self.raw_low || self.eng_high == self.eng_low {
            return eng;
        }
        self.raw_low
            + (eng - self.eng_low) * (self.raw_high - self.raw_low) / (self.eng_high - self.eng_low)
    }
}

// =============================================================================
// ClampPolicy
// =============================================================================

/// Caller-level clamping policy.
///
/// Precedence: when `respect_tag_flag` is active the per-tag flag alone
/// decides; otherwise the global `default_clamp` alone governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClampPolicy {
    /// Honor each tag's `clamp` flag.
    #[serde(default)]
    pub respect_tag_flag: bool,

    /// Clamp every scaled value regardless of per-tag flags.
    #[serde(default)]
    pub default_clamp: bool,
}

impl ClampPolicy {
    /// A policy that honors per-tag clamp flags.
    pub const fn respect_tag_flag() -> Self {
        Self {
            respect_tag_flag: true,
            default_clamp: false,
        }
    }

    /// A policy that clamps everything.
    pub const fn clamp_all() -> Self {
        Self {
            respect_tag_flag: false,
            default_clamp: true,
        }
    }

    /// Resolves whether a value under a tag with the given clamp flag should
    /// be clamped.
    #[inline]
    pub const fn resolves(&self, tag_flag: bool) -> bool {
        if self.respect_tag_flag {
            tag_flag
        } else {
            self.default_clamp
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CLAMP: ClampPolicy = ClampPolicy {
        respect_tag_flag: false,
        default_clamp: false,
    };

    #[test]
    fn test_forward_transform() {
        let scale = LinearScale::new(0.0, 1000.0, 0.0, 100.0, false);
        assert_eq!(scale.to_engineering(0.0, &NO_CLAMP), 0.0);
        assert_eq!(scale.to_engineering(500.0, &NO_CLAMP), 50.0);
        assert_eq!(scale.to_engineering(1000.0, &NO_CLAMP), 100.0);
        // Unclamped values extrapolate.
        assert_eq!(scale.to_engineering(1500.0, &NO_CLAMP), 150.0);
    }

    #[test]
    fn test_degenerate_span_yields_eng_low() {
        let scale = LinearScale::new(10.0, 10.0, -5.0, 5.0, false);
        assert_eq!(scale.to_engineering(123.0, &NO_CLAMP), -5.0);
    }

    #[test]
    fn test_clamp_respects_tag_flag() {
        let clamped = LinearScale::new(0.0, 1000.0, 0.0, 100.0, true);
        let unclamped = LinearScale::new(0.0, 1000.0, 0.0, 100.0, false);
        let policy = ClampPolicy::respect_tag_flag();

        assert_eq!(clamped.to_engineering(1500.0, &policy), 100.0);
        assert_eq!(clamped.to_engineering(500.0, &policy), 50.0);
        assert_eq!(unclamped.to_engineering(1500.0, &policy), 150.0);
    }

    #[test]
    fn test_global_default_clamp_wins_when_tag_flag_ignored() {
        let scale = LinearScale::new(0.0, 1000.0, 0.0, 100.0, false);
        let policy = ClampPolicy::clamp_all();
        assert_eq!(scale.to_engineering(2000.0, &policy), 100.0);
        assert_eq!(scale.to_engineering(-100.0, &policy), 0.0);
    }

    #[test]
    fn test_clamp_bounds_are_order_independent() {
        // Declared "low" above declared "high": an inverted span.
        let scale = LinearScale::new(0.0, 1000.0, 100.0, 0.0, true);
        let policy = ClampPolicy::respect_tag_flag();
        assert_eq!(scale.to_engineering(2000.0, &policy), 0.0);
        assert_eq!(scale.to_engineering(-1000.0, &policy), 100.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        let scale = LinearScale::new(100.0, 4000.0, -50.0, 250.0, false);
        for raw in [100.0, 1000.0, 2500.0, 4000.0] {
            let eng = scale.to_engineering(raw, &NO_CLAMP);
            assert!((scale.to_raw(eng) - raw).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inverse_never_clamps() {
        let scale = LinearScale::new(0.0, 1000.0, 0.0, 100.0, true);
        assert_eq!(scale.to_raw(200.0), 2000.0);
    }

    #[test]
    fn test_degenerate_inverse_passes_through() {
        let scale = LinearScale::new(5.0, 5.0, 0.0, 100.0, false);
        assert_eq!(scale.to_raw(42.0), 42.0);
    }

    #[test]
    fn test_validate() {
        let ok = LinearScale::new(0.0, 1000.0, 0.0, 100.0, false);
        assert!(ok.validate("t").is_ok());

        let bad = LinearScale::new(0.0, f64::NAN, 0.0, 100.0, false);
        assert!(bad.validate("t").is_err());

        // A degenerate raw span is valid; the forward transform yields eng_low.
        let degenerate = LinearScale::new(1.0, 1.0, 0.0, 100.0, false);
        assert!(degenerate.validate("t").is_ok());
    }
}
