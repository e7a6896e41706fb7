//! Witness type for confidence values bounded to [0.0, 1.0].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence value guaranteed to be in the range [0.0, 1.0].
///
/// Rule priors, phase outputs, and consolidated scores all travel
/// through this type, so range checks happen at construction rather
/// than at every use site.
///
/// # Construction
///
/// - [`Confidence::new`]: Returns `None` if out of range
/// - [`Confidence::saturating`]: Clamps to [0, 1]
///
/// `Confidence` is `#[repr(transparent)]` over `f64`; there is no
/// runtime overhead.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Confidence(f64);

/// Ceiling applied when cross-phase agreement boosts a score.
pub const AGREEMENT_CEILING: f64 = 0.98;

/// Boost added per agreeing phase beyond the first.
pub const AGREEMENT_BOOST: f64 = 0.05;

impl Confidence {
    /// The minimum valid confidence.
    pub const MIN: Self = Self(0.0);

    /// The maximum valid confidence.
    pub const MAX: Self = Self(1.0);

    /// Create a confidence, returning `None` if out of range.
    #[must_use]
    #[inline]
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&value) && !value.is_nan() {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a confidence, clamping to [0.0, 1.0].
    #[must_use]
    #[inline]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the inner value (guaranteed to be in [0.0, 1.0]).
    #[must_use]
    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Check if this passes a threshold.
    #[must_use]
    #[inline]
    pub fn passes(self, threshold: f64) -> bool {
        self.0 >= threshold
    }

    /// Apply the cross-phase agreement boost for `sources` agreeing
    /// phases, capped at [`AGREEMENT_CEILING`].
    #[must_use]
    #[inline]
    pub fn boosted(self, sources: usize) -> Self {
        let extra = AGREEMENT_BOOST * sources.saturating_sub(1) as f64;
        Self((self.0 + extra).min(AGREEMENT_CEILING))
    }
}

impl fmt::Debug for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Confidence({:.4})", self.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Confidence> for f64 {
    #[inline]
    fn from(conf: Confidence) -> Self {
        conf.0
    }
}
