use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// A rectangular window onto the complex plane.
///
/// `origin` is the mathematician's bottom-left corner (smallest real and
/// imaginary parts); `axes` is the extent along each axis. The same type
/// describes a plot's overall bounds, which we call its _metadata_.
///
/// On the wire the extent is named `axes_length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub origin: Complex,
    #[serde(rename = "axes_length")]
    pub axes: Complex,
}

impl View {
    /// Create a view, rejecting non-finite components and non-positive axes.
    pub fn new(origin: Complex, axes: Complex) -> crate::Result<Self> {
        let view = Self { origin, axes };
        view.validate()?;
        Ok(view)
    }

    /// Create a view of the given extent around `centre`.
    pub fn from_centre(centre: Complex, axes: Complex) -> crate::Result<Self> {
        Self::new(centre - axes * 0.5, axes)
    }

    /// Check the invariants. Views that arrive over the wire are
    /// deserialized without going through [`View::new`], so callers
    /// validate them here.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.origin.is_finite() || !self.axes.is_finite() {
            return Err(CoreError::InvalidView {
                reason: format!("components must be finite, got {self}"),
            });
        }
        if self.axes.re <= 0.0 || self.axes.im <= 0.0 {
            return Err(CoreError::InvalidView {
                reason: format!("axes must be positive, got {}", self.axes),
            });
        }
        Ok(())
    }

    /// Top-right corner: `origin + axes`.
    #[inline]
    pub fn end_corner(&self) -> Complex {
        self.origin + self.axes
    }

    /// Midpoint: `origin + 0.5 * axes`.
    #[inline]
    pub fn centre(&self) -> Complex {
        self.origin + self.axes * 0.5
    }

    /// Ratio of real extent to imaginary extent.
    ///
    /// Non-finite when the imaginary axis is zero, which callers treat as
    /// "not usable yet".
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.axes.re / self.axes.im
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FV[or={},ax={}]", self.origin, self.axes)
    }
}
