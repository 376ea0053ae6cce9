use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A point in normalized viewport space.
///
/// The whole tile pyramid image spans `x ∈ [0, 1]` and `y ∈ [0, 1]`, with
/// `y` increasing downward like screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub const CENTRE: Self = Self { x: 0.5, y: 0.5 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An inclusive rectangle of screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelRect {
    /// The whole container: top-left `(0, 0)`, bottom-right `(w-1, h-1)`.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: width.saturating_sub(1) as f64,
            bottom: height.saturating_sub(1) as f64,
        }
    }
}

/// The part of a viewport that navigation sets: zoom plus normalized centre.
///
/// Stashing and restoring one of these must reproduce the position exactly,
/// so it is compared bitwise by `PartialEq`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanZoom {
    pub zoom: f64,
    pub centre: NormPoint,
}

impl PanZoom {
    pub const HOME_FILL: Self = Self {
        zoom: 1.0,
        centre: NormPoint::CENTRE,
    };
}

/// The on-screen window into the tile pyramid.
///
/// `zoom` is relative to the container width: at zoom 1 the image's unit
/// width spans `width` pixels. `image_aspect` is the displayed width/height
/// ratio of the unit square, so one normalized unit covers
/// `zoom * width / image_aspect` pixels vertically. When it equals the plot's
/// axes aspect, every screen pixel is square on the complex plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Container width in pixels.
    pub width: u32,
    /// Container height in pixels.
    pub height: u32,
    pub zoom: f64,
    pub centre: NormPoint,
    pub image_aspect: f64,
}

impl ViewportState {
    /// A viewport whose unit square exactly fills the container.
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        Ok(Self {
            width,
            height,
            zoom: 1.0,
            centre: NormPoint::CENTRE,
            image_aspect: width as f64 / height as f64,
        })
    }

    /// The aspect ratio of the container (width / height).
    pub fn screen_aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    #[inline]
    fn pixels_per_unit_x(&self) -> f64 {
        self.zoom * self.width as f64
    }

    #[inline]
    fn pixels_per_unit_y(&self) -> f64 {
        self.zoom * self.width as f64 / self.image_aspect
    }

    /// Map a (possibly fractional) pixel coordinate into normalized space.
    #[inline]
    pub fn pixel_to_normalized(&self, px: f64, py: f64) -> NormPoint {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        NormPoint {
            x: self.centre.x + (px - half_w) / self.pixels_per_unit_x(),
            y: self.centre.y + (py - half_h) / self.pixels_per_unit_y(),
        }
    }

    /// Inverse of [`pixel_to_normalized`](Self::pixel_to_normalized).
    #[inline]
    pub fn normalized_to_pixel(&self, point: NormPoint) -> (f64, f64) {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        (
            half_w + (point.x - self.centre.x) * self.pixels_per_unit_x(),
            half_h + (point.y - self.centre.y) * self.pixels_per_unit_y(),
        )
    }

    /// Normalized top-left and bottom-right of the whole container, edges
    /// included.
    pub fn visible_bounds(&self) -> (NormPoint, NormPoint) {
        (
            self.pixel_to_normalized(0.0, 0.0),
            self.pixel_to_normalized(self.width as f64, self.height as f64),
        )
    }

    /// On-screen width of the whole pyramid image, in pixels.
    pub fn image_width_px(&self) -> f64 {
        self.pixels_per_unit_x()
    }

    pub fn pan_zoom(&self) -> PanZoom {
        PanZoom {
            zoom: self.zoom,
            centre: self.centre,
        }
    }

    /// Jump to an exact pan/zoom.
    pub fn apply(&mut self, target: PanZoom) -> crate::Result<()> {
        if !(target.zoom > 0.0 && target.zoom.is_finite()) {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom must be positive and finite, got {}", target.zoom),
            });
        }
        if !target.centre.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: "centre must be finite".into(),
            });
        }
        self.zoom = target.zoom;
        self.centre = target.centre;
        Ok(())
    }

    /// Zoom by `factor` keeping the normalized point under pixel
    /// `(px, py)` fixed on screen.
    pub fn zoom_about(&mut self, px: f64, py: f64, factor: f64) {
        if !(factor > 0.0 && factor.is_finite()) {
            return;
        }
        let anchor = self.pixel_to_normalized(px, py);
        self.zoom *= factor;
        let moved = self.pixel_to_normalized(px, py);
        self.centre.x += anchor.x - moved.x;
        self.centre.y += anchor.y - moved.y;
    }

    /// Move the view by a pixel delta (positive `dx` moves right).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.centre.x += dx / self.pixels_per_unit_x();
        self.centre.y += dy / self.pixels_per_unit_y();
    }

    /// Change the container size, keeping the centre and the image's
    /// on-screen size.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        self.zoom *= self.width as f64 / width as f64;
        self.width = width;
        self.height = height;
        Ok(())
    }
}
