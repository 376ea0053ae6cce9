//! Aspect-ratio correction and home framing.
//!
//! Two flavours of the same comparison between a plot's axes aspect and a
//! pixel aspect: growing one axis for an export of a fixed pixel size, and
//! adding margins so the whole plot shows on screen undistorted.

use tracing::debug;

use crate::complex::Complex;
use crate::view::View;
use crate::viewport::{NormPoint, PanZoom, ViewportState};

/// Grow one axis of `view` so it matches a `width`×`height` output, keeping
/// the centre where it was.
///
/// Plots that are too narrow for the output grow along the real axis, plots
/// that are too tall grow along the imaginary axis. A zero-sized output
/// leaves the view as it is.
pub fn fix_aspect_ratio(view: &View, width: u32, height: u32) -> View {
    if width == 0 || height == 0 {
        return *view;
    }
    let axes_aspect = view.aspect_ratio();
    let pixels_aspect = width as f64 / height as f64;
    let ratio = pixels_aspect / axes_aspect;
    if !ratio.is_finite() {
        return *view;
    }

    let centre = view.centre();
    let axes = if axes_aspect < pixels_aspect {
        Complex::new(view.axes.re * ratio, view.axes.im)
    } else if axes_aspect > pixels_aspect {
        Complex::new(view.axes.re, view.axes.im / ratio)
    } else {
        return *view;
    };

    let fixed = View {
        origin: centre - axes * 0.5,
        axes,
    };
    debug!(from = %view, to = %fixed, "Fixed aspect ratio");
    fixed
}

/// Pixel margins around the plot when it is shown in full.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Width left for the plot inside a viewport `width` pixels wide.
    pub fn content_width(&self, width: u32) -> f64 {
        width as f64 - self.left - self.right
    }

    /// Height left for the plot inside a viewport `height` pixels tall.
    pub fn content_height(&self, height: u32) -> f64 {
        height as f64 - self.top - self.bottom
    }
}

/// Margins that fit the whole plot in the viewport without distortion.
///
/// Returns `None` while the plot's aspect is unusable (metadata not fetched,
/// zero axes) or the viewport has no area; callers defer rather than fail.
pub fn compute_home_margins(meta: &View, width: u32, height: u32) -> Option<Margins> {
    let plot_aspect = meta.aspect_ratio();
    let screen_aspect = width as f64 / height as f64;
    if !plot_aspect.is_finite() || plot_aspect <= 0.0 {
        return None;
    }
    if !screen_aspect.is_finite() || screen_aspect <= 0.0 {
        return None;
    }

    let margins = if screen_aspect > plot_aspect {
        let m = (screen_aspect - plot_aspect) / 2.0 * height as f64;
        Margins {
            left: m,
            right: m,
            ..Margins::ZERO
        }
    } else if screen_aspect < plot_aspect {
        let m = (1.0 / screen_aspect - 1.0 / plot_aspect) / 2.0 * width as f64;
        Margins {
            top: m,
            bottom: m,
            ..Margins::ZERO
        }
    } else {
        Margins::ZERO
    };
    Some(margins)
}

/// The pan/zoom that puts the plot inside `margins`.
pub fn home_framing(margins: &Margins, width: u32) -> PanZoom {
    PanZoom {
        zoom: margins.content_width(width) / width as f64,
        centre: NormPoint::CENTRE,
    }
}

/// Put `viewport` at home for the plot `meta`: square complex pixels, whole
/// plot visible. No-op returning `false` when the metadata is unusable.
pub fn go_home(viewport: &mut ViewportState, meta: &View) -> bool {
    let Some(margins) = compute_home_margins(meta, viewport.width, viewport.height) else {
        return false;
    };
    viewport.image_aspect = meta.aspect_ratio();
    let home = home_framing(&margins, viewport.width);
    viewport.zoom = home.zoom;
    viewport.centre = home.centre;
    true
}
