//! Conversions between screen pixels, normalized viewport space and the
//! complex plane.
//!
//! Screen `y` grows downward, the imaginary axis grows upward. The flip
//! happens exactly once in each direction: a plot's origin (bottom-left)
//! sits at normalized `(left, 1 - bottom)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::view::View;
use crate::viewport::{NormPoint, PanZoom, PixelRect, ViewportState};

/// Which location field of a [`Destination`] is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    #[default]
    Origin,
    Centre,
}

/// A user-entered navigation target, as read from the go-to-position form.
///
/// Any field may be blank (`None`) or unparseable (non-finite); both count
/// as missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default)]
    pub mode: EntryMode,
    #[serde(default)]
    pub origin_real: Option<f64>,
    #[serde(default)]
    pub origin_imag: Option<f64>,
    #[serde(default)]
    pub centre_real: Option<f64>,
    #[serde(default)]
    pub centre_imag: Option<f64>,
    #[serde(default)]
    pub axes_real: Option<f64>,
    #[serde(default)]
    pub axes_imag: Option<f64>,
    #[serde(default)]
    pub zoom: Option<f64>,
}

impl Destination {
    /// Populate every field from a view, so the form can be edited in
    /// either entry mode.
    pub fn from_view(view: &View, zoom: f64, mode: EntryMode) -> Self {
        let centre = view.centre();
        Self {
            mode,
            origin_real: Some(view.origin.re),
            origin_imag: Some(view.origin.im),
            centre_real: Some(centre.re),
            centre_imag: Some(centre.im),
            axes_real: Some(view.axes.re),
            axes_imag: Some(view.axes.im),
            zoom: Some(zoom),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn positive(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v > 0.0)
}

fn require_usable(meta: &View) -> crate::Result<()> {
    meta.validate().map_err(|_| CoreError::MetadataPending)
}

/// Convert the on-screen pixel rectangle into the complex-plane view it shows.
pub fn forward(rect: PixelRect, viewport: &ViewportState, meta: &View) -> crate::Result<View> {
    require_usable(meta)?;
    let top_left = viewport.pixel_to_normalized(rect.left, rect.top);
    let bottom_right = viewport.pixel_to_normalized(rect.right, rect.bottom);

    let origin_view = NormPoint::new(top_left.x, bottom_right.y);
    let axes_view = Complex::new(bottom_right.x - top_left.x, bottom_right.y - top_left.y);

    let origin = Complex::new(
        meta.origin.re + origin_view.x * meta.axes.re,
        meta.origin.im + (1.0 - origin_view.y) * meta.axes.im,
    );
    let axes = axes_view.component_mul(meta.axes);
    View::new(origin, axes)
}

/// Fill in whichever of origin/centre and real/imaginary axis the user left
/// out, producing the complex-plane view they asked for.
///
/// Axis precedence is real length, then imaginary length, then zoom factor.
/// `plot_axis_re` is the real extent of the whole plot (zoom 1);
/// `aspect_ratio` is the viewport's width/height, assuming square pixels.
pub fn resolve_destination(
    destination: &Destination,
    plot_axis_re: f64,
    aspect_ratio: f64,
) -> crate::Result<View> {
    let location = match destination.mode {
        EntryMode::Origin => {
            let p = Complex::new(
                destination.origin_real.unwrap_or(f64::NAN),
                destination.origin_imag.unwrap_or(f64::NAN),
            );
            if !p.is_finite() {
                return Err(CoreError::OriginRequired);
            }
            p
        }
        EntryMode::Centre => {
            let p = Complex::new(
                destination.centre_real.unwrap_or(f64::NAN),
                destination.centre_imag.unwrap_or(f64::NAN),
            );
            if !p.is_finite() {
                return Err(CoreError::CentreRequired);
            }
            p
        }
    };

    let axes = if let Some(re) = positive(destination.axes_real) {
        Complex::new(re, re / aspect_ratio)
    } else if let Some(im) = positive(destination.axes_imag) {
        Complex::new(im * aspect_ratio, im)
    } else if let Some(zoom) = positive(destination.zoom) {
        let re = plot_axis_re / zoom;
        Complex::new(re, re / aspect_ratio)
    } else {
        return Err(CoreError::AxisRequired);
    };

    let origin = match destination.mode {
        EntryMode::Origin => location,
        EntryMode::Centre => location - axes * 0.5,
    };
    View::new(origin, axes)
}

/// Work out the pan/zoom that shows `destination` in a `width`×`height`
/// viewport onto the plot described by `meta`.
///
/// This is the inverse of [`forward`]. Nothing is mutated; on error the
/// caller's viewport stays where it was.
pub fn inverse(
    destination: &Destination,
    meta: &View,
    width: u32,
    height: u32,
) -> crate::Result<PanZoom> {
    require_usable(meta)?;
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidViewport {
            reason: format!("dimensions must be > 0, got {width}×{height}"),
        });
    }
    let aspect_ratio = width as f64 / height as f64;
    let target = resolve_destination(destination, meta.axes.re, aspect_ratio)?;
    let zoom = meta.axes.re / target.axes.re;

    let axes_view = target.axes.component_div(meta.axes);
    let relative = (target.origin - meta.origin).component_div(meta.axes);
    let origin_view = NormPoint::new(relative.re, 1.0 - relative.im);

    let top_left = NormPoint::new(origin_view.x, origin_view.y - axes_view.im);
    let bottom_right = NormPoint::new(top_left.x + axes_view.re, top_left.y + axes_view.im);
    let centre = NormPoint::new(
        (top_left.x + bottom_right.x) / 2.0,
        (top_left.y + bottom_right.y) / 2.0,
    );

    debug!(%target, zoom, x = centre.x, y = centre.y, "Resolved destination");
    Ok(PanZoom { zoom, centre })
}
