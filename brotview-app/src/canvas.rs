//! Compositing cached pyramid tiles into a picture of the viewport.

use brotview_bridge::{EnginePort, Viewer};
use brotview_core::{NormPoint, ViewportState};

/// Shown where no tile covers the screen.
const BACKGROUND: [u8; 4] = [32, 32, 32, 255];

/// A viewport-sized RGBA image.
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Visible tiles that were not cached yet.
    pub missing: usize,
}

impl Canvas {
    fn blank(width: u32, height: u32) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&BACKGROUND);
        }
        Self {
            width,
            height,
            pixels,
            missing: 0,
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Screen pixel range `[first, last)` covered by normalized span `[lo, hi)`
/// along one axis, clipped to `[0, limit)`.
fn screen_span(lo_px: f64, hi_px: f64, limit: u32) -> (u32, u32) {
    let first = lo_px.max(0.0).floor() as u32;
    let last = hi_px.min(limit as f64).ceil().max(0.0) as u32;
    (first.min(limit), last.min(limit))
}

/// Paint every cached visible tile with nearest-neighbour sampling.
pub(crate) fn composite<E: EnginePort>(viewer: &Viewer<E>) -> Canvas {
    let vp: &ViewportState = viewer.viewport();
    let mut canvas = Canvas::blank(vp.width, vp.height);

    for address in viewer.visible_tiles() {
        let Some(tile) = viewer.tile(address) else {
            canvas.missing += 1;
            continue;
        };
        let dim = (1u64 << address.level) as f64;
        let left = address.dx as f64 * tile.width as f64;
        let top = address.dy as f64 * tile.height as f64;

        let (x0, y0) = vp.normalized_to_pixel(NormPoint::new(left / dim, top / dim));
        let (x1, y1) = vp.normalized_to_pixel(NormPoint::new(
            (left + tile.width as f64) / dim,
            (top + tile.height as f64) / dim,
        ));
        let (sx0, sx1) = screen_span(x0, x1, vp.width);
        let (sy0, sy1) = screen_span(y0, y1, vp.height);

        for sy in sy0..sy1 {
            let n = vp.pixel_to_normalized(0.0, sy as f64 + 0.5);
            let v = ((n.y * dim - top).floor() as i64).clamp(0, tile.height as i64 - 1) as usize;
            for sx in sx0..sx1 {
                let n = vp.pixel_to_normalized(sx as f64 + 0.5, 0.0);
                let u = ((n.x * dim - left).floor() as i64).clamp(0, tile.width as i64 - 1) as usize;
                let src = (v * tile.width as usize + u) * 4;
                let px = &tile.rgba[src..src + 4];
                if px[3] == 0 {
                    continue;
                }
                let dst = (sy as usize * vp.width as usize + sx as usize) * 4;
                canvas.pixels[dst..dst + 4].copy_from_slice(px);
            }
        }
    }
    canvas
}
