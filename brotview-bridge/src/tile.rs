use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default tile edge length in pixels.
pub const TILE_SIZE: u32 = 128;

/// Shallowest pyramid level we request (2 tiles across at the default size).
pub const MIN_LEVEL: u32 = 8;

/// Deepest pyramid level. Tile indices at this depth still fit an `f64`
/// mantissa once converted to plot coordinates.
pub const MAX_LEVEL: u32 = 40;

/// Edge length of the virtual image in pixels, `2^MAX_LEVEL`.
pub const IMAGE_DIMENSION: u64 = 1 << MAX_LEVEL;

/// Where a tile sits in the pyramid.
///
/// At `level` the whole image is `2^level` pixels across; `dx` and `dy` are
/// the tile's column and row at that level, counted from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    pub level: u32,
    pub dx: u64,
    pub dy: u64,
}

impl TileAddress {
    pub fn new(level: u32, dx: u64, dy: u64) -> Self {
        Self { level, dx, dy }
    }
}

impl std::fmt::Display for TileAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}-{}", self.level, self.dx, self.dy)
    }
}

/// A single correlated tile request, exactly as the engine receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileJob {
    pub serial: u64,
    #[serde(flatten)]
    pub address: TileAddress,
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub algorithm: String,
    pub colourer: String,
}

impl TileJob {
    /// Length in bytes of a complete RGBA result for this job.
    pub fn expected_blob_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Finished RGBA pixels for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl TileImage {
    /// Number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Why a tile could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileFailure {
    /// The start request never reached the engine.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// The engine reported an error for this job.
    #[error("{0}")]
    Engine(String),

    #[error("tile data is {actual} bytes, expected {expected}")]
    BadBlob { expected: usize, actual: usize },
}

pub type TileOutcome = std::result::Result<TileImage, TileFailure>;

/// The display-side context waiting for a tile.
///
/// Whoever asks for a tile hands one of these over with the request; it is
/// finished exactly once when the result arrives. If the job goes stale
/// (parameter change, teardown) the placeholder is dropped unfinished.
pub trait TilePlaceholder {
    fn finish(self: Box<Self>, job: &TileJob, outcome: TileOutcome);
}

impl<F> TilePlaceholder for F
where
    F: FnOnce(&TileJob, TileOutcome),
{
    fn finish(self: Box<Self>, job: &TileJob, outcome: TileOutcome) {
        (*self)(job, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn job() -> TileJob {
        TileJob {
            serial: 7,
            address: TileAddress::new(10, 3, 4),
            width: 128,
            height: 128,
            max_iter: 256,
            algorithm: "original".into(),
            colourer: "log-rainbow".into(),
        }
    }

    #[test]
    fn address_display() {
        assert_eq!(TileAddress::new(10, 3, 4).to_string(), "10/3-4");
    }

    #[test]
    fn image_dimension_matches_max_level() {
        assert_eq!(IMAGE_DIMENSION, 1_099_511_627_776);
        assert_eq!(IMAGE_DIMENSION / TILE_SIZE as u64, 1 << 33);
    }

    #[test]
    fn job_wire_format_is_flat() {
        let json = serde_json::to_value(job()).unwrap();
        assert_eq!(json["serial"], 7);
        assert_eq!(json["level"], 10);
        assert_eq!(json["dx"], 3);
        assert_eq!(json["dy"], 4);
        assert_eq!(json["max_iter"], 256);
        assert_eq!(json["algorithm"], "original");
        assert_eq!(json["colourer"], "log-rainbow");
        assert!(json.get("address").is_none());
        assert_eq!(job().expected_blob_len(), 128 * 128 * 4);
    }

    #[test]
    fn closures_are_placeholders() {
        let got = Rc::new(RefCell::new(None));
        let sink = got.clone();
        let placeholder: Box<dyn TilePlaceholder> = Box::new(move |j: &TileJob, o: TileOutcome| {
            *sink.borrow_mut() = Some((j.serial, o.is_ok()));
        });
        placeholder.finish(&job(), Err(TileFailure::Engine("boom".into())));
        assert_eq!(*got.borrow(), Some((7, false)));
    }
}
