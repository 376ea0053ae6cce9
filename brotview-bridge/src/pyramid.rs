//! Which pyramid tiles the viewport needs, and which we already have.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use brotview_core::ViewportState;

use crate::source::{EngineParameterSet, TileCacheKey, TileSource};
use crate::tile::{TileAddress, TileImage, TileJob, TileOutcome, TilePlaceholder, MAX_LEVEL, MIN_LEVEL};

/// Smallest level whose resolution covers the image as it is shown now,
/// clamped to `[MIN_LEVEL, MAX_LEVEL]`.
pub fn level_for_zoom(viewport: &ViewportState) -> u32 {
    let shown = viewport
        .image_width_px()
        .max(viewport.image_width_px() / viewport.image_aspect);
    if !(shown.is_finite() && shown > 1.0) {
        return MIN_LEVEL;
    }
    let level = shown.log2().ceil();
    (level as u32).clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Number of tiles along one edge of the image at `level`.
pub fn tiles_across(level: u32, tile_size: u32) -> u64 {
    let size = tile_size.max(1) as u64;
    (1u64 << level).div_ceil(size)
}

/// Index range `[first, last]` of the tiles overlapping `[lo, hi]` in
/// normalized space, or `None` if the span misses the image.
fn tile_span(lo: f64, hi: f64, level: u32, tile_size: u32) -> Option<(u64, u64)> {
    if !(lo < 1.0 && hi > 0.0) {
        return None;
    }
    let count = tiles_across(level, tile_size);
    let span = tile_size as f64 / (1u64 << level) as f64;
    let first = (lo.max(0.0) / span).floor() as u64;
    let last = ((hi.min(1.0) / span).ceil() as u64).saturating_sub(1);
    Some((first.min(count - 1), last.min(count - 1)))
}

/// Addresses of every tile intersecting the viewport, clipped to the image,
/// in row-major order.
pub fn visible_tiles(viewport: &ViewportState, tile_size: u32) -> Vec<TileAddress> {
    let level = level_for_zoom(viewport);
    let (top_left, bottom_right) = viewport.visible_bounds();
    let (Some((x0, x1)), Some((y0, y1))) = (
        tile_span(top_left.x, bottom_right.x, level, tile_size),
        tile_span(top_left.y, bottom_right.y, level, tile_size),
    ) else {
        return Vec::new();
    };

    let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for dy in y0..=y1 {
        for dx in x0..=x1 {
            tiles.push(TileAddress::new(level, dx, dy));
        }
    }
    tiles
}

/// What to do after a viewport change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePlan {
    /// Visible tiles that are neither cached, failed nor in flight.
    pub to_request: Vec<TileAddress>,
    /// In-flight jobs whose tiles are no longer wanted.
    pub to_abort: Vec<u64>,
}

impl TilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_request.is_empty() && self.to_abort.is_empty()
    }
}

type Inbox = Rc<RefCell<VecDeque<(TileJob, TileOutcome)>>>;

/// Cached, failed and in-flight tiles, keyed by [`TileCacheKey`].
///
/// Placeholders handed out by [`placeholder`](Self::placeholder) post their
/// outcome to an inbox; [`collect`](Self::collect) files them.
#[derive(Default)]
pub struct TilePyramid {
    cached: HashMap<TileCacheKey, TileImage>,
    failed: HashSet<TileCacheKey>,
    in_flight: HashMap<TileCacheKey, u64>,
    inbox: Inbox,
}

impl TilePyramid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(&self) -> Box<dyn TilePlaceholder> {
        let inbox = Rc::clone(&self.inbox);
        Box::new(move |job: &TileJob, outcome: TileOutcome| {
            inbox.borrow_mut().push_back((job.clone(), outcome));
        })
    }

    /// Work out which tiles to ask for and which jobs to drop.
    ///
    /// Jobs handed to `to_abort` are forgotten here. The viewer cancels them
    /// outright, so a result that still turns up for one is stale and never
    /// reaches the cache.
    pub fn plan(&mut self, viewport: &ViewportState, source: &TileSource) -> TilePlan {
        let visible: Vec<TileCacheKey> = visible_tiles(viewport, source.tile_size())
            .into_iter()
            .map(|address| source.cache_key(address))
            .collect();
        let wanted: HashSet<&TileCacheKey> = visible.iter().collect();

        let mut to_abort: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(key, _)| !wanted.contains(key))
            .map(|(_, serial)| *serial)
            .collect();
        to_abort.sort_unstable();
        self.in_flight.retain(|key, _| wanted.contains(key));

        let to_request: Vec<TileAddress> = visible
            .iter()
            .filter(|key| {
                !self.cached.contains_key(*key)
                    && !self.failed.contains(*key)
                    && !self.in_flight.contains_key(*key)
            })
            .map(|key| key.address)
            .collect();

        if !to_request.is_empty() || !to_abort.is_empty() {
            debug!(
                request = to_request.len(),
                abort = to_abort.len(),
                visible = visible.len(),
                "Planned tiles"
            );
        }
        TilePlan {
            to_request,
            to_abort,
        }
    }

    pub fn mark_requested(&mut self, key: TileCacheKey, serial: u64) {
        self.in_flight.insert(key, serial);
    }

    /// File every outcome the placeholders have posted. Returns how many
    /// tiles arrived successfully.
    pub fn collect(&mut self) -> usize {
        let mut arrived = 0;
        let drained: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for (job, outcome) in drained {
            let key = key_for_job(&job);
            if self.in_flight.get(&key) == Some(&job.serial) {
                self.in_flight.remove(&key);
            }
            match outcome {
                Ok(image) => {
                    trace!(%key, serial = job.serial, "Tile cached");
                    self.failed.remove(&key);
                    self.cached.insert(key, image);
                    arrived += 1;
                }
                Err(e) => {
                    warn!(%key, serial = job.serial, "Tile failed: {e}");
                    self.failed.insert(key);
                }
            }
        }
        arrived
    }

    pub fn get(&self, key: &TileCacheKey) -> Option<&TileImage> {
        self.cached.get(key)
    }

    pub fn is_failed(&self, key: &TileCacheKey) -> bool {
        self.failed.contains(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    /// Forget everything, including outcomes not yet collected.
    pub fn reset(&mut self) {
        self.cached.clear();
        self.failed.clear();
        self.in_flight.clear();
        self.inbox.borrow_mut().clear();
    }
}

fn key_for_job(job: &TileJob) -> TileCacheKey {
    TileCacheKey {
        params: EngineParameterSet {
            algorithm: job.algorithm.clone(),
            max_iter: job.max_iter,
            colourer: job.colourer.clone(),
        },
        address: job.address,
    }
}
