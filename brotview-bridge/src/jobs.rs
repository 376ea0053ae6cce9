use std::collections::HashMap;

use tracing::{debug, trace};

use brotview_core::SerialAllocator;

use crate::engine::{TileComplete, TileError};
use crate::tile::{TileFailure, TileImage, TileJob, TileOutcome, TilePlaceholder};

/// A tile result as delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileResult {
    Complete(TileComplete),
    Failed(TileError),
}

impl TileResult {
    pub fn serial(&self) -> u64 {
        match self {
            Self::Complete(t) => t.serial,
            Self::Failed(t) => t.serial,
        }
    }
}

struct PendingTile {
    job: TileJob,
    /// Generation of the tile source that issued the job.
    generation: u64,
    placeholder: Box<dyn TilePlaceholder>,
}

/// Outstanding jobs, keyed by serial.
///
/// An entry lives from dispatch until its result arrives or the caller
/// tears it down. Results for serials that are not here (already resolved,
/// discarded, or issued by an abandoned source) are dropped quietly: that is
/// how late engine replies are made harmless.
#[derive(Default)]
pub struct JobTable {
    map: HashMap<u64, PendingTile>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: TileJob, generation: u64, placeholder: Box<dyn TilePlaceholder>) {
        trace!(serial = job.serial, address = %job.address, "Registered tile job");
        self.map.insert(
            job.serial,
            PendingTile {
                job,
                generation,
                placeholder,
            },
        );
    }

    /// Hand a result to the job's placeholder and forget the job.
    ///
    /// Returns the resolved job, or `None` for a serial we are not tracking.
    pub fn resolve(&mut self, result: TileResult) -> Option<TileJob> {
        let serial = result.serial();
        let Some(pending) = self.map.remove(&serial) else {
            trace!(serial, "Discarding result for untracked tile");
            return None;
        };
        let outcome = match result {
            TileResult::Complete(done) => into_image(&pending.job, done.rgba_blob),
            TileResult::Failed(err) => Err(TileFailure::Engine(err.error)),
        };
        if let Err(e) = &outcome {
            debug!(serial, address = %pending.job.address, "Tile failed: {e}");
        }
        pending.placeholder.finish(&pending.job, outcome);
        Some(pending.job)
    }

    /// Finish a job's placeholder with a failure that did not come from the
    /// engine, e.g. a dispatch error.
    pub fn fail(&mut self, serial: u64, failure: TileFailure) -> Option<TileJob> {
        let pending = self.map.remove(&serial)?;
        pending.placeholder.finish(&pending.job, Err(failure));
        Some(pending.job)
    }

    /// Forget a job without finishing its placeholder.
    pub fn discard(&mut self, serial: u64) -> Option<TileJob> {
        self.map.remove(&serial).map(|p| p.job)
    }

    /// Forget every job issued by the source of `generation`. Returns their
    /// serials, in ascending order.
    pub fn discard_generation(&mut self, generation: u64) -> Vec<u64> {
        let mut serials: Vec<u64> = self
            .map
            .iter()
            .filter(|(_, p)| p.generation == generation)
            .map(|(s, _)| *s)
            .collect();
        serials.sort_unstable();
        for serial in &serials {
            self.map.remove(serial);
        }
        serials
    }

    pub fn contains(&self, serial: u64) -> bool {
        self.map.contains_key(&serial)
    }

    pub fn get(&self, serial: u64) -> Option<&TileJob> {
        self.map.get(&serial).map(|p| &p.job)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn into_image(job: &TileJob, rgba: Vec<u8>) -> TileOutcome {
    let expected = job.expected_blob_len();
    if rgba.len() != expected {
        return Err(TileFailure::BadBlob {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(TileImage {
        width: job.width,
        height: job.height,
        rgba,
    })
}

/// Per-viewer correlation state: the serial counter and the jobs it has
/// numbered. One of these per viewer; nothing here is process-global.
#[derive(Default)]
pub struct ViewerSession {
    pub serials: SerialAllocator,
    pub jobs: JobTable,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }
}
