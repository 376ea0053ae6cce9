use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use brotview_core::View;

use crate::engine::EnginePort;
use crate::jobs::ViewerSession;
use crate::tile::{TileAddress, TileFailure, TileJob, TilePlaceholder};

/// The engine settings one tile source renders with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineParameterSet {
    pub algorithm: String,
    pub max_iter: u32,
    pub colourer: String,
}

/// How two parameter sets differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterChange {
    Unchanged,
    /// Only pixel colouring or precision changes; the plot bounds do not.
    Cosmetic,
    /// A different fractal, with its own plot bounds.
    Structural,
}

impl EngineParameterSet {
    pub fn classify(&self, next: &Self) -> ParameterChange {
        if self.algorithm != next.algorithm {
            ParameterChange::Structural
        } else if self.max_iter != next.max_iter || self.colourer != next.colourer {
            ParameterChange::Cosmetic
        } else {
            ParameterChange::Unchanged
        }
    }
}

impl std::fmt::Display for EngineParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.algorithm, self.colourer, self.max_iter)
    }
}

/// Cache identity of a tile's pixels.
///
/// Everything that changes the pixels is part of the key, so tiles from
/// different parameter sets never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    pub params: EngineParameterSet,
    pub address: TileAddress,
}

impl std::fmt::Display for TileCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.params, self.address)
    }
}

/// Plot bounds of a source, once the engine has told us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metadata {
    Pending,
    Ready(View),
}

impl Metadata {
    pub fn ready(&self) -> Option<&View> {
        match self {
            Self::Ready(view) => Some(view),
            Self::Pending => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// A virtual, effectively infinite tile pyramid for one parameter set.
///
/// Built on startup and on every parameter change. Its metadata is fetched
/// asynchronously; until that reply arrives it stays [`Metadata::Pending`],
/// and so does it forever if the fetch fails.
#[derive(Debug)]
pub struct TileSource {
    params: EngineParameterSet,
    generation: u64,
    tile_size: u32,
    metadata: Metadata,
    metadata_serial: u64,
}

impl TileSource {
    /// Create a source and ask the engine for its plot bounds.
    pub fn open<E: EnginePort + ?Sized>(
        params: EngineParameterSet,
        generation: u64,
        tile_size: u32,
        session: &mut ViewerSession,
        engine: &mut E,
    ) -> Self {
        let metadata_serial = session.serials.next();
        if let Err(e) = engine.get_metadata(metadata_serial, &params.algorithm) {
            error!(%params, "Error requesting metadata: {e}");
        }
        debug!(%params, generation, serial = metadata_serial, "Opened tile source");
        Self {
            params,
            generation,
            tile_size,
            metadata: Metadata::Pending,
            metadata_serial,
        }
    }

    pub fn params(&self) -> &EngineParameterSet {
        &self.params
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Serial of the outstanding metadata request.
    pub fn metadata_serial(&self) -> u64 {
        self.metadata_serial
    }

    pub fn address_for(&self, level: u32, x: u64, y: u64) -> TileAddress {
        TileAddress::new(level, x, y)
    }

    pub fn cache_key(&self, address: TileAddress) -> TileCacheKey {
        TileCacheKey {
            params: self.params.clone(),
            address,
        }
    }

    /// Take a metadata reply. Returns `true` if it made this source's
    /// metadata usable; replies for other serials are ignored.
    pub fn accept_metadata(&mut self, serial: u64, result: Result<View, String>) -> bool {
        if serial != self.metadata_serial {
            return false;
        }
        match result.and_then(|view| view.validate().map(|()| view).map_err(|e| e.to_string())) {
            Ok(view) => {
                info!(params = %self.params, %view, "Metadata ready");
                self.metadata = Metadata::Ready(view);
                true
            }
            Err(e) => {
                error!(params = %self.params, "Error retrieving metadata: {e}");
                false
            }
        }
    }

    /// Number a tile job, remember its placeholder and send it to the engine.
    ///
    /// If the engine cannot take the request the placeholder is finished
    /// straight away with the dispatch error. No retry.
    pub fn begin_job<E: EnginePort + ?Sized>(
        &self,
        session: &mut ViewerSession,
        engine: &mut E,
        address: TileAddress,
        placeholder: Box<dyn TilePlaceholder>,
    ) -> TileJob {
        let job = TileJob {
            serial: session.serials.next(),
            address,
            width: self.tile_size,
            height: self.tile_size,
            max_iter: self.params.max_iter,
            algorithm: self.params.algorithm.clone(),
            colourer: self.params.colourer.clone(),
        };
        session
            .jobs
            .register(job.clone(), self.generation, placeholder);
        if let Err(e) = engine.start_tile(&job) {
            warn!(serial = job.serial, address = %address, "Tile dispatch failed: {e}");
            session
                .jobs
                .fail(job.serial, TileFailure::Dispatch(e.to_string()));
        }
        job
    }

    /// Ask the engine to stop working on `serial`. The job stays in the
    /// table; a result may still turn up.
    pub fn abort_job<E: EnginePort + ?Sized>(&self, engine: &mut E, serial: u64) {
        debug!(serial, "Requesting tile abort");
        if let Err(e) = engine.abort_tile(serial) {
            warn!(serial, "Tile abort failed: {e}");
        }
    }
}
