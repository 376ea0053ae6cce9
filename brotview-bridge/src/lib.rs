pub mod engine;
pub mod error;
pub mod jobs;
pub mod pyramid;
pub mod source;
pub mod tile;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineEvent, EnginePort, ListItem, ListKind, RenderSpec, TileComplete, TileError};
pub use error::{BridgeError, EngineError};
pub use jobs::{JobTable, TileResult, ViewerSession};
pub use pyramid::{level_for_zoom, visible_tiles, TilePlan, TilePyramid};
pub use source::{EngineParameterSet, Metadata, ParameterChange, TileCacheKey, TileSource};
pub use tile::{
    TileAddress, TileFailure, TileImage, TileJob, TileOutcome, TilePlaceholder, TILE_SIZE,
};
pub use viewer::{EventOutcome, SwapPolicy, Viewer, ViewerState};

/// Convenience result type for the bridge crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
