use thiserror::Error;

/// A command could not be handed to the engine.
///
/// This is only about dispatch: failures while the engine works on a job
/// come back later as `tile_error` events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("engine is not running")]
    Disconnected,

    #[error("{0}")]
    Rejected(String),
}

/// Errors originating from the tile bridge and viewer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("unknown {kind}: {name}")]
    UnknownItem { kind: &'static str, name: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] brotview_core::CoreError),
}
