//! The two channels to the rendering engine.
//!
//! Commands go out through an [`EnginePort`], fire-and-forget. Everything the
//! engine produces comes back later as an [`EngineEvent`], correlated with
//! its command by serial only. Nothing here assumes a reply ever arrives, or
//! that an aborted job stays quiet.

use serde::{Deserialize, Serialize};

use brotview_core::{Complex, View};

use crate::error::EngineError;
use crate::tile::TileJob;

/// Which catalogue `list_items` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Fractals,
    Colourers,
}

impl ListKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fractals => "fractal",
            Self::Colourers => "colourer",
        }
    }
}

/// One entry of an engine catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    pub description: String,
}

/// Payload of the `tile_complete` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileComplete {
    pub serial: u64,
    pub rgba_blob: Vec<u8>,
}

/// Payload of the `tile_error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileError {
    pub serial: u64,
    pub error: String,
}

/// A complete request for a plot at a given pixel size, as used by the
/// engine's save-image workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSpec {
    /// Bottom-left corner of the plot.
    pub origin: Complex,
    pub axes: Complex,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "maxiter")]
    pub max_iter: u32,
    pub algorithm: String,
    pub colourer: String,
}

/// Something the engine sent back.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TileComplete(TileComplete),
    TileError(TileError),
    /// Reply to [`EnginePort::get_metadata`].
    Metadata {
        serial: u64,
        result: Result<View, String>,
    },
    /// Reply to [`EnginePort::list_items`].
    Items {
        serial: u64,
        result: Result<Vec<ListItem>, String>,
    },
}

impl EngineEvent {
    pub fn serial(&self) -> u64 {
        match self {
            Self::TileComplete(t) => t.serial,
            Self::TileError(t) => t.serial,
            Self::Metadata { serial, .. } | Self::Items { serial, .. } => *serial,
        }
    }
}

/// Outbound command port to the engine.
///
/// Every method returns as soon as the command is handed over. An `Err`
/// means the command was never delivered; results and engine-side failures
/// arrive as [`EngineEvent`]s.
pub trait EnginePort {
    fn start_tile(&mut self, job: &TileJob) -> Result<(), EngineError>;

    /// Advisory: the engine may still deliver a result for `serial`.
    fn abort_tile(&mut self, serial: u64) -> Result<(), EngineError>;

    fn get_metadata(&mut self, serial: u64, algorithm: &str) -> Result<(), EngineError>;

    fn list_items(&mut self, serial: u64, kind: ListKind) -> Result<(), EngineError>;
}

impl<E: EnginePort + ?Sized> EnginePort for &mut E {
    fn start_tile(&mut self, job: &TileJob) -> Result<(), EngineError> {
        (**self).start_tile(job)
    }

    fn abort_tile(&mut self, serial: u64) -> Result<(), EngineError> {
        (**self).abort_tile(serial)
    }

    fn get_metadata(&mut self, serial: u64, algorithm: &str) -> Result<(), EngineError> {
        (**self).get_metadata(serial, algorithm)
    }

    fn list_items(&mut self, serial: u64, kind: ListKind) -> Result<(), EngineError> {
        (**self).list_items(serial, kind)
    }
}
