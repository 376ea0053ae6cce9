//! An engine port that records every command, for unit tests.

use crate::engine::{EnginePort, ListKind};
use crate::error::EngineError;
use crate::tile::TileJob;

#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    pub started: Vec<TileJob>,
    pub aborted: Vec<u64>,
    pub metadata_requests: Vec<(u64, String)>,
    pub list_requests: Vec<(u64, ListKind)>,
    /// Refuse every command as if the engine had gone away.
    pub refuse: bool,
}

impl RecordingEngine {
    fn check(&self) -> Result<(), EngineError> {
        if self.refuse {
            Err(EngineError::Disconnected)
        } else {
            Ok(())
        }
    }
}

impl EnginePort for RecordingEngine {
    fn start_tile(&mut self, job: &TileJob) -> Result<(), EngineError> {
        self.check()?;
        self.started.push(job.clone());
        Ok(())
    }

    fn abort_tile(&mut self, serial: u64) -> Result<(), EngineError> {
        self.check()?;
        self.aborted.push(serial);
        Ok(())
    }

    fn get_metadata(&mut self, serial: u64, algorithm: &str) -> Result<(), EngineError> {
        self.check()?;
        self.metadata_requests.push((serial, algorithm.to_string()));
        Ok(())
    }

    fn list_items(&mut self, serial: u64, kind: ListKind) -> Result<(), EngineError> {
        self.check()?;
        self.list_requests.push((serial, kind));
        Ok(())
    }
}
