//! Drives a [`Viewer`] through a scripted list of steps, pumping engine
//! events between them.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use brotview_bridge::{EngineEvent, EnginePort, EventOutcome, Viewer, ViewerState};

use crate::canvas;
use crate::config::TourStep;
use crate::engine_worker::render_spec;
use crate::export::{write_png, PlotMetadata};

/// How a wait for the engine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settle {
    /// Stable, with every visible tile resolved.
    Quiet,
    /// The engine could not describe the current algorithm.
    MetadataFailed,
    TimedOut,
    Disconnected,
}

pub(crate) struct Tour<E: EnginePort> {
    viewer: Viewer<E>,
    events: Receiver<EngineEvent>,
    settle_timeout: Duration,
    out_dir: PathBuf,
}

impl<E: EnginePort> Tour<E> {
    pub fn new(
        viewer: Viewer<E>,
        events: Receiver<EngineEvent>,
        settle_timeout: Duration,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            viewer,
            events,
            settle_timeout,
            out_dir,
        }
    }

    #[cfg(test)]
    pub fn viewer(&self) -> &Viewer<E> {
        &self.viewer
    }

    /// Handle engine events until the viewer has all its visible tiles, or
    /// until the timeout runs out.
    pub fn settle(&mut self) -> Settle {
        let deadline = Instant::now() + self.settle_timeout;
        loop {
            if self.viewer.state() == ViewerState::Stable {
                self.viewer.refresh_tiles();
                if self.viewer.session().jobs.is_empty() {
                    return Settle::Quiet;
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    if self.viewer.handle_event(event) == EventOutcome::MetadataFailed {
                        return Settle::MetadataFailed;
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Settle::TimedOut,
                Err(RecvTimeoutError::Disconnected) => return Settle::Disconnected,
            }
        }
    }

    /// Apply one step, then wait for the engine to catch up.
    pub fn run_step(&mut self, step: &TourStep) -> Result<Settle, String> {
        debug!(?step, "Tour step");
        match step {
            TourStep::Home => {
                self.viewer.go_home();
            }
            TourStep::GoTo { destination } => self
                .viewer
                .go_to_position(destination)
                .map_err(|e| e.to_string())?,
            TourStep::Zoom { factor } => self.viewer.zoom_by(*factor),
            TourStep::Pan { dx, dy } => self.viewer.pan_by(*dx, *dy),
            TourStep::Resize { width, height } => self
                .viewer
                .resize(*width, *height)
                .map_err(|e| e.to_string())?,
            TourStep::SetAlgorithm { name } => {
                self.viewer.set_algorithm(name).map_err(|e| e.to_string())?;
            }
            TourStep::SetColourer { name } => {
                self.viewer.set_colourer(name).map_err(|e| e.to_string())?;
            }
            TourStep::SetMaxIter { max_iter } => {
                self.viewer
                    .set_max_iter(*max_iter)
                    .map_err(|e| e.to_string())?;
            }
            TourStep::Snapshot { name } => {
                let settle = self.settle();
                self.snapshot(name)?;
                return Ok(settle);
            }
            TourStep::Export {
                name,
                width,
                height,
            } => self.export(name, *width, *height)?,
        }
        Ok(self.settle())
    }

    /// Run every step, logging failures and carrying on. Stops early if the
    /// engine goes away. Returns the number of steps that failed.
    pub fn run(&mut self, steps: &[TourStep]) -> usize {
        let mut failures = 0;
        for (i, step) in steps.iter().enumerate() {
            match self.run_step(step) {
                Ok(Settle::Quiet) => {}
                Ok(Settle::Disconnected) => {
                    warn!(step = i, "Engine disconnected, stopping tour");
                    return failures + 1;
                }
                Ok(settle) => {
                    warn!(step = i, ?settle, "Engine did not settle");
                    failures += 1;
                }
                Err(e) => {
                    warn!(step = i, "Tour step failed: {e}");
                    failures += 1;
                }
            }
        }
        failures
    }

    fn snapshot(&self, name: &str) -> Result<(), String> {
        let picture = canvas::composite(&self.viewer);
        if picture.missing > 0 {
            warn!(name, missing = picture.missing, "Snapshot has missing tiles");
        }
        let spec = self
            .viewer
            .export_spec(picture.width, picture.height)
            .map_err(|e| format!("No position for snapshot: {e}"))?;
        let path = self.out_dir.join(format!("{name}.png"));
        write_png(
            &picture.pixels,
            picture.width,
            picture.height,
            &path,
            &PlotMetadata::from_spec(&spec),
        )?;
        info!("Saved snapshot {}", path.display());
        Ok(())
    }

    fn export(&self, name: &str, width: u32, height: u32) -> Result<(), String> {
        let spec = self
            .viewer
            .export_spec(width, height)
            .map_err(|e| e.to_string())?;
        let start = Instant::now();
        let pixels = render_spec(&spec)?;
        let path = self.out_dir.join(format!("{name}.png"));
        write_png(&pixels, width, height, &path, &PlotMetadata::from_spec(&spec))?;
        info!(
            "Exported {}x{} to {} in {:.1?}",
            width,
            height,
            path.display(),
            start.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_worker::{spawn_engine, ChannelEngine};
    use brotview_bridge::EngineParameterSet;
    use brotview_core::{Destination, EntryMode};

    fn tour(name: &str, algorithm: &str) -> Tour<ChannelEngine> {
        let (engine, events) = spawn_engine();
        let params = EngineParameterSet {
            algorithm: algorithm.into(),
            max_iter: 32,
            colourer: "log-rainbow".into(),
        };
        let viewer = Viewer::new(engine, params, 64, 48, 128).unwrap();
        let out_dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&out_dir);
        Tour::new(viewer, events, Duration::from_secs(30), out_dir)
    }

    #[test]
    fn settles_at_home() {
        let mut tour = tour("brotview_test_tour_home", "original");
        assert_eq!(tour.settle(), Settle::Quiet);
        assert!(tour.viewer().is_at_home());
        assert_eq!(tour.viewer().state(), ViewerState::Stable);
        let picture = canvas::composite(tour.viewer());
        assert_eq!(picture.missing, 0);
    }

    #[test]
    fn unknown_algorithm_fails_metadata() {
        let mut tour = tour("brotview_test_tour_unknown", "julia");
        assert_eq!(tour.settle(), Settle::MetadataFailed);
        assert!(tour.viewer().state() != ViewerState::Stable);
    }

    #[test]
    fn steps_write_pngs() {
        let mut tour = tour("brotview_test_tour_steps", "original");
        let steps = vec![
            TourStep::Snapshot {
                name: "home".into(),
            },
            TourStep::GoTo {
                destination: Destination {
                    mode: EntryMode::Centre,
                    centre_real: Some(-0.75),
                    centre_imag: Some(0.1),
                    zoom: Some(8.0),
                    ..Default::default()
                },
            },
            TourStep::SetMaxIter { max_iter: 64 },
            TourStep::Export {
                name: "wide".into(),
                width: 32,
                height: 16,
            },
        ];
        assert_eq!(tour.run(&steps), 0);
        assert!(tour.out_dir.join("home.png").exists());
        assert!(tour.out_dir.join("wide.png").exists());
        assert_eq!(tour.viewer().params().max_iter, 64);
        let _ = std::fs::remove_dir_all(&tour.out_dir);
    }

    #[test]
    fn bad_steps_are_counted() {
        let mut tour = tour("brotview_test_tour_bad", "original");
        let steps = vec![
            TourStep::SetMaxIter { max_iter: 0 },
            TourStep::Export {
                name: "empty".into(),
                width: 0,
                height: 10,
            },
            TourStep::Zoom { factor: 2.0 },
        ];
        assert_eq!(tour.run(&steps), 2);
        assert!(!tour.out_dir.join("empty.png").exists());
    }
}
