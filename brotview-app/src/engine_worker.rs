//! A loopback rendering engine on its own thread.
//!
//! Commands arrive over an mpsc channel; tiles are plotted on the rayon pool
//! and their results posted back as [`EngineEvent`]s. Aborting a job stops it
//! between rows and suppresses its reply.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use brotview_bridge::tile::MAX_LEVEL;
use brotview_bridge::{
    EngineError, EngineEvent, EnginePort, ListItem, ListKind, RenderSpec, TileComplete, TileError,
    TileJob,
};
use brotview_core::{Complex, View};

use crate::colourers::Colourer;
use crate::fractals::Algorithm;

/// Request sent from the viewer thread to the engine worker.
pub(crate) enum EngineCommand {
    StartTile(TileJob),
    AbortTile(u64),
    GetMetadata { serial: u64, algorithm: String },
    ListItems { serial: u64, kind: ListKind },
}

/// The viewer's end of the command channel.
pub(crate) struct ChannelEngine {
    tx: mpsc::Sender<EngineCommand>,
}

impl ChannelEngine {
    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.tx
            .send(command)
            .map_err(|_| EngineError::Disconnected)
    }
}

impl EnginePort for ChannelEngine {
    fn start_tile(&mut self, job: &TileJob) -> Result<(), EngineError> {
        self.send(EngineCommand::StartTile(job.clone()))
    }

    fn abort_tile(&mut self, serial: u64) -> Result<(), EngineError> {
        self.send(EngineCommand::AbortTile(serial))
    }

    fn get_metadata(&mut self, serial: u64, algorithm: &str) -> Result<(), EngineError> {
        self.send(EngineCommand::GetMetadata {
            serial,
            algorithm: algorithm.to_string(),
        })
    }

    fn list_items(&mut self, serial: u64, kind: ListKind) -> Result<(), EngineError> {
        self.send(EngineCommand::ListItems { serial, kind })
    }
}

type AbortFlags = Arc<Mutex<HashMap<u64, Arc<AtomicBool>>>>;

/// Spawn the engine worker thread.
///
/// Returns the command port and the receive-side for events. The thread
/// runs until the port is dropped; tiles already on the pool still finish.
pub(crate) fn spawn_engine() -> (ChannelEngine, mpsc::Receiver<EngineEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

    std::thread::Builder::new()
        .name("engine-worker".into())
        .spawn(move || {
            debug!("Engine worker thread started");
            let flags = AbortFlags::default();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(command, &flags, &event_tx);
            }
            debug!("Engine worker thread exiting");
        })
        .expect("Failed to spawn engine worker thread");

    (ChannelEngine { tx: cmd_tx }, event_rx)
}

fn handle_command(command: EngineCommand, flags: &AbortFlags, events: &mpsc::Sender<EngineEvent>) {
    match command {
        EngineCommand::StartTile(job) => {
            let cancel = Arc::new(AtomicBool::new(false));
            lock(flags).insert(job.serial, Arc::clone(&cancel));
            let flags = Arc::clone(flags);
            let events = events.clone();
            rayon::spawn(move || {
                let outcome = render_tile(&job, &cancel);
                lock(&flags).remove(&job.serial);
                let event = match outcome {
                    None => {
                        debug!(serial = job.serial, "Tile aborted");
                        return;
                    }
                    Some(Ok(rgba_blob)) => EngineEvent::TileComplete(TileComplete {
                        serial: job.serial,
                        rgba_blob,
                    }),
                    Some(Err(error)) => EngineEvent::TileError(TileError {
                        serial: job.serial,
                        error,
                    }),
                };
                let _ = events.send(event);
            });
        }
        EngineCommand::AbortTile(serial) => match lock(flags).get(&serial) {
            Some(cancel) => cancel.store(true, Ordering::Relaxed),
            None => trace!(serial, "Abort for a job that is not running"),
        },
        EngineCommand::GetMetadata { serial, algorithm } => {
            let result = Algorithm::from_name(&algorithm)
                .map(Algorithm::default_view)
                .ok_or_else(|| format!("unknown algorithm: {algorithm}"));
            if let Err(e) = &result {
                warn!(serial, "Metadata request failed: {e}");
            }
            let _ = events.send(EngineEvent::Metadata { serial, result });
        }
        EngineCommand::ListItems { serial, kind } => {
            let _ = events.send(EngineEvent::Items {
                serial,
                result: Ok(list_items(kind)),
            });
        }
    }
}

fn lock(flags: &AbortFlags) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<AtomicBool>>> {
    flags.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn list_items(kind: ListKind) -> Vec<ListItem> {
    match kind {
        ListKind::Fractals => Algorithm::ALL
            .iter()
            .map(|a| ListItem {
                name: a.name().into(),
                description: a.description().into(),
            })
            .collect(),
        ListKind::Colourers => Colourer::ALL
            .iter()
            .map(|c| ListItem {
                name: c.name().into(),
                description: c.description().into(),
            })
            .collect(),
    }
}

fn lookup(algorithm: &str, colourer: &str) -> Result<(Algorithm, Colourer), String> {
    let algorithm =
        Algorithm::from_name(algorithm).ok_or_else(|| format!("unknown algorithm: {algorithm}"))?;
    let colourer =
        Colourer::from_name(colourer).ok_or_else(|| format!("unknown colourer: {colourer}"))?;
    Ok((algorithm, colourer))
}

/// Complex point at normalized image position `(nx, ny)`, `ny` downward.
#[inline]
fn plot_point(view: &View, nx: f64, ny: f64) -> Complex {
    Complex::new(
        view.origin.re + nx * view.axes.re,
        view.origin.im + (1.0 - ny) * view.axes.im,
    )
}

/// Plot one pyramid tile. Pixels beyond the image edge are transparent.
///
/// Returns `None` if `cancel` was raised while plotting.
pub(crate) fn render_tile(job: &TileJob, cancel: &AtomicBool) -> Option<Result<Vec<u8>, String>> {
    let (algorithm, colourer) = match lookup(&job.algorithm, &job.colourer) {
        Ok(found) => found,
        Err(e) => return Some(Err(e)),
    };
    if job.address.level > MAX_LEVEL {
        return Some(Err(format!("level {} is too deep", job.address.level)));
    }
    if job.max_iter == 0 {
        return Some(Err("max_iter must be >= 1".into()));
    }

    let view = algorithm.default_view();
    let dim = (1u64 << job.address.level) as f64;
    let w = job.width as usize;
    if w == 0 || job.height == 0 {
        return Some(Ok(Vec::new()));
    }
    let left = job.address.dx as f64 * job.width as f64;
    let top = job.address.dy as f64 * job.height as f64;

    let mut rgba = vec![0u8; job.expected_blob_len()];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(j, row)| {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let ny = (top + j as f64 + 0.5) / dim;
        for (i, px) in row.chunks_exact_mut(4).enumerate() {
            let nx = (left + i as f64 + 0.5) / dim;
            if nx > 1.0 || ny > 1.0 {
                continue;
            }
            let escape = algorithm.escape_count(plot_point(&view, nx, ny), job.max_iter);
            px.copy_from_slice(&colourer.colour(escape));
        }
    });

    if cancel.load(Ordering::Relaxed) {
        return None;
    }
    Some(Ok(rgba))
}

/// Plot a whole render spec at its pixel size, top row first.
pub(crate) fn render_spec(spec: &RenderSpec) -> Result<Vec<u8>, String> {
    let (algorithm, colourer) = lookup(&spec.algorithm, &spec.colourer)?;
    if spec.width == 0 || spec.height == 0 {
        return Err(format!("invalid output size {}x{}", spec.width, spec.height));
    }
    let view = View {
        origin: spec.origin,
        axes: spec.axes,
    };
    let (w, h) = (spec.width as f64, spec.height as f64);

    let mut rgba = vec![0u8; spec.width as usize * spec.height as usize * 4];
    rgba.par_chunks_mut(spec.width as usize * 4)
        .enumerate()
        .for_each(|(j, row)| {
            let ny = (j as f64 + 0.5) / h;
            for (i, px) in row.chunks_exact_mut(4).enumerate() {
                let nx = (i as f64 + 0.5) / w;
                let escape = algorithm.escape_count(plot_point(&view, nx, ny), spec.max_iter);
                px.copy_from_slice(&colourer.colour(escape));
            }
        });
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brotview_bridge::TileAddress;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn job(serial: u64, algorithm: &str) -> TileJob {
        TileJob {
            serial,
            address: TileAddress::new(8, 0, 1),
            width: 16,
            height: 16,
            max_iter: 64,
            algorithm: algorithm.into(),
            colourer: "mandy".into(),
        }
    }

    #[test]
    fn metadata_and_lists() {
        let (mut engine, events) = spawn_engine();
        engine.get_metadata(1, "original").unwrap();
        match events.recv_timeout(TIMEOUT).unwrap() {
            EngineEvent::Metadata { serial, result } => {
                assert_eq!(serial, 1);
                assert_eq!(result.unwrap(), Algorithm::Original.default_view());
            }
            other => panic!("unexpected event {other:?}"),
        }

        engine.get_metadata(2, "julia").unwrap();
        match events.recv_timeout(TIMEOUT).unwrap() {
            EngineEvent::Metadata { serial: 2, result } => assert!(result.is_err()),
            other => panic!("unexpected event {other:?}"),
        }

        engine.list_items(3, ListKind::Colourers).unwrap();
        match events.recv_timeout(TIMEOUT).unwrap() {
            EngineEvent::Items { serial: 3, result } => {
                let names: Vec<String> = result.unwrap().into_iter().map(|i| i.name).collect();
                assert!(names.contains(&"log-rainbow".to_string()));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn tiles_come_back_by_serial() {
        let (mut engine, events) = spawn_engine();
        engine.start_tile(&job(7, "original")).unwrap();
        engine.start_tile(&job(8, "julia")).unwrap();

        let mut seen = HashMap::new();
        for _ in 0..2 {
            let event = events.recv_timeout(TIMEOUT).unwrap();
            seen.insert(event.serial(), event);
        }
        match &seen[&7] {
            EngineEvent::TileComplete(done) => assert_eq!(done.rgba_blob.len(), 16 * 16 * 4),
            other => panic!("unexpected event {other:?}"),
        }
        match &seen[&8] {
            EngineEvent::TileError(err) => assert_eq!(err.error, "unknown algorithm: julia"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn cancelled_render_returns_nothing() {
        let cancel = AtomicBool::new(true);
        assert!(render_tile(&job(1, "original"), &cancel).is_none());
        let cancel = AtomicBool::new(false);
        assert!(render_tile(&job(1, "original"), &cancel).unwrap().is_ok());
    }

    #[test]
    fn pixels_past_the_image_are_transparent() {
        let mut beyond = job(1, "original");
        // Level 8 is 256 pixels across: column 16 is off the image.
        beyond.address = TileAddress::new(8, 16, 0);
        let rgba = render_tile(&beyond, &AtomicBool::new(false)).unwrap().unwrap();
        assert!(rgba.iter().all(|b| *b == 0));
    }

    #[test]
    fn dropped_port_disconnects() {
        let (engine, events) = spawn_engine();
        drop(engine);
        assert!(matches!(
            events.recv_timeout(TIMEOUT),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn render_spec_is_top_row_first() {
        let spec = RenderSpec {
            origin: Complex::new(-3.0, -2.0),
            axes: Complex::new(4.0, 4.0),
            width: 8,
            height: 8,
            max_iter: 50,
            algorithm: "original".into(),
            colourer: "white".into(),
        };
        let rgba = render_spec(&spec).unwrap();
        assert_eq!(rgba.len(), 8 * 8 * 4);
        assert!(rgba.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

        let bad = RenderSpec {
            colourer: "sepia".into(),
            ..spec
        };
        assert_eq!(render_spec(&bad), Err("unknown colourer: sepia".into()));
    }
}
