//! The viewer orchestrator: one tile source at a time, one viewport, and the
//! policy for swapping sources when the user changes engine parameters.

use std::collections::HashMap;

use tracing::{debug, error, info, trace, warn};

use brotview_core::aspect::go_home;
use brotview_core::{
    compute_home_margins, fix_aspect_ratio, forward, inverse, CoreError, Destination, EntryMode,
    Margins, PanZoom, PixelRect, View, ViewportState,
};

use crate::engine::{EngineEvent, EnginePort, ListItem, ListKind, RenderSpec};
use crate::error::BridgeError;
use crate::jobs::{TileResult, ViewerSession};
use crate::pyramid::{visible_tiles, TilePlan, TilePyramid};
use crate::source::{EngineParameterSet, Metadata, ParameterChange, TileSource};
use crate::tile::{TileAddress, TileImage, TileJob, TilePlaceholder};

// ---------------------------------------------------------------------------
// Swap state
// ---------------------------------------------------------------------------

/// What to do with the viewport once a replacement source's metadata is in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwapPolicy {
    /// New plot bounds: go home.
    Structural,
    /// Same plot bounds: put the viewport back exactly where it was.
    Cosmetic { stash: PanZoom },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerState {
    Stable,
    Swapping(SwapPolicy),
}

/// What [`Viewer::handle_event`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// A tile placeholder was finished.
    TileResolved { serial: u64 },
    /// The current source's metadata arrived and the swap completed.
    MetadataReady,
    /// The current source's metadata fetch failed; it stays pending.
    MetadataFailed,
    /// A catalogue listing arrived (or failed, which is logged).
    Catalogue(ListKind),
    /// Nobody is waiting for this serial any more.
    Stale { serial: u64 },
}

#[derive(Debug, Default)]
struct Catalogue {
    fractals: Option<Vec<ListItem>>,
    colourers: Option<Vec<ListItem>>,
    pending: HashMap<u64, ListKind>,
}

impl Catalogue {
    fn items(&self, kind: ListKind) -> Option<&[ListItem]> {
        match kind {
            ListKind::Fractals => self.fractals.as_deref(),
            ListKind::Colourers => self.colourers.as_deref(),
        }
    }

    fn store(&mut self, kind: ListKind, items: Vec<ListItem>) {
        match kind {
            ListKind::Fractals => self.fractals = Some(items),
            ListKind::Colourers => self.colourers = Some(items),
        }
    }

    /// Unknown names are rejected once the list is loaded. Before that,
    /// anything goes; the engine reports bad names per tile.
    fn check(&self, kind: ListKind, name: &str) -> crate::Result<()> {
        match self.items(kind) {
            Some(items) if !items.iter().any(|i| i.name == name) => Err(BridgeError::UnknownItem {
                kind: kind.label(),
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

pub struct Viewer<E: EnginePort> {
    engine: E,
    session: ViewerSession,
    source: TileSource,
    next_generation: u64,
    viewport: ViewportState,
    state: ViewerState,
    /// The container changed size while metadata was pending.
    resize_pending: bool,
    /// The user has not moved away from the home framing.
    at_home: bool,
    home_margins: Option<Margins>,
    pyramid: TilePyramid,
    catalogue: Catalogue,
}

impl<E: EnginePort> Viewer<E> {
    /// Open the first tile source. The viewport goes home as soon as its
    /// metadata arrives.
    pub fn new(
        mut engine: E,
        params: EngineParameterSet,
        width: u32,
        height: u32,
        tile_size: u32,
    ) -> crate::Result<Self> {
        if params.max_iter == 0 {
            return Err(BridgeError::InvalidMaxIterations(0));
        }
        let viewport = ViewportState::new(width, height)?;
        let mut session = ViewerSession::new();
        let source = TileSource::open(params, 0, tile_size, &mut session, &mut engine);
        info!(width, height, tile_size, params = %source.params(), "Viewer created");
        Ok(Self {
            engine,
            session,
            source,
            next_generation: 1,
            viewport,
            state: ViewerState::Swapping(SwapPolicy::Structural),
            resize_pending: false,
            at_home: true,
            home_margins: None,
            pyramid: TilePyramid::new(),
            catalogue: Catalogue::default(),
        })
    }

    // -- accessors ----------------------------------------------------------

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }

    pub fn params(&self) -> &EngineParameterSet {
        self.source.params()
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn home_margins(&self) -> Option<Margins> {
        self.home_margins
    }

    pub fn is_at_home(&self) -> bool {
        self.at_home
    }

    pub fn fractals(&self) -> Option<&[ListItem]> {
        self.catalogue.items(ListKind::Fractals)
    }

    pub fn colourers(&self) -> Option<&[ListItem]> {
        self.catalogue.items(ListKind::Colourers)
    }

    fn metadata(&self) -> crate::Result<View> {
        match self.source.metadata() {
            Metadata::Ready(view) => Ok(*view),
            Metadata::Pending => Err(CoreError::MetadataPending.into()),
        }
    }

    // -- position -----------------------------------------------------------

    /// The complex-plane view currently on screen.
    pub fn get_position(&self) -> crate::Result<View> {
        let meta = self.metadata()?;
        let rect = PixelRect::full(self.viewport.width, self.viewport.height);
        Ok(forward(rect, &self.viewport, &meta)?)
    }

    /// The current position, for the clipboard.
    pub fn copy_current_position(&self) -> crate::Result<View> {
        let view = self.get_position()?;
        info!(%view, "Copied position");
        Ok(view)
    }

    /// The current position as a filled-in go-to form.
    pub fn current_destination(&self, mode: EntryMode) -> crate::Result<Destination> {
        let view = self.get_position()?;
        Ok(Destination::from_view(&view, self.viewport.zoom, mode))
    }

    /// Pan and zoom to a user-entered destination. On error nothing moves.
    pub fn go_to_position(&mut self, destination: &Destination) -> crate::Result<()> {
        let meta = self.metadata()?;
        let target = inverse(
            destination,
            &meta,
            self.viewport.width,
            self.viewport.height,
        )
        .and_then(|pz| {
            let mut moved = self.viewport;
            moved.apply(pz)?;
            Ok(moved)
        });
        match target {
            Ok(moved) => {
                self.viewport = moved;
                self.at_home = false;
                debug!(zoom = moved.zoom, x = moved.centre.x, y = moved.centre.y, "Went to position");
                Ok(())
            }
            Err(e) => {
                warn!("Cannot go to position: {e}");
                Err(e.into())
            }
        }
    }

    /// Show the whole plot undistorted. Returns `false` while metadata is
    /// pending.
    pub fn go_home(&mut self) -> bool {
        let Some(meta) = self.source.metadata().ready().copied() else {
            return false;
        };
        if !go_home(&mut self.viewport, &meta) {
            return false;
        }
        self.home_margins =
            compute_home_margins(&meta, self.viewport.width, self.viewport.height);
        self.at_home = true;
        debug!(zoom = self.viewport.zoom, "Went home");
        true
    }

    /// Zoom about the middle of the container.
    pub fn zoom_by(&mut self, factor: f64) {
        let (cx, cy) = (
            self.viewport.width as f64 / 2.0,
            self.viewport.height as f64 / 2.0,
        );
        self.zoom_about(cx, cy, factor);
    }

    /// Zoom keeping the point under pixel `(px, py)` still.
    pub fn zoom_about(&mut self, px: f64, py: f64, factor: f64) {
        self.viewport.zoom_about(px, py, factor);
        self.at_home = false;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
        self.at_home = false;
    }

    /// The container changed size. The image keeps its on-screen size and
    /// centre; home margins follow if we are at home, once metadata allows.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        let old_width = self.viewport.width;
        self.viewport.resize(width, height)?;
        if let ViewerState::Swapping(SwapPolicy::Cosmetic { stash }) = &mut self.state {
            stash.zoom *= old_width as f64 / width as f64;
        }

        if let Some(meta) = self.source.metadata().ready().copied() {
            self.home_margins = compute_home_margins(&meta, width, height);
            if self.at_home {
                self.go_home();
            }
        } else {
            debug!(width, height, "Metadata pending, deferring home margins");
            self.resize_pending = true;
        }
        Ok(())
    }

    // -- parameters ---------------------------------------------------------

    pub fn set_algorithm(&mut self, algorithm: &str) -> crate::Result<ParameterChange> {
        self.catalogue.check(ListKind::Fractals, algorithm)?;
        let next = EngineParameterSet {
            algorithm: algorithm.to_string(),
            ..self.source.params().clone()
        };
        Ok(self.change_params(next))
    }

    pub fn set_colourer(&mut self, colourer: &str) -> crate::Result<ParameterChange> {
        self.catalogue.check(ListKind::Colourers, colourer)?;
        let next = EngineParameterSet {
            colourer: colourer.to_string(),
            ..self.source.params().clone()
        };
        Ok(self.change_params(next))
    }

    pub fn set_max_iter(&mut self, max_iter: u32) -> crate::Result<ParameterChange> {
        if max_iter == 0 {
            return Err(BridgeError::InvalidMaxIterations(max_iter));
        }
        let next = EngineParameterSet {
            max_iter,
            ..self.source.params().clone()
        };
        Ok(self.change_params(next))
    }

    fn change_params(&mut self, next: EngineParameterSet) -> ParameterChange {
        let change = self.source.params().classify(&next);
        let policy = match (change, self.state) {
            (ParameterChange::Unchanged, _) => return change,
            (ParameterChange::Structural, _) => SwapPolicy::Structural,
            (ParameterChange::Cosmetic, ViewerState::Swapping(pending)) => pending,
            (ParameterChange::Cosmetic, ViewerState::Stable) => SwapPolicy::Cosmetic {
                stash: self.viewport.pan_zoom(),
            },
        };

        self.retire_source();
        let generation = self.next_generation;
        self.next_generation += 1;
        info!(from = %self.source.params(), to = %next, ?policy, "Swapping tile source");
        self.source = TileSource::open(
            next,
            generation,
            self.source.tile_size(),
            &mut self.session,
            &mut self.engine,
        );
        self.state = ViewerState::Swapping(policy);
        change
    }

    /// Drop every job of the current source, telling the engine to stop.
    fn retire_source(&mut self) {
        let serials = self.session.jobs.discard_generation(self.source.generation());
        if !serials.is_empty() {
            debug!(
                generation = self.source.generation(),
                count = serials.len(),
                "Aborting jobs of retired source"
            );
        }
        for serial in serials {
            self.source.abort_job(&mut self.engine, serial);
        }
        self.pyramid.reset();
    }

    // -- tiles --------------------------------------------------------------

    /// Start a job for one tile of the current source.
    pub fn request_tile(
        &mut self,
        address: TileAddress,
        placeholder: Box<dyn TilePlaceholder>,
    ) -> TileJob {
        self.source
            .begin_job(&mut self.session, &mut self.engine, address, placeholder)
    }

    /// Advisory: the job stays registered and its result is still used if
    /// it arrives.
    pub fn abort_tile(&mut self, serial: u64) {
        self.source.abort_job(&mut self.engine, serial);
    }

    /// Abort a job and forget it, so a late result is dropped.
    pub fn cancel_tile(&mut self, serial: u64) -> Option<TileJob> {
        self.source.abort_job(&mut self.engine, serial);
        self.session.jobs.discard(serial)
    }

    pub fn visible_tiles(&self) -> Vec<TileAddress> {
        visible_tiles(&self.viewport, self.source.tile_size())
    }

    /// A cached tile of the current source.
    pub fn tile(&self, address: TileAddress) -> Option<&TileImage> {
        self.pyramid.get(&self.source.cache_key(address))
    }

    /// Request the visible tiles we do not have and cancel the ones that
    /// scrolled away. Does nothing mid-swap, since the viewport is about to
    /// jump.
    pub fn refresh_tiles(&mut self) -> TilePlan {
        if self.state != ViewerState::Stable {
            return TilePlan::default();
        }
        let plan = self.pyramid.plan(&self.viewport, &self.source);
        for &serial in &plan.to_abort {
            self.cancel_tile(serial);
        }
        for &address in &plan.to_request {
            let placeholder = self.pyramid.placeholder();
            let job = self.source.begin_job(
                &mut self.session,
                &mut self.engine,
                address,
                placeholder,
            );
            self.pyramid
                .mark_requested(self.source.cache_key(address), job.serial);
        }
        // Dispatch failures have already posted their outcome.
        self.pyramid.collect();
        plan
    }

    // -- engine events ------------------------------------------------------

    pub fn handle_event(&mut self, event: EngineEvent) -> EventOutcome {
        match event {
            EngineEvent::TileComplete(done) => self.resolve_tile(TileResult::Complete(done)),
            EngineEvent::TileError(err) => self.resolve_tile(TileResult::Failed(err)),
            EngineEvent::Metadata { serial, result } => {
                if serial != self.source.metadata_serial() {
                    trace!(serial, "Discarding metadata for retired source");
                    return EventOutcome::Stale { serial };
                }
                if self.source.accept_metadata(serial, result) {
                    self.finish_swap();
                    EventOutcome::MetadataReady
                } else {
                    EventOutcome::MetadataFailed
                }
            }
            EngineEvent::Items { serial, result } => {
                let Some(kind) = self.catalogue.pending.remove(&serial) else {
                    trace!(serial, "Discarding unexpected listing");
                    return EventOutcome::Stale { serial };
                };
                match result {
                    Ok(items) => {
                        debug!(kind = kind.label(), count = items.len(), "Catalogue loaded");
                        self.catalogue.store(kind, items);
                    }
                    Err(e) => error!(kind = kind.label(), "Error listing items: {e}"),
                }
                EventOutcome::Catalogue(kind)
            }
        }
    }

    fn resolve_tile(&mut self, result: TileResult) -> EventOutcome {
        let serial = result.serial();
        match self.session.jobs.resolve(result) {
            Some(_) => {
                self.pyramid.collect();
                EventOutcome::TileResolved { serial }
            }
            None => EventOutcome::Stale { serial },
        }
    }

    fn finish_swap(&mut self) {
        let state = std::mem::replace(&mut self.state, ViewerState::Stable);
        match state {
            ViewerState::Swapping(SwapPolicy::Structural) => {
                self.go_home();
            }
            ViewerState::Swapping(SwapPolicy::Cosmetic { stash }) => {
                if let Err(e) = self.viewport.apply(stash) {
                    warn!("Cannot restore position, going home: {e}");
                    self.go_home();
                }
            }
            ViewerState::Stable => {}
        }
        if std::mem::take(&mut self.resize_pending) {
            if self.at_home {
                self.go_home();
            } else if let Some(meta) = self.source.metadata().ready() {
                self.home_margins =
                    compute_home_margins(meta, self.viewport.width, self.viewport.height);
            }
        }
        info!(params = %self.source.params(), "Tile source ready");
    }

    /// Ask the engine for its fractal and colourer lists.
    pub fn refresh_catalogue(&mut self) {
        for kind in [ListKind::Fractals, ListKind::Colourers] {
            let serial = self.session.serials.next();
            match self.engine.list_items(serial, kind) {
                Ok(()) => {
                    self.catalogue.pending.insert(serial, kind);
                }
                Err(e) => error!(kind = kind.label(), "Error requesting list: {e}"),
            }
        }
    }

    // -- export -------------------------------------------------------------

    /// Everything the engine needs to render the current position at
    /// `width`×`height`, widened so the output is undistorted.
    pub fn export_spec(&self, width: u32, height: u32) -> crate::Result<RenderSpec> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidOutputSize { width, height }.into());
        }
        let view = fix_aspect_ratio(&self.get_position()?, width, height);
        let params = self.source.params();
        Ok(RenderSpec {
            origin: view.origin,
            axes: view.axes,
            width,
            height,
            max_iter: params.max_iter,
            algorithm: params.algorithm.clone(),
            colourer: params.colourer.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEngine;
    use brotview_core::{Complex, NormPoint};

    fn params() -> EngineParameterSet {
        EngineParameterSet {
            algorithm: "original".into(),
            max_iter: 256,
            colourer: "log-rainbow".into(),
        }
    }

    fn plot() -> View {
        View::new(Complex::new(-3.0, -2.0), Complex::new(4.0, 4.0)).unwrap()
    }

    fn ready_viewer() -> Viewer<RecordingEngine> {
        let mut v = Viewer::new(RecordingEngine::default(), params(), 800, 600, 128).unwrap();
        let serial = v.source().metadata_serial();
        v.handle_event(EngineEvent::Metadata {
            serial,
            result: Ok(plot()),
        });
        v
    }

    #[test]
    fn zero_max_iter_rejected() {
        let bad = EngineParameterSet {
            max_iter: 0,
            ..params()
        };
        assert!(matches!(
            Viewer::new(RecordingEngine::default(), bad, 10, 10, 128),
            Err(BridgeError::InvalidMaxIterations(0))
        ));
        let mut v = ready_viewer();
        assert_eq!(v.set_max_iter(0), Err(BridgeError::InvalidMaxIterations(0)));
    }

    #[test]
    fn position_needs_metadata() {
        let v = Viewer::new(RecordingEngine::default(), params(), 800, 600, 128).unwrap();
        assert_eq!(
            v.get_position(),
            Err(BridgeError::Core(CoreError::MetadataPending))
        );
        assert!(v.export_spec(100, 100).is_err());
    }

    #[test]
    fn first_metadata_goes_home() {
        let v = ready_viewer();
        assert_eq!(v.state(), ViewerState::Stable);
        assert!(v.is_at_home());
        let m = v.home_margins().unwrap();
        assert!((m.left - 100.0).abs() < 1e-9);
        let shown = v.get_position().unwrap();
        assert!((shown.axes.im - 4.0).abs() < 0.01);
    }

    #[test]
    fn identical_parameter_is_noop() {
        let mut v = ready_viewer();
        let generation = v.source().generation();
        assert_eq!(v.set_max_iter(256).unwrap(), ParameterChange::Unchanged);
        assert_eq!(v.set_colourer("log-rainbow").unwrap(), ParameterChange::Unchanged);
        assert_eq!(v.source().generation(), generation);
        assert_eq!(v.state(), ViewerState::Stable);
    }

    #[test]
    fn structural_wins_over_pending_cosmetic() {
        let mut v = ready_viewer();
        v.zoom_by(8.0);
        v.set_max_iter(1024).unwrap();
        assert!(matches!(
            v.state(),
            ViewerState::Swapping(SwapPolicy::Cosmetic { .. })
        ));
        v.set_algorithm("mandel3").unwrap();
        assert_eq!(v.state(), ViewerState::Swapping(SwapPolicy::Structural));
        // A later cosmetic change does not bring the stash back.
        v.set_colourer("white").unwrap();
        assert_eq!(v.state(), ViewerState::Swapping(SwapPolicy::Structural));
    }

    #[test]
    fn second_cosmetic_keeps_first_stash() {
        let mut v = ready_viewer();
        v.pan_by(40.0, -25.0);
        let before = v.viewport().pan_zoom();
        v.set_max_iter(512).unwrap();
        v.set_colourer("mandy").unwrap();
        assert_eq!(
            v.state(),
            ViewerState::Swapping(SwapPolicy::Cosmetic { stash: before })
        );
    }

    #[test]
    fn resize_away_from_home_updates_margins() {
        let mut v = ready_viewer();
        v.zoom_by(2.0);
        let zoomed = v.viewport().pan_zoom();
        v.resize(600, 800).unwrap();
        assert!(!v.is_at_home());
        let m = v.home_margins().unwrap();
        assert!(m.left.abs() < 1e-9 && m.right.abs() < 1e-9);
        assert!((m.top - 100.0).abs() < 1e-9);
        assert!((m.bottom - 100.0).abs() < 1e-9);
        // The view itself stays put.
        assert_eq!(v.viewport().centre, zoomed.centre);
    }

    #[test]
    fn resize_mid_cosmetic_swap_keeps_image_size() {
        let mut v = ready_viewer();
        v.zoom_by(2.0);
        v.pan_by(40.0, -25.0);
        let before = *v.viewport();
        v.set_max_iter(1024).unwrap();
        v.resize(400, 300).unwrap();

        let serial = v.source().metadata_serial();
        v.handle_event(EngineEvent::Metadata {
            serial,
            result: Ok(plot()),
        });
        assert_eq!(v.state(), ViewerState::Stable);
        let after = v.viewport();
        assert_eq!((after.width, after.height), (400, 300));
        assert!((after.image_width_px() - before.image_width_px()).abs() < 1e-9);
        assert!((after.centre.x - before.centre.x).abs() < 1e-12);
        assert!((after.centre.y - before.centre.y).abs() < 1e-12);
        assert!(!v.is_at_home());
        // Margins follow the deferred resize.
        let m = v.home_margins().unwrap();
        assert!((m.left - 50.0).abs() < 1e-9);
    }

    #[test]
    fn stale_metadata_ignored() {
        let mut v = ready_viewer();
        let old = v.source().metadata_serial();
        v.set_algorithm("mandel3").unwrap();
        let outcome = v.handle_event(EngineEvent::Metadata {
            serial: old,
            result: Ok(plot()),
        });
        assert_eq!(outcome, EventOutcome::Stale { serial: old });
        assert!(!v.source().metadata().is_ready());
    }

    #[test]
    fn metadata_failure_stays_swapping() {
        let mut v = Viewer::new(RecordingEngine::default(), params(), 800, 600, 128).unwrap();
        let serial = v.source().metadata_serial();
        let outcome = v.handle_event(EngineEvent::Metadata {
            serial,
            result: Err("unknown algorithm".into()),
        });
        assert_eq!(outcome, EventOutcome::MetadataFailed);
        assert_eq!(v.state(), ViewerState::Swapping(SwapPolicy::Structural));
        assert!(v.refresh_tiles().is_empty());
    }

    #[test]
    fn catalogue_validates_names_once_loaded() {
        let mut v = ready_viewer();
        // Not loaded yet: anything goes.
        assert!(v.set_colourer("sepia").is_ok());

        v.refresh_catalogue();
        let requests = v.engine().list_requests.clone();
        assert_eq!(requests.len(), 2);
        for (serial, kind) in requests {
            let names: &[&str] = match kind {
                ListKind::Fractals => &["original", "mandel3"],
                ListKind::Colourers => &["mandy", "white"],
            };
            let items = names
                .iter()
                .map(|n| ListItem {
                    name: n.to_string(),
                    description: String::new(),
                })
                .collect();
            assert_eq!(
                v.handle_event(EngineEvent::Items {
                    serial,
                    result: Ok(items)
                }),
                EventOutcome::Catalogue(kind)
            );
        }
        assert_eq!(v.fractals().map(|f| f.len()), Some(2));
        assert_eq!(
            v.set_algorithm("julia"),
            Err(BridgeError::UnknownItem {
                kind: "fractal",
                name: "julia".into()
            })
        );
        assert!(v.set_colourer("white").is_ok());
    }

    #[test]
    fn go_to_invalid_leaves_viewport() {
        let mut v = ready_viewer();
        let before = *v.viewport();
        let dest = Destination {
            mode: EntryMode::Centre,
            centre_real: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            v.go_to_position(&dest),
            Err(BridgeError::Core(CoreError::CentreRequired))
        );
        assert_eq!(*v.viewport(), before);
        assert!(v.is_at_home());
    }

    #[test]
    fn export_spec_matches_output_aspect() {
        let v = ready_viewer();
        let spec = v.export_spec(1920, 1080).unwrap();
        assert!((spec.axes.re / spec.axes.im - 1920.0 / 1080.0).abs() < 1e-9);
        assert_eq!(spec.max_iter, 256);
        assert_eq!(spec.algorithm, "original");
        assert_eq!(
            v.export_spec(0, 10),
            Err(BridgeError::Core(CoreError::InvalidOutputSize {
                width: 0,
                height: 10
            }))
        );
    }

    #[test]
    fn resize_at_home_rehomes() {
        let mut v = ready_viewer();
        v.resize(600, 800).unwrap();
        let m = v.home_margins().unwrap();
        assert_eq!(m.left, 0.0);
        assert!((m.top - 100.0).abs() < 1e-9);
        assert_eq!(v.viewport().centre, NormPoint::CENTRE);
    }

    #[test]
    fn resize_away_from_home_keeps_image_size() {
        let mut v = ready_viewer();
        v.zoom_by(3.0);
        let size = v.viewport().image_width_px();
        let centre = v.viewport().centre;
        v.resize(1000, 700).unwrap();
        assert!((v.viewport().image_width_px() - size).abs() < 1e-9);
        assert_eq!(v.viewport().centre, centre);
    }
}
