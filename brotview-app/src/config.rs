use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use brotview_bridge::EngineParameterSet;
use brotview_core::Destination;

// ---------------------------------------------------------------------------
// Scripted tour
// ---------------------------------------------------------------------------

/// One step of the scripted tour the headless driver runs through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TourStep {
    Home,
    GoTo { destination: Destination },
    Zoom { factor: f64 },
    Pan { dx: f64, dy: f64 },
    Resize { width: u32, height: u32 },
    SetAlgorithm { name: String },
    SetColourer { name: String },
    SetMaxIter { max_iter: u32 },
    /// Composite the cached tiles into a PNG of the viewport.
    Snapshot { name: String },
    /// Render the current position straight to a PNG of the given size.
    Export { name: String, width: u32, height: u32 },
}

fn default_tour() -> Vec<TourStep> {
    vec![
        TourStep::Snapshot {
            name: "home".into(),
        },
        TourStep::GoTo {
            destination: Destination {
                mode: brotview_core::EntryMode::Centre,
                centre_real: Some(-0.743_643_887),
                centre_imag: Some(0.131_825_904),
                axes_real: Some(0.02),
                ..Default::default()
            },
        },
        TourStep::Snapshot {
            name: "seahorse".into(),
        },
        TourStep::SetMaxIter { max_iter: 1024 },
        TourStep::Snapshot {
            name: "seahorse-1024".into(),
        },
        TourStep::SetColourer {
            name: "mandy".into(),
        },
        TourStep::Export {
            name: "seahorse-mandy".into(),
            width: 1920,
            height: 1080,
        },
        TourStep::SetAlgorithm {
            name: "mandeldrop".into(),
        },
        TourStep::Snapshot {
            name: "mandeldrop-home".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_colourer")]
    pub colourer: String,
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Where snapshots go. When empty, a `snapshots/` folder next to the
    /// executable is used.
    #[serde(default)]
    pub snapshot_dir: String,
    /// How long to wait for the engine to go quiet after each tour step.
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,
    #[serde(default = "default_tour")]
    pub tour: Vec<TourStep>,
}

fn default_window_width() -> u32 {
    800
}
fn default_window_height() -> u32 {
    600
}
fn default_algorithm() -> String {
    "original".into()
}
fn default_colourer() -> String {
    "log-rainbow".into()
}
fn default_max_iter() -> u32 {
    256
}
fn default_tile_size() -> u32 {
    brotview_bridge::TILE_SIZE
}
fn default_settle_timeout_ms() -> u64 {
    10_000
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            algorithm: default_algorithm(),
            colourer: default_colourer(),
            max_iter: default_max_iter(),
            tile_size: default_tile_size(),
            snapshot_dir: String::new(),
            settle_timeout_ms: default_settle_timeout_ms(),
            tour: default_tour(),
        }
    }
}

impl ViewerConfig {
    /// Load the config from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<ViewerConfig>(&json) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        return config.sanitized();
                    }
                    Err(e) => {
                        error!("Failed to parse config: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read config file: {e}");
                }
            }
        } else {
            debug!("No config file at {}", path.display());
        }
        Self::default()
    }

    /// Persist the config next to the executable.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write config: {e}");
                } else {
                    debug!("Saved config");
                }
            }
            Err(e) => error!("Failed to serialize config: {e}"),
        }
    }

    /// Replace values the viewer would refuse with their defaults.
    fn sanitized(mut self) -> Self {
        if self.window_width == 0 || self.window_height == 0 {
            self.window_width = default_window_width();
            self.window_height = default_window_height();
        }
        if self.max_iter == 0 {
            self.max_iter = default_max_iter();
        }
        if self.tile_size == 0 {
            self.tile_size = default_tile_size();
        }
        self
    }

    pub fn engine_params(&self) -> EngineParameterSet {
        EngineParameterSet {
            algorithm: self.algorithm.clone(),
            max_iter: self.max_iter,
            colourer: self.colourer.clone(),
        }
    }

    pub fn snapshot_directory(&self) -> PathBuf {
        if self.snapshot_dir.is_empty() {
            crate::app_dir::snapshots_directory()
        } else {
            PathBuf::from(&self.snapshot_dir)
        }
    }
}

fn config_path() -> PathBuf {
    crate::app_dir::exe_directory().join("brotview.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config: ViewerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.tile_size, 128);
        assert_eq!(config.engine_params().algorithm, "original");
    }

    #[test]
    fn tour_steps_are_tagged() {
        let json = r#"{
            "max_iter": 512,
            "tour": [
                {"action": "home"},
                {"action": "set_max_iter", "max_iter": 2048},
                {"action": "go_to", "destination": {"mode": "centre", "centreReal": 0.25, "centreImag": -0.1, "zoom": 50}},
                {"action": "export", "name": "x", "width": 64, "height": 32}
            ]
        }"#;
        let config: ViewerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_iter, 512);
        assert_eq!(config.tour.len(), 4);
        assert_eq!(config.tour[1], TourStep::SetMaxIter { max_iter: 2048 });
        match &config.tour[2] {
            TourStep::GoTo { destination } => assert_eq!(destination.zoom, Some(50.0)),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn load_falls_back_and_sanitizes() {
        let dir = std::env::temp_dir().join("brotview_test_config");
        let _ = fs::create_dir_all(&dir);

        let missing = dir.join("missing.json");
        assert_eq!(ViewerConfig::load_from(&missing), ViewerConfig::default());

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(ViewerConfig::load_from(&broken), ViewerConfig::default());

        let zeroes = dir.join("zeroes.json");
        fs::write(&zeroes, r#"{"max_iter": 0, "window_width": 0, "tile_size": 0}"#).unwrap();
        let config = ViewerConfig::load_from(&zeroes);
        assert_eq!(config.max_iter, 256);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.tile_size, 128);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join("brotview_test_config_save");
        let path = dir.join("nested").join("brotview.json");
        let config = ViewerConfig {
            colourer: "white".into(),
            tour: vec![TourStep::Home],
            ..Default::default()
        };
        config.save_to(&path);
        assert_eq!(ViewerConfig::load_from(&path), config);
        let _ = fs::remove_dir_all(&dir);
    }
}
