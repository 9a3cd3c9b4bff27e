//! Persisted editor configuration.
//!
//! Stored as JSON under the platform config directory. Every field has a
//! default so partial or older files still load.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "roadnet";
const CONFIG_FILE: &str = "editor.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub curve: CurveSettings,
    pub grid: GridSettings,
    pub view: ViewSettings,
    pub history: HistorySettings,
    pub scan: ScanSettings,
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    pub default_interpolation_points: usize,
    pub max_interpolation_points: usize,
    /// Multiplier applied to control point drags.
    pub control_point_move_scaler: f64,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            default_interpolation_points: 10,
            max_interpolation_points: 50,
            control_point_move_scaler: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub show: bool,
    pub snap: bool,
    pub spacing_x: f64,
    pub spacing_z: f64,
    pub snap_subdivisions: bool,
    pub subdivisions: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            show: false,
            snap: false,
            spacing_x: 2.0,
            spacing_z: 2.0,
            snap_subdivisions: false,
            subdivisions: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub node_size: f64,
    pub map_zoom_factor: u32,
    /// Extra screen padding (scaled by zoom) before a connection is culled.
    pub connection_margin: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            node_size: 1.0,
            map_zoom_factor: 1,
            connection_margin: 40.0,
        }
    }
}

impl ViewSettings {
    /// Half-width of the square world area nodes may occupy.
    pub fn world_extent(&self) -> f64 {
        1024.0 * self.map_zoom_factor.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub overlap_tolerance: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            overlap_tolerance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub show_node_ids: bool,
    pub show_hovered_location: bool,
    pub profile_frames: bool,
}

impl EditorConfig {
    /// Default location: `<config_dir>/roadnet/editor.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::info!("No config directory available, using default editor config");
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("Editor config {:?} not found, using defaults", path);
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Editor config loaded from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to load editor config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path().context("no config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
