//! Configuration – reads/writes `~/.parttour/config.toml`.
//!
//! ```toml
//! tick_period_ms = 1000
//! server_timeout_ms = 5000
//!
//! [params.aruco_7.wp1]
//! type = "battery"
//! color = "blue"
//!
//! [simulation]
//! marker_ids = [7]
//! ```
//!
//! The `[params]` table is flattened into dotted keys
//! (`aruco_7.wp1.type`), so quoted dotted keys work as well.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parttour_middleware::SimWorld;
use parttour_mission::ParameterStore;
use parttour_runtime::NodeSettings;
use parttour_types::{Pose, RawDetection, ResultCode, TourError, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable holding an explicit config path.
pub const CONFIG_PATH_VAR: &str = "PARTTOUR_CONFIG";

/// Persisted configuration stored in `~/.parttour/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Period of the navigation poll.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// How long a goal submission waits for the navigation server.
    #[serde(default = "default_server_timeout_ms")]
    pub server_timeout_ms: u64,

    /// Distinct parts after which the cameras are released.
    #[serde(default = "default_target_part_count")]
    pub target_part_count: usize,

    /// Maximum number of waypoints visited.
    #[serde(default = "default_tour_length")]
    pub tour_length: usize,

    #[serde(default = "default_map_frame")]
    pub map_frame: String,

    /// Seconds of history kept per time-varying frame link.
    #[serde(default = "default_tf_cache_secs")]
    pub tf_cache_secs: i64,

    /// Per-marker waypoint targets.
    #[serde(default)]
    pub params: toml::Table,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

fn default_tick_period_ms() -> u64 {
    1000
}
fn default_server_timeout_ms() -> u64 {
    5000
}
fn default_target_part_count() -> usize {
    5
}
fn default_tour_length() -> usize {
    5
}
fn default_map_frame() -> String {
    "map".to_string()
}
fn default_tf_cache_secs() -> i64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            server_timeout_ms: default_server_timeout_ms(),
            target_part_count: default_target_part_count(),
            tour_length: default_tour_length(),
            map_frame: default_map_frame(),
            tf_cache_secs: default_tf_cache_secs(),
            params: toml::Table::new(),
            simulation: None,
        }
    }
}

impl Config {
    /// Sample configuration: marker 7 with five targets and a simulated
    /// world in which all five parts are visible.
    pub fn demo() -> Self {
        let targets = [
            ("battery", "blue", 2u8, 10u8),
            ("pump", "red", 0, 11),
            ("sensor", "green", 1, 12),
            ("regulator", "orange", 3, 13),
            ("battery", "purple", 4, 10),
        ];

        let mut marker = toml::Table::new();
        let mut cameras = Vec::new();
        let mut batches = Vec::new();
        for (i, (part_type, color, color_code, type_code)) in targets.iter().enumerate() {
            let mut slot = toml::Table::new();
            slot.insert("type".to_string(), toml::Value::String(part_type.to_string()));
            slot.insert("color".to_string(), toml::Value::String(color.to_string()));
            marker.insert(format!("wp{}", i + 1), toml::Value::Table(slot));

            let camera = format!("camera{}", i + 1);
            cameras.push(CameraConfig {
                camera: camera.clone(),
                x: 2.0 * i as f64,
                y: if i % 2 == 0 { 1.5 } else { -1.5 },
                z: 1.2,
                yaw: 0.0,
            });
            batches.push(BatchConfig {
                camera,
                detections: vec![DetectionConfig {
                    color: *color_code,
                    part_type: *type_code,
                    x: 0.8,
                    y: 0.0,
                    z: -1.0,
                }],
            });
        }

        let mut params = toml::Table::new();
        params.insert("aruco_7".to_string(), toml::Value::Table(marker));

        Self {
            params,
            simulation: Some(SimulationConfig {
                marker_ids: vec![7],
                odometry: Some([-2.0, -0.5, 0.0]),
                cameras,
                batches,
                run_secs: Some(10),
                ..SimulationConfig::default()
            }),
            ..Self::default()
        }
    }

    /// Reject values the node cannot run with.
    ///
    /// # Errors
    ///
    /// [`TourError::Config`] when `target_part_count` or `tour_length` is zero.
    pub fn validate(&self) -> Result<(), TourError> {
        if self.target_part_count == 0 {
            return Err(TourError::Config("target_part_count must be at least 1".to_string()));
        }
        if self.tour_length == 0 {
            return Err(TourError::Config("tour_length must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn node_settings(&self) -> NodeSettings {
        NodeSettings {
            tick_period: Duration::from_millis(self.tick_period_ms.max(1)),
            server_timeout: Duration::from_millis(self.server_timeout_ms),
            target_part_count: self.target_part_count,
            tour_length: self.tour_length,
            map_frame: self.map_frame.clone(),
        }
    }

    /// Flatten `[params]` into dotted keys.
    pub fn parameter_store(&self) -> ParameterStore {
        let mut store = ParameterStore::new();
        flatten_into(&mut store, "", &self.params);
        store
    }
}

fn flatten_into(store: &mut ParameterStore, prefix: &str, table: &toml::Table) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(store, &path, inner),
            toml::Value::String(s) => store.set(path, s.clone()),
            toml::Value::Integer(i) => store.set(path, i.to_string()),
            toml::Value::Float(f) => store.set(path, f.to_string()),
            toml::Value::Boolean(b) => store.set(path, b.to_string()),
            other => warn!(key = %path, kind = other.type_str(), "Unsupported parameter value ignored"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation
// ─────────────────────────────────────────────────────────────────────────────

/// `[simulation]` – what the headless world reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Pause between replayed sensor messages.
    #[serde(default = "default_replay_interval_ms")]
    pub replay_interval_ms: u64,

    #[serde(default = "default_true")]
    pub navigator_online: bool,

    /// Terminal results for successive goals; `succeeded` once exhausted.
    #[serde(default)]
    pub results: Vec<ResultCode>,

    #[serde(default)]
    pub marker_ids: Vec<i64>,

    /// First odometry sample `[x, y, z]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometry: Option<[f64; 3]>,

    /// Stop the node after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_secs: Option<u64>,

    #[serde(default)]
    pub cameras: Vec<CameraConfig>,

    #[serde(default)]
    pub batches: Vec<BatchConfig>,
}

fn default_true() -> bool {
    true
}
fn default_replay_interval_ms() -> u64 {
    200
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            replay_interval_ms: default_replay_interval_ms(),
            navigator_online: true,
            results: Vec::new(),
            marker_ids: Vec::new(),
            odometry: None,
            run_secs: None,
            cameras: Vec::new(),
            batches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub camera: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub camera: String,
    #[serde(default)]
    pub detections: Vec<DetectionConfig>,
}

/// Wire codes plus a position in the camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub color: u8,
    #[serde(rename = "type")]
    pub part_type: u8,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SimulationConfig {
    pub fn world(&self) -> SimWorld {
        let mut world = SimWorld::new()
            .with_marker_ids(self.marker_ids.clone())
            .with_replay_interval(Duration::from_millis(self.replay_interval_ms));
        if let Some([x, y, z]) = self.odometry {
            world = world.with_odometry(Pose::from_xyz(x, y, z));
        }
        for cam in &self.cameras {
            world = world.with_mount(cam.camera.clone(), Vec3::new(cam.x, cam.y, cam.z), cam.yaw);
        }
        for batch in &self.batches {
            let detections = batch
                .detections
                .iter()
                .map(|d| RawDetection {
                    color: d.color,
                    part_type: d.part_type,
                    pose: Pose::from_xyz(d.x, d.y, d.z),
                })
                .collect();
            world = world.with_batch(batch.camera.clone(), detections);
        }
        world
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Load / save
// ─────────────────────────────────────────────────────────────────────────────

/// `$PARTTOUR_CONFIG`, or `~/.parttour/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var(CONFIG_PATH_VAR) {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".parttour").join("config.toml")
}

/// Load the config from `path`, applying environment overrides, then
/// [`Config::validate`]. Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, TourError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| TourError::Config(format!("failed to read {}: {e}", path.display())))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| TourError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Apply `PARTTOUR_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PARTTOUR_TICK_MS` | `tick_period_ms` |
/// | `PARTTOUR_SERVER_TIMEOUT_MS` | `server_timeout_ms` |
/// | `PARTTOUR_TOUR_LENGTH` | `tour_length` |
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PARTTOUR_TICK_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.tick_period_ms = ms;
    }
    if let Ok(v) = std::env::var("PARTTOUR_SERVER_TIMEOUT_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.server_timeout_ms = ms;
    }
    if let Ok(v) = std::env::var("PARTTOUR_TOUR_LENGTH")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.tour_length = n;
    }
}

/// Write `cfg` to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), TourError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| TourError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| TourError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| TourError::Config(format!("failed to write {}: {e}", path.display())))
}
