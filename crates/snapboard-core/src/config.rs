//! Engine tuning constants and the serializable configuration that carries them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum distance at which an edge or boundary alignment is offered.
pub const SNAP: f64 = 8.0;

/// Smallest body dimension a shape may have on either axis.
pub const MIN_SIZE: f64 = 16.0;

/// Maximum angle between two edges that still counts as parallel, in degrees.
pub const PARALLEL_TOLERANCE_DEG: f64 = 12.0;

/// Broad-phase slack for sibling snapping, as a multiple of the snap distance.
pub const BROAD_PHASE_FACTOR: f64 = 1.5;

/// Smallest extent a draft rectangle is given while drawing.
pub const DRAFT_MIN_EXTENT: f64 = 1.0;

/// Angles a rotation gesture is pulled towards, in degrees.
pub const ROTATION_SNAP_STOPS_DEG: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// How close a rotation must be to a stop before it is pulled onto it, in degrees.
pub const ROTATION_SNAP_TOLERANCE_DEG: f64 = 5.0;

/// Double-activate detection window.
pub const DOUBLE_CLICK_TIME_MS: u64 = 500;
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for the constraint engine.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snap distance for container and sibling edges.
    pub snap: f64,
    /// Minimum body width/height.
    pub min_size: f64,
    /// Parallel-edge tolerance in degrees.
    pub parallel_tolerance_deg: f64,
    /// Broad-phase multiplier applied to `snap`.
    pub broad_phase_factor: f64,
    /// Rotation stops in degrees. Empty disables rotation snapping.
    pub rotation_snap_stops_deg: Vec<f64>,
    /// Rotation snap tolerance in degrees. Zero disables rotation snapping.
    pub rotation_snap_tolerance_deg: f64,
    /// Maximum delay between two presses of a double-activate.
    pub double_click_ms: u64,
    /// Maximum travel between two presses of a double-activate.
    pub double_click_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap: SNAP,
            min_size: MIN_SIZE,
            parallel_tolerance_deg: PARALLEL_TOLERANCE_DEG,
            broad_phase_factor: BROAD_PHASE_FACTOR,
            rotation_snap_stops_deg: ROTATION_SNAP_STOPS_DEG.to_vec(),
            rotation_snap_tolerance_deg: ROTATION_SNAP_TOLERANCE_DEG,
            double_click_ms: DOUBLE_CLICK_TIME_MS,
            double_click_distance: DOUBLE_CLICK_DISTANCE,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("snap", self.snap),
            ("min_size", self.min_size),
            ("parallel_tolerance_deg", self.parallel_tolerance_deg),
            ("broad_phase_factor", self.broad_phase_factor),
            ("rotation_snap_tolerance_deg", self.rotation_snap_tolerance_deg),
            ("double_click_distance", self.double_click_distance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        if self.snap < 0.0 {
            return Err(ConfigError::Invalid("snap must not be negative".into()));
        }
        if self.min_size < 1.0 {
            return Err(ConfigError::Invalid("min_size must be at least 1".into()));
        }
        if !(0.0..90.0).contains(&self.parallel_tolerance_deg) {
            return Err(ConfigError::Invalid(
                "parallel_tolerance_deg must be in [0, 90)".into(),
            ));
        }
        if self.broad_phase_factor < 1.0 {
            return Err(ConfigError::Invalid(
                "broad_phase_factor must be at least 1".into(),
            ));
        }
        if self.rotation_snap_tolerance_deg < 0.0 {
            return Err(ConfigError::Invalid(
                "rotation_snap_tolerance_deg must not be negative".into(),
            ));
        }
        if self.rotation_snap_stops_deg.iter().any(|s| !s.is_finite()) {
            return Err(ConfigError::Invalid(
                "rotation_snap_stops_deg must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Cosine of the parallel tolerance, the threshold `|cos Δangle|` must reach.
    pub fn parallel_cos(&self) -> f64 {
        self.parallel_tolerance_deg.to_radians().cos()
    }

    /// Separation beyond which a sibling is skipped without edge tests.
    pub fn broad_phase_margin(&self) -> f64 {
        self.snap * self.broad_phase_factor
    }
}
