use crate::{hierarchy::HierarchyOptions, rig_error::RigError, types::MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Tunables for the rigging session. Every field has a default so a YAML
/// file only needs to list the values it changes.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct RigConfig {
    /// Backward parent index jump that flags a joint as anomalous
    pub anomaly_gap: usize,
    /// Depth cap for the hierarchy walk, never above `MAX_DEPTH`
    pub max_depth: usize,
    /// Mask coverage above this counts as inside the polygon
    pub mask_threshold: f32,
    /// Resolution of the off-screen selection mask
    pub mask_size: [u32; 2],
    /// Lower bound applied by `AnimationPlayer::set_playback_speed`
    pub min_playback_speed: f32,
    /// Polygon points closer than this (in NDC) to the previous point are
    /// dropped while dragging
    pub point_epsilon: f32,
    pub loop_playback: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            anomaly_gap: 5,
            max_depth: 10,
            mask_threshold: 0.1,
            mask_size: [256, 256],
            min_playback_speed: 0.01,
            point_epsilon: 1.0e-3,
            loop_playback: true,
        }
    }
}

impl RigConfig {
    /// # Errors
    /// May return `RigError`
    pub fn from_yaml(text: &str) -> Result<Self, RigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// # Errors
    /// May return `RigError`
    pub fn load(path: &Path) -> Result<Self, RigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Thresholds for the hierarchy walk. A configured depth above the hard
    /// cap is lowered to it.
    #[must_use]
    pub fn hierarchy_options(&self) -> HierarchyOptions {
        HierarchyOptions {
            anomaly_gap: self.anomaly_gap,
            max_depth: self.max_depth.min(MAX_DEPTH),
        }
    }
}
