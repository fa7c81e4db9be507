use std::path::Path;

use bevy::math::DVec3;
use bevy::prelude::*;
use serde::Deserialize;

use crate::ai::{WizardEvent, WizardTuning};
use crate::error::ConfigError;
use crate::navigation::TileTransform;

// ---------------------------------------------------------------------------
// Pursuit config
// ---------------------------------------------------------------------------

/// Session tuning, read from a JSON file. Missing fields fall back to
/// `Default`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    pub maze_file: String,
    /// World units per tile.
    pub tile_size: f64,
    /// World offset added to every tile's corner.
    pub tile_offset: [f64; 3],
    /// World units per second.
    pub wizard_speed: f64,
    pub recalculation_threshold: f64,
    pub cast_delay_secs: f64,
    pub taunt_interval_secs: [f64; 2],
    /// Wizard-to-quarry distance that counts as a catch.
    pub collision_radius: f64,
    /// Fixed simulation rate.
    pub fixed_hz: f64,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            maze_file: "assets/maps/arena.txt".to_string(),
            tile_size: 1.0,
            tile_offset: [0.5, 0.5, 0.0],
            wizard_speed: 3.0,
            recalculation_threshold: 1.0,
            cast_delay_secs: 1.0,
            taunt_interval_secs: [6.0, 12.0],
            collision_radius: 0.5,
            fixed_hz: 64.0,
        }
    }
}

impl PursuitConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tile_size", self.tile_size),
            ("wizard_speed", self.wizard_speed),
            ("fixed_hz", self.fixed_hz),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("recalculation_threshold", self.recalculation_threshold),
            ("cast_delay_secs", self.cast_delay_secs),
            ("collision_radius", self.collision_radius),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        let [lo, hi] = self.taunt_interval_secs;
        if !(lo > 0.0 && lo <= hi) {
            return Err(ConfigError::Invalid(format!(
                "taunt_interval_secs must be an increasing positive range, got [{lo}, {hi}]"
            )));
        }
        Ok(())
    }

    pub fn wizard_tuning(&self) -> WizardTuning {
        WizardTuning {
            speed: self.wizard_speed,
            recalculation_threshold: self.recalculation_threshold,
            cast_delay: self.cast_delay_secs,
            taunt_interval: (self.taunt_interval_secs[0], self.taunt_interval_secs[1]),
        }
    }

    pub fn tile_transform(&self) -> TileTransform {
        TileTransform {
            cell_size: self.tile_size,
            offset: DVec3::from_array(self.tile_offset),
        }
    }
}

// ---------------------------------------------------------------------------
// Session stats
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub paths_started: u32,
    pub path_nodes: u64,
    pub interrupts: u32,
    pub unreachable_alerts: u32,
    pub taunts: u32,
    pub target_defeated: bool,
    pub forced_stop: bool,
}

impl SessionStats {
    pub fn record(&mut self, event: WizardEvent) {
        match event {
            WizardEvent::PathStarted { nodes } => {
                self.paths_started += 1;
                self.path_nodes += nodes as u64;
            }
            WizardEvent::PathInterrupted => self.interrupts += 1,
            WizardEvent::TargetUnreachable => self.unreachable_alerts += 1,
            WizardEvent::Taunt => self.taunts += 1,
            WizardEvent::TargetDefeated => self.target_defeated = true,
            WizardEvent::ForcedStop => self.forced_stop = true,
            WizardEvent::PathExhausted
            | WizardEvent::TargetReachable
            | WizardEvent::TargetCollision => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
