//! Track generation settings.

use serde::{Deserialize, Serialize};

use crate::geom::{LaneLayout, RailProfile, ResolutionPolicy};

use super::error::ConfigError;

/// Settings for [`super::generate`]. Every field has a default, so partial
/// JSON/JS objects deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Nominal width the lane offsets are multiplied with.
    pub track_width: f64,
    /// Texture repeats per unit of centerline length.
    pub tile_repeat_scale: f64,
    /// Texture repeats across the ribbon.
    pub tile_repeat_v: f64,
    pub lanes: LaneLayout,
    pub rail_profile: RailProfile,
    pub resolution: ResolutionPolicy,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            track_width: 1.0,
            tile_repeat_scale: 2.0,
            tile_repeat_v: 2.0,
            lanes: LaneLayout::default(),
            rail_profile: RailProfile::default(),
            resolution: ResolutionPolicy::default(),
        }
    }
}

/// Texture repeat for the ribbon material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextureTiling {
    pub repeat_u: f64,
    pub repeat_v: f64,
}

impl TrackConfig {
    #[must_use]
    pub fn with_track_width(mut self, width: f64) -> Self {
        self.track_width = width;
        self
    }

    #[must_use]
    pub fn with_tile_repeat(mut self, scale: f64, v: f64) -> Self {
        self.tile_repeat_scale = scale;
        self.tile_repeat_v = v;
        self
    }

    #[must_use]
    pub fn with_lanes(mut self, lanes: LaneLayout) -> Self {
        self.lanes = lanes;
        self
    }

    #[must_use]
    pub fn with_rail_profile(mut self, profile: RailProfile) -> Self {
        self.rail_profile = profile;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: ResolutionPolicy) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.track_width) {
            return Err(ConfigError::InvalidTrackWidth(self.track_width));
        }
        if !is_positive(self.tile_repeat_scale) {
            return Err(ConfigError::InvalidTileRepeatScale(self.tile_repeat_scale));
        }
        if !is_positive(self.tile_repeat_v) {
            return Err(ConfigError::InvalidTileRepeatV(self.tile_repeat_v));
        }
        if !is_positive(self.resolution.samples_per_unit) {
            return Err(ConfigError::InvalidDensity(self.resolution.samples_per_unit));
        }
        self.lanes.check()?;
        self.rail_profile.check()?;
        Ok(())
    }

    /// `(length * tile_repeat_scale, tile_repeat_v)`.
    #[must_use]
    pub fn tiling(&self, total_length: f64) -> TextureTiling {
        TextureTiling {
            repeat_u: total_length * self.tile_repeat_scale,
            repeat_v: self.tile_repeat_v,
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
