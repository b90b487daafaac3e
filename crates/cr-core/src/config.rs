//! Tunables for the resize engine.
//!
//! Hosts may pass a partial JSON object; missing fields fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("history capacity must be at least 1")]
    ZeroHistory,

    #[error("invalid scale range [{min}, {max}]")]
    ScaleRange { min: f32, max: f32 },

    #[error("invalid font size range [{min}, {max}]")]
    FontRange { min: f32, max: f32 },

    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },

    #[error("{name} must be a finite, non-negative number, got {value}")]
    Negative { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Most recent snapshots kept for undo. Default: **50**.
    pub history_capacity: usize,

    /// Smart Rearrange is skipped above this many objects. Default: **10**.
    pub rearrange_max_objects: usize,

    /// Gap between packed rows/columns in Smart Rearrange. Default: **20**.
    pub rearrange_gutter: f32,

    /// Aspect-ratio change above which scaling only shrinks-to-fit. Default: **2.0**.
    pub dramatic_aspect_delta: f32,

    /// Scale clamp used for dramatic reshapes. Default: **[0.2, 3.0]**.
    pub scale_min: f32,
    pub scale_max: f32,

    /// Upscale caps for ordinary reshapes. Default: **1.2**, **1.5** when confident.
    pub upscale_cap: f32,
    pub upscale_cap_confident: f32,

    /// Recommendation confidence above which the larger cap applies. Default: **0.8**.
    pub confident_threshold: f32,

    /// Font size clamp after Intelligent Scaling. Default: **[8, 200]**.
    pub min_font_size: f32,
    pub max_font_size: f32,

    /// Margin subtracted from each emergency grid cell. Default: **20**.
    pub emergency_cell_margin: f32,

    /// Inset used by the standalone overflow recentre. Default: **40**.
    pub recenter_margin: f32,

    /// Opacity multipliers for partially / fully outside objects.
    pub partial_opacity_factor: f32,
    pub outside_opacity_factor: f32,

    /// Delay before the post-resize feedback event fires. Default: **1000 ms**.
    pub feedback_delay_ms: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            rearrange_max_objects: 10,
            rearrange_gutter: 20.0,
            dramatic_aspect_delta: 2.0,
            scale_min: 0.2,
            scale_max: 3.0,
            upscale_cap: 1.2,
            upscale_cap_confident: 1.5,
            confident_threshold: 0.8,
            min_font_size: 8.0,
            max_font_size: 200.0,
            emergency_cell_margin: 20.0,
            recenter_margin: 40.0,
            partial_opacity_factor: 0.7,
            outside_opacity_factor: 0.3,
            feedback_delay_ms: 1000,
        }
    }
}

impl ResizeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if !(self.scale_min > 0.0 && self.scale_min <= self.scale_max) {
            return Err(ConfigError::ScaleRange {
                min: self.scale_min,
                max: self.scale_max,
            });
        }
        if !(self.min_font_size > 0.0 && self.min_font_size <= self.max_font_size) {
            return Err(ConfigError::FontRange {
                min: self.min_font_size,
                max: self.max_font_size,
            });
        }
        for (name, value) in [
            ("partial_opacity_factor", self.partial_opacity_factor),
            ("outside_opacity_factor", self.outside_opacity_factor),
            ("confident_threshold", self.confident_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        for (name, value) in [
            ("rearrange_gutter", self.rearrange_gutter),
            ("dramatic_aspect_delta", self.dramatic_aspect_delta),
            ("upscale_cap", self.upscale_cap),
            ("upscale_cap_confident", self.upscale_cap_confident),
            ("emergency_cell_margin", self.emergency_cell_margin),
            ("recenter_margin", self.recenter_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ResizeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let config = ResizeConfig {
            scale_min: 4.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleRange { .. })
        ));
    }

    #[test]
    fn rejects_opacity_factor_above_one() {
        let config = ResizeConfig {
            outside_opacity_factor: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "outside_opacity_factor",
                value: 1.5
            })
        );
    }
}
