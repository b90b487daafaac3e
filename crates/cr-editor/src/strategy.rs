//! Shared types for the three resize strategies.
//!
//! Each strategy mutates the objects in place and reports success or a
//! `StrategyError`. Failures leave partial mutations behind; the engine
//! checkpoints before each attempt and restores on failure.

use crate::{emergency, rearrange, scaling};
use cr_core::geometry::{Containment, Rect, classify, is_contained};
use cr_core::{DrawableObject, ResizeConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    SmartRearrange,
    IntelligentScaling,
    EmergencyRepositioning,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SmartRearrange => "smart-rearrange",
            Strategy::IntelligentScaling => "intelligent-scaling",
            Strategy::EmergencyRepositioning => "emergency-repositioning",
        }
    }

    pub fn run(
        &self,
        objects: &mut [DrawableObject],
        input: &StrategyInput,
        config: &ResizeConfig,
    ) -> Result<(), StrategyError> {
        match self {
            Strategy::SmartRearrange => rearrange::smart_rearrange(objects, input, config),
            Strategy::IntelligentScaling => scaling::intelligent_scaling(objects, input, config),
            Strategy::EmergencyRepositioning => {
                emergency::emergency_reposition(objects, input, config)
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// Preconditions not met; nothing was mutated.
    #[error("strategy not applicable: {0}")]
    Inapplicable(String),

    /// Objects remain outside the viewport after the strategy ran.
    #[error("{count} object(s) left outside the viewport")]
    Overflow { count: usize },

    /// Non-finite or otherwise unusable geometry.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Everything a strategy needs besides the objects themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyInput {
    pub old: Viewport,
    pub new: Viewport,
    /// Inset from all four viewport edges.
    pub padding: f32,
    /// Recommender confidence in `[0, 1]`.
    pub confidence: f32,
}

impl StrategyInput {
    pub fn usable(&self) -> Rect {
        usable_area(&self.new, self.padding)
    }
}

/// Viewport inset by `padding` on every side. Padding is clamped so the
/// area never goes negative.
pub fn usable_area(viewport: &Viewport, padding: f32) -> Rect {
    let max_pad = (viewport.width.min(viewport.height) / 2.0).max(0.0);
    let pad = if padding.is_finite() {
        padding.clamp(0.0, max_pad)
    } else {
        0.0
    };
    Rect::new(
        pad,
        pad,
        (viewport.width - pad * 2.0).max(0.0),
        (viewport.height - pad * 2.0).max(0.0),
    )
}

/// Pull objects that overshoot the viewport by no more than float round-off
/// exactly inside, then count the objects the exact classifier still does
/// not see as `Inside`.
pub(crate) fn settle_inside(objects: &mut [DrawableObject], viewport: &Viewport) -> usize {
    let view = viewport.rect();
    let mut outside = 0;
    for object in objects.iter_mut() {
        let bounds = object.bounds();
        if classify(&bounds, &view) == Containment::Inside {
            continue;
        }
        if !is_contained(&bounds, &view) {
            outside += 1;
            continue;
        }

        if bounds.width > view.width || bounds.height > view.height {
            let fit = (view.width / bounds.width).min(view.height / bounds.height);
            object.scale_uniform(fit * SNAP_SHRINK);
        }
        let (w, h) = object.size();
        object.set_position(
            object.x.clamp(0.0, (view.width - w).max(0.0)),
            object.y.clamp(0.0, (view.height - h).max(0.0)),
        );
        log::trace!("snapped {} inside at ({}, {})", object.id, object.x, object.y);

        if classify(&object.bounds(), &view) != Containment::Inside {
            outside += 1;
        }
    }
    outside
}

/// Keeps a shrink-to-fit product from landing one ulp past the edge.
const SNAP_SHRINK: f32 = 1.0 - 1e-6;

/// Object indices sorted by bounding-box area, largest first. Ties keep
/// their original order.
pub(crate) fn by_area_desc(objects: &[DrawableObject]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..objects.len()).collect();
    order.sort_by(|&a, &b| {
        let aa = cr_core::area(&objects[a].bounds());
        let ab = cr_core::area(&objects[b].bounds());
        ab.total_cmp(&aa)
    });
    order
}
