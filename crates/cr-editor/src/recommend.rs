//! Strategy recommendation.
//!
//! The engine asks a `Recommender` which strategy to try first. It is an
//! opaque oracle: anything that maps a `ResizeContext` to a
//! `Recommendation` will do. `HeuristicRecommender` is the built-in scorer.

use crate::strategy::Strategy;
use cr_core::geometry::Orientation;
use cr_core::{ObjectTag, ResizeConfig, Viewport};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Transient description of one resize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeContext {
    pub old_size: Viewport,
    pub new_size: Viewport,
    pub object_count: usize,
    pub object_tags: SmallVec<[ObjectTag; 8]>,
    /// Filled in once a recommendation has been made.
    pub strategy: Option<Strategy>,
    pub confidence: f32,
    pub suggested_padding: f32,
}

impl ResizeContext {
    pub fn new(
        old_size: Viewport,
        new_size: Viewport,
        tags: impl IntoIterator<Item = ObjectTag>,
    ) -> Self {
        let object_tags: SmallVec<[ObjectTag; 8]> = tags.into_iter().collect();
        Self {
            old_size,
            new_size,
            object_count: object_tags.len(),
            object_tags,
            strategy: None,
            confidence: 0.0,
            suggested_padding: 0.0,
        }
    }

    pub fn orientation_flips(&self) -> bool {
        self.old_size.orientation() != self.new_size.orientation()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub confidence: f32,
    pub suggested_padding: f32,
    pub reasoning: String,
}

impl Recommendation {
    /// Clamp confidence into `[0, 1]` and padding to a finite, non-negative value.
    pub fn sanitized(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !self.suggested_padding.is_finite() || self.suggested_padding < 0.0 {
            self.suggested_padding = 0.0;
        }
        self
    }
}

pub trait Recommender {
    fn recommend(&self, context: &ResizeContext) -> Recommendation;
}

impl<F> Recommender for F
where
    F: Fn(&ResizeContext) -> Recommendation,
{
    fn recommend(&self, context: &ResizeContext) -> Recommendation {
        self(context)
    }
}

/// Built-in scorer.
///
/// Orientation flips with few objects are re-packed; everything else is
/// scaled. Confidence drops as the aspect ratio drifts further. Padding is
/// 5 % of the shorter new side, clamped to `[8, 64]`.
#[derive(Debug, Clone)]
pub struct HeuristicRecommender {
    pub max_rearrange_objects: usize,
}

impl HeuristicRecommender {
    pub fn from_config(config: &ResizeConfig) -> Self {
        Self {
            max_rearrange_objects: config.rearrange_max_objects,
        }
    }
}

impl Default for HeuristicRecommender {
    fn default() -> Self {
        Self::from_config(&ResizeConfig::default())
    }
}

impl Recommender for HeuristicRecommender {
    fn recommend(&self, context: &ResizeContext) -> Recommendation {
        let new = context.new_size;
        let padding = (new.width.min(new.height) * 0.05).clamp(8.0, 64.0);
        let aspect_delta = (context.old_size.aspect() - new.aspect()).abs();

        if context.orientation_flips() && context.object_count <= self.max_rearrange_objects {
            let direction = match new.orientation() {
                Orientation::Landscape => "rows",
                Orientation::Portrait => "columns",
            };
            let text_heavy = context
                .object_tags
                .iter()
                .filter(|t| **t == ObjectTag::Text)
                .count()
                * 2
                >= context.object_count;
            return Recommendation {
                strategy: Strategy::SmartRearrange,
                confidence: if text_heavy { 0.85 } else { 0.75 },
                suggested_padding: padding,
                reasoning: format!(
                    "orientation flips with {} objects; re-pack into {direction}",
                    context.object_count
                ),
            };
        }

        let confidence = (0.95 - aspect_delta * 0.15).clamp(0.3, 0.95);
        Recommendation {
            strategy: Strategy::IntelligentScaling,
            confidence,
            suggested_padding: padding,
            reasoning: format!(
                "aspect ratio changes by {aspect_delta:.2}; scale composition uniformly"
            ),
        }
    }
}
