//! Intelligent Scaling: uniformly scale the whole composition and recentre it.
//!
//! The scale factor is derived from the union bounding box of all objects
//! against the usable area. For a dramatic reshape (aspect ratio changes by
//! more than `dramatic_aspect_delta`) the factor is simply shrink-to-fit,
//! clamped to `[scale_min, scale_max]`. Otherwise upscaling is capped, with a
//! higher cap when the recommendation is confident.

use crate::strategy::{StrategyError, StrategyInput, settle_inside};
use cr_core::{DrawableObject, ResizeConfig};

/// Not atomic: on `Overflow` every object has already been scaled.
pub fn intelligent_scaling(
    objects: &mut [DrawableObject],
    input: &StrategyInput,
    config: &ResizeConfig,
) -> Result<(), StrategyError> {
    let rects: Vec<_> = objects.iter().map(DrawableObject::bounds).collect();
    let Some(content) = cr_core::union(&rects) else {
        return Ok(());
    };

    let usable = input.usable();
    let fit_x = usable.width / content.width;
    let fit_y = usable.height / content.height;
    let fit = fit_x.min(fit_y);

    let aspect_delta = (input.old.aspect() - input.new.aspect()).abs();
    let scale = if aspect_delta > config.dramatic_aspect_delta {
        fit.clamp(config.scale_min, config.scale_max)
    } else {
        let cap = if input.confidence > config.confident_threshold {
            config.upscale_cap_confident
        } else {
            config.upscale_cap
        };
        fit.min(cap)
    };

    if !scale.is_finite() || scale <= 0.0 {
        return Err(StrategyError::Degenerate(format!(
            "scale factor {scale} for content {:.1}×{:.1}",
            content.width, content.height
        )));
    }

    let offset_x = (input.new.width - content.width * scale) / 2.0 - content.x * scale;
    let offset_y = (input.new.height - content.height * scale) / 2.0 - content.y * scale;
    log::debug!(
        "scaling: factor {scale:.3} (aspect Δ {aspect_delta:.2}), offset ({offset_x:.1}, {offset_y:.1})"
    );

    for object in objects.iter_mut() {
        object.set_position(object.x * scale + offset_x, object.y * scale + offset_y);
        match object.font_size() {
            Some(fs) if fs > 0.0 && fs.is_finite() => {
                let size = (fs * scale)
                    .round()
                    .clamp(config.min_font_size, config.max_font_size);
                object.set_font_size(size);
            }
            _ => object.scale_uniform(scale),
        }
    }

    match settle_inside(objects, &input.new) {
        0 => Ok(()),
        count => Err(StrategyError::Overflow { count }),
    }
}
