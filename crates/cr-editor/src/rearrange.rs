//! Smart Rearrange: re-pack objects when the surface flips orientation.
//!
//! Objects keep their size and are packed largest-first, so anchor elements
//! claim space before small elements fill the gaps. A landscape target is
//! packed in rows (left → right, wrapping downwards); a portrait target in
//! columns (top → bottom, wrapping rightwards).

use crate::strategy::{StrategyError, StrategyInput, by_area_desc, settle_inside};
use cr_core::geometry::Orientation;
use cr_core::{DrawableObject, ResizeConfig};

/// Only applies to an orientation flip with at most
/// `config.rearrange_max_objects` objects; otherwise returns
/// `Inapplicable` without touching anything. Not atomic: on `Overflow`
/// some objects may already have moved.
pub fn smart_rearrange(
    objects: &mut [DrawableObject],
    input: &StrategyInput,
    config: &ResizeConfig,
) -> Result<(), StrategyError> {
    let from = input.old.orientation();
    let to = input.new.orientation();
    if from == to {
        return Err(StrategyError::Inapplicable(format!(
            "orientation unchanged ({to:?})"
        )));
    }
    if objects.len() > config.rearrange_max_objects {
        return Err(StrategyError::Inapplicable(format!(
            "{} objects exceeds limit of {}",
            objects.len(),
            config.rearrange_max_objects
        )));
    }

    let order = by_area_desc(objects);
    match to {
        Orientation::Landscape => pack_rows(objects, &order, input, config.rearrange_gutter)?,
        Orientation::Portrait => pack_columns(objects, &order, input, config.rearrange_gutter)?,
    }

    match settle_inside(objects, &input.new) {
        0 => Ok(()),
        count => Err(StrategyError::Overflow { count }),
    }
}

fn pack_rows(
    objects: &mut [DrawableObject],
    order: &[usize],
    input: &StrategyInput,
    gutter: f32,
) -> Result<(), StrategyError> {
    let area = input.usable();
    let mut x = area.x;
    let mut y = area.y;
    let mut row_height = 0.0f32;
    let mut row_has_items = false;

    for (placed, &idx) in order.iter().enumerate() {
        let object = &mut objects[idx];
        let (w, h) = object.size();
        if w > area.width {
            return Err(StrategyError::Overflow {
                count: order.len() - placed,
            });
        }

        if row_has_items && x + w > area.right() {
            y += row_height + gutter;
            x = area.x;
            row_height = 0.0;
        }
        if y + h > area.bottom() {
            return Err(StrategyError::Overflow {
                count: order.len() - placed,
            });
        }

        object.set_position(x, y);
        log::trace!("rearrange {} → row at ({x:.1}, {y:.1})", object.id);

        x += w + gutter;
        row_height = row_height.max(h);
        row_has_items = true;
    }
    Ok(())
}

fn pack_columns(
    objects: &mut [DrawableObject],
    order: &[usize],
    input: &StrategyInput,
    gutter: f32,
) -> Result<(), StrategyError> {
    let area = input.usable();
    let mut x = area.x;
    let mut y = area.y;
    let mut column_width = 0.0f32;
    let mut column_has_items = false;

    for (placed, &idx) in order.iter().enumerate() {
        let object = &mut objects[idx];
        let (w, h) = object.size();
        if h > area.height {
            return Err(StrategyError::Overflow {
                count: order.len() - placed,
            });
        }

        if column_has_items && y + h > area.bottom() {
            x += column_width + gutter;
            y = area.y;
            column_width = 0.0;
        }
        if x + w > area.right() {
            return Err(StrategyError::Overflow {
                count: order.len() - placed,
            });
        }

        object.set_position(x, y);
        log::trace!("rearrange {} → column at ({x:.1}, {y:.1})", object.id);

        y += h + gutter;
        column_width = column_width.max(w);
        column_has_items = true;
    }
    Ok(())
}
