//! Emergency Repositioning: the terminal fallback.
//!
//! Lays every object into a square-ish grid over the usable area, largest
//! first in row-major order, shrinking any object that does not fit its cell
//! and centring it there. Objects are never enlarged.
//!
//! The result is always fully contained. If that ever fails to hold the
//! function reports `Overflow`, which the engine treats as a defect rather
//! than a reason to try something else.

use crate::overflow::fit_factor;
use crate::strategy::{StrategyError, StrategyInput, by_area_desc, settle_inside, usable_area};
use cr_core::{DrawableObject, ResizeConfig};

pub fn emergency_reposition(
    objects: &mut [DrawableObject],
    input: &StrategyInput,
    config: &ResizeConfig,
) -> Result<(), StrategyError> {
    let count = objects.len();
    if count == 0 {
        return Ok(());
    }

    // A padding that swallows the viewport leaves nothing to lay out in.
    let mut area = input.usable();
    if area.width <= 0.0 || area.height <= 0.0 {
        area = usable_area(&input.new, 0.0);
    }

    let cols = (count as f32).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    let cell_w = area.width / cols as f32;
    let cell_h = area.height / rows as f32;

    let margin = config.emergency_cell_margin;
    let avail_w = if cell_w > margin { cell_w - margin } else { cell_w };
    let avail_h = if cell_h > margin { cell_h - margin } else { cell_h };

    log::debug!(
        "emergency: {count} objects into {cols}×{rows} grid, cell {cell_w:.1}×{cell_h:.1}"
    );

    for (slot, idx) in by_area_desc(objects).into_iter().enumerate() {
        let object = &mut objects[idx];
        let (w, h) = object.size();
        let factor = fit_factor(w, h, avail_w, avail_h);
        if factor < 1.0 {
            object.scale_uniform(factor);
        }

        let (w, h) = object.size();
        let cell_x = area.x + (slot % cols) as f32 * cell_w;
        let cell_y = area.y + (slot / cols) as f32 * cell_h;
        let x = cell_x + (cell_w - w) / 2.0;
        let y = cell_y + (cell_h - h) / 2.0;
        object.set_position(x, y);
        log::trace!("emergency {} → ({x:.1}, {y:.1}) ×{factor:.3}", object.id);
    }

    match settle_inside(objects, &input.new) {
        0 => Ok(()),
        count => Err(StrategyError::Overflow { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_core::geometry::is_contained;
    use cr_core::{ObjectKind, Viewport};

    fn input(new: (f32, f32), padding: f32) -> StrategyInput {
        StrategyInput {
            old: Viewport::new(800.0, 600.0),
            new: Viewport::new(new.0, new.1),
            padding,
            confidence: 0.5,
        }
    }

    #[test]
    fn contains_everything_and_never_upscales() {
        let mut objects: Vec<DrawableObject> = (0..60)
            .map(|i| {
                if i % 3 == 0 {
                    DrawableObject::text(&format!("t{i}"), "Label", 36.0, 180.0, 44.0)
                } else {
                    DrawableObject::rect(&format!("r{i}"), 40.0 + i as f32 * 7.0, 30.0)
                        .with_position(i as f32 * 13.0, i as f32 * 9.0)
                }
            })
            .collect();
        let before: Vec<_> = objects.iter().map(|o| (o.scale(), o.font_size())).collect();

        emergency_reposition(&mut objects, &input((400.0, 300.0), 10.0), &ResizeConfig::default())
            .unwrap();

        let view = Viewport::new(400.0, 300.0).rect();
        for (o, (scale, font)) in objects.iter().zip(before) {
            assert!(is_contained(&o.bounds(), &view), "{} at {:?}", o.id, o.bounds());
            assert!(o.scale().0 <= scale.0 && o.scale().1 <= scale.1);
            if let (Some(now), Some(was)) = (o.font_size(), font) {
                assert!(now <= was);
            }
        }
    }

    #[test]
    fn small_objects_keep_their_size() {
        let mut objects = vec![
            DrawableObject::rect("a", 20.0, 20.0).with_position(-999.0, -999.0),
            DrawableObject::ellipse("b", 10.0, 10.0).with_position(5000.0, 0.0),
        ];
        emergency_reposition(&mut objects, &input((1000.0, 1000.0), 0.0), &ResizeConfig::default())
            .unwrap();

        assert_eq!(objects[0].scale(), (1.0, 1.0));
        // Two objects → 2×1 grid, cells 500×1000; a is larger so it takes cell 0.
        assert_eq!((objects[0].x, objects[0].y), (240.0, 490.0));
        assert_eq!((objects[1].x, objects[1].y), (745.0, 495.0));
    }

    #[test]
    fn oversized_group_shrinks_as_unit() {
        let mut objects = vec![DrawableObject::group(
            "g",
            2000.0,
            1000.0,
            vec![DrawableObject::rect("child", 500.0, 500.0)],
        )];
        emergency_reposition(&mut objects, &input((500.0, 500.0), 0.0), &ResizeConfig::default())
            .unwrap();

        let (sx, sy) = objects[0].scale();
        assert!((sx - 0.24).abs() < 1e-6 && (sy - 0.24).abs() < 1e-6);
        match &objects[0].kind {
            ObjectKind::Group { children, .. } => {
                assert_eq!(children[0].scale(), (1.0, 1.0));
                assert_eq!((children[0].x, children[0].y), (0.0, 0.0));
            }
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn tiny_viewport_with_huge_padding_still_contains() {
        let mut objects = vec![DrawableObject::rect("r", 300.0, 300.0)];
        emergency_reposition(&mut objects, &input((30.0, 30.0), 500.0), &ResizeConfig::default())
            .unwrap();
        assert!(is_contained(
            &objects[0].bounds(),
            &Viewport::new(30.0, 30.0).rect()
        ));
    }
}
