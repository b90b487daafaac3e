//! Overflow feedback: fades and dashes objects that leave the viewport.
//!
//! | containment        | opacity             | stroke |
//! |--------------------|---------------------|--------|
//! | inside             | baseline            | none   |
//! | partially outside  | baseline × 0.7      | none   |
//! | fully outside      | baseline × 0.3      | dashed |
//!
//! The baseline is each object's `original_opacity`, captured the first
//! time the classifier sees the object, so repeated classification never
//! compounds the fade.

use cr_core::geometry::{Containment, Rect, classify};
use cr_core::{DrawableObject, ResizeConfig, Scene, StrokePattern};

/// Per-class counts from one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct OverflowReport {
    pub inside: usize,
    pub partially_outside: usize,
    pub fully_outside: usize,
}

impl OverflowReport {
    pub fn has_overflow(&self) -> bool {
        self.partially_outside > 0 || self.fully_outside > 0
    }
}

#[derive(Debug, Clone)]
pub struct OverflowClassifier {
    partial_factor: f32,
    outside_factor: f32,
    recenter_margin: f32,
}

impl Default for OverflowClassifier {
    fn default() -> Self {
        Self::from_config(&ResizeConfig::default())
    }
}

impl OverflowClassifier {
    pub fn from_config(config: &ResizeConfig) -> Self {
        Self {
            partial_factor: config.partial_opacity_factor,
            outside_factor: config.outside_opacity_factor,
            recenter_margin: config.recenter_margin,
        }
    }

    /// Classify every object and apply the matching feedback.
    pub fn classify_scene(&self, scene: &mut Scene) -> OverflowReport {
        let viewport = scene.viewport.rect();
        let mut report = OverflowReport::default();

        for object in &mut scene.objects {
            let state = classify(&object.bounds(), &viewport);
            self.apply(object, state);
            match state {
                Containment::Inside => report.inside += 1,
                Containment::PartiallyOutside => report.partially_outside += 1,
                Containment::FullyOutside => report.fully_outside += 1,
            }
        }

        if report.has_overflow() {
            log::debug!(
                "overflow: {} partially, {} fully outside",
                report.partially_outside,
                report.fully_outside
            );
        }
        report
    }

    /// Apply the feedback for `state` to a single object.
    pub fn apply(&self, object: &mut DrawableObject, state: Containment) {
        let baseline = object.capture_original_opacity();
        match state {
            Containment::Inside => {
                object.set_opacity(baseline);
                object.set_stroke_pattern(None);
            }
            Containment::PartiallyOutside => {
                object.set_opacity(baseline * self.partial_factor);
                object.set_stroke_pattern(None);
            }
            Containment::FullyOutside => {
                object.set_opacity(baseline * self.outside_factor);
                object.set_stroke_pattern(Some(StrokePattern::Dashed));
            }
        }
    }

    /// True if any object is not fully inside the viewport.
    pub fn has_overflow(&self, scene: &Scene) -> bool {
        let viewport = scene.viewport.rect();
        scene
            .objects
            .iter()
            .any(|o| classify(&o.bounds(), &viewport) != Containment::Inside)
    }

    /// Pull every fully-outside object back into a grid over the viewport,
    /// shrinking (never growing) each to fit its cell, then reclassify.
    /// Returns the number of objects moved.
    pub fn recenter_overflowing(&self, scene: &mut Scene) -> usize {
        let viewport = scene.viewport.rect();
        let outside: Vec<usize> = scene
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| classify(&o.bounds(), &viewport) == Containment::FullyOutside)
            .map(|(i, _)| i)
            .collect();

        if outside.is_empty() {
            return 0;
        }

        let n = outside.len();
        let cols = (n as f32).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);

        let margin = self
            .recenter_margin
            .min(viewport.width / 4.0)
            .min(viewport.height / 4.0);
        let area = Rect::new(
            margin,
            margin,
            viewport.width - margin * 2.0,
            viewport.height - margin * 2.0,
        );
        let cell_w = area.width / cols as f32;
        let cell_h = area.height / rows as f32;

        for (slot, &idx) in outside.iter().enumerate() {
            let object = &mut scene.objects[idx];
            let (w, h) = object.size();
            let fit = fit_factor(w, h, cell_w, cell_h);
            if fit < 1.0 {
                object.scale_uniform(fit);
            }

            let (w, h) = object.size();
            let col = slot % cols;
            let row = slot / cols;
            let x = area.x + col as f32 * cell_w + (cell_w - w) / 2.0;
            let y = area.y + row as f32 * cell_h + (cell_h - h) / 2.0;
            object.set_position(x, y);
            log::trace!("recenter {} → ({x:.1}, {y:.1})", object.id);
        }

        self.classify_scene(scene);
        log::debug!("overflow: recentred {n} objects into {cols}×{rows} grid");
        n
    }
}

/// Largest factor ≤ 1 that fits `w × h` into `avail_w × avail_h`.
pub(crate) fn fit_factor(w: f32, h: f32, avail_w: f32, avail_h: f32) -> f32 {
    let fx = if w > 0.0 { avail_w / w } else { f32::INFINITY };
    let fy = if h > 0.0 { avail_h / h } else { f32::INFINITY };
    fx.min(fy).min(1.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_core::{ObjectId, Viewport};

    fn scene_with(objects: Vec<DrawableObject>) -> Scene {
        Scene::with_objects(Viewport::new(800.0, 600.0), objects)
    }

    #[test]
    fn fades_by_containment() {
        let mut scene = scene_with(vec![
            DrawableObject::rect("in", 50.0, 50.0).with_position(10.0, 10.0),
            DrawableObject::rect("part", 50.0, 50.0).with_position(780.0, 10.0),
            DrawableObject::rect("out", 50.0, 50.0).with_position(-500.0, 10.0),
        ]);
        let report = OverflowClassifier::default().classify_scene(&mut scene);
        assert_eq!(
            report,
            OverflowReport {
                inside: 1,
                partially_outside: 1,
                fully_outside: 1
            }
        );

        let o = &scene.objects;
        assert_eq!(o[0].opacity, 1.0);
        assert_eq!(o[0].stroke_pattern, None);
        assert!((o[1].opacity - 0.7).abs() < 1e-6);
        assert_eq!(o[1].stroke_pattern, None);
        assert!((o[2].opacity - 0.3).abs() < 1e-6);
        assert_eq!(o[2].stroke_pattern, Some(StrokePattern::Dashed));
    }

    #[test]
    fn opacity_restores_exactly_after_many_passes() {
        let classifier = OverflowClassifier::default();
        let mut scene = scene_with(vec![
            DrawableObject::rect("r", 40.0, 40.0)
                .with_position(-300.0, 0.0)
                .with_opacity(0.65),
        ]);
        for _ in 0..5 {
            classifier.classify_scene(&mut scene);
        }
        scene.objects[0].set_position(790.0, 0.0);
        classifier.classify_scene(&mut scene);
        scene.objects[0].set_position(100.0, 100.0);
        classifier.classify_scene(&mut scene);

        let r = &scene.objects[0];
        assert_eq!(r.opacity, 0.65);
        assert_eq!(r.original_opacity, Some(0.65));
        assert_eq!(r.stroke_pattern, None);
    }

    #[test]
    fn recenter_pulls_outside_objects_in() {
        let classifier = OverflowClassifier::default();
        let mut scene = scene_with(vec![
            DrawableObject::rect("keep", 50.0, 50.0).with_position(10.0, 10.0),
            DrawableObject::rect("far", 2000.0, 1000.0).with_position(5000.0, 0.0),
            DrawableObject::text("lost", "hi", 20.0, 60.0, 24.0).with_position(0.0, -400.0),
        ]);
        assert!(classifier.has_overflow(&scene));

        let moved = classifier.recenter_overflowing(&mut scene);
        assert_eq!(moved, 2);
        assert!(!classifier.has_overflow(&scene));

        // Untouched object stays put.
        let keep = scene.get(ObjectId::intern("keep")).unwrap();
        assert_eq!((keep.x, keep.y), (10.0, 10.0));

        // Small text is not upscaled.
        let lost = scene.get(ObjectId::intern("lost")).unwrap();
        assert_eq!(lost.font_size(), Some(20.0));
    }

    #[test]
    fn recenter_noop_without_overflow() {
        let classifier = OverflowClassifier::default();
        let mut scene = scene_with(vec![DrawableObject::rect("a", 10.0, 10.0)]);
        assert_eq!(classifier.recenter_overflowing(&mut scene), 0);
    }

    #[test]
    fn fit_factor_never_upscales() {
        assert_eq!(fit_factor(10.0, 10.0, 100.0, 100.0), 1.0);
        assert_eq!(fit_factor(200.0, 50.0, 100.0, 100.0), 0.5);
        assert_eq!(fit_factor(0.0, 0.0, 100.0, 100.0), 1.0);
    }
}
