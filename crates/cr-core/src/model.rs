//! Scene data model for the resize engine.
//!
//! A `Scene` is an ordered list of top-level `DrawableObject`s plus the
//! viewport they are laid out in. Objects are rigid units: the engine moves
//! and rescales them but never reflows their content. Scaling rules differ
//! per kind: text scales through its font size, shapes and groups through
//! independent `scale_x`/`scale_y` factors over an intrinsic size.

use crate::geometry::{Orientation, Rect, aspect_ratio};
use crate::id::ObjectId;
use crate::snapshot::{Snapshot, SnapshotError};
use serde::{Deserialize, Serialize};

// ─── Viewport ────────────────────────────────────────────────────────────

/// The working surface. Origin is always `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::of(self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }
}

// ─── Object kinds ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Image,
    Path,
}

/// Per-kind geometry and scaling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// Text box measured at the current `font_size`. Changing the font size
    /// rescales the box proportionally.
    Text {
        content: String,
        font_size: f32,
        width: f32,
        height: f32,
    },
    Shape {
        shape: ShapeKind,
        width: f32,
        height: f32,
        scale_x: f32,
        scale_y: f32,
    },
    /// Opaque composite. Children are carried along untouched.
    Group {
        width: f32,
        height: f32,
        scale_x: f32,
        scale_y: f32,
        children: Vec<DrawableObject>,
    },
}

/// Coarse kind tag, reported to the recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectTag {
    Text,
    Shape,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokePattern {
    Solid,
    Dashed,
}

// ─── DrawableObject ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableObject {
    /// Hosts may omit the id; a fresh anonymous one is assigned.
    #[serde(default = "ObjectId::anonymous")]
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub stroke_pattern: Option<StrokePattern>,
    /// Restore baseline for overflow feedback. Captured once, the first time
    /// the classifier inspects the object.
    #[serde(default)]
    pub original_opacity: Option<f32>,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl DrawableObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            visible: true,
            opacity: 1.0,
            stroke_pattern: None,
            original_opacity: None,
        }
    }

    pub fn text(id: &str, content: &str, font_size: f32, width: f32, height: f32) -> Self {
        Self::new(
            ObjectId::intern(id),
            ObjectKind::Text {
                content: content.to_string(),
                font_size,
                width,
                height,
            },
        )
    }

    pub fn shape(id: &str, shape: ShapeKind, width: f32, height: f32) -> Self {
        Self::new(
            ObjectId::intern(id),
            ObjectKind::Shape {
                shape,
                width,
                height,
                scale_x: 1.0,
                scale_y: 1.0,
            },
        )
    }

    pub fn rect(id: &str, width: f32, height: f32) -> Self {
        Self::shape(id, ShapeKind::Rect, width, height)
    }

    pub fn ellipse(id: &str, width: f32, height: f32) -> Self {
        Self::shape(id, ShapeKind::Ellipse, width, height)
    }

    pub fn image(id: &str, width: f32, height: f32) -> Self {
        Self::shape(id, ShapeKind::Image, width, height)
    }

    pub fn group(id: &str, width: f32, height: f32, children: Vec<DrawableObject>) -> Self {
        Self::new(
            ObjectId::intern(id),
            ObjectKind::Group {
                width,
                height,
                scale_x: 1.0,
                scale_y: 1.0,
                children,
            },
        )
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn tag(&self) -> ObjectTag {
        match self.kind {
            ObjectKind::Text { .. } => ObjectTag::Text,
            ObjectKind::Shape { .. } => ObjectTag::Shape,
            ObjectKind::Group { .. } => ObjectTag::Group,
        }
    }

    /// On-surface size after scaling.
    pub fn size(&self) -> (f32, f32) {
        match &self.kind {
            ObjectKind::Text { width, height, .. } => (*width, *height),
            ObjectKind::Shape {
                width,
                height,
                scale_x,
                scale_y,
                ..
            }
            | ObjectKind::Group {
                width,
                height,
                scale_x,
                scale_y,
                ..
            } => (width * scale_x, height * scale_y),
        }
    }

    /// On-surface size is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        let (w, h) = self.size();
        w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0
    }

    pub fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(self.x, self.y, w, h)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Current `(scale_x, scale_y)`; text reports `(1, 1)`.
    pub fn scale(&self) -> (f32, f32) {
        match &self.kind {
            ObjectKind::Text { .. } => (1.0, 1.0),
            ObjectKind::Shape {
                scale_x, scale_y, ..
            }
            | ObjectKind::Group {
                scale_x, scale_y, ..
            } => (*scale_x, *scale_y),
        }
    }

    /// Set absolute scale factors. Text has none, so this is a no-op there.
    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        match &mut self.kind {
            ObjectKind::Text { .. } => {}
            ObjectKind::Shape {
                scale_x, scale_y, ..
            }
            | ObjectKind::Group {
                scale_x, scale_y, ..
            } => {
                *scale_x = sx;
                *scale_y = sy;
            }
        }
    }

    pub fn font_size(&self) -> Option<f32> {
        match &self.kind {
            ObjectKind::Text { font_size, .. } => Some(*font_size),
            _ => None,
        }
    }

    /// Set the font size of a text object, rescaling its box to match.
    /// No-op for non-text objects or a non-positive size.
    pub fn set_font_size(&mut self, size: f32) {
        if let ObjectKind::Text {
            font_size,
            width,
            height,
            ..
        } = &mut self.kind
            && *font_size > 0.0
            && size > 0.0
        {
            let ratio = size / *font_size;
            *width *= ratio;
            *height *= ratio;
            *font_size = size;
        }
    }

    /// Scale the object by `factor` using its kind's rule. Text without a
    /// usable font size has its box scaled directly.
    pub fn scale_uniform(&mut self, factor: f32) {
        match self.font_size() {
            Some(fs) if fs > 0.0 && fs.is_finite() => self.set_font_size(fs * factor),
            Some(_) => {
                if let ObjectKind::Text { width, height, .. } = &mut self.kind {
                    *width *= factor;
                    *height *= factor;
                }
            }
            None => {
                let (sx, sy) = self.scale();
                self.set_scale(sx * factor, sy * factor);
            }
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_stroke_pattern(&mut self, pattern: Option<StrokePattern>) {
        self.stroke_pattern = pattern;
    }

    /// Record the current opacity as the restore baseline, unless one was
    /// already captured. Returns the baseline.
    pub fn capture_original_opacity(&mut self) -> f32 {
        *self.original_opacity.get_or_insert(self.opacity)
    }

    pub fn placement(&self) -> ObjectPlacement {
        let b = self.bounds();
        ObjectPlacement {
            id: self.id,
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

/// Position and size of an object at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub id: ObjectId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The complete editable surface: viewport plus ordered top-level objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub viewport: Viewport,
    pub objects: Vec<DrawableObject>,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            objects: Vec::new(),
        }
    }

    pub fn with_objects(viewport: Viewport, objects: Vec<DrawableObject>) -> Self {
        Self { viewport, objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Append an object on top of the stack.
    pub fn add(&mut self, object: DrawableObject) {
        self.objects.push(object);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<DrawableObject> {
        let idx = self.index_of(id)?;
        Some(self.objects.remove(idx))
    }

    pub fn object_tags(&self) -> impl Iterator<Item = ObjectTag> + '_ {
        self.objects.iter().map(DrawableObject::tag)
    }

    /// Union of every object's bounds.
    pub fn content_bounds(&self) -> Option<Rect> {
        let rects: Vec<Rect> = self.objects.iter().map(DrawableObject::bounds).collect();
        crate::geometry::union(&rects)
    }

    pub fn placements(&self) -> Vec<ObjectPlacement> {
        self.objects.iter().map(DrawableObject::placement).collect()
    }

    pub fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        Snapshot::capture(self)
    }

    /// Replace this scene's contents with the decoded snapshot.
    /// On error the scene is left untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        *self = snapshot.decode()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_bounds_apply_scale() {
        let mut r = DrawableObject::rect("box", 100.0, 50.0).with_position(10.0, 20.0);
        r.set_scale(2.0, 0.5);
        assert_eq!(r.bounds(), Rect::new(10.0, 20.0, 200.0, 25.0));
    }

    #[test]
    fn text_font_size_rescales_box() {
        let mut t = DrawableObject::text("title", "Hello", 20.0, 100.0, 24.0);
        t.set_font_size(40.0);
        assert_eq!(t.font_size(), Some(40.0));
        assert_eq!(t.size(), (200.0, 48.0));
        // Text has no scale factors.
        t.set_scale(3.0, 3.0);
        assert_eq!(t.size(), (200.0, 48.0));
    }

    #[test]
    fn zero_font_text_scales_its_box() {
        let mut t = DrawableObject::text("t", "Wide", 0.0, 2000.0, 40.0);
        t.scale_uniform(0.25);
        assert_eq!(t.size(), (500.0, 10.0));
        assert_eq!(t.font_size(), Some(0.0));
    }

    #[test]
    fn malformed_sizes_are_detected() {
        assert!(DrawableObject::rect("ok", 0.0, 10.0).is_well_formed());
        assert!(!DrawableObject::rect("neg", -5.0, 10.0).is_well_formed());
        assert!(!DrawableObject::text("nan", "x", 12.0, f32::NAN, 10.0).is_well_formed());
        let mut g = DrawableObject::group("g", 10.0, 10.0, Vec::new());
        g.set_scale(f32::INFINITY, 1.0);
        assert!(!g.is_well_formed());
    }

    #[test]
    fn missing_id_gets_a_fresh_one() {
        const NO_ID: &str = r#"{
            "kind": { "type": "shape", "shape": "rect", "width": 5.0, "height": 5.0, "scale_x": 1.0, "scale_y": 1.0 },
            "x": 0.0, "y": 0.0
        }"#;
        let a: DrawableObject = serde_json::from_str(NO_ID).unwrap();
        let b: DrawableObject = serde_json::from_str(NO_ID).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.is_anonymous());
        assert!(!ObjectId::intern("hero").is_anonymous());
    }

    #[test]
    fn scale_uniform_dispatches_by_kind() {
        let mut t = DrawableObject::text("t", "Hi", 10.0, 40.0, 12.0);
        t.scale_uniform(0.5);
        assert_eq!(t.font_size(), Some(5.0));

        let mut g = DrawableObject::group("g", 100.0, 100.0, vec![DrawableObject::rect("c", 10.0, 10.0)]);
        g.scale_uniform(0.5);
        assert_eq!(g.scale(), (0.5, 0.5));
        match &g.kind {
            ObjectKind::Group { children, .. } => assert_eq!(children[0].scale(), (1.0, 1.0)),
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn original_opacity_captured_once() {
        let mut r = DrawableObject::rect("r", 10.0, 10.0).with_opacity(0.8);
        assert_eq!(r.capture_original_opacity(), 0.8);
        r.set_opacity(0.2);
        assert_eq!(r.capture_original_opacity(), 0.8);
        assert_eq!(r.original_opacity, Some(0.8));
    }

    #[test]
    fn scene_add_remove() {
        let mut scene = Scene::new(Viewport::default());
        scene.add(DrawableObject::rect("a", 10.0, 10.0));
        scene.add(DrawableObject::rect("b", 10.0, 10.0).with_position(50.0, 50.0));
        assert_eq!(scene.index_of(ObjectId::intern("b")), Some(1));

        let bounds = scene.content_bounds().unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 60.0, 60.0));

        assert!(scene.remove(ObjectId::intern("a")).is_some());
        assert!(scene.remove(ObjectId::intern("a")).is_none());
        assert_eq!(scene.len(), 1);
    }
}
