//! Pure geometry helpers shared by the classifier and the resize strategies.
//!
//! Everything here is deterministic and side-effect free: identical inputs
//! always produce identical outputs.

use serde::{Deserialize, Serialize};

/// Slack allowed when checking containment, so that centred or scaled
/// layouts are not rejected for float round-off.
pub const CONTAINMENT_EPSILON: f32 = 1e-3;

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Width × height; zero for degenerate rectangles.
pub fn area(rect: &Rect) -> f32 {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return 0.0;
    }
    rect.width * rect.height
}

/// Bounding-box union of all rectangles. `None` when the input is empty.
pub fn union<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut any = false;

    for r in rects {
        any = true;
        min_x = min_x.min(r.x);
        min_y = min_y.min(r.y);
        max_x = max_x.max(r.right());
        max_y = max_y.max(r.bottom());
    }

    any.then(|| Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Where an object's bounds sit relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Containment {
    Inside,
    PartiallyOutside,
    FullyOutside,
}

/// Classify `bounds` against a viewport rectangle anchored at `(0, 0)`.
///
/// Edges are inclusive: an object touching the viewport edge is inside,
/// and an object whose right edge sits exactly on `x = 0` is still partially
/// visible rather than fully outside.
pub fn classify(bounds: &Rect, viewport: &Rect) -> Containment {
    classify_with_tolerance(bounds, viewport, 0.0)
}

/// `classify` with `CONTAINMENT_EPSILON` slack. True for bounds that are
/// inside up to float round-off; strategies snap such objects fully inside
/// before the exact `classify` is trusted.
pub fn is_contained(bounds: &Rect, viewport: &Rect) -> bool {
    classify_with_tolerance(bounds, viewport, CONTAINMENT_EPSILON) == Containment::Inside
}

fn classify_with_tolerance(bounds: &Rect, viewport: &Rect, eps: f32) -> Containment {
    let (vw, vh) = (viewport.width, viewport.height);

    if bounds.right() < 0.0 || bounds.bottom() < 0.0 || bounds.x > vw || bounds.y > vh {
        return Containment::FullyOutside;
    }

    if bounds.x < -eps || bounds.y < -eps || bounds.right() > vw + eps || bounds.bottom() > vh + eps
    {
        return Containment::PartiallyOutside;
    }

    Containment::Inside
}

/// Landscape when strictly wider than tall; square counts as portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn of(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Width / height, or 0 for a zero-height rectangle.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height == 0.0 { 0.0 } else { width / height }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Rect = Rect::from_size(800.0, 600.0);

    #[test]
    fn area_of_degenerate_is_zero() {
        assert_eq!(area(&Rect::new(0.0, 0.0, 10.0, 20.0)), 200.0);
        assert_eq!(area(&Rect::new(5.0, 5.0, 0.0, 20.0)), 0.0);
        assert_eq!(area(&Rect::new(5.0, 5.0, -3.0, 20.0)), 0.0);
    }

    #[test]
    fn union_covers_all() {
        let rects = [
            Rect::new(10.0, 10.0, 20.0, 20.0),
            Rect::new(-5.0, 40.0, 10.0, 10.0),
        ];
        let u = union(&rects).unwrap();
        assert_eq!(u, Rect::new(-5.0, 10.0, 35.0, 40.0));
        assert!(union(&[] as &[Rect]).is_none());
    }

    #[test]
    fn classify_inside_touching_edges() {
        let b = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(classify(&b, &VIEW), Containment::Inside);
    }

    #[test]
    fn classify_partial() {
        let b = Rect::new(-10.0, 100.0, 50.0, 50.0);
        assert_eq!(classify(&b, &VIEW), Containment::PartiallyOutside);
        let b = Rect::new(780.0, 100.0, 50.0, 50.0);
        assert_eq!(classify(&b, &VIEW), Containment::PartiallyOutside);
    }

    #[test]
    fn classify_fully_outside_each_side() {
        for b in [
            Rect::new(-100.0, 10.0, 50.0, 50.0),
            Rect::new(10.0, -100.0, 50.0, 50.0),
            Rect::new(801.0, 10.0, 50.0, 50.0),
            Rect::new(10.0, 601.0, 50.0, 50.0),
        ] {
            assert_eq!(classify(&b, &VIEW), Containment::FullyOutside, "{b:?}");
        }
    }

    #[test]
    fn classify_is_idempotent() {
        let b = Rect::new(-10.0, 590.0, 40.0, 40.0);
        assert_eq!(classify(&b, &VIEW), classify(&b, &VIEW));
    }

    #[test]
    fn contained_tolerates_round_off() {
        let b = Rect::new(-0.0001, 0.0, 800.0005, 600.0);
        assert!(is_contained(&b, &VIEW));
        assert_eq!(classify(&b, &VIEW), Containment::PartiallyOutside);
    }

    #[test]
    fn orientation_square_is_portrait() {
        assert_eq!(Orientation::of(1200.0, 628.0), Orientation::Landscape);
        assert_eq!(Orientation::of(1080.0, 1920.0), Orientation::Portrait);
        assert_eq!(Orientation::of(500.0, 500.0), Orientation::Portrait);
    }
}
