//! Immutable whole-scene snapshots.
//!
//! A snapshot is the MessagePack encoding of a `Scene` (objects and
//! viewport). The bytes are shared behind an `Arc`, so cloning a snapshot
//! into and out of the history log never copies the payload.

use crate::model::Scene;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("failed to encode scene snapshot: {0}")]
    Encode(String),

    #[error("failed to decode scene snapshot: {0}")]
    Decode(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Arc<[u8]>,
}

impl Snapshot {
    pub fn capture(scene: &Scene) -> Result<Self, SnapshotError> {
        let bytes =
            rmp_serde::to_vec_named(scene).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        log::trace!(
            "snapshot: captured {} objects ({} bytes)",
            scene.objects.len(),
            bytes.len()
        );
        Ok(Self {
            bytes: bytes.into(),
        })
    }

    /// Wrap bytes produced elsewhere (e.g. persisted by the host).
    /// Validity is only checked on `decode`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn decode(&self) -> Result<Scene, SnapshotError> {
        rmp_serde::from_slice(&self.bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Snapshot({} bytes)", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawableObject, StrokePattern, Viewport};
    use pretty_assertions::assert_eq;

    fn sample_scene() -> Scene {
        let mut faded = DrawableObject::ellipse("dot", 30.0, 30.0).with_position(-50.0, 10.0);
        faded.capture_original_opacity();
        faded.set_opacity(0.3);
        faded.set_stroke_pattern(Some(StrokePattern::Dashed));

        Scene::with_objects(
            Viewport::new(1200.0, 628.0),
            vec![
                DrawableObject::text("title", "Summer Sale", 48.0, 420.0, 58.0).with_position(40.0, 40.0),
                DrawableObject::group(
                    "logo",
                    120.0,
                    60.0,
                    vec![DrawableObject::image("mark", 60.0, 60.0)],
                )
                .with_position(1000.0, 500.0),
                faded,
            ],
        )
    }

    #[test]
    fn snapshot_roundtrip_is_exact() {
        let scene = sample_scene();
        let snap = Snapshot::capture(&scene).unwrap();
        assert!(!snap.is_empty());
        assert_eq!(snap.decode().unwrap(), scene);
    }

    #[test]
    fn clones_share_payload() {
        let snap = Snapshot::capture(&sample_scene()).unwrap();
        let copy = snap.clone();
        assert_eq!(snap.as_bytes().as_ptr(), copy.as_bytes().as_ptr());
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let snap = Snapshot::from_bytes(vec![0xc1, 0x00, 0xff]);
        assert!(matches!(snap.decode(), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn restore_leaves_scene_untouched_on_error() {
        let mut scene = sample_scene();
        let before = scene.clone();
        let bad = Snapshot::from_bytes(vec![0x01]);
        assert!(scene.restore(&bad).is_err());
        assert_eq!(scene, before);
    }
}
