pub mod config;
pub mod geometry;
pub mod id;
pub mod model;
pub mod snapshot;

pub use config::{ConfigError, ResizeConfig};
pub use geometry::{Containment, Orientation, Rect, area, classify, is_contained, union};
pub use id::ObjectId;
pub use model::*;
pub use snapshot::{Snapshot, SnapshotError};
