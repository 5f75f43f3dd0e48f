mod geometry;
mod markers;
mod projection;
mod renderer;

pub use markers::{build_markers, marker_at, Marker};
pub use projection::Viewport;
pub use renderer::{LineString, Lod, MapLayers, MapRenderer};
