pub mod bounds;
pub mod distance;

pub use bounds::Bounds;
pub use distance::{centroid, haversine_m};
