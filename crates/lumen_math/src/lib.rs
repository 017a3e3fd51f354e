//! Lumen math - vectors, rays, intervals and bounding boxes.
//!
//! Vector types come straight from `glam`; this crate only adds the
//! small set of geometric types the path tracer is built on.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
