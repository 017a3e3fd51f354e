//! Lumen Renderer - progressive CPU path tracing
//!
//! A Monte Carlo path tracer that refines its image one frame at a time:
//!
//! - **Geometry**: spheres (optionally moving) and parallelograms, behind
//!   a median-split BVH with stack-based traversal
//! - **Materials**: Lambertian, metal, dielectric and diffuse emitters,
//!   with solid, checker and image textures
//! - **Sampling**: a per-pixel hash generator re-seeded every frame
//! - **Accumulation**: double-buffered running average in gamma space
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{presets, TextureCache};
//! use lumen_renderer::RenderSession;
//!
//! let desc = presets::preset("book-cover")?;
//! let mut session = RenderSession::from_description(&desc, &mut TextureCache::new(), 0)?;
//! for _ in 0..64 {
//!     session.render_frame();
//! }
//! let rgba = session.frame_rgba();
//! ```

pub mod accumulator;
pub mod bvh;
mod camera;
pub mod hittable;
mod material;
mod quad;
pub mod random;
pub mod renderer;
mod scene;
mod session;
mod sphere;
mod texture;

pub use accumulator::{AccumulationBuffer, ImageBuffer};
pub use bvh::{Bvh, BvhError, BvhNode, FlatBvh, FlatBvhNode, TRAVERSAL_STACK_SIZE};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, Primitive};
pub use material::{Color, Material, ScatterResult};
pub use quad::Quad;
pub use random::{FrameSeeds, PixelRng};
pub use renderer::{color_to_rgba, linear_to_gamma, ray_color, render_pixel};
pub use scene::{BuildError, BuildResult, Scene};
pub use session::{FrameStats, RenderSession};
pub use sphere::Sphere;
pub use texture::Texture;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
