//! Lumen Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Scene description**: `SceneDescription` with an ordered object list,
//!   a named material registry, camera, background and render settings,
//!   all loadable from JSON
//! - **Presets**: named example scenes built in code
//! - **Textures**: image texture decoding and caching
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{presets, SceneDescription};
//!
//! let scene = presets::preset("cornell-box")?;
//! let from_disk = SceneDescription::load("scenes/room.json")?;
//! ```

pub mod presets;
pub mod scene;
pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use presets::{preset, PRESET_NAMES};
pub use scene::{
    box_quads, MaterialDesc, ObjectDesc, SceneDescription, SceneError, SceneResult, TextureDesc,
};
pub use settings::{Background, CameraError, CameraSettings, RenderSettings};
pub use texture::{ImageTexture, TextureCache, TextureError};
