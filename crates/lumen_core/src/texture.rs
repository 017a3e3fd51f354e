//! Image texture loading and caching.
//!
//! Image textures are decoded once with the `image` crate, converted to
//! linear RGB floats and shared between every material that references the
//! same path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to open texture {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height} RGB")]
    SizeMismatch { width: u32, height: u32, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image in linear RGB, sampled by surface UV.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first
    pixels: Vec<Vec3>,
    /// Where the pixels came from (for logging)
    pub source: String,
}

impl ImageTexture {
    /// Build a texture from 8-bit sRGB triples.
    pub fn from_srgb8(
        width: u32,
        height: u32,
        bytes: &[u8],
        source: impl Into<String>,
    ) -> TextureResult<Self> {
        let source = source.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(source));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3));
        if expected != Some(bytes.len()) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                actual: bytes.len(),
            });
        }

        let pixels = bytes
            .chunks_exact(3)
            .map(|p| {
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
            source,
        })
    }

    /// Sample at UV with bilinear filtering.
    ///
    /// `u` wraps around; `v` is clamped to [0, 1] with `v = 1` at the top
    /// row of the image.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let u = if u.is_finite() { u.rem_euclid(1.0) } else { 0.0 };
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        let x = u * (self.width - 1) as f32;
        let y = (1.0 - v) * (self.height - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    /// Approximate memory footprint.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// Cache of decoded image textures keyed by the path used in the scene.
pub struct TextureCache {
    textures: HashMap<String, Arc<ImageTexture>>,
    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Resolve relative texture paths against `base_dir` (usually the
    /// directory holding the scene file).
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture, returning the cached copy when present.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<ImageTexture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Register an already decoded texture under `path`.
    pub fn insert(&mut self, path: impl Into<String>, texture: ImageTexture) -> Arc<ImageTexture> {
        let texture = Arc::new(texture);
        self.textures.insert(path.into(), texture.clone());
        texture
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

fn load_texture_file(path: &Path) -> TextureResult<ImageTexture> {
    let img = image::open(path).map_err(|source| TextureError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    ImageTexture::from_srgb8(width, height, rgb.as_raw(), path.to_string_lossy())
}

/// Convert an sRGB byte to a linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> ImageTexture {
        // Left pixel black, right pixel white.
        ImageTexture::from_srgb8(2, 1, &[0, 0, 0, 255, 255, 255], "inline").unwrap()
    }

    #[test]
    fn test_sample_corners_and_wrap() {
        let tex = two_by_one();

        assert!(tex.sample(0.0, 0.5).length() < 1e-6);
        assert!((tex.sample(0.999, 0.5) - Vec3::ONE).length() < 0.01);
        // u = 1.25 wraps to 0.25, a quarter of the way across.
        assert!((tex.sample(1.25, 0.5).x - 0.25).abs() < 1e-5);
        // Non-finite UV never panics.
        assert!(tex.sample(f32::NAN, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_rejects_bad_buffers() {
        assert!(matches!(
            ImageTexture::from_srgb8(2, 2, &[0; 5], "short"),
            Err(TextureError::SizeMismatch { .. })
        ));
        assert!(matches!(
            ImageTexture::from_srgb8(0, 2, &[], "empty"),
            Err(TextureError::Empty(_))
        ));
        // Dimensions whose byte count does not fit in u32.
        assert!(matches!(
            ImageTexture::from_srgb8(65_536, 65_536, &[0; 12], "huge"),
            Err(TextureError::SizeMismatch { width: 65_536, height: 65_536, actual: 12 })
        ));
    }

    #[test]
    fn test_cache_loads_once() {
        let dir = std::env::temp_dir().join(format!("lumen_texture_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("stripes.png");
        image::RgbImage::from_fn(4, 2, |x, _| {
            if x % 2 == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        })
        .save(&file)
        .unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let first = cache.load("stripes.png").unwrap();
        let second = cache.load("stripes.png").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((first.width, first.height), (4, 2));

        assert!(cache.load("missing.png").is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);
        let mid = srgb_to_linear(128);
        assert!(mid > 0.1 && mid < 0.5);
    }
}
