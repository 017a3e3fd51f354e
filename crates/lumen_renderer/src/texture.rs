//! Surface color lookups.

use std::sync::Arc;

use crate::Color;
use lumen_core::{ImageTexture, TextureCache, TextureDesc, TextureError};
use lumen_math::Vec3;

/// A color as a function of surface coordinates and position.
#[derive(Clone, Debug)]
pub enum Texture {
    Solid(Color),
    /// Alternating 3-D cells of size `1 / inv_scale`
    Checker {
        inv_scale: f32,
        even: Color,
        odd: Color,
    },
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn checker(scale: f32, even: Color, odd: Color) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    /// Resolve a descriptor, decoding images through `cache`.
    pub fn from_desc(desc: &TextureDesc, cache: &mut TextureCache) -> Result<Self, TextureError> {
        Ok(match desc {
            TextureDesc::Solid { color } => Texture::Solid(*color),
            TextureDesc::Checker { scale, even, odd } => Texture::checker(*scale, *even, *odd),
            TextureDesc::Image { path } => Texture::Image(cache.load(path)?),
        })
    }

    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let cell = (*inv_scale * p).floor();
                let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);
                if parity == 0 {
                    *even
                } else {
                    *odd
                }
            }
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_alternates() {
        let even = Vec3::ONE;
        let odd = Vec3::ZERO;
        let tex = Texture::checker(1.0, even, odd);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), even);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), odd);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), even);
        // Negative cells continue the pattern across the origin.
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5)), odd);
    }

    #[test]
    fn test_from_desc() {
        let mut cache = TextureCache::new();
        let solid = Texture::from_desc(&TextureDesc::Solid { color: Vec3::X }, &mut cache).unwrap();
        assert_eq!(solid.value(0.3, 0.7, Vec3::ZERO), Vec3::X);

        let missing = TextureDesc::Image {
            path: "does/not/exist.png".into(),
        };
        assert!(Texture::from_desc(&missing, &mut cache).is_err());
    }

    #[test]
    fn test_image_texture_uses_uv() {
        let mut cache = TextureCache::new();
        cache.insert(
            "inline",
            ImageTexture::from_srgb8(2, 1, &[0, 0, 0, 255, 255, 255], "inline").unwrap(),
        );
        let tex = Texture::from_desc(
            &TextureDesc::Image {
                path: "inline".into(),
            },
            &mut cache,
        )
        .unwrap();

        assert!(tex.value(0.0, 0.5, Vec3::ZERO).length() < 1e-6);
        assert!(tex.value(0.99, 0.5, Vec3::ZERO).x > 0.9);
    }
}
