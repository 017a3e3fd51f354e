//! Camera, background and render settings.
//!
//! These are the knobs the surrounding UI turns between frames. All of
//! them are plain data with serde support so a scene file can carry them.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a [`CameraSettings`] cannot produce an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("image width must be at least one pixel")]
    ZeroWidth,

    #[error("aspect ratio must be positive, got {0}")]
    AspectRatio(f32),

    #[error("vfov must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("focus distance must be positive, got {0}")]
    FocusDistance(f32),

    #[error("defocus angle cannot be negative, got {0}")]
    DefocusAngle(f32),

    #[error("look_from and look_at coincide")]
    NoViewDirection,
}

/// Camera placement, lens and output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Point the camera looks from
    pub look_from: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Variation angle of rays through each pixel, in degrees (0 = pinhole)
    pub defocus_angle: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
    /// Output width in pixels
    pub image_width: u32,
    /// Width over height
    pub aspect_ratio: f32,
}

impl CameraSettings {
    /// Output height in pixels, never less than one.
    pub fn image_height(&self) -> u32 {
        let height = (self.image_width as f32 / self.aspect_ratio) as u32;
        height.max(1)
    }

    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Check the settings describe a usable camera.
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.image_width == 0 {
            return Err(CameraError::ZeroWidth);
        }
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return Err(CameraError::AspectRatio(self.aspect_ratio));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::FieldOfView(self.vfov));
        }
        if !(self.focus_dist > 0.0) {
            return Err(CameraError::FocusDistance(self.focus_dist));
        }
        if self.defocus_angle < 0.0 {
            return Err(CameraError::DefocusAngle(self.defocus_angle));
        }
        if (self.look_from - self.look_at).length_squared() == 0.0 {
            return Err(CameraError::NoViewDirection);
        }
        Ok(())
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

/// What a ray sees when it escapes the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    /// Vertical blend from `bottom` (looking straight down) to `top`.
    Gradient { bottom: Vec3, top: Vec3 },
    /// A constant color; black for enclosed scenes lit by their own lights.
    Solid { color: Vec3 },
}

impl Background {
    pub fn sky() -> Self {
        Background::Gradient {
            bottom: Vec3::ONE,
            top: Vec3::new(0.5, 0.7, 1.0),
        }
    }

    pub fn black() -> Self {
        Background::Solid { color: Vec3::ZERO }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::sky()
    }
}

/// Integrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Camera samples traced per pixel in each progressive frame
    pub samples_per_frame: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Smallest accepted hit distance, keeps bounced rays off their own surface
    pub t_min: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_frame: 1,
            max_depth: 10,
            t_min: 0.001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_height_never_zero() {
        let settings = CameraSettings::default().with_resolution(400, 16.0 / 9.0);
        assert_eq!(settings.image_height(), 225);

        let wide = CameraSettings::default().with_resolution(3, 10.0);
        assert_eq!(wide.image_height(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_lens() {
        assert!(CameraSettings::default().validate().is_ok());

        let no_fov = CameraSettings::default().with_lens(0.0, 0.0, 1.0);
        assert_eq!(no_fov.validate(), Err(CameraError::FieldOfView(0.0)));

        let no_focus = CameraSettings::default().with_lens(40.0, 0.0, 0.0);
        assert_eq!(no_focus.validate(), Err(CameraError::FocusDistance(0.0)));

        let same_point = CameraSettings::default().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(same_point.validate(), Err(CameraError::NoViewDirection));

        let no_width = CameraSettings::default().with_resolution(0, 1.0);
        assert_eq!(no_width.validate(), Err(CameraError::ZeroWidth));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: RenderSettings = serde_json::from_str(r#"{ "max_depth": 3 }"#).unwrap();
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.samples_per_frame, 1);

        let background: Background =
            serde_json::from_str(r#"{ "type": "solid", "color": [0.0, 0.0, 0.0] }"#).unwrap();
        assert_eq!(background, Background::black());
    }
}
