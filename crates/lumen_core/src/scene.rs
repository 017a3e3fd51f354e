//! Data-driven scene description.
//!
//! A scene is an ordered list of primitives that reference materials by
//! name from a registry, plus the camera, background and render settings.
//! Everything here is renderer-agnostic plain data that round-trips
//! through JSON; the renderer turns it into hittable geometry.

use std::collections::BTreeMap;
use std::path::Path;

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{Background, CameraError, CameraSettings, RenderSettings};
use crate::texture::TextureError;

/// Errors raised while loading or validating a scene.
///
/// All of these are configuration errors: they are caught when the scene
/// is constructed, never while rendering.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Object {index} references unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },

    #[error("Invalid material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },

    #[error("Invalid object {index}: {reason}")]
    InvalidObject { index: usize, reason: String },

    #[error("Invalid camera: {0}")]
    InvalidCamera(#[from] CameraError),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Procedural or image texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureDesc {
    Solid { color: Vec3 },
    /// 3-D checkerboard keyed by `floor(p / scale)` parity
    Checker { scale: f32, even: Vec3, odd: Vec3 },
    /// Image looked up by surface UV
    Image { path: String },
}

impl TextureDesc {
    fn validate(&self) -> Result<(), String> {
        match self {
            TextureDesc::Checker { scale, .. } if !(*scale > 0.0) => {
                Err(format!("checker scale must be positive, got {scale}"))
            }
            TextureDesc::Image { path } if path.is_empty() => Err("image path is empty".into()),
            _ => Ok(()),
        }
    }
}

impl From<Vec3> for TextureDesc {
    fn from(color: Vec3) -> Self {
        TextureDesc::Solid { color }
    }
}

/// Material descriptor. The tag picks which payload fields exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        texture: TextureDesc,
    },
    Metal {
        albedo: Vec3,
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        refraction_index: f32,
    },
    DiffuseLight {
        texture: TextureDesc,
    },
}

impl MaterialDesc {
    pub fn lambertian(albedo: Vec3) -> Self {
        MaterialDesc::Lambertian {
            texture: albedo.into(),
        }
    }

    pub fn checker(scale: f32, even: Vec3, odd: Vec3) -> Self {
        MaterialDesc::Lambertian {
            texture: TextureDesc::Checker { scale, even, odd },
        }
    }

    pub fn metal(albedo: Vec3, fuzz: f32) -> Self {
        MaterialDesc::Metal { albedo, fuzz }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        MaterialDesc::Dielectric { refraction_index }
    }

    pub fn light(emit: Vec3) -> Self {
        MaterialDesc::DiffuseLight {
            texture: emit.into(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            MaterialDesc::Lambertian { texture } | MaterialDesc::DiffuseLight { texture } => {
                texture.validate()
            }
            MaterialDesc::Metal { fuzz, .. } if !fuzz.is_finite() => {
                Err(format!("fuzz must be finite, got {fuzz}"))
            }
            MaterialDesc::Dielectric { refraction_index } if !(*refraction_index > 0.0) => Err(
                format!("refraction index must be positive, got {refraction_index}"),
            ),
            _ => Ok(()),
        }
    }
}

/// A primitive in the scene's ordered object list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDesc {
    Sphere {
        center: Vec3,
        radius: f32,
        material: String,
    },
    /// Sphere whose center moves linearly from `center1` (time 0) to
    /// `center2` (time 1)
    MovingSphere {
        center1: Vec3,
        center2: Vec3,
        radius: f32,
        material: String,
    },
    /// Parallelogram with corner `q` and edges `u`, `v`
    Quad {
        q: Vec3,
        u: Vec3,
        v: Vec3,
        material: String,
    },
}

impl ObjectDesc {
    pub fn sphere(center: Vec3, radius: f32, material: impl Into<String>) -> Self {
        ObjectDesc::Sphere {
            center,
            radius,
            material: material.into(),
        }
    }

    pub fn moving_sphere(
        center1: Vec3,
        center2: Vec3,
        radius: f32,
        material: impl Into<String>,
    ) -> Self {
        ObjectDesc::MovingSphere {
            center1,
            center2,
            radius,
            material: material.into(),
        }
    }

    pub fn quad(q: Vec3, u: Vec3, v: Vec3, material: impl Into<String>) -> Self {
        ObjectDesc::Quad {
            q,
            u,
            v,
            material: material.into(),
        }
    }

    /// Name of the registry material this object uses.
    pub fn material(&self) -> &str {
        match self {
            ObjectDesc::Sphere { material, .. }
            | ObjectDesc::MovingSphere { material, .. }
            | ObjectDesc::Quad { material, .. } => material,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ObjectDesc::Sphere { radius, .. } | ObjectDesc::MovingSphere { radius, .. }
                if !(*radius > 0.0 && radius.is_finite()) =>
            {
                Err(format!("sphere radius must be positive, got {radius}"))
            }
            ObjectDesc::Quad { u, v, .. } if u.cross(*v).length_squared() == 0.0 => {
                Err("quad edges are parallel or zero".into())
            }
            _ => Ok(()),
        }
    }
}

/// The six faces of the axis-aligned box with opposite corners `a` and `b`.
pub fn box_quads(a: Vec3, b: Vec3, material: &str) -> Vec<ObjectDesc> {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    vec![
        ObjectDesc::quad(Vec3::new(min.x, min.y, max.z), dx, dy, material), // front
        ObjectDesc::quad(Vec3::new(max.x, min.y, max.z), -dz, dy, material), // right
        ObjectDesc::quad(Vec3::new(max.x, min.y, min.z), -dx, dy, material), // back
        ObjectDesc::quad(Vec3::new(min.x, min.y, min.z), dz, dy, material), // left
        ObjectDesc::quad(Vec3::new(min.x, max.y, max.z), dx, -dz, material), // top
        ObjectDesc::quad(Vec3::new(min.x, min.y, min.z), dx, dz, material), // bottom
    ]
}

/// A complete, loadable scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Scene name (preset name or file stem)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub camera: CameraSettings,

    #[serde(default)]
    pub background: Background,

    #[serde(default)]
    pub settings: RenderSettings,

    /// Material registry
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDesc>,

    /// Primitives in input order; the BVH indexes into this list
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

impl SceneDescription {
    pub fn new(name: impl Into<String>, camera: CameraSettings) -> Self {
        Self {
            name: name.into(),
            camera,
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register (or replace) a named material.
    pub fn add_material(&mut self, name: impl Into<String>, material: MaterialDesc) {
        self.materials.insert(name.into(), material);
    }

    /// Append an object and return its index in the object list.
    pub fn add_object(&mut self, object: ObjectDesc) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Parse a scene from JSON and validate it.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene file. An unnamed scene takes the file stem as its name.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut scene = Self::from_json_str(&json)?;

        if scene.name.is_empty() {
            scene.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        log::info!(
            "Loaded scene '{}' from {}: {} objects, {} materials",
            scene.name,
            path.display(),
            scene.object_count(),
            scene.material_count()
        );
        Ok(scene)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every reference and parameter in the scene.
    pub fn validate(&self) -> SceneResult<()> {
        self.camera.validate()?;

        for (name, material) in &self.materials {
            material
                .validate()
                .map_err(|reason| SceneError::InvalidMaterial {
                    name: name.clone(),
                    reason,
                })?;
        }

        for (index, object) in self.objects.iter().enumerate() {
            if !self.materials.contains_key(object.material()) {
                return Err(SceneError::UnknownMaterial {
                    index,
                    name: object.material().to_string(),
                });
            }
            object
                .validate()
                .map_err(|reason| SceneError::InvalidObject { index, reason })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_sphere() -> SceneDescription {
        let mut scene = SceneDescription::new("one", CameraSettings::default());
        scene.add_material("grey", MaterialDesc::lambertian(Vec3::splat(0.5)));
        scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, "grey"));
        scene
    }

    #[test]
    fn test_json_roundtrip_preserves_scene() {
        let scene = one_sphere();
        let json = scene.to_json().unwrap();
        let parsed = SceneDescription::from_json_str(&json).unwrap();
        assert_eq!(parsed, scene);
    }

    #[test]
    fn test_parse_hand_written_scene() {
        let json = r#"{
            "camera": { "look_from": [0, 2, 5], "look_at": [0, 0, 0], "vfov": 40 },
            "background": { "type": "solid", "color": [0, 0, 0] },
            "materials": {
                "floor": { "type": "lambertian",
                           "texture": { "type": "checker", "scale": 0.5,
                                        "even": [0, 0, 0], "odd": [1, 1, 1] } },
                "lamp": { "type": "diffuse_light", "texture": { "type": "solid", "color": [4, 4, 4] } },
                "chrome": { "type": "metal", "albedo": [0.8, 0.8, 0.8] }
            },
            "objects": [
                { "type": "quad", "q": [-1, 0, -1], "u": [2, 0, 0], "v": [0, 0, 2], "material": "floor" },
                { "type": "sphere", "center": [0, 3, 0], "radius": 0.5, "material": "lamp" },
                { "type": "moving_sphere", "center1": [1, 1, 0], "center2": [1, 2, 0],
                  "radius": 0.3, "material": "chrome" }
            ]
        }"#;

        let scene = SceneDescription::from_json_str(json).unwrap();
        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.camera.vfov, 40.0);
        assert_eq!(scene.camera.image_width, CameraSettings::default().image_width);
        assert_eq!(scene.materials["chrome"], MaterialDesc::metal(Vec3::splat(0.8), 0.0));
    }

    #[test]
    fn test_unknown_material_tag_is_a_parse_error() {
        let json = r#"{ "materials": { "x": { "type": "plastic", "albedo": [1, 1, 1] } } }"#;
        assert!(matches!(
            SceneDescription::from_json_str(json),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_catches_configuration_errors() {
        let mut missing = one_sphere();
        missing.add_object(ObjectDesc::sphere(Vec3::ZERO, 1.0, "nope"));
        assert!(matches!(
            missing.validate(),
            Err(SceneError::UnknownMaterial { index: 1, .. })
        ));

        let mut flat = one_sphere();
        flat.add_object(ObjectDesc::quad(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, "grey"));
        assert!(matches!(
            flat.validate(),
            Err(SceneError::InvalidObject { index: 1, .. })
        ));

        let mut glass = one_sphere();
        glass.add_material("glass", MaterialDesc::dielectric(0.0));
        assert!(matches!(
            glass.validate(),
            Err(SceneError::InvalidMaterial { .. })
        ));

        let mut checker = one_sphere();
        checker.add_material("floor", MaterialDesc::checker(0.0, Vec3::ZERO, Vec3::ONE));
        assert!(checker.validate().is_err());

        let mut tiny = one_sphere();
        tiny.add_object(ObjectDesc::sphere(Vec3::ZERO, -1.0, "grey"));
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn test_box_quads_enclose_the_box() {
        let quads = box_quads(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, "white");
        assert_eq!(quads.len(), 6);

        for quad in &quads {
            let ObjectDesc::Quad { q, u, v, .. } = quad else {
                panic!("box_quads returned a non-quad");
            };
            for corner in [*q, *q + *u, *q + *v, *q + *u + *v] {
                assert!(corner.cmpge(Vec3::ZERO).all());
                assert!(corner.cmple(Vec3::new(1.0, 2.0, 3.0)).all());
            }
            assert!(u.cross(*v).length() > 0.0);
        }
    }

    #[test]
    fn test_load_names_scene_after_file() {
        let path = std::env::temp_dir().join(format!("lumen_scene_{}.json", std::process::id()));
        let mut scene = one_sphere();
        scene.name.clear();
        std::fs::write(&path, scene.to_json().unwrap()).unwrap();

        let loaded = SceneDescription::load(&path).unwrap();
        assert_eq!(loaded.name, format!("lumen_scene_{}", std::process::id()));
        std::fs::remove_file(&path).ok();
    }
}
