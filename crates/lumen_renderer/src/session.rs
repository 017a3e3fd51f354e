//! Progressive render session.
//!
//! A [`RenderSession`] owns everything one view of a scene needs: the
//! built scene, the camera, the integrator settings and the accumulation
//! buffers. Each call to [`RenderSession::render_frame`] draws fresh frame
//! seeds, shades one sample per pixel in parallel and folds it into the
//! running estimate. The `&mut self` receiver means a frame finishes
//! before anything else can touch the session.

use std::time::{Duration, Instant};

use lumen_core::{CameraSettings, RenderSettings, SceneDescription, SceneError, TextureCache};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::accumulator::{AccumulationBuffer, ImageBuffer};
use crate::random::{FrameSeeds, PixelRng};
use crate::renderer::render_pixel;
use crate::scene::BuildResult;
use crate::{Camera, Scene};

/// What happened during one progressive frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    /// 1-based index of the frame within the current accumulation
    pub iteration: u32,
    pub seeds: FrameSeeds,
    pub elapsed: Duration,
}

pub struct RenderSession {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    accumulator: AccumulationBuffer,
    /// Host generator for per-frame seeds
    seed_rng: StdRng,
}

impl RenderSession {
    pub fn new(scene: Scene, camera: CameraSettings, settings: RenderSettings, seed: u64) -> Self {
        let camera = Camera::new(camera);
        let accumulator = AccumulationBuffer::new(camera.image_width(), camera.image_height());

        Self {
            scene,
            camera,
            settings,
            accumulator,
            seed_rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build the scene, camera and settings a description carries.
    pub fn from_description(
        desc: &SceneDescription,
        textures: &mut TextureCache,
        seed: u64,
    ) -> BuildResult<Self> {
        let scene = Scene::from_description(desc, textures)?;
        Ok(Self::new(scene, desc.camera, desc.settings, seed))
    }

    /// Render one progressive frame and blend it into the estimate.
    pub fn render_frame(&mut self) -> FrameStats {
        let start = Instant::now();
        let iteration = self.accumulator.iteration();
        let seeds = FrameSeeds::draw(&mut self.seed_rng);

        let scene = &self.scene;
        let camera = &self.camera;
        let settings = &self.settings;
        self.accumulator.accumulate(|x, y| {
            let mut rng = PixelRng::new(x, y, seeds);
            render_pixel(camera, scene, x, y, settings, &mut rng)
        });

        let elapsed = start.elapsed();
        log::debug!(
            "Frame {} ({}x{}) in {:.1} ms",
            iteration,
            self.accumulator.width(),
            self.accumulator.height(),
            elapsed.as_secs_f64() * 1000.0
        );

        FrameStats {
            iteration,
            seeds,
            elapsed,
        }
    }

    /// Render `frames` frames back to back.
    pub fn render_frames(&mut self, frames: u32) -> Duration {
        (0..frames).map(|_| self.render_frame().elapsed).sum()
    }

    /// Move or re-lens the camera. Restarts accumulation, reallocating the
    /// buffers if the resolution changed.
    pub fn set_camera(&mut self, camera: CameraSettings) -> Result<(), SceneError> {
        camera.validate()?;
        self.camera = Camera::new(camera);
        self.accumulator
            .resize(self.camera.image_width(), self.camera.image_height());
        log::info!(
            "Camera changed ({}x{}), accumulation restarted",
            self.camera.image_width(),
            self.camera.image_height()
        );
        Ok(())
    }

    /// Swap in a different scene. Restarts accumulation.
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.accumulator.reset();
        log::info!(
            "Scene changed ({} primitives), accumulation restarted",
            self.scene.primitives().len()
        );
    }

    /// Change integrator settings. Restarts accumulation.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.accumulator.reset();
    }

    pub fn reset(&mut self) {
        self.accumulator.reset();
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Frames in the current estimate.
    pub fn frames_accumulated(&self) -> u32 {
        self.accumulator.frames_accumulated()
    }

    /// The current gamma-encoded estimate.
    pub fn image(&self) -> &ImageBuffer {
        self.accumulator.front()
    }

    /// The current estimate as 8-bit RGBA, top row first.
    pub fn frame_rgba(&self) -> Vec<u8> {
        self.accumulator.to_rgba8()
    }
}
