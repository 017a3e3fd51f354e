//! Progressive accumulation over a pair of swapped image buffers.
//!
//! Each frame reads the running estimate from the front buffer, blends a
//! fresh sample into it and writes the result to the back buffer; the two
//! swap once the whole frame is written. No pixel is ever read and written
//! in the same frame, so rows can be shaded in parallel.
//!
//! Blending happens on gamma-corrected values. With `n` frames already
//! accumulated the new frame gets weight `1 / (n + 1)`, which makes the
//! front buffer the exact running mean of every gamma-space frame so far.

use rayon::prelude::*;

use crate::renderer::{color_to_gamma, color_to_rgba};
use crate::Color;

/// Row-major image of colors, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// 8-bit RGBA of the stored (already gamma-encoded) colors.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| color_to_rgba(color))
            .collect()
    }
}

/// Double-buffered running average of progressive frames.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    front: ImageBuffer,
    back: ImageBuffer,
    /// 1-based index of the next frame to blend
    iteration: u32,
}

impl AccumulationBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            front: ImageBuffer::new(width, height),
            back: ImageBuffer::new(width, height),
            iteration: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.front.width
    }

    pub fn height(&self) -> u32 {
        self.front.height
    }

    /// Index of the frame the next call to [`Self::accumulate`] produces.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Number of frames in the current estimate.
    pub fn frames_accumulated(&self) -> u32 {
        self.iteration - 1
    }

    /// Forget the history; the next frame replaces the image outright.
    pub fn reset(&mut self) {
        self.iteration = 1;
    }

    /// Reallocate for a new resolution and reset. A no-op reset when the
    /// size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width() || height != self.height() {
            self.front = ImageBuffer::new(width, height);
            self.back = ImageBuffer::new(width, height);
        }
        self.reset();
    }

    /// Weight given to the history when blending frame `iteration`.
    #[inline]
    pub fn history_weight(iteration: u32) -> f32 {
        if iteration < 2 {
            0.0
        } else {
            (iteration - 1) as f32 / iteration as f32
        }
    }

    /// Shade one frame and fold it into the estimate.
    ///
    /// `shade(x, y)` returns the pixel's fresh linear-space sample. Rows
    /// are shaded in parallel; when this returns the buffers have swapped
    /// and the front buffer holds the updated estimate.
    pub fn accumulate<F>(&mut self, shade: F)
    where
        F: Fn(u32, u32) -> Color + Sync,
    {
        let Self {
            front,
            back,
            iteration,
        } = self;
        let width = front.width as usize;
        let alpha = Self::history_weight(*iteration);

        if width > 0 {
            back.pixels
                .par_chunks_mut(width)
                .zip(front.pixels.par_chunks(width))
                .enumerate()
                .for_each(|(y, (out_row, prev_row))| {
                    for (x, (out, prev)) in out_row.iter_mut().zip(prev_row).enumerate() {
                        let sample = color_to_gamma(shade(x as u32, y as u32));
                        *out = if alpha == 0.0 {
                            sample
                        } else {
                            sample.lerp(*prev, alpha)
                        };
                    }
                });
        }

        std::mem::swap(front, back);
        *iteration += 1;
    }

    /// The current estimate, gamma encoded.
    pub fn front(&self) -> &ImageBuffer {
        &self.front
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        self.front.to_rgba8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_first_frame_is_stored_unblended() {
        let mut acc = AccumulationBuffer::new(3, 2);
        acc.accumulate(|x, y| Color::splat((x + y) as f32 * 0.04));

        assert_eq!(acc.iteration(), 2);
        assert_eq!(acc.frames_accumulated(), 1);
        // sqrt(0.04 * 3) for pixel (2, 1)
        assert!((acc.front().get(2, 1).x - 0.12f32.sqrt()).abs() < 1e-6);
        assert_eq!(acc.front().get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_running_mean_of_gamma_frames() {
        let mut acc = AccumulationBuffer::new(1, 1);
        let frames = [0.16f32, 0.64, 0.04, 1.0];
        for value in frames {
            acc.accumulate(|_, _| Color::splat(value));
        }

        let expected = frames.iter().map(|v| v.sqrt()).sum::<f32>() / frames.len() as f32;
        assert!((acc.front().get(0, 0).x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_reset_discards_history() {
        let mut acc = AccumulationBuffer::new(2, 2);
        for _ in 0..5 {
            acc.accumulate(|_, _| Color::ONE);
        }
        acc.reset();
        assert_eq!(acc.iteration(), 1);

        acc.accumulate(|_, _| Color::splat(0.25));
        assert_eq!(acc.front().get(1, 1), Color::splat(0.5));
    }

    #[test]
    fn test_resize_reallocates() {
        let mut acc = AccumulationBuffer::new(4, 4);
        acc.accumulate(|_, _| Color::ONE);
        acc.resize(8, 2);

        assert_eq!((acc.width(), acc.height()), (8, 2));
        assert_eq!(acc.iteration(), 1);
        assert_eq!(acc.front().pixels.len(), 16);
        assert_eq!(acc.to_rgba8().len(), 16 * 4);
    }

    #[test]
    fn test_nan_samples_do_not_poison_the_estimate() {
        let mut acc = AccumulationBuffer::new(1, 1);
        acc.accumulate(|_, _| Color::new(f32::NAN, -1.0, 0.25));
        let c = acc.front().get(0, 0);
        assert_eq!(c, Color::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_variance_shrinks_with_more_frames() {
        // Per-pixel estimates of a noisy constant over many independent
        // pixels; their spread must fall as frames accumulate.
        let pixels = 2000;
        let mut rng = StdRng::seed_from_u64(12345);
        let mut acc = AccumulationBuffer::new(pixels, 1);
        let mut variances = Vec::new();

        for frame in 1..=64u32 {
            let noise: Vec<f32> = (0..pixels).map(|_| rng.gen_range(0.0..0.5)).collect();
            acc.accumulate(|x, _| Color::splat(0.25 + noise[x as usize]));

            if frame.is_power_of_two() {
                let values: Vec<f32> = acc.front().pixels.iter().map(|c| c.x).collect();
                let mean = values.iter().sum::<f32>() / values.len() as f32;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
                variances.push(var);
            }
        }

        assert_eq!(variances.len(), 7);
        for pair in variances.windows(2) {
            assert!(pair[1] < pair[0], "variance did not shrink: {variances:?}");
        }
        assert!(variances[0] / variances[6] > 20.0, "{variances:?}");
    }

    #[test]
    fn test_history_weight() {
        assert_eq!(AccumulationBuffer::history_weight(0), 0.0);
        assert_eq!(AccumulationBuffer::history_weight(1), 0.0);
        assert_eq!(AccumulationBuffer::history_weight(2), 0.5);
        assert!((AccumulationBuffer::history_weight(4) - 0.75).abs() < 1e-7);
    }
}
