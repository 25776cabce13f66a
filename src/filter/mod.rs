//! 2D convolution over RGB with a configurable border policy.
//!
//! Alpha is never convolved: every recomputed pixel comes out fully opaque.
//! Sums are accumulated in `f64` and rounded/clamped once on write-back.

mod kernel;

pub use kernel::Kernel;

use serde::{Deserialize, Serialize};

use crate::color::CHANNELS;
use crate::raster::{sample_offset, PixelBuffer};
use crate::surface::Surface;

/// What happens to pixels closer than `half` to an edge, where the kernel
/// window would hang off the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Border pixels keep their original samples
    #[default]
    Preserve,
    /// Border pixels are written as all-zero samples
    Zero,
    /// Border pixels are recomputed, off-image neighbors replicate the nearest edge pixel
    Extend,
}

impl EdgeMode {
    /// Map the boolean `pad_with_zeros` switch onto a mode
    pub fn from_pad_with_zeros(pad_with_zeros: bool) -> Self {
        if pad_with_zeros {
            Self::Zero
        } else {
            Self::Preserve
        }
    }
}

#[inline]
fn to_sample(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Weighted RGB sum around (x, y). `at` maps a possibly off-image
/// coordinate to the pixel that stands in for it.
#[inline]
fn window_sum(
    src: &[u8],
    width: u32,
    kernel: &Kernel,
    x: i64,
    y: i64,
    at: impl Fn(i64, i64) -> (u32, u32),
) -> [f64; 3] {
    let half = kernel.half() as i64;
    let mut acc = [0.0f64; 3];
    for ky in 0..kernel.side() {
        for kx in 0..kernel.side() {
            let w = kernel.weight(kx, ky);
            let (sx, sy) = at(x + kx as i64 - half, y + ky as i64 - half);
            let idx = sample_offset(width, sx, sy);
            acc[0] += src[idx] as f64 * w;
            acc[1] += src[idx + 1] as f64 * w;
            acc[2] += src[idx + 2] as f64 * w;
        }
    }
    acc
}

/// Convolve `samples` in place. Returns the number of recomputed pixels.
fn convolve(samples: &mut [u8], width: u32, height: u32, kernel: &Kernel, mode: EdgeMode) -> usize {
    let src = samples.to_vec();
    if mode == EdgeMode::Zero {
        samples.fill(0);
    }

    let (w, h) = (width as i64, height as i64);
    let half = kernel.half() as i64;
    let interior = |x: i64, y: i64| x >= half && x < w - half && y >= half && y < h - half;
    let clamp = |x: i64, y: i64| (x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);

    let mut recomputed = 0;
    for y in 0..h {
        for x in 0..w {
            if !interior(x, y) && mode != EdgeMode::Extend {
                continue;
            }
            // Interior windows never leave the image, so clamping is a no-op there
            let [r, g, b] = window_sum(&src, width, kernel, x, y, clamp);
            let idx = sample_offset(width, x as u32, y as u32);
            samples[idx] = to_sample(r);
            samples[idx + 1] = to_sample(g);
            samples[idx + 2] = to_sample(b);
            samples[idx + CHANNELS - 1] = 255;
            recomputed += 1;
        }
    }
    recomputed
}

impl<S: Surface> PixelBuffer<S> {
    /// Convolve with `kernel`. Only pixels whose whole window fits in the
    /// image are recomputed; the border keeps its samples, or is zeroed when
    /// `pad_with_zeros` is set.
    pub fn apply_filter(&mut self, kernel: &Kernel, pad_with_zeros: bool) -> usize {
        self.apply_filter_with(kernel, EdgeMode::from_pad_with_zeros(pad_with_zeros))
    }

    /// Convolve with an explicit border policy. Returns the number of recomputed pixels.
    pub fn apply_filter_with(&mut self, kernel: &Kernel, mode: EdgeMode) -> usize {
        let (width, height) = self.dimensions();
        let recomputed = self.modify(|samples| convolve(samples, width, height, kernel, mode));
        log::trace!(
            "{}x{} kernel ({:?}) recomputed {} of {} pixels",
            kernel.side(),
            kernel.side(),
            mode,
            recomputed,
            self.pixel_count()
        );
        recomputed
    }
}
