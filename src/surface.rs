//! The external sample store a [`PixelBuffer`](crate::PixelBuffer) synchronizes with.
//!
//! A surface only knows its size and how to hand over or accept a complete
//! RGBA sample array. How (or whether) it is displayed is none of our business.

use std::cell::Cell;

use crate::color::{Color, CHANNELS};
use crate::error::{PixelError, Result};

/// Full-array sample exchange with whatever owns the pixels
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Copy of all `width * height * 4` samples
    fn get_full_samples(&self) -> Vec<u8>;

    /// Replace all samples. `samples` is always `width * height * 4` long.
    fn put_full_samples(&mut self, samples: &[u8]);

    #[inline]
    fn sample_count(&self) -> usize {
        self.width() as usize * self.height() as usize * CHANNELS
    }
}

/// Both sides of a pixel grid must be at least 1
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PixelError::EmptyDimensions { width, height });
    }
    Ok(())
}

/// RGBA surface held in memory. Counts synchronizations so callers can see
/// how much surface traffic an operation caused.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    samples: Vec<u8>, // RGBA, 4 bytes per pixel
    reads: Cell<usize>,
    writes: usize,
}

impl MemorySurface {
    /// Blank surface, every sample 0
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            samples: vec![0; width as usize * height as usize * CHANNELS],
            reads: Cell::new(0),
            writes: 0,
        })
    }

    /// Surface with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut surface = Self::new(width, height)?;
        for px in surface.samples.chunks_exact_mut(CHANNELS) {
            color.write_to(px);
        }
        Ok(surface)
    }

    /// Surface over already decoded RGBA data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(PixelError::SampleCountMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: data,
            reads: Cell::new(0),
            writes: 0,
        })
    }

    /// Borrow the samples without counting a read
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.samples
    }

    /// Number of `get_full_samples` calls so far
    #[inline]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Number of `put_full_samples` calls so far
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn reset_counters(&mut self) {
        self.reads.set(0);
        self.writes = 0;
    }
}

impl Surface for MemorySurface {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    fn get_full_samples(&self) -> Vec<u8> {
        self.reads.set(self.reads.get() + 1);
        self.samples.clone()
    }

    fn put_full_samples(&mut self, samples: &[u8]) {
        self.writes += 1;
        self.samples.copy_from_slice(samples);
    }
}
