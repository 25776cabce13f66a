//! Seeded region growing over 4-connected pixels.
//!
//! Which pixels join the region is entirely up to a [`FloodFillHandler`]:
//! `select` decides membership, `admit_candidate` decides which graph edges
//! may be followed at all. The traversal itself only guarantees that no
//! pixel is ever evaluated twice.

use crate::color::{Color, Position, CHANNELS};
use crate::error::{PixelError, Result};
use crate::raster::{sample_offset, PixelBuffer};
use crate::surface::Surface;

/// Callbacks steering a flood fill
pub trait FloodFillHandler {
    /// Does `position` (currently `color`) belong to the region?
    fn select(&mut self, position: Position, color: Color) -> bool;

    /// Called once per accepted pixel. Returning a color repaints it.
    fn on_accepted(&mut self, _position: Position, _color: Color) -> Option<Color> {
        None
    }

    /// Called once per rejected pixel
    fn on_rejected(&mut self, _position: Position, _color: Color) {}

    /// May the traversal step from the accepted pixel `from` to `to`?
    fn admit_candidate(&mut self, _from: Position, _to: Position) -> bool {
        true
    }
}

/// Visit state of one pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Visit {
    #[default]
    Unvisited = 0,
    Accepted = 1,
    Rejected = 2,
}

/// Outcome of one traversal: the per-pixel visit mask plus tallies
#[derive(Debug, Clone)]
pub struct FloodFill {
    width: u32,
    height: u32,
    mask: Vec<Visit>,
    accepted: usize,
    rejected: usize,
}

impl FloodFill {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mask: vec![Visit::Unvisited; width as usize * height as usize],
            accepted: 0,
            rejected: 0,
        }
    }

    /// State of `position`; off-grid positions read as unvisited
    pub fn state(&self, position: Position) -> Visit {
        if position.x < 0
            || position.y < 0
            || position.x >= self.width as i32
            || position.y >= self.height as i32
        {
            return Visit::Unvisited;
        }
        self.mask[position.y as usize * self.width as usize + position.x as usize]
    }

    #[inline]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    #[inline]
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    #[inline]
    pub fn visited(&self) -> usize {
        self.accepted + self.rejected
    }

    /// Row-major visit mask, one entry per pixel
    #[inline]
    pub fn mask(&self) -> &[Visit] {
        &self.mask
    }

    /// Accepted positions in row-major order
    pub fn accepted_positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as usize;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == Visit::Accepted)
            .map(move |(i, _)| Position::new((i % width) as i32, (i / width) as i32))
    }
}

/// LIFO traversal over `samples`. `seed` must be on the grid.
fn traverse<H: FloodFillHandler + ?Sized>(
    samples: &mut [u8],
    width: u32,
    height: u32,
    seed: Position,
    handler: &mut H,
) -> FloodFill {
    let mut fill = FloodFill::new(width, height);
    let inside = |p: Position| p.x >= 0 && p.y >= 0 && p.x < width as i32 && p.y < height as i32;
    let cell = |p: Position| p.y as usize * width as usize + p.x as usize;

    let mut frontier = vec![seed];
    while let Some(p) = frontier.pop() {
        // A position can be pushed by several accepted neighbors before it is popped
        if fill.mask[cell(p)] != Visit::Unvisited {
            continue;
        }

        let idx = sample_offset(width, p.x as u32, p.y as u32);
        let color = Color::from_samples(&samples[idx..idx + CHANNELS]);

        if handler.select(p, color) {
            fill.mask[cell(p)] = Visit::Accepted;
            fill.accepted += 1;
            if let Some(paint) = handler.on_accepted(p, color) {
                paint.write_to(&mut samples[idx..idx + CHANNELS]);
            }

            for n in p.neighbors4() {
                if inside(n) && fill.mask[cell(n)] == Visit::Unvisited && handler.admit_candidate(p, n) {
                    frontier.push(n);
                }
            }
        } else {
            fill.mask[cell(p)] = Visit::Rejected;
            fill.rejected += 1;
            handler.on_rejected(p, color);
        }
    }
    fill
}

// ============================================================================
// Color Fill
// ============================================================================

/// Classic paint-bucket handler: grow over pixels within `tolerance`
/// (per channel, alpha included) of a reference color and repaint them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFill {
    pub reference: Color,
    pub paint: Color,
    pub tolerance: u8,
}

impl ColorFill {
    pub fn new(reference: Color, paint: Color) -> Self {
        Self {
            reference,
            paint,
            tolerance: 0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl FloodFillHandler for ColorFill {
    fn select(&mut self, _position: Position, color: Color) -> bool {
        color.max_channel_distance(self.reference) <= self.tolerance
    }

    fn on_accepted(&mut self, _position: Position, _color: Color) -> Option<Color> {
        Some(self.paint)
    }
}

impl<S: Surface> PixelBuffer<S> {
    fn checked_seed(&self, seed: Position) -> Result<()> {
        if self.is_inside(seed) {
            return Ok(());
        }
        log::warn!("flood seed ({}; {}) is outside.", seed.x, seed.y);
        Err(PixelError::OutOfBounds {
            x: seed.x,
            y: seed.y,
            width: self.width(),
            height: self.height(),
        })
    }

    /// Grow a region from `seed` under the rules of `handler`.
    /// One surface synchronization for the whole traversal when unbuffered.
    pub fn flood_fill<H: FloodFillHandler + ?Sized>(
        &mut self,
        seed: Position,
        handler: &mut H,
    ) -> Result<FloodFill> {
        self.checked_seed(seed)?;
        let (width, height) = self.dimensions();
        let fill = self.modify(|samples| traverse(samples, width, height, seed, handler));
        log::trace!(
            "flood fill from ({}; {}): {} accepted, {} rejected",
            seed.x,
            seed.y,
            fill.accepted,
            fill.rejected
        );
        Ok(fill)
    }

    /// Paint-bucket fill: repaint the region of pixels within `tolerance`
    /// of the seed's own color
    pub fn flood_fill_color(&mut self, seed: Position, paint: Color, tolerance: u8) -> Result<FloodFill> {
        self.checked_seed(seed)?;
        let (width, height) = self.dimensions();
        Ok(self.modify(|samples| {
            let idx = sample_offset(width, seed.x as u32, seed.y as u32);
            let reference = Color::from_samples(&samples[idx..idx + CHANNELS]);
            let mut handler = ColorFill::new(reference, paint).with_tolerance(tolerance);
            traverse(samples, width, height, seed, &mut handler)
        }))
    }
}
