//! Whole-image, row and column traversal with in-place transformation.
//!
//! All three entry points share one strided walk over linear pixel indices.
//! The sample array is fetched once before the walk and committed once after,
//! so the surface sees O(1) synchronizations no matter how many pixels move.

use super::pixel_buffer::PixelBuffer;
use crate::color::{Color, Position, CHANNELS};
use crate::error::{PixelError, Result};
use crate::surface::Surface;

/// Per-pixel visitor.
///
/// Returning `None` leaves the pixel untouched. That is not the same as
/// returning the current color: a selective filter returns `None` for
/// pixels it does not care about.
pub trait PixelTransform {
    fn transform(&mut self, position: Position, color: Color) -> Option<Color>;
}

impl<F> PixelTransform for F
where
    F: FnMut(Position, Color) -> Option<Color>,
{
    #[inline]
    fn transform(&mut self, position: Position, color: Color) -> Option<Color> {
        self(position, color)
    }
}

/// Visit pixel indices `first, first + stride, ...` below `last`, rewriting
/// the pixels the visitor returns a color for. Returns how many were rewritten.
fn walk_samples<T: PixelTransform + ?Sized>(
    samples: &mut [u8],
    width: u32,
    first: usize,
    last: usize,
    stride: usize,
    visit: &mut T,
) -> usize {
    debug_assert!(stride > 0, "walk stride must be positive");
    let width = width as usize;
    let mut written = 0;

    for p in (first..last).step_by(stride) {
        let idx = p * CHANNELS;
        let position = Position::new((p % width) as i32, (p / width) as i32);
        let current = Color::from_samples(&samples[idx..idx + CHANNELS]);

        if let Some(new_color) = visit.transform(position, current) {
            new_color.write_to(&mut samples[idx..idx + CHANNELS]);
            written += 1;
        }
    }
    written
}

impl<S: Surface> PixelBuffer<S> {
    pub(crate) fn walk<T: PixelTransform + ?Sized>(
        &mut self,
        first: usize,
        last: usize,
        stride: usize,
        visit: &mut T,
    ) -> usize {
        let width = self.width();
        let last = last.min(self.pixel_count());
        let written = self.modify(|samples| walk_samples(samples, width, first, last, stride, visit));
        log::trace!(
            "walk {}..{} step {}: {} pixels rewritten",
            first,
            last,
            stride,
            written
        );
        written
    }

    /// Visit every pixel in row-major order. Returns how many pixels were rewritten.
    pub fn for_each_pixel<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(Position, Color) -> Option<Color>,
    {
        self.apply_transform(&mut visit)
    }

    /// Whole-image walk driven by a [`PixelTransform`] implementation
    pub fn apply_transform<T: PixelTransform + ?Sized>(&mut self, transform: &mut T) -> usize {
        let count = self.pixel_count();
        self.walk(0, count, 1, transform)
    }

    /// Visit the pixels of row `row`, left to right
    pub fn for_each_pixel_in_row<F>(&mut self, row: u32, mut visit: F) -> Result<usize>
    where
        F: FnMut(Position, Color) -> Option<Color>,
    {
        if row >= self.height() {
            log::warn!("row {} is outside (height {}).", row, self.height());
            return Err(PixelError::RowOutOfRange {
                row,
                height: self.height(),
            });
        }
        let first = row as usize * self.width() as usize;
        Ok(self.walk(first, first + self.width() as usize, 1, &mut visit))
    }

    /// Visit the pixels of column `column`, top to bottom
    pub fn for_each_pixel_in_column<F>(&mut self, column: u32, mut visit: F) -> Result<usize>
    where
        F: FnMut(Position, Color) -> Option<Color>,
    {
        if column >= self.width() {
            log::warn!("column {} is outside (width {}).", column, self.width());
            return Err(PixelError::ColumnOutOfRange {
                column,
                width: self.width(),
            });
        }
        let width = self.width() as usize;
        let first = column as usize;
        Ok(self.walk(first, first + self.height() as usize * width, width, &mut visit))
    }
}
