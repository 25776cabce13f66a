use std::borrow::Cow;

use crate::color::{Color, Position, CHANNELS};
use crate::error::{PixelError, Result};
use crate::surface::{check_dimensions, MemorySurface, Surface};

// ============================================================================
// Access Strategy
// ============================================================================

/// Where reads and writes land.
///
/// `Direct` round-trips the whole sample array through the surface on every
/// access. `Buffered` owns a snapshot that absorbs all traffic until it is
/// committed back in one piece. Only one of the two can exist at a time.
#[derive(Debug, Clone)]
enum Access {
    Direct,
    Buffered(Vec<u8>),
}

/// Byte offset of the first sample of pixel (x, y).
/// Every component addresses samples through this.
#[inline]
pub(crate) fn sample_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * CHANNELS
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Width x height grid of RGBA samples on top of a [`Surface`].
pub struct PixelBuffer<S: Surface = MemorySurface> {
    surface: S,
    width: u32,
    height: u32,
    access: Access,
}

impl PixelBuffer<MemorySurface> {
    /// Blank in-memory buffer, optionally filled with `color`.
    /// Without a color every sample is 0 (transparent black).
    /// Both sides must be positive.
    pub fn blank(width: u32, height: u32, color: Option<Color>) -> Result<Self> {
        let surface = match color {
            Some(color) => MemorySurface::filled(width, height, color)?,
            None => MemorySurface::new(width, height)?,
        };
        Self::new(surface)
    }

    /// In-memory buffer over an already decoded RGBA image
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(MemorySurface::from_rgba(width, height, data)?)
    }
}

impl<S: Surface> PixelBuffer<S> {
    /// Wrap a surface. Size is read once and fixed from here on;
    /// a surface with an empty side is rejected.
    pub fn new(surface: S) -> Result<Self> {
        let width = surface.width();
        let height = surface.height();
        check_dimensions(width, height)?;
        Ok(Self {
            surface,
            width,
            height,
            access: Access::Direct,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * CHANNELS
    }

    /// The underlying surface. While buffered it does not see pending writes.
    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Give the surface back, committing a pending snapshot first
    pub fn into_surface(mut self) -> S {
        if let Access::Buffered(snapshot) = std::mem::replace(&mut self.access, Access::Direct) {
            log::debug!("committing pending active buffer on release");
            self.surface.put_full_samples(&snapshot);
        }
        self.surface
    }

    // ========================================================================
    // Coordinate Math
    // ========================================================================

    /// True if (x, y) lies on the grid
    #[inline]
    pub fn is_inside(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Sample offset of a position, `None` when it is off the grid
    #[inline]
    pub fn linear_offset(&self, position: Position) -> Option<usize> {
        self.is_inside(position)
            .then(|| sample_offset(self.width, position.x as u32, position.y as u32))
    }

    /// 2D position of a pixel index (index = y * width + x)
    #[inline]
    pub fn image_position(&self, pixel_index: usize) -> Position {
        let width = self.width as usize;
        Position::new((pixel_index % width) as i32, (pixel_index / width) as i32)
    }

    /// Resolve a position to its sample offset, logging when it is off the grid
    fn checked_offset(&self, position: Position) -> Result<usize> {
        self.linear_offset(position).ok_or_else(|| {
            log::warn!("position ({}; {}) is outside.", position.x, position.y);
            PixelError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            }
        })
    }

    // ========================================================================
    // Sample Synchronization
    // ========================================================================

    /// Current samples: borrowed from the snapshot, or one surface read
    pub(crate) fn samples(&self) -> Cow<'_, [u8]> {
        match &self.access {
            Access::Buffered(snapshot) => Cow::Borrowed(snapshot),
            Access::Direct => Cow::Owned(self.surface.get_full_samples()),
        }
    }

    /// Run `f` over the active samples. Unbuffered, that costs exactly one
    /// surface read and one full write-back, however much `f` touches.
    pub(crate) fn modify<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        match &mut self.access {
            Access::Buffered(snapshot) => f(snapshot),
            Access::Direct => {
                let mut samples = self.surface.get_full_samples();
                let result = f(&mut samples);
                self.surface.put_full_samples(&samples);
                result
            }
        }
    }

    // ========================================================================
    // Buffered Mode
    // ========================================================================

    #[inline]
    pub fn is_buffered(&self) -> bool {
        matches!(self.access, Access::Buffered(_))
    }

    /// Snapshot the surface; until closed, all access hits the snapshot only
    pub fn enable_active_buffer(&mut self) -> Result<()> {
        if self.is_buffered() {
            return Err(PixelError::InvalidBufferState("active buffer is already open"));
        }
        log::debug!("opening active buffer ({}x{})", self.width, self.height);
        self.access = Access::Buffered(self.surface.get_full_samples());
        Ok(())
    }

    /// Commit the snapshot back to the surface in one write and drop it
    pub fn close_active_buffer(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.access, Access::Direct) {
            Access::Buffered(snapshot) => {
                log::debug!("committing active buffer ({}x{})", self.width, self.height);
                self.surface.put_full_samples(&snapshot);
                Ok(())
            }
            Access::Direct => Err(PixelError::InvalidBufferState("no active buffer to close")),
        }
    }

    /// Open the active buffer, run `f`, and close it again whatever `f` returns.
    ///
    /// If `f` already closed the buffer itself, its commit stands and nothing
    /// is closed twice; `f`'s result is returned either way.
    pub fn with_active_buffer<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        self.enable_active_buffer()?;
        let result = f(self);
        if self.is_buffered() {
            self.close_active_buffer()?;
        }
        Ok(result)
    }

    // ========================================================================
    // Pixel Access
    // ========================================================================

    /// Read one pixel. Off-grid positions are logged and reported as `OutOfBounds`.
    pub fn get_pixel(&self, position: Position) -> Result<Color> {
        let idx = self.checked_offset(position)?;
        Ok(Color::from_samples(&self.samples()[idx..idx + CHANNELS]))
    }

    /// Write one pixel. Unbuffered, this commits the full sample array.
    pub fn set_pixel(&mut self, position: Position, color: Color) -> Result<()> {
        let idx = self.checked_offset(position)?;
        self.modify(|samples| color.write_to(&mut samples[idx..idx + CHANNELS]));
        Ok(())
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        self.modify(|samples| {
            for px in samples.chunks_exact_mut(CHANNELS) {
                color.write_to(px);
            }
        });
    }

    /// Independent copy of every sample
    pub fn raw_copy(&self) -> Vec<u8> {
        self.samples().into_owned()
    }

    /// One sample at a raw offset, `None` past the end.
    ///
    /// Unbuffered, every call fetches the whole sample array from the
    /// surface. For many reads, enable the active buffer or take a
    /// [`raw_copy`](Self::raw_copy) once.
    pub fn raw_value(&self, sample_index: usize) -> Option<u8> {
        self.samples().get(sample_index).copied()
    }

    /// Overwrite every sample at once. `samples` must match the buffer size.
    pub fn replace_samples(&mut self, samples: &[u8]) -> Result<()> {
        let expected = self.sample_count();
        if samples.len() != expected {
            return Err(PixelError::SampleCountMismatch {
                expected,
                found: samples.len(),
            });
        }
        self.modify(|dest| dest.copy_from_slice(samples));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::blank(w, h, None).unwrap()
    }

    #[test]
    fn test_linear_offset_formula() {
        let buf = buffer(5, 3);
        assert_eq!(buf.linear_offset(Position::new(0, 0)), Some(0));
        assert_eq!(buf.linear_offset(Position::new(4, 0)), Some(16));
        assert_eq!(buf.linear_offset(Position::new(1, 2)), Some((2 * 5 + 1) * 4));
        assert_eq!(buf.linear_offset(Position::new(5, 0)), None);
    }

    #[test]
    fn test_image_position() {
        let buf = buffer(5, 3);
        assert_eq!(buf.image_position(0), Position::new(0, 0));
        assert_eq!(buf.image_position(7), Position::new(2, 1));
        assert_eq!(buf.image_position(14), Position::new(4, 2));
    }

    #[test]
    fn test_is_inside_rejects_edges() {
        let buf = buffer(4, 3);
        assert!(buf.is_inside(Position::new(0, 0)));
        assert!(buf.is_inside(Position::new(3, 2)));
        assert!(!buf.is_inside(Position::new(-1, 0)));
        assert!(!buf.is_inside(Position::new(0, -1)));
        assert!(!buf.is_inside(Position::new(4, 0)));
        assert!(!buf.is_inside(Position::new(0, 3)));
    }

    #[test]
    fn test_roundtrip_unbuffered() {
        let mut buf = buffer(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let c = Color::rgba(x as u8 * 10, y as u8 * 20, 7, 128);
                buf.set_pixel(Position::new(x, y), c).unwrap();
                assert_eq!(buf.get_pixel(Position::new(x, y)).unwrap(), c);
            }
        }
    }

    #[test]
    fn test_roundtrip_buffered() {
        let mut buf = buffer(4, 3);
        let color_at = |x: i32, y: i32| Color::rgba(x as u8 * 10, y as u8 * 20, 7, 200 - x as u8);

        buf.enable_active_buffer().unwrap();
        for y in 0..3 {
            for x in 0..4 {
                buf.set_pixel(Position::new(x, y), color_at(x, y)).unwrap();
                assert_eq!(buf.get_pixel(Position::new(x, y)).unwrap(), color_at(x, y));
            }
        }
        buf.close_active_buffer().unwrap();

        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(buf.get_pixel(Position::new(x, y)).unwrap(), color_at(x, y));
            }
        }
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        assert_eq!(
            PixelBuffer::blank(0, 7, None).err(),
            Some(PixelError::EmptyDimensions { width: 0, height: 7 })
        );
        assert!(PixelBuffer::blank(5, 0, Some(Color::WHITE)).is_err());
        assert!(PixelBuffer::from_rgba(0, 1, Vec::new()).is_err());
        assert!(matches!(
            PixelBuffer::new(Flat(0)),
            Err(PixelError::EmptyDimensions { width: 0, height: 1 })
        ));
    }

    /// Single-row surface of the given width
    struct Flat(u32);

    impl Surface for Flat {
        fn width(&self) -> u32 {
            self.0
        }

        fn height(&self) -> u32 {
            1
        }

        fn get_full_samples(&self) -> Vec<u8> {
            vec![0; self.sample_count()]
        }

        fn put_full_samples(&mut self, _samples: &[u8]) {}
    }

    #[test]
    fn test_out_of_bounds_does_not_mutate() {
        let mut buf = PixelBuffer::blank(3, 3, Some(Color::rgb(5, 5, 5))).unwrap();
        let before = buf.raw_copy();
        let err = buf.set_pixel(Position::new(3, 0), Color::WHITE).unwrap_err();
        assert_eq!(
            err,
            PixelError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 3
            }
        );
        assert!(buf.get_pixel(Position::new(-1, 2)).is_err());
        assert_eq!(buf.raw_copy(), before);
        assert_eq!(buf.surface().writes(), 0);
    }

    #[test]
    fn test_unbuffered_write_syncs_full_surface() {
        let mut buf = buffer(8, 8);
        buf.set_pixel(Position::new(1, 1), Color::WHITE).unwrap();
        buf.set_pixel(Position::new(2, 2), Color::WHITE).unwrap();
        assert_eq!(buf.surface().writes(), 2);
        assert_eq!(buf.surface().reads(), 2);
    }

    #[test]
    fn test_buffered_writes_commit_once() {
        let mut buf = buffer(8, 8);
        buf.enable_active_buffer().unwrap();
        for i in 0..8 {
            buf.set_pixel(Position::new(i, i), Color::WHITE).unwrap();
        }
        // Surface untouched until close
        assert_eq!(buf.surface().writes(), 0);
        assert!(buf.surface().as_bytes().iter().all(|&b| b == 0));
        buf.close_active_buffer().unwrap();
        assert_eq!(buf.surface().writes(), 1);
        assert_eq!(buf.surface().reads(), 1);
        assert_eq!(buf.surface().as_bytes()[..4], [255, 255, 255, 255]);
    }

    #[test]
    fn test_buffer_state_errors() {
        let mut buf = buffer(2, 2);
        assert!(matches!(
            buf.close_active_buffer(),
            Err(PixelError::InvalidBufferState(_))
        ));
        buf.enable_active_buffer().unwrap();
        assert!(matches!(
            buf.enable_active_buffer(),
            Err(PixelError::InvalidBufferState(_))
        ));
        assert!(buf.is_buffered());
        buf.close_active_buffer().unwrap();
        assert!(!buf.is_buffered());
    }

    #[test]
    fn test_with_active_buffer() {
        let mut buf = buffer(3, 3);
        let n = buf
            .with_active_buffer(|b| {
                b.fill(Color::rgb(9, 9, 9));
                b.set_pixel(Position::new(1, 1), Color::BLACK).unwrap();
                2
            })
            .unwrap();
        assert_eq!(n, 2);
        assert!(!buf.is_buffered());
        assert_eq!(buf.surface().writes(), 1);
        assert_eq!(buf.get_pixel(Position::new(0, 0)).unwrap(), Color::rgb(9, 9, 9));
        assert_eq!(buf.get_pixel(Position::new(1, 1)).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_with_active_buffer_closed_inside() {
        let mut buf = buffer(2, 2);
        let result = buf.with_active_buffer(|b| {
            b.set_pixel(Position::new(1, 1), Color::WHITE).unwrap();
            b.close_active_buffer().unwrap();
            42
        });
        assert_eq!(result, Ok(42));
        assert!(!buf.is_buffered());
        assert_eq!(buf.surface().writes(), 1);
        assert_eq!(buf.get_pixel(Position::new(1, 1)).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_raw_value_unbuffered_reads_surface_each_time() {
        let mut buf = buffer(2, 2);
        buf.raw_value(0);
        buf.raw_value(1);
        assert_eq!(buf.surface().reads(), 2);

        buf.enable_active_buffer().unwrap();
        for i in 0..16 {
            assert_eq!(buf.raw_value(i), Some(0));
        }
        assert_eq!(buf.surface().reads(), 3);
    }

    #[test]
    fn test_into_surface_commits_pending() {
        let mut buf = buffer(2, 1);
        buf.enable_active_buffer().unwrap();
        buf.set_pixel(Position::new(1, 0), Color::rgba(1, 2, 3, 4)).unwrap();
        let surface = buf.into_surface();
        assert_eq!(surface.as_bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_raw_access() {
        let buf = PixelBuffer::from_rgba(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buf.raw_value(5), Some(6));
        assert_eq!(buf.raw_value(8), None);
        let mut copy = buf.raw_copy();
        copy[0] = 99;
        assert_eq!(buf.raw_value(0), Some(1));
    }

    #[test]
    fn test_replace_samples_checks_size() {
        let mut buf = buffer(1, 1);
        assert!(buf.replace_samples(&[1, 2, 3]).is_err());
        buf.replace_samples(&[1, 2, 3, 4]).unwrap();
        assert_eq!(buf.get_pixel(Position::new(0, 0)).unwrap(), Color::rgba(1, 2, 3, 4));
    }
}
