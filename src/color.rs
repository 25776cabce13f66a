//! Color and position value types shared by every pixel operation.

use serde::{Deserialize, Serialize};

/// Number of samples stored per pixel (red, green, blue, alpha)
pub const CHANNELS: usize = 4;

/// RGBA color, one 8-bit sample per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Read a color from the first four samples of `samples`
    #[inline]
    pub fn from_samples(samples: &[u8]) -> Self {
        Self::rgba(samples[0], samples[1], samples[2], samples[3])
    }

    /// Write this color into the first four samples of `dest`
    #[inline]
    pub fn write_to(self, dest: &mut [u8]) {
        dest[0] = self.r;
        dest[1] = self.g;
        dest[2] = self.b;
        dest[3] = self.a;
    }

    #[inline]
    pub const fn to_array(self) -> [u8; CHANNELS] {
        [self.r, self.g, self.b, self.a]
    }

    /// Largest per-channel absolute difference to `other`, alpha included
    pub fn max_channel_distance(self, other: Color) -> u8 {
        self.to_array()
            .iter()
            .zip(other.to_array())
            .map(|(&a, b)| a.abs_diff(b))
            .max()
            .unwrap_or(0)
    }
}

impl From<[u8; CHANNELS]> for Color {
    fn from([r, g, b, a]: [u8; CHANNELS]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::rgba(r, g, b, a)
    }
}

/// Pixel coordinate. Signed so callers can ask about spots outside the grid
/// (e.g. neighbor lookups) and get an `OutOfBounds` answer instead of a wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four axis-aligned neighbors in traversal order: north, south, west, east
    #[inline]
    pub const fn neighbors4(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
        ]
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
