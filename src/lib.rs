//! # canvaspix
//!
//! In-memory RGBA pixel buffer on top of an external sample store
//! (the [`Surface`]), with:
//!
//! - bounds-checked pixel access and a buffered mode that batches any number
//!   of edits into one commit
//! - whole-image, row and column walks that transform pixels in place
//! - seeded, 4-connected flood fill steered by a [`FloodFillHandler`]
//! - kernel convolution with a selectable [`EdgeMode`]
//! - weighted compositing of equally sized buffers
//!
//! Pixel `(x, y)` lives at sample offset `(y * width + x) * 4`, channels in
//! R, G, B, A order.
//!
//! ```
//! use canvaspix::{Color, Kernel, PixelBuffer, Position};
//!
//! let mut buf = PixelBuffer::blank(64, 64, Some(Color::WHITE)).unwrap();
//! buf.with_active_buffer(|b| {
//!     b.flood_fill_color(Position::new(0, 0), Color::rgb(255, 0, 0), 0).unwrap();
//!     b.apply_filter(&Kernel::gaussian3(), false);
//! })
//! .unwrap();
//! assert_eq!(buf.surface().writes(), 1);
//! ```

pub mod color;
pub mod composite;
pub mod error;
pub mod filter;
pub mod flood;
pub mod raster;
pub mod surface;

pub use color::{Color, Position, CHANNELS};
pub use composite::combine;
pub use error::{PixelError, Result};
pub use filter::{EdgeMode, Kernel};
pub use flood::{ColorFill, FloodFill, FloodFillHandler, Visit};
pub use raster::{PixelBuffer, PixelTransform};
pub use surface::{MemorySurface, Surface};
