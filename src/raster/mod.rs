mod iterate;
mod pixel_buffer;

pub use iterate::PixelTransform;
pub use pixel_buffer::PixelBuffer;

pub(crate) use pixel_buffer::sample_offset;
