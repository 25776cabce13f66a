//! Per-sample weighted combination of several equally sized buffers.

use crate::error::{PixelError, Result};
use crate::raster::PixelBuffer;
use crate::surface::Surface;

/// How far the weights may drift from summing to 1
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

fn validate<S: Surface>(buffers: &[&PixelBuffer<S>], weights: &[f64]) -> Result<(u32, u32)> {
    let first = buffers.first().ok_or(PixelError::NoLayers)?;
    if buffers.len() != weights.len() {
        return Err(PixelError::WeightCountMismatch {
            buffers: buffers.len(),
            weights: weights.len(),
        });
    }

    let expected = first.dimensions();
    if let Some(other) = buffers.iter().find(|b| b.dimensions() != expected) {
        return Err(PixelError::DimensionMismatch {
            expected,
            found: other.dimensions(),
        });
    }

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(PixelError::WeightSumInvalid(sum));
    }
    Ok(expected)
}

/// Every output sample is `sum(weights[k] * buffers[k][i])`, rounded.
///
/// All buffers must share one size and the weights must sum to 1; both are
/// checked up front so nothing out of range is ever produced. Each buffer is
/// read once, alpha is blended like any other channel.
pub fn combine<S: Surface>(buffers: &[&PixelBuffer<S>], weights: &[f64]) -> Result<Vec<u8>> {
    let (width, height) = validate(buffers, weights)?;
    let layers: Vec<_> = buffers.iter().map(|b| b.samples()).collect();

    let len = buffers[0].sample_count();
    let mut out = vec![0u8; len];
    for (i, sample) in out.iter_mut().enumerate() {
        let v: f64 = layers
            .iter()
            .zip(weights)
            .map(|(layer, &w)| layer[i] as f64 * w)
            .sum();
        *sample = v.round().clamp(0.0, 255.0) as u8;
    }

    log::trace!("combined {} layers of {}x{}", buffers.len(), width, height);
    Ok(out)
}

impl<S: Surface> PixelBuffer<S> {
    /// Replace this buffer's contents with the weighted combination of `buffers`
    pub fn blend_from<T: Surface>(&mut self, buffers: &[&PixelBuffer<T>], weights: &[f64]) -> Result<()> {
        let out = combine(buffers, weights)?;
        let found = buffers[0].dimensions();
        if found != self.dimensions() {
            return Err(PixelError::DimensionMismatch {
                expected: self.dimensions(),
                found,
            });
        }
        self.replace_samples(&out)
    }
}
