use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PixelError, Result};

/// Square matrix of convolution weights with an odd side, so there is a
/// center pixel. Weights are row-major: `weight(kx, ky)` is applied to the
/// neighbor at offset `(kx - half, ky - half)`.
///
/// Serializes as a plain nested array, e.g. `[[0,1,0],[1,-4,1],[0,1,0]]`,
/// and is validated on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Kernel {
    side: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build from rows. Fails on empty, ragged, non-square or even-sized input.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let side = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != side) {
            return Err(PixelError::MalformedKernel(format!(
                "row of length {} in a kernel with {} rows",
                row.len(),
                side
            )));
        }
        Self::from_weights(side, rows.into_iter().flatten().collect())
    }

    /// Build from `side * side` row-major weights
    pub fn from_weights(side: usize, weights: Vec<f64>) -> Result<Self> {
        if side == 0 {
            return Err(PixelError::MalformedKernel("kernel is empty".into()));
        }
        if side % 2 == 0 {
            return Err(PixelError::MalformedKernel(format!(
                "side {} is even, no center pixel",
                side
            )));
        }
        if weights.len() != side * side {
            return Err(PixelError::MalformedKernel(format!(
                "{} weights for a {}x{} kernel",
                weights.len(),
                side,
                side
            )));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
            return Err(PixelError::MalformedKernel(format!("non-finite weight {}", w)));
        }
        Ok(Self { side, weights })
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Distance from the center to the edge of the window
    #[inline]
    pub fn half(&self) -> usize {
        self.side / 2
    }

    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.side + kx]
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// 1x1 pass-through
    pub fn identity() -> Self {
        Self {
            side: 1,
            weights: vec![1.0],
        }
    }

    /// Uniform average over a `side` x `side` window (`side` must be odd)
    pub fn box_blur(side: usize) -> Result<Self> {
        let n = side * side;
        Self::from_weights(side, vec![1.0 / n as f64; n])
    }

    /// 3x3 binomial approximation of a Gaussian
    pub fn gaussian3() -> Self {
        let w = [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0];
        Self {
            side: 3,
            weights: w.iter().map(|v| v / 16.0).collect(),
        }
    }

    pub fn sharpen() -> Self {
        Self {
            side: 3,
            weights: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    /// Laplacian edge detector
    pub fn edge_detect() -> Self {
        Self {
            side: 3,
            weights: vec![-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
        }
    }

    pub fn emboss() -> Self {
        Self {
            side: 3,
            weights: vec![-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0],
        }
    }

    // ========================================================================
    // JSON Config
    // ========================================================================

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PixelError::KernelConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PixelError::KernelConfig(e.to_string()))
    }

    /// Load a kernel from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PixelError::KernelConfig(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Save kernel to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| PixelError::KernelConfig(e.to_string()))
    }
}

impl TryFrom<Vec<Vec<f64>>> for Kernel {
    type Error = PixelError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<Kernel> for Vec<Vec<f64>> {
    fn from(kernel: Kernel) -> Self {
        kernel.weights.chunks(kernel.side).map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(Kernel::new(vec![]), Err(PixelError::MalformedKernel(_))));
        assert!(matches!(
            Kernel::new(vec![vec![1.0, 1.0], vec![1.0, 1.0]]),
            Err(PixelError::MalformedKernel(_))
        ));
        assert!(matches!(
            Kernel::new(vec![vec![1.0, 1.0, 1.0], vec![1.0], vec![1.0, 1.0, 1.0]]),
            Err(PixelError::MalformedKernel(_))
        ));
        assert!(Kernel::from_weights(3, vec![1.0; 8]).is_err());
        assert!(Kernel::from_weights(1, vec![f64::NAN]).is_err());
        assert!(Kernel::box_blur(4).is_err());
    }

    #[test]
    fn test_half_and_weights() {
        let k = Kernel::new(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        assert_eq!(k.side(), 3);
        assert_eq!(k.half(), 1);
        assert_eq!(k.weight(2, 0), 3.0);
        assert_eq!(k.weight(0, 2), 7.0);
    }

    #[test]
    fn test_presets_normalized() {
        assert!((Kernel::box_blur(5).unwrap().sum() - 1.0).abs() < 1e-9);
        assert!((Kernel::gaussian3().sum() - 1.0).abs() < 1e-9);
        assert!((Kernel::sharpen().sum() - 1.0).abs() < 1e-9);
        assert_eq!(Kernel::edge_detect().sum(), 0.0);
        assert_eq!(Kernel::identity().half(), 0);
    }

    #[test]
    fn test_json_config() {
        let k = Kernel::from_json("[[0, 1, 0], [1, -4, 1], [0, 1, 0]]").unwrap();
        assert_eq!(k.weight(1, 1), -4.0);

        let back = Kernel::from_json(&k.to_json().unwrap()).unwrap();
        assert_eq!(back, k);

        assert!(matches!(
            Kernel::from_json("[[1, 1], [1, 1]]"),
            Err(PixelError::KernelConfig(_))
        ));
        assert!(matches!(
            Kernel::from_json("not json"),
            Err(PixelError::KernelConfig(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("canvaspix-kernel-{}.json", std::process::id()));
        Kernel::emboss().save(&path).unwrap();
        let loaded = Kernel::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, Kernel::emboss());
    }
}
