use thiserror::Error;

/// Everything a pixel operation can report. All failures are local to one
/// call; none of them leave the buffer partially written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PixelError {
    #[error("position ({x}; {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("row {row} is outside a buffer of height {height}")]
    RowOutOfRange { row: u32, height: u32 },

    #[error("column {column} is outside a buffer of width {width}")]
    ColumnOutOfRange { column: u32, width: u32 },

    #[error("buffer size {width}x{height} is empty, both sides must be positive")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("invalid buffer state: {0}")]
    InvalidBufferState(&'static str),

    #[error("malformed kernel: {0}")]
    MalformedKernel(String),

    #[error("kernel config: {0}")]
    KernelConfig(String),

    #[error("dimension mismatch: expected {}x{}, found {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("{buffers} buffers but {weights} weights")]
    WeightCountMismatch { buffers: usize, weights: usize },

    #[error("weights sum to {0}, expected 1")]
    WeightSumInvalid(f64),

    #[error("nothing to combine")]
    NoLayers,

    #[error("expected {expected} samples, found {found}")]
    SampleCountMismatch { expected: usize, found: usize },
}

pub type Result<T, E = PixelError> = std::result::Result<T, E>;
