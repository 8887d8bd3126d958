use std::path::PathBuf;

use crate::raster::PixelFormat;
use crate::shape::Shape;

/// All errors that can occur while preparing try-on samples.
///
/// Asset failures carry the path that was being read so a failing sample can
/// be traced back to the file on disk. Every variant is fatal for the sample
/// being built; nothing is retried or replaced with a default.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An expected input file does not exist.
    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its content does not have the expected structure
    /// (undecodable image, wrong dimensions, bad keypoint record, ...).
    #[error("malformed asset {}: {reason}", path.display())]
    MalformedAsset { path: PathBuf, reason: String },

    /// Invalid configuration detected before any sample is built.
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Shape mismatch between two tensors.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },

    /// Dimension index out of range for the tensor's rank.
    #[error("dimension out of range: dim {dim} for tensor with {rank} dimensions")]
    DimOutOfRange { dim: usize, rank: usize },

    /// Element count mismatch when creating a tensor from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// A raster operation was applied to a buffer in the wrong pixel format.
    #[error("pixel format mismatch: expected {expected:?}, got {got:?}")]
    PixelFormat {
        expected: PixelFormat,
        got: PixelFormat,
    },

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create a configuration error.
    pub fn config(s: impl Into<String>) -> Self {
        Error::Config(s.into())
    }

    /// Create a malformed-asset error for `path`.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedAsset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O error on `path` to `AssetNotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::AssetNotFound { path }
        } else {
            Error::Io { path, source }
        }
    }
}

/// Convenience Result type used throughout the try-on crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_not_found() {
        let e = Error::from_io(
            "data/train/cloth/x.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(e, Error::AssetNotFound { .. }));
        assert!(e.to_string().contains("data/train/cloth/x.jpg"));
    }

    #[test]
    fn test_from_io_other() {
        let e = Error::from_io(
            "a.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(e, Error::Io { .. }));
    }
}
