use std::error::Error;
use std::fmt::Display;

use crate::writer::OutOfMemoryRequest;

/// # The error type for encoding
#[derive(Debug)]
pub enum EncodingError {
    /// The named color type is not one the encoder understands
    UnsupportedColorType(String),

    /// Image data length does not match dimensions and color type
    BadImageData { length: usize, required: usize },

    /// The output buffer could not be grown
    OutOfMemory { requested: usize },

    /// An io error occurred during writing
    IoError(std::io::Error),
}

impl From<std::io::Error> for EncodingError {
    fn from(err: std::io::Error) -> EncodingError {
        let requested = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<OutOfMemoryRequest>())
            .map(|request| request.0);

        match requested {
            Some(requested) => EncodingError::OutOfMemory { requested },
            None => EncodingError::IoError(err),
        }
    }
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use EncodingError::*;
        match self {
            UnsupportedColorType(name) => write!(
                f,
                "Unsupported color type: {:?}",
                name
            ),
            BadImageData { length, required } => write!(
                f,
                "Image data length does not match dimensions and color_type: {} need exactly {}",
                length,
                required
            ),
            OutOfMemory { requested } => write!(
                f,
                "Out of memory while growing output buffer by {} bytes",
                requested
            ),
            IoError(err) => err.fmt(f),
        }
    }
}

impl Error for EncodingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodingError::IoError(err) => Some(err),
            _ => None
        }
    }
}
