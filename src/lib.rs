//! # Baseline JPEG encoder
//!
//! Encodes raw gray, RGB and CMYK pixel buffers into sequential, Huffman coded
//! JPEG files using the standard quantization and Huffman tables.
//! No subsampling is performed.
//!
//! ```no_run
//! # use jpeg_baseline::{encode, ColorType, EncodingError, Image};
//! # fn main() -> Result<(), EncodingError> {
//! let data = vec![127u8; 32 * 32 * 3];
//!
//! let jpeg = encode(&Image::new(&data, 32, 32, ColorType::Rgb), 75)?;
//! # Ok(())
//! # }
//! ```

mod writer;
mod marker;
mod huffman;
mod fdct;
mod quantization;
mod image_buffer;
mod encoder;
mod error;

pub use encoder::{encode, encode_file, ColorType, JpegColorType, Encoder, Image};
pub use error::EncodingError;

#[cfg(feature = "benchmark")]
pub use fdct::fdct;
#[cfg(feature = "benchmark")]
pub use huffman::HuffmanTable;
#[cfg(feature = "benchmark")]
pub use image_buffer::{rgb_to_ycbcr, ImageBuffer, RgbImage};
#[cfg(feature = "benchmark")]
pub use quantization::QuantizationTable;
