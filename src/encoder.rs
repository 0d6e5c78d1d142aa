use crate::error::EncodingError;
use crate::fdct::fdct;
use crate::huffman::{CodingClass, HuffmanTable};
use crate::image_buffer::*;
use crate::marker::Marker;
use crate::quantization::{QuantizationTable, ScaleFactors};
use crate::writer::{JfifWriter, OutputBuffer, ZIGZAG};

use std::fs::File;
use std::io::{BufWriter, Result as IOResult, Write};
use std::path::Path;
use std::str::FromStr;

/// # Color types used in encoding
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JpegColorType {
    /// One component grayscale colorspace
    Luma,

    /// Three component YCbCr colorspace
    Ycbcr,

    /// 4 Component CMYK colorspace
    Cmyk,
}

impl JpegColorType {
    pub fn get_num_components(self) -> usize {
        use JpegColorType::*;

        match self {
            Luma => 1,
            Ycbcr => 3,
            Cmyk => 4,
        }
    }
}

/// # Color types for input images
///
/// Available color input formats for [Encoder::encode] and [encode].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorType {
    /// Grayscale with 1 byte per pixel
    Luma,

    /// RGB with 3 bytes per pixel
    Rgb,

    /// BGR with 3 bytes per pixel, as produced by many display snapshots
    Bgr,

    /// 16 bit little endian 5-6-5 RGB with 2 bytes per pixel
    Rgb565,

    /// CMYK with 4 bytes per pixel
    Cmyk,
}

impl ColorType {
    pub(crate) fn get_bytes_per_pixel(self) -> usize {
        use ColorType::*;

        match self {
            Luma => 1,
            Rgb565 => 2,
            Rgb | Bgr => 3,
            Cmyk => 4,
        }
    }
}

impl FromStr for ColorType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" | "luma" | "l" => Ok(ColorType::Luma),
            "rgb" => Ok(ColorType::Rgb),
            "bgr" => Ok(ColorType::Bgr),
            "rgb565" => Ok(ColorType::Rgb565),
            "cmyk" => Ok(ColorType::Cmyk),
            _ => Err(EncodingError::UnsupportedColorType(s.to_owned())),
        }
    }
}

/// Borrowed raw pixel buffer to encode
#[derive(Copy, Clone, Debug)]
pub struct Image<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
    pub color_type: ColorType,
}

impl<'a> Image<'a> {
    pub fn new(data: &'a [u8], width: u16, height: u16, color_type: ColorType) -> Image<'a> {
        Image {
            data,
            width,
            height,
            color_type,
        }
    }

    fn validate(&self) -> Result<(), EncodingError> {
        let required = usize::from(self.width) * usize::from(self.height) * self.color_type.get_bytes_per_pixel();

        if self.data.len() != required {
            return Err(EncodingError::BadImageData {
                length: self.data.len(),
                required,
            });
        }

        Ok(())
    }
}

pub(crate) struct Component {
    pub id: u8,
    pub quantization_table: u8,
    pub dc_huffman_table: u8,
    pub ac_huffman_table: u8,
}

fn components_for(color_type: JpegColorType) -> Vec<Component> {
    (0..color_type.get_num_components())
        .map(|i| {
            // Only the chroma components of YCbCr images use the second table set
            let table = u8::from(color_type == JpegColorType::Ycbcr && i > 0);

            Component {
                id: i as u8 + 1,
                quantization_table: table,
                dc_huffman_table: table,
                ac_huffman_table: table,
            }
        })
        .collect()
}

// Room for markers and tables
const HEADER_CAPACITY: usize = 1024;

/// Encode an image into a freshly allocated JPEG byte stream.
///
/// `quality` is clamped to 1..=100. The pixel data length must match the
/// dimensions and color type exactly. Allocation failures of the output buffer
/// are reported as [EncodingError::OutOfMemory].
pub fn encode(image: &Image<'_>, quality: u8) -> Result<Vec<u8>, EncodingError> {
    let quality = quality.max(1).min(100);

    image.validate()?;

    log::debug!(
        "Encoding {}x{} {:?} image with quality {}",
        image.width,
        image.height,
        image.color_type,
        quality
    );

    if image.width == 0 || image.height == 0 {
        log::warn!("Encoding empty image: {}x{}", image.width, image.height);
    }

    let capacity = HEADER_CAPACITY + image.data.len() / 4;
    let mut writer = JfifWriter::new(OutputBuffer::with_capacity(capacity)?);

    let Image { data, width, height, color_type } = *image;

    match color_type {
        ColorType::Luma => encode_image(&mut writer, GrayImage(data, width, height), quality)?,
        ColorType::Rgb => encode_image(&mut writer, RgbImage(data, width, height), quality)?,
        ColorType::Bgr => encode_image(&mut writer, BgrImage(data, width, height), quality)?,
        ColorType::Rgb565 => encode_image(&mut writer, Rgb565Image(data, width, height), quality)?,
        ColorType::Cmyk => encode_image(&mut writer, CmykImage(data, width, height), quality)?,
    }

    let result = writer.into_inner().into_inner();

    log::debug!("Encoded {}x{} image into {} bytes", width, height, result.len());

    Ok(result)
}

/// Encode an image and write it to a new file at `path`.
///
/// The whole stream is built in memory first, so a failed encode never creates
/// the file. If writing fails the partially written file is removed.
pub fn encode_file<P: AsRef<Path>>(path: P, image: &Image<'_>, quality: u8) -> Result<(), EncodingError> {
    let path = path.as_ref();
    let data = encode(image, quality)?;

    let result = File::create(path).and_then(|file| {
        let mut w = BufWriter::new(file);
        w.write_all(&data)?;
        w.flush()
    });

    if let Err(err) = result {
        log::warn!("Failed to write {}: {}", path.display(), err);

        if let Err(remove_err) = std::fs::remove_file(path) {
            if remove_err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove partial file {}: {}", path.display(), remove_err);
            }
        }

        return Err(err.into());
    }

    Ok(())
}

fn encode_image<W: Write, I: ImageBuffer>(
    writer: &mut JfifWriter<W>,
    image: I,
    quality: u8,
) -> IOResult<()> {
    let color_type = image.get_jpeg_color_type();
    let components = components_for(color_type);

    let quantization_tables = [
        QuantizationTable::default_luma(quality),
        QuantizationTable::default_chroma(quality),
    ];

    let huffman_tables = [
        (HuffmanTable::default_luma_dc(), HuffmanTable::default_luma_ac()),
        (HuffmanTable::default_chroma_dc(), HuffmanTable::default_chroma_ac()),
    ];

    let num_tables = if color_type == JpegColorType::Ycbcr { 2 } else { 1 };

    log::trace!(
        "{:?}: {} components, {} table sets, luma DC quantizer {}",
        color_type,
        components.len(),
        num_tables,
        quantization_tables[0].get(0)
    );

    writer.write_marker(Marker::SOI)?;

    if color_type == JpegColorType::Cmyk {
        writer.write_adobe_segment(0)?;
    }

    for (i, table) in quantization_tables.iter().take(num_tables).enumerate() {
        writer.write_quantization_segment(i as u8, table)?;
    }

    writer.write_frame_header(image.width(), image.height(), &components)?;

    for (i, (dc_table, ac_table)) in huffman_tables.iter().take(num_tables).enumerate() {
        writer.write_huffman_segment(CodingClass::Dc, i as u8, dc_table)?;
        writer.write_huffman_segment(CodingClass::Ac, i as u8, ac_table)?;
    }

    writer.write_scan_header(&components)?;

    let scale_factors = [
        quantization_tables[0].scale_factors(),
        quantization_tables[1].scale_factors(),
    ];

    encode_blocks(writer, &image, &components, &scale_factors, &huffman_tables)?;

    writer.flush_bit_buffer()?;
    writer.write_marker(Marker::EOI)?;

    Ok(())
}

fn encode_blocks<W: Write, I: ImageBuffer>(
    writer: &mut JfifWriter<W>,
    image: &I,
    components: &[Component],
    scale_factors: &[ScaleFactors; 2],
    huffman_tables: &[(HuffmanTable, HuffmanTable); 2],
) -> IOResult<()> {
    let width = image.width();
    let height = image.height();

    let num_cols = ceil_div(u32::from(width), 8);
    let num_rows = ceil_div(u32::from(height), 8);

    let buffer_width = num_cols as usize * 8;
    let buffer_size = buffer_width * 8;

    let mut row: [Vec<u8>; 4] = [
        Vec::with_capacity(buffer_size),
        Vec::with_capacity(buffer_size),
        Vec::with_capacity(buffer_size),
        Vec::with_capacity(buffer_size),
    ];

    // One DC predictor per component, carried across the whole scan
    let mut prev_dc = [0i16; 4];

    for block_y in 0..num_rows {
        for r in &mut row {
            r.clear();
        }

        // Edge blocks replicate the last row and column
        for y in 0..8 {
            let y = (block_y * 8 + y).min(u32::from(height) - 1) as u16;

            for x in 0..buffer_width {
                let x = (x as u32).min(u32::from(width) - 1) as u16;
                image.fill_buffers(x, y, &mut row);
            }
        }

        for block_x in 0..num_cols as usize {
            for (i, component) in components.iter().enumerate() {
                let mut block = get_block(&row[i], block_x * 8, buffer_width);

                fdct(&mut block);

                let q_block = quantize_block(&block, &scale_factors[component.quantization_table as usize]);

                let (dc_table, _) = &huffman_tables[component.dc_huffman_table as usize];
                let (_, ac_table) = &huffman_tables[component.ac_huffman_table as usize];

                writer.write_block(&q_block, prev_dc[i], dc_table, ac_table)?;

                prev_dc[i] = q_block[0];
            }
        }
    }

    Ok(())
}

fn quantize_block(block: &[i16; 64], scale_factors: &ScaleFactors) -> [i16; 64] {
    let mut q_block = [0i16; 64];

    for (i, q) in q_block.iter_mut().enumerate() {
        let index = ZIGZAG[i] as usize;
        *q = scale_factors.quantize(block[index], index);
    }

    q_block
}

fn get_block(data: &[u8], start_x: usize, width: usize) -> [i16; 64] {
    let mut block = [0i16; 64];

    for y in 0..8 {
        for x in 0..8 {
            block[y * 8 + x] = i16::from(data[start_x + x + y * width]);
        }
    }

    block
}

fn ceil_div(value: u32, div: u32) -> u32 {
    value / div + u32::from(value % div != 0)
}

/// # The JPEG encoder
///
/// Encodes the whole image in memory and writes the result to `w` with a
/// single call once encoding succeeded.
pub struct Encoder<W: Write> {
    w: W,
    quality: u8,
}

impl<W: Write> Encoder<W> {
    /// Create a new encoder with the given quality
    ///
    /// The quality is clamped to values in the range 1..=100.
    pub fn new(w: W, quality: u8) -> Encoder<W> {
        Encoder {
            w,
            quality: quality.max(1).min(100),
        }
    }

    /// Set the quality used for the quantization tables
    ///
    /// The quality is clamped to values in the range 1..=100.
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.max(1).min(100);
    }

    /// Quality used for the quantization tables
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an image
    ///
    /// Data format and length must conform to specified width, height and color type.
    pub fn encode(
        self,
        data: &[u8],
        width: u16,
        height: u16,
        color_type: ColorType,
    ) -> Result<(), EncodingError> {
        self.encode_image(&Image::new(data, width, height, color_type))
    }

    /// Encode an [Image]
    pub fn encode_image(mut self, image: &Image<'_>) -> Result<(), EncodingError> {
        let data = encode(image, self.quality)?;

        self.w.write_all(&data)?;
        self.w.flush()?;

        Ok(())
    }
}

impl Encoder<BufWriter<File>> {
    /// Create a new encoder writing to a file
    ///
    /// The file is created or truncated right away. If encoding fails later
    /// it is left empty, use [encode_file] to never leave a file behind.
    pub fn new_file<P: AsRef<Path>>(path: P, quality: u8) -> Result<Encoder<BufWriter<File>>, EncodingError> {
        let file = File::create(path)?;
        let buf = BufWriter::new(file);
        Ok(Self::new(buf, quality))
    }
}
