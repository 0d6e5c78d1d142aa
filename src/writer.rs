use crate::encoder::Component;
use crate::huffman::{CodingClass, HuffmanTable};
use crate::marker::Marker;
use crate::quantization::QuantizationTable;

use std::io::{self, Result as IOResult, Write};

/// Natural order index for every zig-zag position
pub(crate) static ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10,
    17, 24, 32, 25, 18, 11, 4, 5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// In memory sink that reports allocation failure instead of aborting.
///
/// Growth failures surface as [`io::ErrorKind::OutOfMemory`].
#[derive(Default)]
pub(crate) struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> io::Result<OutputBuffer> {
        let mut buffer = OutputBuffer::default();
        buffer.reserve(capacity)?;
        Ok(buffer)
    }

    fn reserve(&mut self, additional: usize) -> io::Result<()> {
        self.data
            .try_reserve(additional)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, OutOfMemoryRequest(additional)))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.reserve(buf.len())?;
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Payload of the io error raised by [`OutputBuffer`]
#[derive(Debug)]
pub(crate) struct OutOfMemoryRequest(pub usize);

impl std::fmt::Display for OutOfMemoryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to reserve {} bytes", self.0)
    }
}

impl std::error::Error for OutOfMemoryRequest {}

pub(crate) struct JfifWriter<W: Write> {
    w: W,
    bit_buffer: u32,
    bit_count: u8,
}

impl<W: Write> JfifWriter<W> {
    pub fn new(w: W) -> Self {
        JfifWriter {
            w,
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn write(&mut self, buf: &[u8]) -> IOResult<()> {
        self.w.write_all(buf)
    }

    pub fn write_u8(&mut self, value: u8) -> IOResult<()> {
        self.w.write_all(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> IOResult<()> {
        self.w.write_all(&value.to_be_bytes())
    }

    pub fn write_marker(&mut self, marker: Marker) -> IOResult<()> {
        self.write(&[0xFF, marker.into()])
    }

    pub fn write_segment(&mut self, marker: Marker, data: &[u8]) -> IOResult<()> {
        self.write_marker(marker)?;
        self.write_u16(data.len() as u16 + 2)?;
        self.write(data)?;

        Ok(())
    }

    /// Append the low `size` bits of `value`, most significant bit first.
    ///
    /// Every completed byte is written out, followed by a stuffed zero byte
    /// if it equals 0xFF.
    pub fn write_bits(&mut self, value: u32, size: u8) -> IOResult<()> {
        debug_assert!(size <= 16);

        if size == 0 {
            return Ok(());
        }

        let mask = (1u32 << size) - 1;

        self.bit_buffer = (self.bit_buffer << size) | (value & mask);
        self.bit_count += size;

        while self.bit_count >= 8 {
            self.bit_count -= 8;

            let byte = (self.bit_buffer >> self.bit_count) as u8;
            self.write_u8(byte)?;

            if byte == 0xFF {
                self.write_u8(0x00)?;
            }
        }

        self.bit_buffer &= (1 << self.bit_count) - 1;

        Ok(())
    }

    /// Pad the entropy coded segment with 1-bits up to the next byte boundary.
    pub fn flush_bit_buffer(&mut self) -> IOResult<()> {
        self.write_bits(0x7F, 7)?;

        // A byte boundary was already reached if anything remains
        self.bit_buffer = 0;
        self.bit_count = 0;

        Ok(())
    }

    fn huffman_encode(&mut self, symbol: u8, table: &HuffmanTable) -> IOResult<()> {
        let (size, code) = table.get_for_value(symbol);
        self.write_bits(u32::from(code), size)
    }

    fn huffman_encode_value(&mut self, size: u8, symbol: u8, value: u16, table: &HuffmanTable) -> IOResult<()> {
        self.huffman_encode(symbol, table)?;
        self.write_bits(u32::from(value), size)
    }

    /// Entropy code one quantized block given in zig-zag order.
    ///
    /// `prev_dc` is the quantized DC value of the previous block of the same
    /// component, or 0 for the first one.
    pub fn write_block(
        &mut self,
        block: &[i16; 64],
        prev_dc: i16,
        dc_table: &HuffmanTable,
        ac_table: &HuffmanTable,
    ) -> IOResult<()> {
        self.write_dc(block[0], prev_dc, dc_table)?;
        self.write_ac_block(block, ac_table)
    }

    fn write_dc(&mut self, value: i16, prev_dc: i16, dc_table: &HuffmanTable) -> IOResult<()> {
        let diff = i32::from(value) - i32::from(prev_dc);
        let (size, bits) = get_code(diff);

        log::trace!("DC: value={}, diff={}, size={}", value, diff, size);

        self.huffman_encode_value(size, size, bits, dc_table)
    }

    fn write_ac_block(&mut self, block: &[i16; 64], ac_table: &HuffmanTable) -> IOResult<()> {
        let mut zero_run = 0u8;

        for &value in &block[1..] {
            if value == 0 {
                zero_run += 1;
            } else {
                while zero_run > 15 {
                    self.huffman_encode(0xF0, ac_table)?;
                    zero_run -= 16;
                }

                let (size, bits) = get_code(i32::from(value));
                let symbol = (zero_run << 4) | size;

                self.huffman_encode_value(size, symbol, bits, ac_table)?;

                zero_run = 0;
            }
        }

        if zero_run > 0 {
            self.huffman_encode(0x00, ac_table)?;
        }

        Ok(())
    }

    pub fn write_quantization_segment(&mut self, table_nr: u8, table: &QuantizationTable) -> IOResult<()> {
        let mut buf = [0u8; 65];

        buf[0] = table_nr;

        for (i, v) in buf[1..].iter_mut().enumerate() {
            *v = table.get(i);
        }

        self.write_segment(Marker::DQT, &buf)
    }

    pub fn write_huffman_segment(
        &mut self,
        class: CodingClass,
        destination: u8,
        table: &HuffmanTable,
    ) -> IOResult<()> {
        debug_assert!(destination < 4, "Bad destination: {}", destination);

        self.write_marker(Marker::DHT)?;
        self.write_u16(2 + 1 + 16 + table.values().len() as u16)?;

        self.write_u8(((class as u8) << 4) | destination)?;
        self.write(table.length())?;
        self.write(table.values())?;

        Ok(())
    }

    pub fn write_frame_header(
        &mut self,
        width: u16,
        height: u16,
        components: &[Component],
    ) -> IOResult<()> {
        self.write_marker(Marker::SOF0)?;
        self.write_u16(2 + 1 + 2 + 2 + 1 + 3 * components.len() as u16)?;

        // Sample precision
        self.write_u8(8)?;

        self.write_u16(height)?;
        self.write_u16(width)?;

        self.write_u8(components.len() as u8)?;

        for component in components {
            self.write_u8(component.id)?;
            // 1x1 sampling, no subsampling
            self.write_u8(0x11)?;
            self.write_u8(component.quantization_table)?;
        }

        Ok(())
    }

    pub fn write_scan_header(&mut self, components: &[Component]) -> IOResult<()> {
        self.write_marker(Marker::SOS)?;
        self.write_u16(2 + 1 + 2 * components.len() as u16 + 3)?;

        self.write_u8(components.len() as u8)?;

        for component in components {
            self.write_u8(component.id)?;
            self.write_u8((component.dc_huffman_table << 4) | component.ac_huffman_table)?;
        }

        // Spectral selection 0..=63, no successive approximation
        self.write(&[0x00, 0x3F, 0x00])
    }

    /// Adobe APP14 segment, required to flag CMYK data.
    pub fn write_adobe_segment(&mut self, color_transform: u8) -> IOResult<()> {
        let mut buf = [0u8; 12];

        buf[0..5].copy_from_slice(b"Adobe");
        // Version 100
        buf[5..7].copy_from_slice(&100u16.to_be_bytes());
        // Flags 0 and 1 stay zero
        buf[11] = color_transform;

        self.write_segment(Marker::APP(14), &buf)
    }
}

/// Size category and additional bits of a coefficient.
///
/// Negative values are stored as `value + 2^size - 1`.
pub(crate) fn get_code(value: i32) -> (u8, u16) {
    let magnitude = value.unsigned_abs();
    let size = (32 - magnitude.leading_zeros()) as u8;

    let bits = if value < 0 {
        value + (1 << size) - 1
    } else {
        value
    };

    (size, bits as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut JfifWriter<&mut Vec<u8>>)) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = JfifWriter::new(&mut out);
        f(&mut writer);
        out
    }

    #[test]
    fn test_get_code() {
        assert_eq!(get_code(0), (0, 0));
        assert_eq!(get_code(1), (1, 1));
        assert_eq!(get_code(-1), (1, 0));
        assert_eq!(get_code(2), (2, 2));
        assert_eq!(get_code(-2), (2, 1));
        assert_eq!(get_code(3), (2, 3));
        assert_eq!(get_code(-3), (2, 0));
        assert_eq!(get_code(-7), (3, 0));
        assert_eq!(get_code(1023), (10, 1023));
        assert_eq!(get_code(-1024), (11, 1023));
        assert_eq!(get_code(2047), (11, 2047));
    }

    #[test]
    fn test_bits_msb_first() {
        let out = written(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_bits(0b00110, 5).unwrap();
            w.write_bits(0xABC, 12).unwrap();
        });

        // 1010_0110 1010_1011 with 1100 pending
        assert_eq!(out, vec![0xA6, 0xAB]);
    }

    #[test]
    fn test_byte_stuffing() {
        let out = written(|w| {
            w.write_bits(0xFF, 8).unwrap();
            w.write_bits(0x12, 8).unwrap();
            w.write_bits(0xFFFF, 16).unwrap();
        });

        assert_eq!(out, vec![0xFF, 0x00, 0x12, 0xFF, 0x00, 0xFF, 0x00]);
    }

    #[test]
    fn test_padding() {
        let out = written(|w| {
            w.write_bits(0b0, 1).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(out, vec![0x7F]);

        let out = written(|w| {
            w.write_bits(0b1, 1).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(out, vec![0xFF, 0x00]);

        // Already aligned, the partial padding is dropped
        let out = written(|w| {
            w.write_bits(0x12, 8).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(out, vec![0x12]);

        let out = written(|w| {
            w.write_bits(0b0, 2).unwrap();
            w.flush_bit_buffer().unwrap();
            w.write_u8(0xD9).unwrap();
        });
        assert_eq!(out, vec![0x3F, 0xD9]);
    }

    #[test]
    fn test_block_flat() {
        let dc = HuffmanTable::default_luma_dc();
        let ac = HuffmanTable::default_luma_ac();

        // diff 0 => DC code 00, then EOB 1010, padded with ones
        let out = written(|w| {
            w.write_block(&[0; 64], 0, &dc, &ac).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(out, vec![0b0010_1011]);
    }

    #[test]
    fn test_block_uses_predictor() {
        let dc = HuffmanTable::default_luma_dc();
        let ac = HuffmanTable::default_luma_ac();

        let mut block = [0i16; 64];
        block[0] = 5;

        // Predictor 5 gives a zero difference
        let same = written(|w| {
            w.write_block(&block, 5, &dc, &ac).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(same, vec![0b0010_1011]);

        // Predictor 0: diff 5 => size 3 (100), bits 101, then EOB 1010
        let diff = written(|w| {
            w.write_block(&block, 0, &dc, &ac).unwrap();
            w.flush_bit_buffer().unwrap();
        });
        assert_eq!(diff, vec![0b1001_0110, 0b1011_1111]);
    }

    #[test]
    fn test_block_zero_run() {
        let dc = HuffmanTable::default_luma_dc();
        let ac = HuffmanTable::default_luma_ac();

        // Last coefficient set: 62 zeros need three ZRL codes before (14, 1)
        let mut block = [0i16; 64];
        block[63] = 1;

        let mut expected = Vec::new();
        {
            let mut w = JfifWriter::new(&mut expected);
            w.write_bits(0b00, 2).unwrap();
            for _ in 0..3 {
                let (size, code) = ac.get_for_value(0xF0);
                w.write_bits(u32::from(code), size).unwrap();
            }
            let (size, code) = ac.get_for_value(0xE1);
            w.write_bits(u32::from(code), size).unwrap();
            w.write_bits(1, 1).unwrap();
            w.flush_bit_buffer().unwrap();
        }

        let out = written(|w| {
            w.write_block(&block, 0, &dc, &ac).unwrap();
            w.flush_bit_buffer().unwrap();
        });

        assert_eq!(out, expected);
    }

    #[test]
    fn test_block_no_eob_when_full() {
        let dc = HuffmanTable::default_luma_dc();
        let ac = HuffmanTable::default_luma_ac();

        let block = [1i16; 64];

        // DC diff 1: 010 + 1, then 63 times symbol 0x01 (00) + bit 1
        let mut expected = Vec::new();
        {
            let mut w = JfifWriter::new(&mut expected);
            w.write_bits(0b010, 3).unwrap();
            w.write_bits(1, 1).unwrap();
            for _ in 0..63 {
                w.write_bits(0b00, 2).unwrap();
                w.write_bits(1, 1).unwrap();
            }
            w.flush_bit_buffer().unwrap();
        }

        let out = written(|w| {
            w.write_block(&block, 0, &dc, &ac).unwrap();
            w.flush_bit_buffer().unwrap();
        });

        assert_eq!(out, expected);
    }

    #[test]
    fn test_segment_length() {
        let out = written(|w| w.write_segment(Marker::APP(15), b"HOHOHO\0").unwrap());
        assert_eq!(out, b"\xFF\xEF\0\x09HOHOHO\0".to_vec());

        let out = written(|w| w.write_adobe_segment(0).unwrap());
        assert_eq!(out, b"\xFF\xEE\0\x0EAdobe\0\x64\0\0\0\0\0".to_vec());
    }

    #[test]
    fn test_output_buffer() {
        let mut buffer = OutputBuffer::with_capacity(16).unwrap();
        buffer.write_all(&[1, 2, 3]).unwrap();
        buffer.write_all(&[4]).unwrap();
        assert_eq!(buffer.into_inner(), vec![1, 2, 3, 4]);

        let err = OutputBuffer::with_capacity(usize::MAX).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
    }
}
