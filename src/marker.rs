#![allow(clippy::upper_case_acronyms)]

// Subset of Table B.1 written by a baseline encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Start Of Frame, baseline DCT
    SOF0,
    /// Define Huffman table(s)
    DHT,
    /// Start of image
    SOI,
    /// End of image
    EOI,
    /// Start of scan
    SOS,
    /// Define quantization table(s)
    DQT,
    /// Reserved for application segments
    APP(u8),
}

impl From<Marker> for u8 {
    fn from(marker: Marker) -> Self {
        use self::Marker::*;

        match marker {
            SOF0 => 0xC0,
            DHT => 0xC4,
            SOI => 0xD8,
            EOI => 0xD9,
            SOS => 0xDA,
            DQT => 0xDB,
            APP(v) => 0xE0 + v,
        }
    }
}
