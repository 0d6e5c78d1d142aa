use std::num::NonZeroU8;

use crate::writer::ZIGZAG;

// Tables K.1 and K.2, stored in zig-zag order
static DEFAULT_LUMA_TABLE: [u8; 64] = [
    16, 11, 12, 14, 12, 10, 16, 14,
    13, 14, 18, 17, 16, 19, 24, 40,
    26, 24, 22, 22, 24, 49, 35, 37,
    29, 40, 58, 51, 61, 60, 57, 51,
    56, 55, 64, 72, 92, 78, 64, 68,
    87, 69, 55, 56, 80, 109, 81, 87,
    95, 98, 103, 104, 103, 62, 77, 113,
    121, 112, 100, 120, 92, 101, 103, 99,
];

static DEFAULT_CHROMA_TABLE: [u8; 64] = [
    17, 18, 18, 24, 21, 24, 47, 26,
    26, 47, 99, 66, 56, 66, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Quantization table in zig-zag order, as written to the DQT segment.
pub struct QuantizationTable {
    table: [NonZeroU8; 64],
}

impl QuantizationTable {
    pub fn new_with_quality(table: &[u8; 64], quality: u8) -> QuantizationTable {
        let quality = quality.max(1).min(100) as u32;

        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - quality * 2
        };

        let mut q_table = [NonZeroU8::MIN; 64];

        for (q, &v) in q_table.iter_mut().zip(table.iter()) {
            let v = (v as u32 * scale + 50) / 100;

            // Clamped to 1..=255 so the conversion never fails
            *q = NonZeroU8::new(v.max(1).min(255) as u8).unwrap_or(NonZeroU8::MIN);
        }

        QuantizationTable {
            table: q_table
        }
    }

    pub fn default_luma(quality: u8) -> QuantizationTable {
        Self::new_with_quality(&DEFAULT_LUMA_TABLE, quality)
    }

    pub fn default_chroma(quality: u8) -> QuantizationTable {
        Self::new_with_quality(&DEFAULT_CHROMA_TABLE, quality)
    }

    /// Value at zig-zag position `index`
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.table[index].get()
    }

    /// Divisors for the scaled DCT output in natural order.
    ///
    /// The forward DCT leaves its results scaled up by 8, so every table entry
    /// is multiplied by 8 here and quantization needs no further correction.
    pub fn scale_factors(&self) -> ScaleFactors {
        let mut factors = [0u16; 64];

        for (i, q) in self.table.iter().enumerate() {
            factors[ZIGZAG[i] as usize] = u16::from(q.get()) * 8;
        }

        ScaleFactors(factors)
    }
}

/// Per frequency divisors in natural (row major) order
pub struct ScaleFactors([u16; 64]);

impl ScaleFactors {
    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        self.0[index]
    }

    /// Divides a raw DCT coefficient by its scale factor, rounding half up.
    #[inline]
    pub fn quantize(&self, value: i16, index: usize) -> i16 {
        let scale = i32::from(self.get(index));
        let value = (i32::from(value) << 1) / scale;
        ((value + 1) >> 1) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_range() {
        for quality in 0..=255u8 {
            for table in [QuantizationTable::default_luma(quality), QuantizationTable::default_chroma(quality)] {
                for i in 0..64 {
                    let v = table.get(i);
                    assert!(v >= 1, "Zero entry for quality {}", quality);
                    assert!(u32::from(v) <= 255, "Entry above 255 for quality {}", quality);
                }
            }
        }
    }

    #[test]
    fn test_lower_quality_coarser() {
        for (low, high) in [
            (QuantizationTable::default_luma(1), QuantizationTable::default_luma(100)),
            (QuantizationTable::default_chroma(1), QuantizationTable::default_chroma(100)),
            (QuantizationTable::default_luma(25), QuantizationTable::default_luma(75)),
        ] {
            for i in 0..64 {
                assert!(low.get(i) > high.get(i), "Entry {} not coarser: {} <= {}", i, low.get(i), high.get(i));
            }
        }

        // Scaling never decreases when quality drops
        for quality in 2..=100u8 {
            let coarse = QuantizationTable::default_luma(quality - 1);
            let fine = QuantizationTable::default_luma(quality);

            for i in 0..64 {
                assert!(coarse.get(i) >= fine.get(i), "Quality {} entry {}", quality, i);
            }
        }
    }

    #[test]
    fn test_quality_scaling() {
        let q1 = QuantizationTable::default_luma(1);
        let q50 = QuantizationTable::default_luma(50);
        let q75 = QuantizationTable::default_luma(75);
        let q100 = QuantizationTable::default_luma(100);

        for i in 0..64 {
            assert_eq!(q1.get(i), 255);
            assert_eq!(q50.get(i), DEFAULT_LUMA_TABLE[i]);
            assert_eq!(q100.get(i), 1);
        }

        assert_eq!(q75.get(0), 8);
        assert_eq!(q75.get(1), 6);
        assert_eq!(q75.get(63), 50);
    }

    #[test]
    fn test_quality_clamped() {
        let q0 = QuantizationTable::default_chroma(0);
        let q1 = QuantizationTable::default_chroma(1);
        let q200 = QuantizationTable::default_chroma(200);
        let q100 = QuantizationTable::default_chroma(100);

        for i in 0..64 {
            assert_eq!(q0.get(i), q1.get(i));
            assert_eq!(q200.get(i), q100.get(i));
        }
    }

    #[test]
    fn test_scale_factors_natural_order() {
        let table = QuantizationTable::default_luma(50);
        let factors = table.scale_factors();

        // Natural order table K.1 row 0 is 16, 11, 10, 16, ...
        assert_eq!(factors.get(0), 16 * 8);
        assert_eq!(factors.get(1), 11 * 8);
        assert_eq!(factors.get(2), 10 * 8);
        // Row 1 starts with 12
        assert_eq!(factors.get(8), 12 * 8);
        assert_eq!(factors.get(63), 99 * 8);
    }

    #[test]
    fn test_quantize_rounding() {
        let factors = QuantizationTable::default_luma(100).scale_factors();

        // Divisor is 8
        assert_eq!(factors.quantize(0, 0), 0);
        assert_eq!(factors.quantize(3, 0), 0);
        assert_eq!(factors.quantize(4, 0), 1);
        assert_eq!(factors.quantize(11, 0), 1);
        assert_eq!(factors.quantize(12, 0), 2);
        assert_eq!(factors.quantize(-4, 0), 0);
        assert_eq!(factors.quantize(-8, 0), -1);
        assert_eq!(factors.quantize(-12, 0), -1);
        assert_eq!(factors.quantize(8128, 0), 1016);
    }
}
