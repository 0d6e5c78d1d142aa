/*
 * The default huffman tables are taken from
 * section K.3 Typical Huffman tables for 8-bit precision luminance and chrominance
 */

/// Table class as written to the DHT segment
#[derive(Copy, Clone, Debug)]
pub enum CodingClass {
    Dc = 0,
    Ac = 1,
}

static DEFAULT_LUMA_DC_CODE_LENGTHS: [u8; 16] = [
    0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

static DEFAULT_LUMA_DC_VALUES: [u8; 12] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0A, 0x0B,
];

static DEFAULT_CHROMA_DC_CODE_LENGTHS: [u8; 16] = [
    0x00, 0x03, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
];

static DEFAULT_CHROMA_DC_VALUES: [u8; 12] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0A, 0x0B,
];

static DEFAULT_LUMA_AC_CODE_LENGTHS: [u8; 16] = [
    0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03,
    0x05, 0x05, 0x04, 0x04, 0x00, 0x00, 0x01, 0x7D,
];

static DEFAULT_LUMA_AC_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
    0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
    0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16,
    0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
    0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
    0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
    0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
    0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6,
    0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
    0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4,
    0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA,
    0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

static DEFAULT_CHROMA_AC_CODE_LENGTHS: [u8; 16] = [
    0x00, 0x02, 0x01, 0x02, 0x04, 0x04, 0x03, 0x04,
    0x07, 0x05, 0x04, 0x04, 0x00, 0x01, 0x02, 0x77,
];

static DEFAULT_CHROMA_AC_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
    0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
    0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33, 0x52, 0xF0,
    0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34,
    0xE1, 0x25, 0xF1, 0x17, 0x18, 0x19, 0x1A, 0x26,
    0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38,
    0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7A, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5,
    0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4,
    0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
    0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2,
    0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA,
    0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9,
    0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

/// Code lookup for one of the four standard tables.
///
/// Maps a symbol to its `(size, code)` pair. Unused symbols have size 0.
pub struct HuffmanTable {
    lookup_table: [(u8, u16); 256],
    length: [u8; 16],
    values: &'static [u8],
}

impl HuffmanTable {
    pub fn new(length: &[u8; 16], values: &'static [u8]) -> HuffmanTable {
        HuffmanTable {
            lookup_table: create_lookup_table(length, values),
            length: *length,
            values,
        }
    }

    pub fn default_luma_dc() -> HuffmanTable {
        Self::new(&DEFAULT_LUMA_DC_CODE_LENGTHS, &DEFAULT_LUMA_DC_VALUES)
    }

    pub fn default_luma_ac() -> HuffmanTable {
        Self::new(&DEFAULT_LUMA_AC_CODE_LENGTHS, &DEFAULT_LUMA_AC_VALUES)
    }

    pub fn default_chroma_dc() -> HuffmanTable {
        Self::new(&DEFAULT_CHROMA_DC_CODE_LENGTHS, &DEFAULT_CHROMA_DC_VALUES)
    }

    pub fn default_chroma_ac() -> HuffmanTable {
        Self::new(&DEFAULT_CHROMA_AC_CODE_LENGTHS, &DEFAULT_CHROMA_AC_VALUES)
    }

    #[inline]
    pub fn get_for_value(&self, value: u8) -> (u8, u16) {
        let res = self.lookup_table[value as usize];
        debug_assert!(res.0 > 0, "Got zero size code for value: {}", value);
        res
    }

    pub fn length(&self) -> &[u8; 16] {
        &self.length
    }

    pub fn values(&self) -> &[u8] {
        self.values
    }
}

// Canonical code assignment as defined in Figures C.1 to C.3:
// consecutive codes within a length, shifted left once per length step.
fn create_lookup_table(code_lengths: &[u8; 16], values: &[u8]) -> [(u8, u16); 256] {
    let mut lookup_table = [(0u8, 0u16); 256];

    let mut code = 0u32;
    let mut values = values.iter();

    for (i, &count) in code_lengths.iter().enumerate() {
        let size = (i + 1) as u8;

        for _ in 0..count {
            match values.next() {
                Some(&value) => lookup_table[value as usize] = (size, code as u16),
                None => return lookup_table,
            }
            code += 1;
        }

        code <<= 1;
    }

    lookup_table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tables() -> [HuffmanTable; 4] {
        [
            HuffmanTable::default_luma_dc(),
            HuffmanTable::default_luma_ac(),
            HuffmanTable::default_chroma_dc(),
            HuffmanTable::default_chroma_ac(),
        ]
    }

    fn codes(table: &HuffmanTable) -> Vec<(u8, u16)> {
        table.values().iter().map(|&v| table.get_for_value(v)).collect()
    }

    #[test]
    fn test_value_counts() {
        for table in &all_tables() {
            let total: usize = table.length().iter().map(|&c| c as usize).sum();
            assert_eq!(total, table.values().len());
        }
    }

    #[test]
    fn test_standard_codes() {
        let luma_dc = HuffmanTable::default_luma_dc();
        assert_eq!(luma_dc.get_for_value(0), (2, 0b00));
        assert_eq!(luma_dc.get_for_value(1), (3, 0b010));
        assert_eq!(luma_dc.get_for_value(5), (3, 0b110));
        assert_eq!(luma_dc.get_for_value(6), (4, 0b1110));
        assert_eq!(luma_dc.get_for_value(11), (9, 0b1_1111_1110));

        let luma_ac = HuffmanTable::default_luma_ac();
        assert_eq!(luma_ac.get_for_value(0x01), (2, 0b00));
        assert_eq!(luma_ac.get_for_value(0x02), (2, 0b01));
        assert_eq!(luma_ac.get_for_value(0x03), (3, 0b100));
        assert_eq!(luma_ac.get_for_value(0x00), (4, 0b1010));
        assert_eq!(luma_ac.get_for_value(0xF0), (11, 0b111_1111_1001));
        assert_eq!(luma_ac.get_for_value(0xFA), (16, 0xFFFE));

        let chroma_dc = HuffmanTable::default_chroma_dc();
        assert_eq!(chroma_dc.get_for_value(0), (2, 0b00));
        assert_eq!(chroma_dc.get_for_value(3), (3, 0b110));
        assert_eq!(chroma_dc.get_for_value(11), (11, 0b111_1111_1110));

        let chroma_ac = HuffmanTable::default_chroma_ac();
        assert_eq!(chroma_ac.get_for_value(0x00), (2, 0b00));
        assert_eq!(chroma_ac.get_for_value(0xF0), (10, 0b11_1111_1010));
    }

    #[test]
    fn test_canonical() {
        for table in &all_tables() {
            let codes = codes(table);

            for pair in codes.windows(2) {
                let (s1, c1) = pair[0];
                let (s2, c2) = pair[1];

                assert!(s1 <= s2);

                if s1 == s2 {
                    assert_eq!(c1 + 1, c2);
                }
            }
        }
    }

    #[test]
    fn test_prefix_free() {
        for table in &all_tables() {
            let codes = codes(table);

            for (i, &(s1, c1)) in codes.iter().enumerate() {
                for (j, &(s2, c2)) in codes.iter().enumerate() {
                    if i == j || s1 > s2 {
                        continue;
                    }

                    assert_ne!(c2 >> (s2 - s1), c1, "Code {:b} is a prefix of {:b}", c1, c2);
                }
            }
        }
    }

    #[test]
    fn test_no_all_ones_code() {
        for table in &all_tables() {
            for (size, code) in codes(table) {
                assert_ne!(u32::from(code), (1u32 << size) - 1);
            }
        }
    }
}
