#![no_main]

use libfuzzer_sys::fuzz_target;

use jpeg_baseline::*;

fuzz_target!(|data: &[u8]| {

    let pixels = data.len() / 3;

    let width = (pixels as f64).sqrt() as u16;
    let height = width;

    if width > 0 && width < u16::MAX && height > 0 && height < u16::MAX {
        let data = &data[..usize::from(width) * usize::from(height) * 3];

        let out = encode(&Image::new(data, width, height, ColorType::Rgb), 100).unwrap();

        assert_eq!(&out[..2], &[0xFF, 0xD8]);
        assert_eq!(&out[out.len() - 2..], &[0xFF, 0xD9]);
    }
});
