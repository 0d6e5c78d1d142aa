#![no_main]

use libfuzzer_sys::fuzz_target;

use jpeg_baseline::*;

const COLOR_TYPES: [ColorType; 5] = [
    ColorType::Luma,
    ColorType::Rgb,
    ColorType::Bgr,
    ColorType::Rgb565,
    ColorType::Cmyk,
];

// First byte picks the color type, second the quality, third the width
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let color_type = COLOR_TYPES[usize::from(data[0]) % COLOR_TYPES.len()];
    let quality = data[1];
    let width = u16::from(data[2]).max(1);
    let data = &data[3..];

    let bytes_per_pixel = match color_type {
        ColorType::Luma => 1,
        ColorType::Rgb565 => 2,
        ColorType::Rgb | ColorType::Bgr => 3,
        ColorType::Cmyk => 4,
    };

    let height = data.len() / bytes_per_pixel / usize::from(width);

    if height == 0 || height > usize::from(u16::MAX) {
        return;
    }

    let data = &data[..usize::from(width) * height * bytes_per_pixel];

    encode(&Image::new(data, width, height as u16, color_type), quality).unwrap();
});
