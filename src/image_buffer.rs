#![allow(clippy::identity_op)]

use crate::encoder::JpegColorType;

/// Conversion from RGB to YCbCr
///
/// To avoid floating point math this scales everything by 2^16 which gives
/// a precision of approx 4 digits.
///
/// Non scaled conversion:
/// Y  =  0.29900 * R + 0.58700 * G + 0.11400 * B
/// Cb = -0.16874 * R - 0.33126 * G + 0.50000 * B  + 128
/// Cr =  0.50000 * R - 0.41869 * G - 0.08131 * B  + 128
///
/// Y is rounded to nearest. Cb and Cr round with one less than a half so
/// the +128 offset can never push them past 255.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as i32;
    let g = g as i32;
    let b = b as i32;

    let y = 19595 * r + 38470 * g + 7471 * b + (1 << 15);
    let cb = -11059 * r - 21709 * g + 32768 * b + (128 << 16) + ((1 << 15) - 1);
    let cr = 32768 * r - 27439 * g - 5329 * b + (128 << 16) + ((1 << 15) - 1);

    let y = y >> 16;
    let cb = cb >> 16;
    let cr = cr >> 16;

    (y as u8, cb as u8, cr as u8)
}

/// Expand a 16 bit 5-6-5 pixel to 8 bits per channel
#[inline]
pub fn rgb565_to_rgb(value: u16) -> (u8, u8, u8) {
    let r = u32::from((value & 0xF800) >> 11);
    let g = u32::from((value & 0x07E0) >> 5);
    let b = u32::from(value & 0x001F);

    ((r * 255 / 31) as u8, (g * 255 / 63) as u8, (b * 255 / 31) as u8)
}

/// Source of component samples for the block loop.
///
/// `fill_buffers` appends one sample per component for the pixel at `x`, `y`.
/// Callers must keep the coordinates inside the image.
pub trait ImageBuffer {
    fn get_jpeg_color_type(&self) -> JpegColorType;

    fn width(&self) -> u16;

    fn height(&self) -> u16;

    fn fill_buffers(&self, x: u16, y: u16, buffers: &mut [Vec<u8>; 4]);
}

pub(crate) struct GrayImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for GrayImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Luma
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, x: u16, y: u16, buffers: &mut [Vec<u8>; 4]) {
        let offset = usize::from(y) * usize::from(self.1) + usize::from(x);

        buffers[0].push(self.0[offset + 0]);
    }
}

macro_rules! ycbcr_image {
    ($name:ident, $num_colors:expr, $o1:expr, $o2:expr, $o3:expr) => {
        pub struct $name<'a>(pub &'a [u8], pub u16, pub u16);

        impl<'a> ImageBuffer for $name<'a> {
            fn get_jpeg_color_type(&self) -> JpegColorType {
                JpegColorType::Ycbcr
            }

            fn width(&self) -> u16 {
                self.1
            }

            fn height(&self) -> u16 {
                self.2
            }

            #[inline(always)]
            fn fill_buffers(&self, x: u16, y: u16, buffers: &mut [Vec<u8>; 4]) {
                let offset = (usize::from(y) * usize::from(self.1) + usize::from(x)) * $num_colors;
                let (y, cb, cr) = rgb_to_ycbcr(self.0[offset + $o1], self.0[offset + $o2], self.0[offset + $o3]);

                buffers[0].push(y);
                buffers[1].push(cb);
                buffers[2].push(cr);
            }
        }
    }
}

ycbcr_image!(RgbImage, 3, 0, 1, 2);
ycbcr_image!(BgrImage, 3, 2, 1, 0);

pub(crate) struct Rgb565Image<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for Rgb565Image<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Ycbcr
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, x: u16, y: u16, buffers: &mut [Vec<u8>; 4]) {
        let offset = (usize::from(y) * usize::from(self.1) + usize::from(x)) * 2;

        let value = u16::from_le_bytes([self.0[offset + 0], self.0[offset + 1]]);
        let (r, g, b) = rgb565_to_rgb(value);
        let (y, cb, cr) = rgb_to_ycbcr(r, g, b);

        buffers[0].push(y);
        buffers[1].push(cb);
        buffers[2].push(cr);
    }
}

/// CMYK samples, stored inverted as Adobe applications expect
pub(crate) struct CmykImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for CmykImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Cmyk
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, x: u16, y: u16, buffers: &mut [Vec<u8>; 4]) {
        let offset = (usize::from(y) * usize::from(self.1) + usize::from(x)) * 4;

        buffers[0].push(255 - self.0[offset + 0]);
        buffers[1].push(255 - self.0[offset + 1]);
        buffers[2].push(255 - self.0[offset + 2]);
        buffers[3].push(255 - self.0[offset + 3]);
    }
}
