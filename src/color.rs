// src/color.rs

//! Defines the packed colour type exchanged with the simulation module
//! (`PackedColor`) and the straight-alpha pixel type used by every image in
//! the host (`Rgba`).

use serde::{Deserialize, Serialize};
use std::fmt;

const RGB_MASK: u32 = 0x00FF_FFFF;

/// A 24-bit packed RGB colour: red in bits 16-23, green in bits 8-15,
/// blue in bits 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct PackedColor(u32);

impl PackedColor {
    pub const BLACK: PackedColor = PackedColor(0x00_0000);
    pub const WHITE: PackedColor = PackedColor(0xFF_FFFF);

    /// Creates a colour from a packed value. Bits above 23 are discarded.
    pub const fn new(value: u32) -> Self {
        Self(value & RGB_MASK)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Interprets a raw signed cell element as a colour.
    pub const fn from_cell_value(value: i32) -> Self {
        Self::new(value as u32)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn to_rgba(self) -> Rgba {
        Rgba::opaque(self.r(), self.g(), self.b())
    }
}

impl From<u32> for PackedColor {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<PackedColor> for u32 {
    fn from(color: PackedColor) -> Self {
        color.0
    }
}

impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r(), self.g(), self.b())
    }
}

/// RGBA colour in 32-bit format (8 bits per channel, straight alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to RGBA byte array
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Source-over composite of `self` onto `dst`, both straight alpha.
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => return self,
            0 => return dst,
            _ => {}
        }
        let src_a = self.a as u32;
        let dst_a = dst.a as u32 * (255 - src_a) / 255;
        let out_a = src_a + dst_a;
        if out_a == 0 {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: u8, d: u8| ((s as u32 * src_a + d as u32 * dst_a) / out_a) as u8;
        Rgba::new(
            mix(self.r, dst.r),
            mix(self.g, dst.g),
            mix(self.b, dst.b),
            out_a as u8,
        )
    }
}

impl From<PackedColor> for Rgba {
    fn from(color: PackedColor) -> Self {
        color.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn it_should_unpack_channels_from_the_packed_layout() {
        let color = PackedColor::new(0x12_34_56);
        assert_eq!((color.r(), color.g(), color.b()), (0x12, 0x34, 0x56));
        assert_eq!(PackedColor::from_rgb(0x12, 0x34, 0x56), color);
        assert_eq!(color.to_string(), "rgb(18, 52, 86)");
    }

    #[test]
    fn it_should_discard_bits_above_the_24_bit_range() {
        assert_eq!(PackedColor::new(0xFF00_0001).value(), 1);
        assert_eq!(PackedColor::from_cell_value(0x0100_00AB).value(), 0xAB);
        assert_eq!(PackedColor::from_cell_value(0x7F12_3456).value(), 0x12_3456);
    }

    #[test]
    fn it_should_composite_partially_transparent_pixels_over_the_destination() {
        let dst = Rgba::opaque(0, 0, 0);
        assert_eq!(Rgba::opaque(9, 9, 9).over(dst), Rgba::opaque(9, 9, 9));
        assert_eq!(Rgba::TRANSPARENT.over(dst), dst);

        let half = Rgba::new(255, 255, 255, 128).over(dst);
        assert_eq!(half.a, 255);
        assert_eq!(half.r, 128);
    }
}
