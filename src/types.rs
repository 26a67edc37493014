//! Small value types shared across record layouts.

use std::f32::consts::TAU;

/// Three-component float vector (world positions, scales, axes).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Two-component float vector (texture coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// ARGB color, stored on disk as a packed ARGB8 u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_argb8(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    pub const fn to_argb8(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Converts radians to binary angle measurement (0x10000 per full turn).
pub fn rad_to_bams(rad: f32) -> i32 {
    (rad / TAU * 65536.0) as i32
}

/// Converts binary angle measurement to radians.
pub fn bams_to_rad(bams: i32) -> f32 {
    bams as f32 / 65536.0 * TAU
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packs_argb8() {
        let c = Color::from_argb8(0x80FF4020);
        assert_eq!((c.a, c.r, c.g, c.b), (0x80, 0xFF, 0x40, 0x20));
        assert_eq!(c.to_argb8(), 0x80FF4020);
    }

    #[test]
    fn bams_quarter_turn() {
        assert_eq!(rad_to_bams(TAU / 4.0), 0x4000);
        let rad = bams_to_rad(0x8000);
        assert!((rad - TAU / 2.0).abs() < 1e-4);
    }
}
