//! Colors

use bytemuck::{Pod, Zeroable};

/// Convert an f32 [0,1] component to a u8 [0,255] component
///
/// Values outside of [0,1] are clamped
pub fn cu8(v: f32) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Convert a u8 [0,255] component to an f32 [0,1] component
pub fn cf32(v: u8) -> f32 {
    f32::from(v) / 255.0
}

/// Color as Red, Green, Blue, and Alpha
#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Eq,Pod,Zeroable)]
pub struct Rgba8 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba8 {
    /// White Color (255,255,255,255)
    pub fn white() -> Self {
        Self::new(255,255,255,255)
    }
    /// Black Color (0,0,0,255)
    pub fn black() -> Self {
        Self::new(0,0,0,255)
    }
    /// Fully transparent black (0,0,0,0)
    pub fn transparent() -> Self {
        Self::new(0,0,0,0)
    }
    /// Create new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba8 { r, g, b, a }
    }
    /// Components in memory order
    pub fn to_array(self) -> [u8;4] {
        [self.r, self.g, self.b, self.a]
    }
    /// Create a color from components in memory order
    pub fn from_slice(p: &[u8]) -> Self {
        Rgba8::new(p[0], p[1], p[2], p[3])
    }
}

/// Color with floating point components in [0,1]
#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

impl From<Color> for Rgba8 {
    fn from(c: Color) -> Rgba8 {
        Rgba8::new(cu8(c.r), cu8(c.g), cu8(c.b), cu8(c.a))
    }
}
impl From<Rgba8> for Color {
    fn from(c: Rgba8) -> Color {
        Color::new(cf32(c.r), cf32(c.g), cf32(c.b), cf32(c.a))
    }
}
