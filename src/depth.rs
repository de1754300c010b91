//! Depth buffers

use crate::primitives::DepthBuffering;
use crate::DepthTest;

/// Depth buffer storing one byte per pixel
///
/// Depth values in [-1,1] are quantized to [0,255]. A test passes when the
/// quantized value is strictly greater than the stored one, so larger z
/// values win. The buffer is cleared to 0 on reset.
///
///     use softraster::{ByteDepthBuffer, DepthTest};
///
///     let mut depth = ByteDepthBuffer::new();
///     depth.reset(4, 4);
///     assert!(depth.test(1, 2, 0.5));
///     assert!(!depth.test(1, 2, 0.2));
///     assert!(depth.test(1, 2, 0.9));
///
#[derive(Debug,Default,Clone)]
pub struct ByteDepthBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl ByteDepthBuffer {
    pub fn new() -> Self {
        Self { data: vec![], width: 0, height: 0 }
    }
    /// Map a depth in [-1,1] to [0,255]
    ///
    /// `None` when `z` is outside of [-1,1]
    pub fn quantize(z: f32) -> Option<u8> {
        if !(-1.0 ..= 1.0).contains(&z) {
            return None;
        }
        Some(((z + 1.0) * 0.5 * 255.0).round() as u8)
    }
    /// Stored value at (`x`,`y`)
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }
}

impl DepthTest for ByteDepthBuffer {
    fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, 0);
    }
    fn test(&mut self, x: usize, y: usize, z: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let q = match Self::quantize(z) {
            Some(q) => q,
            None => return false,
        };
        let stored = &mut self.data[y * self.width + x];
        if q > *stored {
            *stored = q;
            true
        } else {
            false
        }
    }
}

/// Depth buffer for a depth policy, `None` when depth testing is disabled
pub fn depth_buffer(mode: DepthBuffering) -> Option<Box<dyn DepthTest>> {
    match mode {
        DepthBuffering::BytePrecision |
        DepthBuffering::ShortPrecision |
        DepthBuffering::FloatPrecision => Some(Box::new(ByteDepthBuffer::new())),
        DepthBuffering::None => None,
    }
}
