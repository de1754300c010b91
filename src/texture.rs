//! RGBA8 image used as the pipeline framebuffer

use crate::color::{Color, Rgba8};
use crate::file;

use std::ops::Index;
use std::ops::IndexMut;
use std::path::Path;

/// Bytes per pixel
const BPP: usize = 4;

/// Rule applied when a pixel is written over an existing one
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ColorRule {
    /// Source overwrites destination
    None,
    /// Source is scaled by its alpha and added to the destination
    Alpha,
    /// Source is added to the destination
    Additive,
}
impl Default for ColorRule {
    fn default() -> ColorRule {
        ColorRule::Alpha
    }
}

/// Rule applied when sampling with normalized coordinates
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum SampleRule {
    /// Nearest pixel
    Basic,
    /// Bilinear blend of the four surrounding pixels
    LinearInterpolation,
}
impl Default for SampleRule {
    fn default() -> SampleRule {
        SampleRule::Basic
    }
}

/// Export format for [get_as_format](struct.Texture.html#method.get_as_format)
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Format {
    /// Red, Green, Blue; 3 bytes per pixel
    Rgb,
    /// Red, Green, Blue premultiplied by Alpha; 3 bytes per pixel
    BlendedRgb,
    /// Average of all four components; 1 byte per pixel
    Grayscale,
}

/// 32-bit RGBA image
///
/// Data is stored as row-major order (C-format), the first pixel is
/// the top left of the image
#[derive(Debug,Clone,Default)]
pub struct Texture {
    data: Vec<u8>,
    width: usize,
    height: usize,
    color_rule: ColorRule,
    sample_rule: SampleRule,
}

impl Texture {
    /// Create a new image of `width` x `height`
    ///
    /// Pixels are initialized to transparent black
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (usize::from(width), usize::from(height));
        Self { data: vec![0u8; width * height * BPP],
               width, height,
               color_rule: ColorRule::default(),
               sample_rule: SampleRule::default(),
        }
    }
    /// Create a new image from RGBA data
    ///
    /// Returns `None` when `data` is not `width * height * 4` bytes
    pub fn from_data(width: u16, height: u16, data: Vec<u8>) -> Option<Self> {
        let mut tex = Self::new(width, height);
        if data.len() != tex.data.len() {
            return None;
        }
        tex.data = data;
        Some(tex)
    }
    /// Read an image from a file
    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self, image::ImageError> {
        let (data, w, h) = file::read_file(filename)?;
        let mut tex = Self::new(w, h);
        tex.data = data;
        Ok(tex)
    }
    /// Save the image to a file, format is taken from the extension
    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), std::io::Error> {
        file::write_file(&self.data, self.width, self.height, filename)
    }
    /// Image Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }
    /// Image Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }
    /// Raw pixel data, `width * height * 4` bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
    pub fn set_color_rule(&mut self, rule: ColorRule) {
        self.color_rule = rule;
    }
    pub fn color_rule(&self) -> ColorRule {
        self.color_rule
    }
    pub fn set_sample_rule(&mut self, rule: SampleRule) {
        self.sample_rule = rule;
    }
    pub fn sample_rule(&self) -> SampleRule {
        self.sample_rule
    }
    /// Set every pixel to `c`, ignoring the color rule
    pub fn clear(&mut self, c: Rgba8) {
        let c = c.to_array();
        self.data.chunks_exact_mut(BPP).for_each(|p| p.copy_from_slice(&c));
    }
    /// Write a pixel following the color rule
    ///
    /// Locations outside of the image are ignored
    ///
    ///     use softraster::{Texture, ColorRule, Rgba8};
    ///
    ///     let mut tex = Texture::new(2,2);
    ///     tex.set_color_rule(ColorRule::Additive);
    ///     tex.put_pixel(1,0, Rgba8::new(100,0,0,10));
    ///     tex.put_pixel(1,0, Rgba8::new(200,0,0,10));
    ///     assert_eq!(tex.get_pixel(1,0), Rgba8::new(255,0,0,20));
    ///     tex.put_pixel(5,5, Rgba8::white()); // Ignored
    ///
    pub fn put_pixel(&mut self, x: usize, y: usize, src: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let dst = self.get_pixel(x, y);
        let out = match self.color_rule {
            ColorRule::None => src,
            ColorRule::Alpha => {
                let alpha = f32::from(src.a) / 255.0;
                let add = |d: u8, s: u8| {
                    (f32::from(d) + f32::from(s) * alpha).min(255.0) as u8
                };
                Rgba8::new(add(dst.r, src.r), add(dst.g, src.g),
                           add(dst.b, src.b), add(dst.a, src.a))
            },
            ColorRule::Additive => {
                Rgba8::new(dst.r.saturating_add(src.r),
                           dst.g.saturating_add(src.g),
                           dst.b.saturating_add(src.b),
                           dst.a.saturating_add(src.a))
            },
        };
        self[(x,y)][..BPP].copy_from_slice(&out.to_array());
    }
    /// Write a floating point color following the color rule
    pub fn put_color(&mut self, x: usize, y: usize, c: Color) {
        self.put_pixel(x, y, Rgba8::from(c));
    }
    /// Read a pixel
    ///
    /// Locations outside of the image read as transparent black
    pub fn get_pixel(&self, x: usize, y: usize) -> Rgba8 {
        if x >= self.width || y >= self.height {
            return Rgba8::transparent();
        }
        Rgba8::from_slice(&self[(x,y)])
    }
    pub fn get_color(&self, x: usize, y: usize) -> Color {
        Color::from(self.get_pixel(x, y))
    }
    /// Sample the image at normalized coordinates following the sample rule
    ///
    /// `u` and `v` are clamped to [0,1]
    pub fn sample_pixel(&self, u: f32, v: f32) -> Rgba8 {
        if self.width == 0 || self.height == 0 {
            return Rgba8::transparent();
        }
        let u = u.max(0.0).min(1.0);
        let v = v.max(0.0).min(1.0);
        match self.sample_rule {
            SampleRule::Basic => {
                let x = ((u * self.width as f32) as usize).min(self.width - 1);
                let y = ((v * self.height as f32) as usize).min(self.height - 1);
                self.get_pixel(x, y)
            },
            SampleRule::LinearInterpolation => {
                let fx = u * (self.width - 1) as f32;
                let fy = v * (self.height - 1) as f32;
                let (x0, y0) = (fx.floor() as usize, fy.floor() as usize);
                let x1 = (x0 + 1).min(self.width - 1);
                let y1 = (y0 + 1).min(self.height - 1);
                let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
                let p = [self.get_color(x0,y0), self.get_color(x1,y0),
                         self.get_color(x0,y1), self.get_color(x1,y1)];
                let mix = |a: f32, b: f32, c: f32, d: f32| {
                    let top = a + (b - a) * tx;
                    let bot = c + (d - c) * tx;
                    top + (bot - top) * ty
                };
                Rgba8::from(Color::new(mix(p[0].r, p[1].r, p[2].r, p[3].r),
                                       mix(p[0].g, p[1].g, p[2].g, p[3].g),
                                       mix(p[0].b, p[1].b, p[2].b, p[3].b),
                                       mix(p[0].a, p[1].a, p[2].a, p[3].a)))
            },
        }
    }
    /// Write `src` with its top left at (`x`,`y`)
    ///
    /// Only destination pixels with x < `max_x` and y < `max_y` are written.
    /// Pixels follow the color rule, those outside of the image are discarded.
    pub fn put_texture(&mut self, x: i64, y: i64, max_x: i64, max_y: i64, src: &Texture) {
        for sy in 0 .. src.height {
            let dy = y + sy as i64;
            if dy >= max_y {
                break;
            }
            for sx in 0 .. src.width {
                let dx = x + sx as i64;
                if dx >= max_x {
                    break;
                }
                if dx < 0 || dy < 0 {
                    continue;
                }
                self.put_pixel(dx as usize, dy as usize, src.get_pixel(sx, sy));
            }
        }
    }
    /// Export the image in a different pixel format
    pub fn get_as_format(&self, fmt: Format) -> Vec<u8> {
        let pixels = self.data.chunks_exact(BPP);
        match fmt {
            Format::Rgb => pixels.flat_map(|p| p[..3].to_vec()).collect(),
            Format::BlendedRgb => {
                pixels.flat_map(|p| {
                    let a = u32::from(p[3]);
                    p[..3].iter()
                        .map(|&c| ((u32::from(c) * a + 127) / 255) as u8)
                        .collect::<Vec<_>>()
                }).collect()
            },
            Format::Grayscale => {
                pixels.map(|p| {
                    let sum : u32 = p.iter().map(|&c| u32::from(c)).sum();
                    (sum / 4) as u8
                }).collect()
            },
        }
    }
    /// Resize the image, keeping the old content in the top left
    pub fn resize(&mut self, width: u16, height: u16) {
        let mut out = Texture::new(width, height);
        out.color_rule = self.color_rule;
        out.sample_rule = self.sample_rule;
        let w = self.width.min(out.width);
        for row in 0 .. self.height.min(out.height) {
            let src = row * self.width * BPP;
            let dst = row * out.width * BPP;
            out.data[dst .. dst + w * BPP].copy_from_slice(&self.data[src .. src + w * BPP]);
        }
        *self = out;
    }
    /// Resize the image without keeping its content
    ///
    /// All pixels are transparent black afterwards
    pub fn resize_fast(&mut self, width: u16, height: u16) {
        self.width = usize::from(width);
        self.height = usize::from(height);
        self.data = vec![0u8; self.width * self.height * BPP];
    }
}

impl Index<(usize,usize)> for Texture {
    type Output = [u8];
    fn index(&self, index: (usize, usize)) -> &[u8] {
        assert!(index.0 < self.width, "request {} >= {} width :: index", index.0, self.width);
        assert!(index.1 < self.height, "request {} >= {} height :: index", index.1, self.height);
        let i = ((index.1 * self.width) + index.0) * BPP;
        &self.data[i .. i + BPP]
    }
}
impl IndexMut<(usize,usize)> for Texture {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut [u8] {
        assert!(index.0 < self.width, "request {} >= {} width :: index_mut", index.0, self.width);
        assert!(index.1 < self.height, "request {} >= {} height :: index_mut", index.1, self.height);
        let i = ((index.1 * self.width) + index.0) * BPP;
        &mut self.data[i .. i + BPP]
    }
}
