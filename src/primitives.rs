//! Primitive record field types

use bytemuck::{Pod, Zeroable};

use std::mem::size_of;

/// Kind of a single slot within a record
///
/// Every kind except `UserVertex` has a fixed byte size, see [size].
/// The size of a `UserVertex` is a parameter of each run.
///
/// [size]: #method.size
#[derive(Debug,Copy,Clone,PartialEq,Eq,Hash)]
pub enum DataType {
    Null,
    Float,
    Int,
    Vector2,
    Vector3,
    Vector4,
    Mat4,
    Fragment,
    UserVertex,
}

impl DataType {
    /// Byte size of the type, `None` for `UserVertex`
    ///
    ///     use softraster::DataType;
    ///
    ///     assert_eq!(DataType::Vector3.fixed_size(), Some(12));
    ///     assert_eq!(DataType::Fragment.fixed_size(), Some(16));
    ///     assert_eq!(DataType::UserVertex.fixed_size(), None);
    ///
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            DataType::Null       => Some(0),
            DataType::Float      => Some(size_of::<f32>()),
            DataType::Int        => Some(size_of::<i32>()),
            DataType::Vector2    => Some(size_of::<Vector2>()),
            DataType::Vector3    => Some(size_of::<Vector3>()),
            DataType::Vector4    => Some(size_of::<Vector4>()),
            DataType::Mat4       => Some(size_of::<Mat4>()),
            DataType::Fragment   => Some(size_of::<Fragment>()),
            DataType::UserVertex => None,
        }
    }
    /// Byte size of the type, with `UserVertex` taking `vertex_size`
    pub fn size(self, vertex_size: usize) -> usize {
        self.fixed_size().unwrap_or(vertex_size)
    }
}

/// Kind of polygon assembled by the rasterizer
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Polygon {
    Triangles,
    Lines,
    Points,
}

impl Polygon {
    /// Number of input vertices making up one primitive
    pub fn arity(self) -> usize {
        match self {
            Polygon::Points    => 1,
            Polygon::Lines     => 2,
            Polygon::Triangles => 3,
        }
    }
}

/// Depth test policy of the rasterizer
///
/// All precisions currently share the 8-bit [ByteDepthBuffer].
///
/// [ByteDepthBuffer]: ../depth/struct.ByteDepthBuffer.html
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum DepthBuffering {
    BytePrecision,
    ShortPrecision,
    FloatPrecision,
    None,
}

impl Default for DepthBuffering {
    fn default() -> DepthBuffering {
        DepthBuffering::BytePrecision
    }
}

#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
impl Vector4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// Row-major 4x4 matrix
#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Mat4 {
    pub data: [f32; 16],
}

/// Pixel produced by the rasterizer
///
/// `x`,`y` address the framebuffer with the origin at the top left.
/// `bias0..2` are the barycentric weights of the three source vertices.
#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Fragment {
    pub x: u16,
    pub y: u16,
    pub bias0: f32,
    pub bias1: f32,
    pub bias2: f32,
}

impl Fragment {
    /// Interpolate three per-vertex values with the fragment weights
    pub fn interpolate(&self, a: f32, b: f32, c: f32) -> f32 {
        self.bias0 * a + self.bias1 * b + self.bias2 * c
    }
}
