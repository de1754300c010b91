//! Example stages shared by the integration tests

#![allow(dead_code)]

use softraster::{DataType, Fragment, Rgba8, RuntimeIo, Signature, Stage, Vector3};
use bytemuck::{Pod, Zeroable};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Position and color
#[repr(C)]
#[derive(Debug,Default,Copy,Clone,PartialEq,Pod,Zeroable)]
pub struct Vertex {
    pub x: f32, pub y: f32, pub z: f32,
    pub r: f32, pub g: f32, pub b: f32, pub a: f32,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, r: f32, g: f32, b: f32, a: f32) -> Self {
        Vertex { x, y, z, r, g, b, a }
    }
    pub fn white(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 1.0, 1.0, 1.0, 1.0)
    }
}

/// Triangle covering the lower half of the framebuffer with its apex at the top
pub fn triangle(z: f32) -> [Vertex; 3] {
    [Vertex::white(-1.0, -1.0, z),
     Vertex::white( 1.0, -1.0, z),
     Vertex::white( 0.0,  1.0, z)]
}

/// Moves every vertex by an offset
#[derive(Debug,Default)]
pub struct VertexShader {
    pub offset: Vector3,
}

impl Stage for VertexShader {
    fn input_signature(&self) -> Signature {
        Signature::user_vertex()
    }
    fn output_signature(&self) -> Signature {
        Signature::user_vertex()
    }
    fn execute(&mut self, io: &mut RuntimeIo<'_>) {
        let mut v : Vertex = io.read_next();
        v.x += self.offset.x;
        v.y += self.offset.y;
        v.z += self.offset.z;
        io.write_next(&v);
        io.commit();
    }
}

pub fn fragment_signature() -> Signature {
    Signature::from(vec![DataType::Fragment,
                         DataType::UserVertex,
                         DataType::UserVertex,
                         DataType::UserVertex])
}

/// Writes the interpolated vertex color of each fragment
#[derive(Debug,Default)]
pub struct FragmentShader;

impl Stage for FragmentShader {
    fn input_signature(&self) -> Signature {
        fragment_signature()
    }
    fn output_signature(&self) -> Signature {
        Signature::new()
    }
    fn execute(&mut self, io: &mut RuntimeIo<'_>) {
        let frag : Fragment = io.read_next();
        let v : [Vertex; 3] = [io.read_next(), io.read_next(), io.read_next()];
        let color = Rgba8::new(
            softraster::cu8(frag.interpolate(v[0].r, v[1].r, v[2].r)),
            softraster::cu8(frag.interpolate(v[0].g, v[1].g, v[2].g)),
            softraster::cu8(frag.interpolate(v[0].b, v[1].b, v[2].b)),
            softraster::cu8(frag.interpolate(v[0].a, v[1].a, v[2].a)));
        io.framebuffer_mut().put_pixel(usize::from(frag.x), usize::from(frag.y), color);
    }
}

/// Keeps every fragment and its source vertices
#[derive(Debug,Default)]
pub struct FragmentRecorder {
    pub fragments: Vec<Fragment>,
    pub vertices: Vec<[Vertex; 3]>,
}

impl Stage for FragmentRecorder {
    fn input_signature(&self) -> Signature {
        fragment_signature()
    }
    fn output_signature(&self) -> Signature {
        Signature::new()
    }
    fn execute(&mut self, io: &mut RuntimeIo<'_>) {
        if io.current_iteration() == 0 {
            self.fragments.clear();
            self.vertices.clear();
        }
        self.fragments.push(io.read_next());
        self.vertices.push([io.read_next(), io.read_next(), io.read_next()]);
    }
}

/// Accepts anything shaped like `sig`, outputs `out`
pub struct Shape {
    pub sig: Signature,
    pub out: Signature,
}

impl Shape {
    pub fn new(sig: Vec<DataType>, out: Vec<DataType>) -> Self {
        Shape { sig: Signature::from(sig), out: Signature::from(out) }
    }
}

impl Stage for Shape {
    fn input_signature(&self) -> Signature {
        self.sig.clone()
    }
    fn output_signature(&self) -> Signature {
        self.out.clone()
    }
    fn execute(&mut self, _io: &mut RuntimeIo<'_>) {}
}
