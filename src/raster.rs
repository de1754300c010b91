//! Rasterizer stage
//!
//! Collects incoming vertices into polygons and emits one `Fragment`
//! record per covered pixel, followed by the source vertices so later
//! stages can interpolate their attributes.

use crate::depth::depth_buffer;
use crate::primitives::DataType;
use crate::primitives::DepthBuffering;
use crate::primitives::Fragment;
use crate::primitives::Polygon;
use crate::primitives::Vector3;
use crate::runtime::RuntimeIo;
use crate::signature::Signature;
use crate::DepthTest;
use crate::Stage;

use std::cmp::max;
use std::cmp::min;
use std::mem::size_of;

/// Vertices of the polygon being assembled
#[derive(Debug,Default)]
struct VertexAccumulator {
    vertices: Vec<Vec<u8>>,
    count: usize,
}

impl VertexAccumulator {
    fn reset(&mut self, arity: usize, vertex_size: usize) {
        self.vertices = vec![vec![0u8; vertex_size]; arity];
        self.count = 0;
    }
    /// Store a vertex, returns true once the polygon is complete
    fn push(&mut self, vertex: &[u8]) -> bool {
        let slot = &mut self.vertices[self.count];
        let n = min(slot.len(), vertex.len());
        slot[..n].copy_from_slice(&vertex[..n]);
        self.count += 1;
        self.count == self.vertices.len()
    }
    /// Position at the start of vertex `i`
    fn position(&self, i: usize) -> Option<Vector3> {
        let v = &self.vertices[i];
        if v.len() < size_of::<Vector3>() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&v[..size_of::<Vector3>()]))
    }
}

/// Built-in stage turning vertices into fragments
///
/// Input is a single `UserVertex` whose first bytes are a `Vector3`
/// position in homogeneous coordinates ([-1,1] spans the framebuffer,
/// y pointing up). Output is a `Fragment` followed by the polygon's
/// vertices.
///
/// Only triangles produce fragments; points and lines are accepted
/// but not rasterized.
pub struct Rasterizer {
    polygon: Polygon,
    depth: Option<Box<dyn DepthTest>>,
    accum: VertexAccumulator,
    warned: bool,
}

/// Create a rasterizer for `polygon` with a depth test of `depth`
pub fn create_rasterizer(polygon: Polygon, depth: DepthBuffering) -> Rasterizer {
    Rasterizer::new(polygon, depth)
}

impl Rasterizer {
    pub fn new(polygon: Polygon, depth: DepthBuffering) -> Self {
        Self { polygon, depth: depth_buffer(depth), accum: VertexAccumulator::default(), warned: false }
    }
    /// Create a rasterizer using a custom depth test
    pub fn with_depth_test(polygon: Polygon, depth: Box<dyn DepthTest>) -> Self {
        Self { polygon, depth: Some(depth), accum: VertexAccumulator::default(), warned: false }
    }
    pub fn polygon(&self) -> Polygon {
        self.polygon
    }
    fn new_run(&mut self, io: &RuntimeIo<'_>) {
        let vertex_size = io.size_of(DataType::UserVertex);
        self.accum.reset(self.polygon.arity(), vertex_size);
        self.warned = false;
        let fb = io.framebuffer();
        if let Some(depth) = self.depth.as_mut() {
            depth.reset(fb.width(), fb.height());
        }
        log::trace!("rasterizer: {:?} over {}x{}, vertex {} bytes",
                    self.polygon, fb.width(), fb.height(), vertex_size);
    }
    fn populate_triangle(&mut self, io: &mut RuntimeIo<'_>) {
        let mut p = [Vector3::default(); 3];
        for (i, pos) in p.iter_mut().enumerate() {
            match self.accum.position(i) {
                Some(v) => *pos = v,
                None => {
                    if !self.warned {
                        log::warn!("rasterizer: vertex of {} bytes has no position",
                                   self.accum.vertices[i].len());
                        self.warned = true;
                    }
                    return;
                },
            }
        }
        let (width, height) = (io.framebuffer().width(), io.framebuffer().height());
        if width == 0 || height == 0 {
            return;
        }
        let (w, h) = (width as f32, height as f32);
        let sx = [w * (p[0].x + 1.0) / 2.0, w * (p[1].x + 1.0) / 2.0, w * (p[2].x + 1.0) / 2.0];
        let sy = [h * (p[0].y + 1.0) / 2.0, h * (p[1].y + 1.0) / 2.0, h * (p[2].y + 1.0) / 2.0];

        // [a b; c d] maps (w0,w1) to a position relative to v2
        let (a, b) = (sx[0] - sx[2], sx[1] - sx[2]);
        let (c, d) = (sy[0] - sy[2], sy[1] - sy[2]);
        let det = a * d - b * c;
        if det == 0.0 || !det.is_finite() {
            log::trace!("rasterizer: degenerate triangle {:?}", p);
            return;
        }
        // Coverage is decided on undivided numerators so pixels on an edge
        // stay at exactly zero whatever the vertex order
        let sign = det.signum();

        let lo = |v: &[f32;3]| v[0].min(v[1]).min(v[2]).floor() as i64;
        let hi = |v: &[f32;3]| v[0].max(v[1]).max(v[2]).ceil() as i64;
        let (x0, x1) = (max(lo(&sx), 0), min(hi(&sx), width as i64 - 1));
        let (y0, y1) = (max(lo(&sy), 0), min(hi(&sy), height as i64 - 1));

        let mut n = 0;
        for y in y0 ..= y1 {
            for x in x0 ..= x1 {
                let (vx, vy) = (x as f32 - sx[2], y as f32 - sy[2]);
                let n0 = d * vx - b * vy;
                let n1 = a * vy - c * vx;
                let n2 = det - n0 - n1;
                if n0 * sign < 0.0 || n1 * sign < 0.0 || n2 * sign < 0.0 {
                    continue;
                }
                let (w0, w1, w2) = (n0 / det, n1 / det, n2 / det);
                let (px, py) = (x as usize, height - 1 - y as usize);
                if let Some(depth) = self.depth.as_mut() {
                    let z = w0 * p[0].z + w1 * p[1].z + w2 * p[2].z;
                    if !depth.test(px, py, z) {
                        continue;
                    }
                }
                io.write_next(&Fragment { x: px as u16, y: py as u16,
                                          bias0: w0, bias1: w1, bias2: w2 });
                for v in &self.accum.vertices {
                    io.write_next_bytes(v);
                }
                io.commit();
                n += 1;
            }
        }
        log::trace!("rasterizer: triangle produced {} fragments", n);
    }
}

impl Stage for Rasterizer {
    fn input_signature(&self) -> Signature {
        Signature::user_vertex()
    }
    fn output_signature(&self) -> Signature {
        let mut sig = Signature::new().with_slot(DataType::Fragment);
        for _ in 0 .. self.polygon.arity() {
            sig.add_slot(DataType::UserVertex);
        }
        sig
    }
    fn execute(&mut self, io: &mut RuntimeIo<'_>) {
        if io.current_iteration() == 0 {
            self.new_run(io);
        }
        if !self.accum.push(io.read_slot_bytes(0)) {
            return;
        }
        match self.polygon {
            Polygon::Triangles => self.populate_triangle(io),
            Polygon::Lines | Polygon::Points => {},
        }
        self.accum.count = 0;
    }
}
