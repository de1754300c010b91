
mod common;
use common::*;

use softraster::{DataType, DepthBuffering, Pipeline, Polygon, Program, RuntimeIo};
use softraster::{Signature, Stage, Texture, create_rasterizer, shared};

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn record(depth: DepthBuffering) -> (Program, Rc<RefCell<FragmentRecorder>>) {
    init_logging();
    let recorder = shared(FragmentRecorder::default());
    let mut p = Pipeline::new();
    p.push_execution_stage(shared(create_rasterizer(Polygon::Triangles, depth))).unwrap();
    p.push_execution_stage(recorder.clone()).unwrap();
    (p.compile().unwrap(), recorder)
}

#[test]
fn output_shape() {
    let sig = |p| create_rasterizer(p, DepthBuffering::None).output_signature();
    assert_eq!(sig(Polygon::Triangles), fragment_signature());
    assert_eq!(sig(Polygon::Lines),
               Signature::from(vec![DataType::Fragment, DataType::UserVertex, DataType::UserVertex]));
    assert_eq!(sig(Polygon::Points),
               Signature::from(vec![DataType::Fragment, DataType::UserVertex]));
    let r = create_rasterizer(Polygon::Lines, DepthBuffering::BytePrecision);
    assert_eq!(r.input_signature(), Signature::user_vertex());
    assert_eq!(r.polygon(), Polygon::Lines);
}

#[test]
fn fragments_are_inside() {
    let (program, recorder) = record(DepthBuffering::None);
    let mut fb = Texture::new(80, 64);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();

    let rec = recorder.borrow();
    assert!(rec.fragments.len() > 1000);
    let mut seen = HashSet::new();
    for (f, v) in rec.fragments.iter().zip(rec.vertices.iter()) {
        assert!(f.bias0 >= 0.0 && f.bias1 >= 0.0 && f.bias2 >= 0.0);
        assert!((f.bias0 + f.bias1 + f.bias2 - 1.0).abs() < 1e-4);
        assert!(usize::from(f.x) < 80 && usize::from(f.y) < 64);
        assert!(seen.insert((f.x, f.y)), "pixel {},{} twice", f.x, f.y);
        assert_eq!(v, &triangle(0.0));

        // Weights reproduce the pixel position
        let sx = |v: &Vertex| 80.0 * (v.x + 1.0) / 2.0;
        let sy = |v: &Vertex| 64.0 * (v.y + 1.0) / 2.0;
        let x = f.interpolate(sx(&v[0]), sx(&v[1]), sx(&v[2]));
        let y = f.interpolate(sy(&v[0]), sy(&v[1]), sy(&v[2]));
        assert!((x - f32::from(f.x)).abs() < 1e-2);
        assert!((y - (63.0 - f32::from(f.y))).abs() < 1e-2);
    }
}

#[test]
fn apex_is_a_single_pixel() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let mut fb = Texture::new(80, 64);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();

    let rec = recorder.borrow();
    let top : Vec<_> = rec.fragments.iter().filter(|f| f.y == 0).map(|f| f.x).collect();
    assert_eq!(top, vec![40]);
    // Rows widen towards the base
    let row = |y| rec.fragments.iter().filter(|f| f.y == y).count();
    assert!(row(10) < row(30));
    assert!(row(30) < row(60));
}

#[test]
fn degenerate_triangles_are_empty() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let mut fb = Texture::new(32, 32);
    let line = [Vertex::white(-1.0, -1.0, 0.0),
                Vertex::white( 0.0,  0.0, 0.0),
                Vertex::white( 1.0,  1.0, 0.0)];
    program.run_vertices(&mut fb, &line).unwrap();
    assert!(recorder.borrow().fragments.is_empty());

    let point = [Vertex::white(0.5, 0.5, 0.0); 3];
    program.run_vertices(&mut fb, &point).unwrap();
    assert!(recorder.borrow().fragments.is_empty());
}

#[test]
fn larger_depth_wins() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let mut fb = Texture::new(40, 40);

    let mut verts = triangle(0.5).to_vec();
    verts.extend_from_slice(&triangle(0.0));
    program.run_vertices(&mut fb, &verts).unwrap();
    let n = recorder.borrow().fragments.len();
    assert!(n > 0);
    assert!(recorder.borrow().vertices.iter().all(|v| v[0].z == 0.5));

    let mut verts = triangle(0.0).to_vec();
    verts.extend_from_slice(&triangle(0.5));
    program.run_vertices(&mut fb, &verts).unwrap();
    let rec = recorder.borrow();
    assert_eq!(rec.fragments.len(), 2 * n);
    assert_eq!(rec.vertices.iter().filter(|v| v[0].z == 0.5).count(), n);
}

#[test]
fn coplanar_triangles_draw_once() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let mut fb = Texture::new(40, 40);
    let mut verts = triangle(0.25).to_vec();
    verts.extend_from_slice(&triangle(0.25));
    program.run_vertices(&mut fb, &verts).unwrap();
    let n = recorder.borrow().fragments.len();

    program.run_vertices(&mut fb, &triangle(0.25)).unwrap();
    assert_eq!(recorder.borrow().fragments.len(), n);
}

#[test]
fn no_depth_test_keeps_everything() {
    let (program, recorder) = record(DepthBuffering::None);
    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
    let n = recorder.borrow().fragments.len();

    let mut verts = triangle(0.5).to_vec();
    verts.extend_from_slice(&triangle(0.0));
    verts.extend_from_slice(&triangle(3.0));
    program.run_vertices(&mut fb, &verts).unwrap();
    assert_eq!(recorder.borrow().fragments.len(), 3 * n);
}

#[test]
fn out_of_range_depth_is_dropped() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, &triangle(3.0)).unwrap();
    assert!(recorder.borrow().fragments.is_empty());
    program.run_vertices(&mut fb, &triangle(-1.0)).unwrap();
    assert!(recorder.borrow().fragments.is_empty());
}

#[test]
fn depth_is_cleared_between_runs() {
    let (program, recorder) = record(DepthBuffering::ShortPrecision);
    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
    let n = recorder.borrow().fragments.len();
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
    assert_eq!(recorder.borrow().fragments.len(), n);
    assert!(n > 0);
}

#[test]
fn clipped_to_framebuffer() {
    let (program, recorder) = record(DepthBuffering::FloatPrecision);
    let mut fb = Texture::new(20, 10);
    let big = [Vertex::white(-3.0, -2.0, 0.0),
               Vertex::white( 3.0, -2.0, 0.0),
               Vertex::white( 0.0,  5.0, 0.0)];
    program.run_vertices(&mut fb, &big).unwrap();
    let rec = recorder.borrow();
    assert_eq!(rec.fragments.len(), 200);
    assert!(rec.fragments.iter().all(|f| f.x < 20 && f.y < 10));
}

#[test]
fn leftover_vertices_are_ignored() {
    let (program, recorder) = record(DepthBuffering::None);
    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
    let n = recorder.borrow().fragments.len();

    let mut verts = triangle(0.0).to_vec();
    verts.push(Vertex::white(0.0, 0.0, 0.0));
    verts.push(Vertex::white(1.0, 0.0, 0.0));
    program.run_vertices(&mut fb, &verts).unwrap();
    assert_eq!(recorder.borrow().fragments.len(), n);
}

#[test]
fn short_vertices_make_nothing() {
    let (program, recorder) = record(DepthBuffering::None);
    let mut fb = Texture::new(8, 8);
    let verts : [[f32; 2]; 3] = [[-1.0, -1.0], [1.0, -1.0], [0.0, 1.0]];
    program.run_vertices(&mut fb, &verts).unwrap();
    assert!(recorder.borrow().fragments.is_empty());
}

/// Counts whatever reaches it
struct Count {
    sig: Signature,
    n: Rc<RefCell<usize>>,
}

impl Stage for Count {
    fn input_signature(&self) -> Signature {
        self.sig.clone()
    }
    fn output_signature(&self) -> Signature {
        Signature::new()
    }
    fn execute(&mut self, _io: &mut RuntimeIo<'_>) {
        *self.n.borrow_mut() += 1;
    }
}

#[test]
fn lines_and_points_are_accepted() {
    for &polygon in &[Polygon::Lines, Polygon::Points] {
        let rast = create_rasterizer(polygon, DepthBuffering::BytePrecision);
        let n = Rc::new(RefCell::new(0));
        let count = Count { sig: rast.output_signature(), n: n.clone() };
        let mut p = Pipeline::new();
        p.push_execution_stage(shared(rast)).unwrap();
        p.push_execution_stage(shared(count)).unwrap();
        let program = p.compile().unwrap();

        let mut fb = Texture::new(16, 16);
        program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
        assert_eq!(*n.borrow(), 0);
    }
}

#[test]
fn custom_depth_test() {
    /// Only lets the left half through
    struct LeftHalf(usize);
    impl softraster::DepthTest for LeftHalf {
        fn reset(&mut self, width: usize, _height: usize) {
            self.0 = width / 2;
        }
        fn test(&mut self, x: usize, _y: usize, _z: f32) -> bool {
            x < self.0
        }
    }
    let recorder = shared(FragmentRecorder::default());
    let rast = softraster::Rasterizer::with_depth_test(Polygon::Triangles, Box::new(LeftHalf(0)));
    let mut p = Pipeline::new();
    p.push_execution_stage(shared(rast)).unwrap();
    p.push_execution_stage(recorder.clone()).unwrap();
    let program = p.compile().unwrap();

    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, &triangle(0.0)).unwrap();
    let rec = recorder.borrow();
    assert!(!rec.fragments.is_empty());
    assert!(rec.fragments.iter().all(|f| f.x < 20));
}

fn pixels(program: &Program, recorder: &Rc<RefCell<FragmentRecorder>>, verts: &[Vertex]) -> Vec<(u16, u16)> {
    let mut fb = Texture::new(40, 40);
    program.run_vertices(&mut fb, verts).unwrap();
    let mut px : Vec<_> = recorder.borrow().fragments.iter().map(|f| (f.x, f.y)).collect();
    px.sort();
    px
}

#[test]
fn coverage_ignores_vertex_order() {
    let (program, recorder) = record(DepthBuffering::None);
    let [t0, t1, t2] = triangle(0.0);
    let reference = pixels(&program, &recorder, &[t0, t1, t2]);
    assert!(!reference.is_empty());
    for order in &[[t0, t2, t1], [t1, t0, t2], [t1, t2, t0], [t2, t0, t1], [t2, t1, t0]] {
        assert_eq!(pixels(&program, &recorder, order), reference);
    }
    // Left edge runs from (0,0) to (20,40) in screen space
    let on_edge = [(0u16, 39u16), (1, 37), (2, 35), (10, 19), (19, 1)];
    for p in &on_edge {
        assert!(reference.contains(p), "edge pixel {:?} missing", p);
    }
}

fn quad() -> Vec<Vertex> {
    let (a, b) = (Vertex::white(-1.0, -1.0, 0.0), Vertex::white( 1.0, -1.0, 0.0));
    let (c, d) = (Vertex::white( 1.0,  1.0, 0.0), Vertex::white(-1.0,  1.0, 0.0));
    vec![a, b, c, a, c, d]
}

#[test]
fn shared_diagonal_without_depth_is_drawn_twice() {
    let (program, recorder) = record(DepthBuffering::None);
    let px = pixels(&program, &recorder, &quad());
    // Every pixel once, the 40 diagonal pixels once more
    assert_eq!(px.len(), 40 * 40 + 40);
    for i in 0 .. 40u16 {
        let diag = (i, 39 - i);
        assert_eq!(px.iter().filter(|&&p| p == diag).count(), 2, "diagonal {:?}", diag);
    }
}

#[test]
fn shared_diagonal_with_depth_is_drawn_once() {
    let (program, recorder) = record(DepthBuffering::BytePrecision);
    let px = pixels(&program, &recorder, &quad());
    let unique : HashSet<_> = px.iter().collect();
    assert_eq!(px.len(), 40 * 40);
    assert_eq!(unique.len(), 40 * 40);
}
