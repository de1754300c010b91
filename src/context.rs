//! Rendering context

use crate::error::RenderError;
use crate::pipeline::Program;
use crate::primitives::Vector3;
use crate::texture::Texture;

use bytemuck::Pod;

use std::mem::size_of;

/// Draws vertex arrays with a program into a framebuffer
///
/// Vertex types must be `Pod` and begin with a `Vector3` position.
///
///     use softraster::{Context, Pipeline, Texture, Polygon, DepthBuffering};
///     use softraster::create_rasterizer;
///     # use softraster::{Stage, Signature, RuntimeIo, Fragment};
///     # struct Plot;
///     # impl Stage for Plot {
///     #     fn input_signature(&self) -> Signature { create_rasterizer(Polygon::Triangles, DepthBuffering::None).output_signature() }
///     #     fn output_signature(&self) -> Signature { Signature::new() }
///     #     fn execute(&mut self, io: &mut RuntimeIo) {
///     #         let f : Fragment = io.read_next();
///     #         io.framebuffer_mut().put_pixel(f.x as usize, f.y as usize, softraster::Rgba8::white());
///     #     }
///     # }
///     use std::rc::Rc;
///     use std::cell::RefCell;
///
///     let mut pipeline = Pipeline::new();
///     let raster = create_rasterizer(Polygon::Triangles, DepthBuffering::BytePrecision);
///     pipeline.push_execution_stage(Rc::new(RefCell::new(raster))).unwrap();
///     pipeline.push_execution_stage(Rc::new(RefCell::new(Plot))).unwrap();
///
///     let mut fb = Texture::new(8, 8);
///     let mut context = Context::new(&mut fb);
///     context.use_program(pipeline.compile().unwrap());
///     let tri : [[f32;3];3] = [[-1.,-1.,0.], [1.,-1.,0.], [0.,1.,0.]];
///     context.render_vertices(&tri).unwrap();
///     assert_eq!(fb.get_pixel(4, 0).a, 255);
///
pub struct Context<'fb> {
    framebuffer: &'fb mut Texture,
    program: Option<Program>,
}

impl<'fb> Context<'fb> {
    pub fn new(framebuffer: &'fb mut Texture) -> Self {
        Self { framebuffer, program: None }
    }
    /// Set the image rendered into
    pub fn set_framebuffer(&mut self, framebuffer: &'fb mut Texture) {
        self.framebuffer = framebuffer;
    }
    pub fn framebuffer(&self) -> &Texture {
        &*self.framebuffer
    }
    /// Set the program to render with, returning the previous one
    pub fn use_program(&mut self, program: Program) -> Option<Program> {
        self.program.replace(program)
    }
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }
    /// Render `vertices` in order
    pub fn render_vertices<V: Pod>(&mut self, vertices: &[V]) -> Result<(), RenderError> {
        let program = self.program.as_ref().ok_or(RenderError::NoProgram)?;
        if size_of::<V>() < size_of::<Vector3>() {
            return Err(RenderError::VertexTooSmall { size: size_of::<V>() });
        }
        program.run_vertices(&mut *self.framebuffer, vertices)
    }
    /// Render the vertices referenced by `indices`, in index order
    pub fn render_vertices_indexed<V: Pod>(&mut self, vertices: &[V], indices: &[u32]) -> Result<(), RenderError> {
        let expanded = indices.iter().map(|&i| {
            vertices.get(i as usize).copied()
                .ok_or(RenderError::IndexOutOfRange { index: i, count: vertices.len() })
        }).collect::<Result<Vec<V>, RenderError>>()?;
        self.render_vertices(&expanded)
    }
}
