//! Pipeline assembly and compiled programs

use crate::error::PipelineError;
use crate::error::RenderError;
use crate::runtime::RuntimeConfig;
use crate::runtime::RuntimeIo;
use crate::signature::Signature;
use crate::texture::Texture;
use crate::StageRef;

use bytemuck::Pod;

use std::mem::size_of;

/// Ordered list of stages under assembly
///
/// Stages are pushed in the order they process records. Each push is
/// checked against the current end of the pipeline; a rejected stage
/// leaves the pipeline as it was.
///
/// The pipeline only holds shared handles, the caller keeps its own
/// handle to change a stage between runs.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<StageRef>,
    config: RuntimeConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: vec![], config: RuntimeConfig::default() }
    }
    /// Create a pipeline whose programs run with `config`
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { stages: vec![], config }
    }
    /// Add a stage at the end of the pipeline
    ///
    /// The first stage must accept a single `UserVertex`; any later stage
    /// must accept exactly what the previous stage outputs.
    pub fn push_execution_stage(&mut self, stage: StageRef) -> Result<(), PipelineError> {
        let input = stage.borrow().input_signature();
        let result = match self.stages.last() {
            None if input != Signature::user_vertex() =>
                Err(PipelineError::BeginSignatureMismatch),
            Some(last) if last.borrow().output_signature() != input =>
                Err(PipelineError::IoMismatch { index: self.stages.len() }),
            _ => Ok(()),
        };
        match result {
            Ok(()) => {
                self.stages.push(stage);
                log::debug!("pipeline: stage {} accepted", self.stages.len() - 1);
            },
            Err(ref e) => log::debug!("pipeline: stage rejected: {}", e),
        }
        result
    }
    /// Add a stage, reporting the result as a status string
    ///
    /// The string is empty when the stage was accepted
    pub fn push_status(&mut self, stage: StageRef) -> String {
        match self.push_execution_stage(stage) {
            Ok(()) => String::new(),
            Err(e) => e.to_string(),
        }
    }
    /// Create a program from the pushed stages
    ///
    /// Fails when there are no stages or when the last stage outputs anything
    pub fn compile(&self) -> Result<Program, PipelineError> {
        let last = self.stages.last().ok_or(PipelineError::Empty)?;
        if !last.borrow().output_signature().is_empty() {
            return Err(PipelineError::EndSignatureMismatch);
        }
        log::debug!("pipeline: compiled {} stages", self.stages.len());
        Ok(Program { stages: self.stages.clone(),
                     config: self.config,
                     status: String::new() })
    }
    /// Remove all stages
    pub fn clear(&mut self) {
        self.stages.clear();
    }
    pub fn len(&self) -> usize {
        self.stages.len()
    }
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Validated, immutable list of stages
///
/// Created by [Pipeline::compile](struct.Pipeline.html#method.compile)
pub struct Program {
    stages: Vec<StageRef>,
    config: RuntimeConfig,
    status: String,
}

impl Program {
    /// Status of the program, empty when valid
    pub fn status(&self) -> &str {
        &self.status
    }
    pub fn len(&self) -> usize {
        self.stages.len()
    }
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
    pub fn set_config(&mut self, config: RuntimeConfig) {
        self.config = config;
    }
    /// Process `count` vertices of `vertex_size` bytes through every stage
    ///
    /// Each stage runs once per record committed by the stage before it;
    /// the first stage runs once per vertex. The last stage draws into
    /// `framebuffer`.
    ///
    /// # Panics
    ///
    /// If a stage is already borrowed through another handle
    pub fn run(&self, framebuffer: &mut Texture, vertices: &[u8],
               vertex_size: usize, count: usize) -> Result<(), RenderError> {
        let expected = vertex_size.checked_mul(count).unwrap_or(usize::MAX);
        if vertices.len() < expected {
            return Err(RenderError::VertexDataLength { expected, actual: vertices.len() });
        }
        let mut io = RuntimeIo::new(framebuffer, self.config);
        io.run_setup(vertices, vertex_size, count);
        for (i, stage) in self.stages.iter().enumerate() {
            let mut stage = stage.borrow_mut();
            io.next_proc(&*stage);
            log::debug!("run: stage {} with {} iterations", i, io.iteration_count());
            for _ in 0 .. io.iteration_count() {
                stage.execute(&mut io);
                io.next_iter();
            }
        }
        Ok(())
    }
    /// Process a slice of vertices, see [run](#method.run)
    pub fn run_vertices<V: Pod>(&self, framebuffer: &mut Texture, vertices: &[V]) -> Result<(), RenderError> {
        if size_of::<V>() == 0 {
            return Err(RenderError::VertexTooSmall { size: 0 });
        }
        self.run(framebuffer, bytemuck::cast_slice(vertices), size_of::<V>(), vertices.len())
    }
}
