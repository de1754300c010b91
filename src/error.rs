//! Errors

use std::fmt;

/// Reason a stage was rejected or a pipeline could not be compiled
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum PipelineError {
    /// The first stage does not accept a single `UserVertex`
    BeginSignatureMismatch,
    /// Stage `index` does not accept what the previous stage outputs
    IoMismatch { index: usize },
    /// The last stage has a non-empty output signature
    EndSignatureMismatch,
    /// No stages were pushed
    Empty,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::BeginSignatureMismatch =>
                write!(f, "begin signature mismatch: the first stage must accept just one UserVertex as its input"),
            PipelineError::IoMismatch { index } =>
                write!(f, "io mismatch: the output signature at the end of the pipeline does not match the input signature of stage {}", index),
            PipelineError::EndSignatureMismatch =>
                write!(f, "end signature mismatch: the last stage must not output anything"),
            PipelineError::Empty =>
                write!(f, "pipeline has no stages"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Reason a render could not start
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum RenderError {
    /// No program is in use
    NoProgram,
    /// Vertex data is shorter than `vertex_size * count`
    VertexDataLength { expected: usize, actual: usize },
    /// Vertex type cannot hold a position
    VertexTooSmall { size: usize },
    /// Index refers past the end of the vertex array
    IndexOutOfRange { index: u32, count: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoProgram =>
                write!(f, "no program in use"),
            RenderError::VertexDataLength { expected, actual } =>
                write!(f, "vertex data holds {} bytes, expected at least {}", actual, expected),
            RenderError::VertexTooSmall { size } =>
                write!(f, "vertex type of {} bytes cannot start with a Vector3 position", size),
            RenderError::IndexOutOfRange { index, count } =>
                write!(f, "index {} out of range for {} vertices", index, count),
        }
    }
}

impl std::error::Error for RenderError {}
