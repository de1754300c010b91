//! Software rendering pipeline
//!
//! How does this work
//!
//! ```text
//!    pipeline = Pipeline::new()
//!    pipeline.push_execution_stage( vertex stage )     -- {UserVertex} -> {UserVertex}
//!    pipeline.push_execution_stage( rasterizer )       -- {UserVertex} -> {Fragment, UserVertex x3}
//!    pipeline.push_execution_stage( fragment stage )   -- {Fragment, UserVertex x3} -> {}
//!    program = pipeline.compile()
//!  Run
//!    program.run(framebuffer, vertices, vertex_size, count)
//!      run_setup()   -- vertices become the first input records
//!      for each stage
//!        next_proc() -- swap caches, compute slot offsets
//!        for each input record
//!          stage.execute(io)
//!            read_next / read_slot
//!            write_next / write_slot
//!            commit()  -- one record for the next stage, any number per iteration
//!          next_iter()
//!  The last stage writes pixels into the framebuffer
//! ```

pub mod primitives;
pub mod signature;
pub mod color;
pub mod texture;
pub mod file;
pub mod error;
pub mod runtime;
pub mod pipeline;
pub mod depth;
pub mod raster;
pub mod context;

pub use primitives::*;
pub use signature::*;
pub use color::*;
pub use texture::*;
pub use error::*;
pub use runtime::*;
pub use pipeline::*;
pub use depth::*;
pub use raster::*;
pub use context::*;

use std::cell::RefCell;
use std::rc::Rc;

/// A single pipeline computation unit
///
/// A stage runs once per input record. Its input and output records are
/// described by its signatures, which must stay the same while the stage
/// is part of a pipeline.
///
/// A stage may keep state between iterations of a run, for instance to
/// gather several vertices. Such state should be reset when
/// [RuntimeIo::current_iteration] is 0 so the stage can be used for
/// several runs.
///
/// [RuntimeIo::current_iteration]: runtime/struct.RuntimeIo.html#method.current_iteration
pub trait Stage {
    /// Slots of each input record, read in order by `read_next`
    fn input_signature(&self) -> Signature;
    /// Slots of each output record, written in order by `write_next`
    fn output_signature(&self) -> Signature;
    /// Process one input record
    fn execute(&mut self, io: &mut RuntimeIo<'_>);
}

/// Shared handle to a stage
///
/// The pipeline and the caller both hold the stage
pub type StageRef = Rc<RefCell<dyn Stage>>;

/// Wrap a stage into a shared handle
pub fn shared<S: Stage + 'static>(stage: S) -> Rc<RefCell<S>> {
    Rc::new(RefCell::new(stage))
}

/// Per pixel depth store
pub trait DepthTest {
    /// Resize to `width` x `height` and clear all values
    fn reset(&mut self, width: usize, height: usize);
    /// Test depth `z` at (`x`,`y`), storing it on success
    fn test(&mut self, x: usize, y: usize, z: f32) -> bool;
}
