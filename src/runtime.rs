//! Stage execution engine
//!
//! A run moves records between two byte caches. The output cache of one
//! stage becomes the input cache of the next; the caches are exchanged,
//! never copied. Records are addressed through [Slot]s computed from the
//! stage signatures when the stage begins.
//!
//! [Slot]: ../signature/struct.Slot.html

use crate::primitives::DataType;
use crate::signature::Signature;
use crate::signature::Slot;
use crate::texture::Texture;
use crate::Stage;

use bytemuck::Pod;

use std::cmp::min;
use std::mem::size_of;

/// Initial size of each record cache in bytes
pub const DEFAULT_CACHE_SIZE : usize = 512 * 1024;
/// Capacity multiplier applied when a record cache grows
pub const DEFAULT_GROWTH_FACTOR : f64 = 2.0;

/// Settings of the execution engine
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct RuntimeConfig {
    /// Initial size of each record cache in bytes
    pub initial_cache_size: usize,
    /// Capacity multiplier used when a cache is too small, must be > 1
    pub growth_factor: f64,
    /// Log a warning when a stage accesses a slot with the wrong size
    /// or a slot its signature does not declare
    pub check_slots: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { initial_cache_size: DEFAULT_CACHE_SIZE,
               growth_factor: DEFAULT_GROWTH_FACTOR,
               check_slots: false,
        }
    }
}

/// Growable byte arena holding consecutive records
///
/// Capacity only grows; `len` is the number of bytes in use
#[derive(Debug)]
struct RecordCache {
    data: Vec<u8>,
    len: usize,
    growth_factor: f64,
}

impl RecordCache {
    fn new(capacity: usize, growth_factor: f64) -> Self {
        let growth_factor = if growth_factor > 1.0 { growth_factor } else { DEFAULT_GROWTH_FACTOR };
        Self { data: vec![0u8; capacity], len: 0, growth_factor }
    }
    fn capacity(&self) -> usize {
        self.data.len()
    }
    /// Grow until at least `bytes` are available, keeping the content
    fn reserve(&mut self, bytes: usize) {
        if bytes <= self.capacity() {
            return;
        }
        let mut cap = self.capacity().max(1);
        while cap < bytes {
            cap = ((cap as f64 * self.growth_factor) as usize).max(cap + 1);
        }
        log::trace!("record cache grows {} -> {} bytes", self.capacity(), cap);
        self.data.resize(cap, 0);
    }
}

/// Input and output state of the running stage
///
/// A stage receives the `RuntimeIo` on every iteration. Each iteration has
/// exactly one input record, laid out by the stage's input signature.
/// Output is written into the pending output record, laid out by the
/// output signature, and handed to the next stage with [commit]. A stage
/// may commit any number of records per iteration.
///
/// Typed reads and writes copy the bytes of the slot; the type is a hint
/// and is not checked unless [RuntimeConfig::check_slots] is set.
///
/// [commit]: #method.commit
/// [RuntimeConfig::check_slots]: struct.RuntimeConfig.html#structfield.check_slots
pub struct RuntimeIo<'fb> {
    framebuffer: &'fb mut Texture,
    config: RuntimeConfig,
    vertex_size: usize,
    input: RecordCache,
    output: RecordCache,
    in_slots: Vec<Slot>,
    out_slots: Vec<Slot>,
    input_size: usize,
    output_size: usize,
    current_iter: usize,
    iter_count: usize,
    commit_count: usize,
    slot_in: usize,
    slot_out: usize,
}

impl<'fb> RuntimeIo<'fb> {
    pub(crate) fn new(framebuffer: &'fb mut Texture, config: RuntimeConfig) -> Self {
        Self { framebuffer,
               config,
               vertex_size: 0,
               input:  RecordCache::new(config.initial_cache_size, config.growth_factor),
               output: RecordCache::new(config.initial_cache_size, config.growth_factor),
               in_slots: vec![],
               out_slots: vec![],
               input_size: 0,
               output_size: 0,
               current_iter: 0,
               iter_count: 0,
               commit_count: 0,
               slot_in: 0,
               slot_out: 0,
        }
    }
    /// Seed the output cache with the vertex array
    ///
    /// Acts as a stage that committed `count` records of `{UserVertex}`
    pub(crate) fn run_setup(&mut self, vertices: &[u8], vertex_size: usize, count: usize) {
        let bytes = vertex_size * count;
        self.vertex_size = vertex_size;
        self.output.reserve(bytes);
        self.output.data[..bytes].copy_from_slice(&vertices[..bytes]);
        self.output.len = bytes;
        self.in_slots.clear();
        self.out_slots = Signature::user_vertex().layout(vertex_size);
        self.input_size = 0;
        self.output_size = vertex_size;
        self.current_iter = 0;
        self.iter_count = 0;
        self.commit_count = count;
        self.slot_in = 0;
        self.slot_out = 0;
    }
    /// Prepare for the next stage
    ///
    /// Records committed so far become the input
    pub(crate) fn next_proc(&mut self, stage: &dyn Stage) {
        let input = stage.input_signature();
        let output = stage.output_signature();
        self.in_slots  = input.layout(self.vertex_size);
        self.out_slots = output.layout(self.vertex_size);
        self.input_size  = input.record_size(self.vertex_size);
        self.output_size = output.record_size(self.vertex_size);

        self.iter_count = self.commit_count;
        self.current_iter = 0;
        self.commit_count = 0;
        self.slot_in = 0;
        self.slot_out = 0;

        std::mem::swap(&mut self.input, &mut self.output);
        self.output.len = 0;
        self.output.reserve(self.output_size);

        if self.config.check_slots && self.input.len != self.iter_count * self.input_size {
            log::warn!("stage input holds {} bytes, expected {} records of {} bytes",
                       self.input.len, self.iter_count, self.input_size);
        }
    }
    /// Move to the next input record
    pub(crate) fn next_iter(&mut self) {
        self.current_iter += 1;
        self.slot_in = 0;
    }

    /// Read the next slot of the input record
    pub fn read_next<T: Pod>(&mut self) -> T {
        let slot = self.slot_in;
        self.slot_in += 1;
        self.read_slot(slot)
    }
    /// Read slot `slot` of the input record
    ///
    /// Does not move the cursor used by [read_next](#method.read_next).
    /// A slot that does not exist reads as zero.
    pub fn read_slot<T: Pod>(&self, slot: usize) -> T {
        let mut value : T = bytemuck::Zeroable::zeroed();
        let src = self.read_slot_bytes(slot);
        if let Some(s) = self.in_slots.get(slot) {
            self.diagnose_size("read", slot, s, size_of::<T>());
        }
        let n = min(src.len(), size_of::<T>());
        bytemuck::bytes_of_mut(&mut value)[..n].copy_from_slice(&src[..n]);
        value
    }
    /// Bytes of the next slot of the input record
    pub fn read_next_bytes(&mut self) -> &[u8] {
        let slot = self.slot_in;
        self.slot_in += 1;
        self.read_slot_bytes(slot)
    }
    /// Bytes of slot `slot` of the input record
    ///
    /// Empty if the slot does not exist
    pub fn read_slot_bytes(&self, slot: usize) -> &[u8] {
        match self.in_slots.get(slot) {
            Some(s) => {
                let start = self.input_start() + s.offset;
                &self.input.data[start .. start + s.len]
            },
            None => {
                self.diagnose_missing("read", slot, self.in_slots.len());
                &[]
            },
        }
    }
    /// Bytes of the whole input record
    pub fn read_record(&self) -> &[u8] {
        let start = self.input_start();
        &self.input.data[start .. start + self.input_size]
    }

    /// Write the next slot of the pending output record
    pub fn write_next<T: Pod>(&mut self, value: &T) {
        let slot = self.slot_out;
        self.slot_out += 1;
        self.write_slot(slot, value);
    }
    /// Write slot `slot` of the pending output record
    ///
    /// Does not move the cursor used by [write_next](#method.write_next).
    /// Writes to a slot that does not exist are dropped.
    pub fn write_slot<T: Pod>(&mut self, slot: usize, value: &T) {
        self.write_slot_bytes(slot, bytemuck::bytes_of(value));
    }
    /// Write raw bytes to the next slot of the pending output record
    pub fn write_next_bytes(&mut self, bytes: &[u8]) {
        let slot = self.slot_out;
        self.slot_out += 1;
        self.write_slot_bytes(slot, bytes);
    }
    /// Write raw bytes to slot `slot` of the pending output record
    ///
    /// At most the slot's size is copied
    pub fn write_slot_bytes(&mut self, slot: usize, bytes: &[u8]) {
        let s = match self.out_slots.get(slot) {
            Some(s) => *s,
            None => {
                self.diagnose_missing("write", slot, self.out_slots.len());
                return;
            },
        };
        self.diagnose_size("write", slot, &s, bytes.len());
        let record = self.output_start();
        self.output.reserve(record + self.output_size);
        let start = record + s.offset;
        let n = min(s.len, bytes.len());
        self.output.data[start .. start + n].copy_from_slice(&bytes[..n]);
    }
    /// Bytes of the whole pending output record
    pub fn write_record_mut(&mut self) -> &mut [u8] {
        let start = self.output_start();
        self.output.reserve(start + self.output_size);
        &mut self.output.data[start .. start + self.output_size]
    }
    /// Finalize the pending output record
    ///
    /// Each committed record is one iteration of the next stage
    pub fn commit(&mut self) {
        self.commit_count += 1;
        self.slot_out = 0;
        self.output.len = self.commit_count * self.output_size;
        self.output.reserve((self.commit_count + 1) * self.output_size);
    }

    /// Whether the current iteration is the last of this stage
    pub fn is_last_iteration(&self) -> bool {
        self.current_iter + 1 == self.iter_count
    }
    /// Current iteration of the stage, starting at 0
    pub fn current_iteration(&self) -> usize {
        self.current_iter
    }
    /// Number of iterations the stage runs
    pub fn iteration_count(&self) -> usize {
        self.iter_count
    }
    /// Records committed by the stage so far
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }
    /// Target image of the run
    pub fn framebuffer(&self) -> &Texture {
        &*self.framebuffer
    }
    /// Target image of the run, for writing pixels
    pub fn framebuffer_mut(&mut self) -> &mut Texture {
        &mut *self.framebuffer
    }
    /// Size of `ty` in bytes for this run
    pub fn size_of(&self, ty: DataType) -> usize {
        ty.size(self.vertex_size)
    }
    /// Size of a `UserVertex` for this run
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }
    /// Size of one input record in bytes
    pub fn input_record_size(&self) -> usize {
        self.input_size
    }
    /// Size of one output record in bytes
    pub fn output_record_size(&self) -> usize {
        self.output_size
    }

    fn input_start(&self) -> usize {
        self.current_iter * self.input_size
    }
    fn output_start(&self) -> usize {
        self.commit_count * self.output_size
    }
    fn diagnose_size(&self, op: &str, slot: usize, s: &Slot, size: usize) {
        if self.config.check_slots && s.len != size {
            log::warn!("{} of slot {} ({:?}, {} bytes) with a value of {} bytes",
                       op, slot, s.ty, s.len, size);
        }
    }
    fn diagnose_missing(&self, op: &str, slot: usize, declared: usize) {
        if self.config.check_slots {
            log::warn!("{} of slot {} but the signature declares {} slots", op, slot, declared);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Vector2;

    struct Pairs;
    impl Stage for Pairs {
        fn input_signature(&self) -> Signature {
            Signature::user_vertex()
        }
        fn output_signature(&self) -> Signature {
            Signature::new().with_slot(DataType::Int).with_slot(DataType::Vector2)
        }
        fn execute(&mut self, _io: &mut RuntimeIo<'_>) {}
    }

    #[test]
    fn cache_growth_is_geometric_and_keeps_content() {
        let mut c = RecordCache::new(4, 2.0);
        c.data.copy_from_slice(&[1,2,3,4]);
        c.reserve(4);
        assert_eq!(c.capacity(), 4);
        c.reserve(9);
        assert_eq!(c.capacity(), 16);
        assert_eq!(&c.data[..4], &[1,2,3,4]);

        let mut c = RecordCache::new(0, 0.5);
        c.reserve(3);
        assert!(c.capacity() >= 3);
    }

    #[test]
    fn write_offset_survives_growth() {
        let mut tex = Texture::new(1,1);
        let config = RuntimeConfig { initial_cache_size: 8, ..RuntimeConfig::default() };
        let mut io = RuntimeIo::new(&mut tex, config);
        io.run_setup(&[0u8; 4], 4, 1);
        io.next_proc(&Pairs);
        assert_eq!(io.output_record_size(), 12);
        for i in 0 .. 20 {
            io.write_next(&(i as i32));
            io.write_next(&Vector2::new(i as f32, -(i as f32)));
            io.commit();
        }
        assert_eq!(io.commit_count(), 20);
        assert_eq!(io.output.len, 240);
        assert!(io.output.capacity() >= 252);
        for i in 0 .. 20 {
            let rec = &io.output.data[i * 12 .. (i + 1) * 12];
            let n : i32 = bytemuck::pod_read_unaligned(&rec[..4]);
            let v : Vector2 = bytemuck::pod_read_unaligned(&rec[4..]);
            assert_eq!(n, i as i32);
            assert_eq!(v, Vector2::new(i as f32, -(i as f32)));
        }
    }

    #[test]
    fn missing_slots_are_harmless() {
        let mut tex = Texture::new(1,1);
        let config = RuntimeConfig { check_slots: true, ..RuntimeConfig::default() };
        let mut io = RuntimeIo::new(&mut tex, config);
        io.run_setup(&[7u8, 0, 0, 0], 4, 1);
        io.next_proc(&Pairs);
        assert_eq!(io.read_next::<i32>(), 7);
        assert_eq!(io.read_next::<i32>(), 0);
        assert!(io.read_slot_bytes(5).is_empty());
        io.write_slot(9, &1.0f32);
        io.write_slot(0, &[1u8, 2, 3, 4, 5, 6]);
        assert_eq!(&io.write_record_mut()[..4], &[1,2,3,4]);
    }
}
