//! Record signatures

use crate::primitives::DataType;

/// Ordered sequence of slots describing the shape of one record
///
/// Slot order is byte order: slot `i` starts after slots `0..i`.
/// Two signatures are equal only when they hold the same types
/// in the same order.
///
///     use softraster::{Signature, DataType};
///
///     let mut a = Signature::new();
///     a.add_slot(DataType::Fragment);
///     a.add_slot(DataType::Float);
///
///     let b = Signature::from(vec![DataType::Float, DataType::Fragment]);
///     assert_ne!(a, b);
///     assert_eq!(a.record_size(0), 20);
///
#[derive(Debug,Default,Clone,PartialEq,Eq,Hash)]
pub struct Signature {
    types: Vec<DataType>,
}

/// Location of one slot within a record
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Slot {
    pub ty: DataType,
    /// Byte offset from the start of the record
    pub offset: usize,
    /// Byte length of the slot
    pub len: usize,
}

impl Signature {
    /// Create an empty signature
    pub fn new() -> Self {
        Self { types: vec![] }
    }
    /// Signature holding a single `UserVertex`, the entry of every pipeline
    pub fn user_vertex() -> Self {
        Self::from(vec![DataType::UserVertex])
    }
    /// Append a slot
    pub fn add_slot(&mut self, ty: DataType) {
        self.types.push(ty);
    }
    /// Builder form of [add_slot](#method.add_slot)
    pub fn with_slot(mut self, ty: DataType) -> Self {
        self.add_slot(ty);
        self
    }
    pub fn slots(&self) -> &[DataType] {
        &self.types
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    /// Size of one record in bytes
    pub fn record_size(&self, vertex_size: usize) -> usize {
        self.types.iter().map(|t| t.size(vertex_size)).sum()
    }
    /// Offset and length of every slot
    pub fn layout(&self, vertex_size: usize) -> Vec<Slot> {
        let mut offset = 0;
        self.types.iter().map(|&ty| {
            let len = ty.size(vertex_size);
            let slot = Slot { ty, offset, len };
            offset += len;
            slot
        }).collect()
    }
}

impl From<Vec<DataType>> for Signature {
    fn from(types: Vec<DataType>) -> Self {
        Self { types }
    }
}
