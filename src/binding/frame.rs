//! Binding frames and the per-symbol LIFO stack

use crate::error::{BindingError, BindingResult};
use crate::symbol::Symbol;
use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter so frame IDs never repeat within a process
static NEXT_FRAME: AtomicU64 = AtomicU64::new(1);

/// Identity of the scope that owns a binding frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

impl FrameId {
    pub fn next() -> Self {
        FrameId(NEXT_FRAME.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value saved when a scope overrides a symbol
#[derive(Debug, Clone)]
pub struct BindingFrame {
    id: FrameId,
    saved: Value,
}

impl BindingFrame {
    pub fn new(id: FrameId, saved: Value) -> Self {
        BindingFrame { id, saved }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn saved(&self) -> &Value {
        &self.saved
    }

    pub fn into_saved(self) -> Value {
        self.saved
    }
}

/// Stack of live frames for one symbol (index 0 is outermost)
///
/// Nesting rarely goes deep, so the first few frames stay inline.
#[derive(Debug, Default)]
pub struct BindingStack {
    frames: SmallVec<[BindingFrame; 4]>,
}

impl BindingStack {
    pub fn new() -> Self {
        BindingStack {
            frames: SmallVec::new(),
        }
    }

    pub fn push(&mut self, frame: BindingFrame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame if, and only if, it is `id`
    pub fn pop_checked(&mut self, id: FrameId, symbol: &Symbol) -> BindingResult<BindingFrame> {
        let top = self.top().map(BindingFrame::id);
        if top != Some(id) {
            return Err(BindingError::out_of_order(symbol, id, top));
        }
        self.frames
            .pop()
            .ok_or_else(|| BindingError::out_of_order(symbol, id, None))
    }

    pub fn top(&self) -> Option<&BindingFrame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.frames.iter().any(|f| f.id == id)
    }
}
