//! Carrying thread bindings to other threads
//!
//! Thread bindings are private to the thread that made them. Work handed to
//! another thread sees only roots unless the bindings are conveyed: capture
//! them on the submitting thread, then re-establish them around the work on
//! the receiving thread.

use crate::binding::{DynamicCell, SymbolCell};
use crate::error::BindingResult;
use crate::rebind::{with_rebind, RebindSet};
use crate::value::Value;
use std::sync::Arc;

/// Thread bindings captured from one thread
#[derive(Debug, Clone, Default)]
pub struct BindingSnapshot {
    bindings: Vec<(Arc<DynamicCell>, Value)>,
}

impl BindingSnapshot {
    /// Capture the calling thread's current value of every bound cell
    ///
    /// Cells without a binding on this thread are skipped; the receiving
    /// thread will see their root.
    pub fn capture(cells: &[Arc<DynamicCell>]) -> Self {
        let bindings: Vec<_> = cells
            .iter()
            .filter(|cell| cell.is_thread_bound())
            .map(|cell| (Arc::clone(cell), cell.read()))
            .collect();
        tracing::debug!(
            target: "rebind::conveyance",
            captured = bindings.len(),
            candidates = cells.len(),
            "captured thread bindings"
        );
        BindingSnapshot { bindings }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Value captured for `cell`, if it was bound
    pub fn get(&self, cell: &DynamicCell) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(c, _)| std::ptr::eq(Arc::as_ptr(c), cell))
            .map(|(_, v)| v)
    }

    /// Run `body` on the calling thread with the captured bindings in place
    pub fn run<T>(&self, body: impl FnOnce() -> T) -> BindingResult<T> {
        let set: RebindSet<'_> = self
            .bindings
            .iter()
            .map(|(cell, value)| (&**cell as &dyn SymbolCell, value.clone()))
            .collect();
        with_rebind(&set, body)
    }
}

/// Wrap `f` so that it runs with the caller's current bindings of `cells`
///
/// The returned closure is `Send` whenever `f` is, so it can be handed to
/// `std::thread::spawn` or a pool.
pub fn bound_fn<T, F>(cells: &[Arc<DynamicCell>], f: F) -> impl FnOnce() -> BindingResult<T>
where
    F: FnOnce() -> T,
{
    let snapshot = BindingSnapshot::capture(cells);
    move || snapshot.run(f)
}
