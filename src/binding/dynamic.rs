//! Thread-scoped dynamic cells
//!
//! A `DynamicCell` has a root shared by all threads plus, on each thread
//! that has bound it, a private thread binding. The thread binding exists
//! while the thread holds at least one frame for the cell; when the last
//! frame is popped it is removed and the root becomes visible again,
//! including any root update made by another thread in the meantime.
//!
//! Thread bindings live in a thread-local map keyed by a process-unique
//! cell key, so binding, reading and restoring never take a lock.

use super::watch::Watches;
use super::{
    lock, read_lock, write_lock, BindingFrame, BindingStack, CellKind, Change, FrameId, SymbolCell,
    Watch, WatchEvent,
};
use crate::error::{BindingError, BindingResult};
use crate::symbol::Symbol;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

static NEXT_CELL_KEY: AtomicU64 = AtomicU64::new(1);

/// A thread's private value for one cell and the frames that produced it
struct ThreadBinding {
    value: Value,
    frames: BindingStack,
}

thread_local! {
    static THREAD_BINDINGS: RefCell<FxHashMap<u64, ThreadBinding>> =
        RefCell::new(FxHashMap::default());
}

pub struct DynamicCell {
    symbol: Symbol,
    key: u64,
    root: RwLock<Value>,
    // Serializes alter_root
    alter: Mutex<()>,
    watches: Watches,
}

impl DynamicCell {
    pub fn new(symbol: Symbol, init: Value) -> Self {
        DynamicCell {
            symbol,
            key: NEXT_CELL_KEY.fetch_add(1, Ordering::Relaxed),
            root: RwLock::new(init),
            alter: Mutex::new(()),
            watches: Watches::default(),
        }
    }

    /// The shared root, ignoring any binding on this thread
    pub fn root(&self) -> Value {
        read_lock(&self.root).clone()
    }

    /// Replace the shared root, even while this thread has a binding
    pub fn set_root(&self, value: Value) {
        let old = mem::replace(&mut *write_lock(&self.root), value.clone());
        self.notify(&old, &value, Change::Write);
    }

    /// Replace the root with `f(current root)`
    ///
    /// Serialized against other `alter_root` calls; `f` may read the cell.
    pub fn alter_root(&self, f: impl FnOnce(&Value) -> Value) -> Value {
        let (old, new) = {
            let _serial = lock(&self.alter);
            let new = f(&self.root());
            (mem::replace(&mut *write_lock(&self.root), new.clone()), new)
        };
        self.notify(&old, &new, Change::Write);
        new
    }

    /// Whether the calling thread currently has a binding for this cell
    pub fn is_thread_bound(&self) -> bool {
        THREAD_BINDINGS.with(|bindings| bindings.borrow().contains_key(&self.key))
    }

    fn thread_value(&self) -> Option<Value> {
        THREAD_BINDINGS.with(|bindings| {
            bindings
                .borrow()
                .get(&self.key)
                .map(|binding| binding.value.clone())
        })
    }

    fn notify(&self, old: &Value, new: &Value, change: Change) {
        self.watches.notify(WatchEvent {
            symbol: &self.symbol,
            old,
            new,
            change,
        });
    }
}

impl SymbolCell for DynamicCell {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn kind(&self) -> CellKind {
        CellKind::Dynamic
    }

    fn read(&self) -> Value {
        self.thread_value().unwrap_or_else(|| self.root())
    }

    fn write(&self, value: Value) {
        let bound_old = THREAD_BINDINGS.with(|bindings| {
            bindings
                .borrow_mut()
                .get_mut(&self.key)
                .map(|binding| mem::replace(&mut binding.value, value.clone()))
        });
        let old = match bound_old {
            Some(old) => old,
            None => mem::replace(&mut *write_lock(&self.root), value.clone()),
        };
        self.notify(&old, &value, Change::Write);
    }

    fn push_frame(&self) -> FrameId {
        let id = FrameId::next();
        let saved = self.read();
        THREAD_BINDINGS.with(|bindings| {
            let mut bindings = bindings.borrow_mut();
            let binding = bindings.entry(self.key).or_insert_with(|| ThreadBinding {
                value: saved.clone(),
                frames: BindingStack::new(),
            });
            binding.frames.push(BindingFrame::new(id, saved));
        });
        id
    }

    fn pop_frame(&self, frame: FrameId) -> BindingResult<()> {
        // None for the restored value means the root is visible again
        let (old, restored) = THREAD_BINDINGS.with(|bindings| -> BindingResult<_> {
            let mut bindings = bindings.borrow_mut();
            let Some(binding) = bindings.get_mut(&self.key) else {
                return Err(BindingError::out_of_order(&self.symbol, frame, None));
            };
            let saved = binding.frames.pop_checked(frame, &self.symbol)?.into_saved();
            if binding.frames.is_empty() {
                let old = bindings
                    .remove(&self.key)
                    .map(|binding| binding.value)
                    .unwrap_or_default();
                Ok((old, None))
            } else {
                let old = mem::replace(&mut binding.value, saved.clone());
                Ok((old, Some(saved)))
            }
        })?;
        let restored = restored.unwrap_or_else(|| self.root());
        self.notify(&old, &restored, Change::Restore);
        Ok(())
    }

    fn binding_depth(&self) -> usize {
        THREAD_BINDINGS.with(|bindings| {
            bindings
                .borrow()
                .get(&self.key)
                .map_or(0, |binding| binding.frames.depth())
        })
    }

    fn add_watch(&self, key: &str, watch: Watch) {
        self.watches.add(key, watch);
    }

    fn remove_watch(&self, key: &str) -> bool {
        self.watches.remove(key)
    }
}

impl Drop for DynamicCell {
    fn drop(&mut self) {
        // Frames left by leaked or abandoned guards. Only the dropping
        // thread's entry is reachable; other threads free theirs on exit.
        let stale = THREAD_BINDINGS
            .try_with(|bindings| {
                bindings
                    .try_borrow_mut()
                    .ok()
                    .and_then(|mut bindings| bindings.remove(&self.key))
            })
            .ok()
            .flatten();
        drop(stale);
    }
}

impl fmt::Debug for DynamicCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicCell")
            .field("symbol", &self.symbol)
            .field("root", &self.root())
            .field("thread_value", &self.thread_value())
            .finish()
    }
}
