//! Symbol cells and their binding stacks
//!
//! A symbol cell is the storage behind one rebindable global. Two storage
//! strategies share the `SymbolCell` interface and are chosen when the var is
//! declared:
//!
//! - `DynamicCell`: a shared root plus per-thread bindings. Frames pushed on
//!   one thread are invisible to every other thread.
//! - `RootCell`: a single process-wide value. Frames replace the root itself,
//!   so every thread observes the override.
//!
//! # Frames
//!
//! `push_frame` saves the value currently visible to the caller and returns a
//! `FrameId`. `pop_frame` accepts only the innermost live frame, writes its
//! saved value back and rejects anything else with `OutOfOrderRelease`.
//! `ScopeGuard` wraps this pair so that callers never handle frame IDs
//! directly.

mod dynamic;
mod frame;
mod root;
mod watch;

pub use dynamic::DynamicCell;
pub use frame::{BindingFrame, BindingStack, FrameId};
pub use root::RootCell;
pub use watch::{Change, Watch, WatchEvent};

use crate::error::BindingResult;
use crate::symbol::Symbol;
use crate::value::Value;
use std::fmt;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// Storage strategy of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Thread-scoped bindings over a shared root
    Dynamic,
    /// Shared root only
    Root,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Dynamic => write!(f, "dynamic"),
            CellKind::Root => write!(f, "root"),
        }
    }
}

/// Shared handle to a declared cell of either strategy
pub type Var = Arc<dyn SymbolCell>;

/// Mutable storage for one rebindable symbol
pub trait SymbolCell: Send + Sync {
    fn symbol(&self) -> &Symbol;

    fn kind(&self) -> CellKind;

    /// Current value as seen by the calling thread
    fn read(&self) -> Value;

    /// Replace the current value. No validation is performed.
    fn write(&self, value: Value);

    /// Save the current value in a new innermost frame
    fn push_frame(&self) -> FrameId;

    /// Pop `frame` and restore its saved value
    ///
    /// Fails with `OutOfOrderRelease` unless `frame` is the innermost live
    /// frame visible to the caller.
    fn pop_frame(&self, frame: FrameId) -> BindingResult<()>;

    /// Number of live frames visible to the caller
    fn binding_depth(&self) -> usize;

    /// Register `watch` under `key`, replacing any watch with the same key
    fn add_watch(&self, key: &str, watch: Watch);

    /// Returns true if a watch was registered under `key`
    fn remove_watch(&self, key: &str) -> bool;
}

impl<C: SymbolCell + ?Sized> SymbolCell for Arc<C> {
    fn symbol(&self) -> &Symbol {
        (**self).symbol()
    }

    fn kind(&self) -> CellKind {
        (**self).kind()
    }

    fn read(&self) -> Value {
        (**self).read()
    }

    fn write(&self, value: Value) {
        (**self).write(value)
    }

    fn push_frame(&self) -> FrameId {
        (**self).push_frame()
    }

    fn pop_frame(&self, frame: FrameId) -> BindingResult<()> {
        (**self).pop_frame(frame)
    }

    fn binding_depth(&self) -> usize {
        (**self).binding_depth()
    }

    fn add_watch(&self, key: &str, watch: Watch) {
        (**self).add_watch(key, watch)
    }

    fn remove_watch(&self, key: &str) -> bool {
        (**self).remove_watch(key)
    }
}

// Lock helpers. A panic while a lock is held cannot leave a Value half
// written, so poisoned locks are recovered.

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
