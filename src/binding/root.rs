//! Shared-root cells
//!
//! A `RootCell` holds one value for the whole process. Rebinding it replaces
//! that value for every thread until the frame is popped. The lock only
//! makes each read and write atomic; two threads redefining the same root
//! at once is a caller error, which the shared frame stack reports as
//! `OutOfOrderRelease` when the interleaving breaks LIFO order.

use super::watch::Watches;
use super::{
    lock, read_lock, write_lock, BindingFrame, BindingStack, CellKind, Change, FrameId,
    SymbolCell, Watch, WatchEvent,
};
use crate::error::BindingResult;
use crate::symbol::Symbol;
use crate::value::Value;
use std::fmt;
use std::mem;
use std::sync::{Mutex, RwLock};

pub struct RootCell {
    symbol: Symbol,
    root: RwLock<Value>,
    frames: Mutex<BindingStack>,
    // Serializes alter_root
    alter: Mutex<()>,
    watches: Watches,
}

impl RootCell {
    pub fn new(symbol: Symbol, init: Value) -> Self {
        RootCell {
            symbol,
            root: RwLock::new(init),
            frames: Mutex::new(BindingStack::new()),
            alter: Mutex::new(()),
            watches: Watches::default(),
        }
    }

    /// Replace the root with `f(current)`
    ///
    /// Concurrent `alter_root` calls are serialized. `f` runs without the
    /// value lock held, so it may read this cell. Returns the new root value.
    pub fn alter_root(&self, f: impl FnOnce(&Value) -> Value) -> Value {
        let (old, new) = {
            let _serial = lock(&self.alter);
            let new = f(&self.read());
            let old = mem::replace(&mut *write_lock(&self.root), new.clone());
            (old, new)
        };
        self.notify(&old, &new, Change::Write);
        new
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

impl SymbolCell for RootCell {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn kind(&self) -> CellKind {
        CellKind::Root
    }

    fn read(&self) -> Value {
        read_lock(&self.root).clone()
    }

    fn write(&self, value: Value) {
        let old = mem::replace(&mut *write_lock(&self.root), value.clone());
        self.notify(&old, &value, Change::Write);
    }

    fn push_frame(&self) -> FrameId {
        let id = FrameId::next();
        let mut frames = lock(&self.frames);
        frames.push(BindingFrame::new(id, self.read()));
        id
    }

    fn pop_frame(&self, frame: FrameId) -> BindingResult<()> {
        let (old, restored) = {
            let mut frames = lock(&self.frames);
            let saved = frames.pop_checked(frame, &self.symbol)?.into_saved();
            let old = mem::replace(&mut *write_lock(&self.root), saved.clone());
            (old, saved)
        };
        self.notify(&old, &restored, Change::Restore);
        Ok(())
    }

    fn binding_depth(&self) -> usize {
        lock(&self.frames).depth()
    }

    fn add_watch(&self, key: &str, watch: Watch) {
        self.watches.add(key, watch);
    }

    fn remove_watch(&self, key: &str) -> bool {
        self.watches.remove(key)
    }
}

impl fmt::Debug for RootCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootCell")
            .field("symbol", &self.symbol)
            .field("root", &self.read())
            .field("depth", &self.binding_depth())
            .finish()
    }
}
