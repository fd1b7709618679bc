//! Observers notified when a cell's value changes

use super::{read_lock, write_lock};
use crate::symbol::Symbol;
use crate::value::Value;
use smallvec::SmallVec;
use std::sync::{Arc, RwLock};

/// What caused a value change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A plain `write` (including the override written by a rebind)
    Write,
    /// A frame was popped and its saved value became visible again
    Restore,
}

/// A single value change delivered to watches
#[derive(Debug)]
pub struct WatchEvent<'a> {
    pub symbol: &'a Symbol,
    pub old: &'a Value,
    pub new: &'a Value,
    pub change: Change,
}

pub type Watch = Arc<dyn Fn(&WatchEvent<'_>) + Send + Sync>;

/// Watches registered on one cell, keyed by name
#[derive(Default)]
pub(crate) struct Watches {
    entries: RwLock<SmallVec<[(Arc<str>, Watch); 2]>>,
}

impl Watches {
    pub(crate) fn add(&self, key: &str, watch: Watch) {
        let mut entries = write_lock(&self.entries);
        if let Some(slot) = entries.iter_mut().find(|(k, _)| k.as_ref() == key) {
            slot.1 = watch;
        } else {
            entries.push((Arc::from(key), watch));
        }
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        let mut entries = write_lock(&self.entries);
        let before = entries.len();
        entries.retain(|(k, _)| k.as_ref() != key);
        entries.len() != before
    }

    /// Call every watch in registration order
    ///
    /// The list is copied first so a watch may read the cell or register
    /// further watches without deadlocking.
    pub(crate) fn notify(&self, event: WatchEvent<'_>) {
        let watches: SmallVec<[Watch; 2]> = read_lock(&self.entries)
            .iter()
            .map(|(_, w)| w.clone())
            .collect();
        for watch in watches {
            watch(&event);
        }
    }
}
