//! Applying a set of overrides around a body of work
//!
//! `with_rebind` acquires one guard per pair, writes the override, runs the
//! body and then releases every guard in reverse acquisition order. The
//! release happens on every exit path: a normal return, an `Err` from
//! `try_with_rebind`, or a panic unwinding out of the body.

use crate::binding::SymbolCell;
use crate::config::{self, ReleaseFailurePolicy};
use crate::error::{BindingError, BindingResult};
use crate::guard::{on_release_failure, ScopeGuard};
use crate::symbol::Symbol;
use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;

/// Ordered (cell, new value) overrides for one scope
///
/// Order matters: overrides are applied first to last and restored last to
/// first. The same cell may appear more than once; each occurrence gets its
/// own frame.
#[derive(Default)]
pub struct RebindSet<'a> {
    bindings: SmallVec<[(&'a dyn SymbolCell, Value); 4]>,
}

impl<'a> RebindSet<'a> {
    pub fn new() -> Self {
        RebindSet {
            bindings: SmallVec::new(),
        }
    }

    /// Builder form of `push`
    pub fn bind(mut self, cell: &'a dyn SymbolCell, value: impl Into<Value>) -> Self {
        self.push(cell, value);
        self
    }

    pub fn push(&mut self, cell: &'a dyn SymbolCell, value: impl Into<Value>) {
        self.bindings.push((cell, value.into()));
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a dyn SymbolCell, &Value)> + '_ {
        self.bindings.iter().map(|(cell, value)| (*cell, value))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.bindings.iter().map(|(cell, _)| cell.symbol())
    }

    /// Run `body` with these overrides in place
    pub fn run<T>(&self, body: impl FnOnce() -> T) -> BindingResult<T> {
        with_rebind(self, body)
    }

    /// Run a fallible `body` with these overrides in place
    pub fn try_run<T, E>(&self, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<BindingError>,
    {
        try_with_rebind(self, body)
    }
}

impl<'a> FromIterator<(&'a dyn SymbolCell, Value)> for RebindSet<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a dyn SymbolCell, Value)>>(iter: I) -> Self {
        RebindSet {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for RebindSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(cell, v)| (cell.symbol(), v)))
            .finish()
    }
}

/// Guards acquired by one invocation, released newest first
struct GuardSet<'a> {
    guards: SmallVec<[ScopeGuard<'a>; 4]>,
}

impl<'a> GuardSet<'a> {
    fn with_capacity(n: usize) -> Self {
        GuardSet {
            guards: SmallVec::with_capacity(n),
        }
    }

    fn push(&mut self, guard: ScopeGuard<'a>) {
        self.guards.push(guard);
    }

    /// Release every guard in reverse order
    ///
    /// A rejected release does not stop the others. The first error is
    /// returned and the rejected guards are abandoned.
    fn release_all(&mut self) -> BindingResult<()> {
        let mut first_error = None;
        while let Some(mut guard) = self.guards.pop() {
            if let Err(err) = guard.release() {
                guard.abandon();
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for GuardSet<'_> {
    fn drop(&mut self) {
        // Only reached with guards left when the body panicked. SmallVec
        // drops front to back, so pop explicitly to keep LIFO order.
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Apply the overrides, run `body`, then restore every override
///
/// The body's result is kept even when restoration fails, so callers can
/// decide which failure to surface.
fn run_scoped<T>(set: &RebindSet<'_>, body: impl FnOnce() -> T) -> (T, BindingResult<()>) {
    let mut guards = GuardSet::with_capacity(set.len());
    for (cell, value) in set.iter() {
        guards.push(ScopeGuard::acquire(cell));
        cell.write(value.clone());
    }
    tracing::trace!(target: "rebind", bindings = set.len(), "entering body");

    let result = body();

    let restored = guards.release_all();
    (result, restored)
}

/// Run `body` with every override in `set` applied
///
/// Returns the body's result once all overrides are restored, or the first
/// restoration error. A panic in `body` resumes after restoration.
pub fn with_rebind<T>(set: &RebindSet<'_>, body: impl FnOnce() -> T) -> BindingResult<T> {
    let (result, restored) = run_scoped(set, body);
    restored.map(|()| result)
}

/// Run a fallible `body` with every override in `set` applied
///
/// A body error is returned unchanged after restoration. A restoration
/// error after a successful body is returned as `E`. When both fail the
/// body error is returned and the restoration error goes through the
/// configured `ReleaseFailurePolicy`, which panics by default.
pub fn try_with_rebind<T, E>(
    set: &RebindSet<'_>,
    body: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<BindingError>,
{
    try_rebind_under(config::current().release_failure, set, body)
}

fn try_rebind_under<T, E>(
    policy: ReleaseFailurePolicy,
    set: &RebindSet<'_>,
    body: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<BindingError>,
{
    match run_scoped(set, body) {
        (result, Ok(())) => result,
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(body_err), Err(err)) => {
            tracing::error!(
                target: "rebind",
                "restoration failed after body error: {}",
                err
            );
            on_release_failure(policy, &err);
            Err(body_err)
        }
    }
}
