//! Scope guards: save on creation, restore exactly once.
//!
//! `ScopeGuard::acquire` pushes a frame holding the value visible at that
//! moment. The guard restores it either through an explicit `release` or,
//! if the owner never released it, in `Drop`, so returns, `?` and panics
//! all restore.
//!
//! Guards are `!Send`: a frame on a `DynamicCell` lives in the acquiring
//! thread's bindings and has to be popped there.

use crate::binding::{FrameId, SymbolCell};
use crate::config::{self, ReleaseFailurePolicy};
use crate::error::{BindingError, BindingResult};
use crate::symbol::Symbol;
use std::fmt;
use std::marker::PhantomData;

/// Lifecycle of a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Frame pushed, restoration pending
    Acquired,
    /// Saved value restored
    Released,
    /// Release was rejected and reported; the guard will not retry
    Abandoned,
}

pub struct ScopeGuard<'a> {
    cell: &'a dyn SymbolCell,
    frame: FrameId,
    state: GuardState,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopeGuard<'a> {
    /// Save the current value of `cell` in a new frame
    ///
    /// Does not override the value; the caller writes the override after
    /// acquiring, so the saved value is always the pre-override one.
    pub fn acquire(cell: &'a dyn SymbolCell) -> Self {
        let frame = cell.push_frame();
        tracing::debug!(
            target: "rebind::guard",
            symbol = %cell.symbol(),
            frame = %frame,
            kind = %cell.kind(),
            "acquired"
        );
        ScopeGuard {
            cell,
            frame,
            state: GuardState::Acquired,
            _not_send: PhantomData,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn symbol(&self) -> &Symbol {
        self.cell.symbol()
    }

    pub fn cell(&self) -> &'a dyn SymbolCell {
        self.cell
    }

    /// Restore the saved value and mark the guard released
    ///
    /// Fails with `DoubleRelease` if the guard was already released,
    /// `AbandonedRelease` if it was abandoned, and `OutOfOrderRelease` if a
    /// later frame for the same symbol is still alive. An out-of-order
    /// release leaves the guard acquired.
    pub fn release(&mut self) -> BindingResult<()> {
        let rejected = match self.state {
            GuardState::Acquired => None,
            GuardState::Released => Some(BindingError::double_release(self.cell.symbol())),
            GuardState::Abandoned => Some(BindingError::abandoned_release(
                self.cell.symbol(),
                self.frame,
            )),
        };
        if let Some(err) = rejected {
            tracing::error!(target: "rebind::guard", frame = %self.frame, "{}", err);
            return Err(err);
        }
        if let Err(err) = self.cell.pop_frame(self.frame) {
            tracing::error!(target: "rebind::guard", frame = %self.frame, "{}", err);
            return Err(err);
        }
        self.state = GuardState::Released;
        tracing::debug!(
            target: "rebind::guard",
            symbol = %self.cell.symbol(),
            frame = %self.frame,
            "released"
        );
        Ok(())
    }

    /// Stop tracking a guard whose release was rejected
    pub(crate) fn abandon(&mut self) {
        if self.state == GuardState::Acquired {
            tracing::warn!(
                target: "rebind::guard",
                symbol = %self.cell.symbol(),
                frame = %self.frame,
                "abandoned without restoring"
            );
            self.state = GuardState::Abandoned;
        }
    }

    /// Release on scope exit, handling a rejected release under `policy`
    fn release_on_exit(&mut self, policy: ReleaseFailurePolicy) {
        if self.state != GuardState::Acquired {
            return;
        }
        if let Err(err) = self.release() {
            self.state = GuardState::Abandoned;
            on_release_failure(policy, &err);
        }
    }
}

/// Apply `policy` to a restoration error nobody can return to the caller
///
/// The error has already been logged. While the thread is unwinding this
/// never panics, since a second panic would abort the process.
pub(crate) fn on_release_failure(policy: ReleaseFailurePolicy, err: &BindingError) {
    if std::thread::panicking() {
        return;
    }
    match policy {
        ReleaseFailurePolicy::Panic => panic!("{}", err),
        ReleaseFailurePolicy::Log => {}
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.state == GuardState::Acquired {
            self.release_on_exit(config::current().release_failure);
        }
    }
}

impl fmt::Debug for ScopeGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("symbol", self.cell.symbol())
            .field("frame", &self.frame)
            .field("state", &self.state)
            .finish()
    }
}
