//! Builder methods for constructing BindingError instances

use super::types::BindingError;
use crate::binding::{CellKind, FrameId};
use crate::symbol::Symbol;

impl BindingError {
    // Restoration
    pub fn double_release(symbol: &Symbol) -> Self {
        BindingError::DoubleRelease {
            symbol: symbol.to_string(),
        }
    }

    pub fn out_of_order(symbol: &Symbol, frame: FrameId, top: Option<FrameId>) -> Self {
        BindingError::OutOfOrderRelease {
            symbol: symbol.to_string(),
            frame,
            top,
        }
    }

    pub fn abandoned_release(symbol: &Symbol, frame: FrameId) -> Self {
        BindingError::AbandonedRelease {
            symbol: symbol.to_string(),
            frame,
        }
    }

    // Declaration and resolution
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        BindingError::UndefinedVariable { name: name.into() }
    }

    pub fn not_dynamic(symbol: &Symbol) -> Self {
        BindingError::NotDynamic {
            symbol: symbol.to_string(),
        }
    }

    pub fn strategy_conflict(symbol: &Symbol, declared: CellKind, requested: CellKind) -> Self {
        BindingError::StrategyConflict {
            symbol: symbol.to_string(),
            declared,
            requested,
        }
    }
}
