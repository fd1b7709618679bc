//! Error type definitions for binding and restoration

use crate::binding::{CellKind, FrameId};
use std::error::Error as StdError;
use std::fmt;

/// Typed error for the binding layer
///
/// `DoubleRelease`, `OutOfOrderRelease` and `AbandonedRelease` are ordering
/// bugs in the caller and are surfaced loudly. The remaining variants come from declaring and
/// resolving vars through a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    // Restoration errors
    DoubleRelease {
        symbol: String,
    },
    OutOfOrderRelease {
        symbol: String,
        frame: FrameId,
        top: Option<FrameId>,
    },
    AbandonedRelease {
        symbol: String,
        frame: FrameId,
    },

    // Declaration and resolution errors
    UndefinedVariable {
        name: String,
    },
    NotDynamic {
        symbol: String,
    },
    StrategyConflict {
        symbol: String,
        declared: CellKind,
        requested: CellKind,
    },
}

/// Convenience alias for binding-layer results
pub type BindingResult<T> = Result<T, BindingError>;

impl BindingError {
    /// Get a human-readable description of the error
    pub fn description(&self) -> String {
        match self {
            BindingError::DoubleRelease { symbol } => {
                format!("Binding error: guard for {} was already released", symbol)
            }
            BindingError::OutOfOrderRelease { symbol, frame, top } => match top {
                Some(top) => format!(
                    "Binding error: release of frame {} for {} while frame {} is still bound",
                    frame, symbol, top
                ),
                None => format!(
                    "Binding error: release of frame {} for {} with no frames bound",
                    frame, symbol
                ),
            },
            BindingError::AbandonedRelease { symbol, frame } => format!(
                "Binding error: guard for {} was abandoned with frame {} unrestored",
                symbol, frame
            ),
            BindingError::UndefinedVariable { name } => {
                format!("Reference error: undefined variable '{}'", name)
            }
            BindingError::NotDynamic { symbol } => {
                format!("Binding error: can't dynamically bind non-dynamic var {}", symbol)
            }
            BindingError::StrategyConflict {
                symbol,
                declared,
                requested,
            } => format!(
                "Declaration error: {} is declared {} and cannot be redeclared {}",
                symbol, declared, requested
            ),
        }
    }

    /// Whether this error signals a broken release ordering
    pub fn is_restoration_error(&self) -> bool {
        matches!(
            self,
            BindingError::DoubleRelease { .. }
                | BindingError::OutOfOrderRelease { .. }
                | BindingError::AbandonedRelease { .. }
        )
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl StdError for BindingError {}

/// Conversion from BindingError to String for string-error hosts
impl From<BindingError> for String {
    fn from(err: BindingError) -> String {
        err.description()
    }
}
