//! # rebind - scoped dynamic binding for runtime globals
//!
//! `rebind` provides the storage and restoration machinery behind Lisp-style
//! dynamic variables: temporarily override one or more globals for the
//! extent of a body of work, with the previous values restored on every
//! exit path.
//!
//! ## Quick Start
//!
//! ```
//! use rebind::{Namespace, SymbolCell, Value};
//!
//! let mut ns = Namespace::new("other");
//! let foo = ns.defdynamic("*foo*", 1).unwrap();
//! let bar = ns.def("bar", 10).unwrap();
//!
//! // binding: thread-scoped override of a dynamic var
//! ns.binding_set([("*foo*", 2)])
//!     .unwrap()
//!     .run(|| assert_eq!(foo.read(), Value::int(2)))
//!     .unwrap();
//! assert_eq!(foo.read(), Value::int(1));
//!
//! // with-redefs: temporary replacement of a shared root
//! ns.rebind_set([("bar", 2)])
//!     .unwrap()
//!     .run(|| assert_eq!(bar.read(), Value::int(2)))
//!     .unwrap();
//! assert_eq!(bar.read(), Value::int(10));
//! ```
//!
//! ## Architecture
//!
//! 1. **Cells** (`binding`) - `DynamicCell` (thread bindings over a shared
//!    root) and `RootCell` (shared root only) behind the `SymbolCell` trait
//! 2. **Guards** (`guard`) - `ScopeGuard` saves a value and restores it
//!    exactly once, in `Drop` if not earlier
//! 3. **Orchestrator** (`rebind`) - `with_rebind` applies a `RebindSet`
//!    around a body and restores in reverse order
//! 4. **Namespace** (`namespace`) - declares vars and resolves names
//! 5. **Conveyance** (`conveyance`) - carries thread bindings to other
//!    threads

pub mod binding;
pub mod config;
pub mod conveyance;
pub mod error;
pub mod guard;
pub mod namespace;
pub mod rebind;
pub mod symbol;
pub mod value;

pub use binding::{CellKind, DynamicCell, FrameId, RootCell, SymbolCell, Var};
pub use config::{RebindConfig, ReleaseFailurePolicy};
pub use conveyance::{bound_fn, BindingSnapshot};
pub use error::{BindingError, BindingResult};
pub use guard::{GuardState, ScopeGuard};
pub use namespace::Namespace;
pub use rebind::{try_with_rebind, with_rebind, RebindSet};
pub use symbol::{Symbol, SymbolId, SymbolTable};
pub use value::Value;
