//! Error types for the binding layer

mod builders;
mod types;

pub use types::{BindingError, BindingResult};
