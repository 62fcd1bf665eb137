//! Utility module

mod error;
mod span;

pub use error::{CompilationError, Error, ErrorKind, Result};
pub use span::{Position, Span};
