//! C0 compiler front-end
//!
//! Lexes C0 source into tokens, then checks it in a single recursive-descent
//! pass against a scoped symbol table. The result is either the validated
//! [`frontend::Program`] structure or the first error found.

pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;

pub use frontend::{compile, Program};
pub use utils::{CompilationError, Error, ErrorKind, Result};
