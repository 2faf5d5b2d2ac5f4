//! Lexical scopes and name resolution.

pub mod meaning;
pub mod resolver;
pub mod suggestions;

pub use meaning::Meaning;
pub use resolver::{Binding, ScopeError, ScopeResolver};
