//! User-facing diagnostics: stable error codes, diagnostic values and the
//! batch reporter a compilation session collects them in.

pub mod compiler_errors;
pub mod convert;
pub mod diagnostic;
pub mod error_code;
pub mod format;
pub mod reporter;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::{ErrorCode, ErrorType};
pub use format::format_message;
pub use reporter::{DEFAULT_MAX_ERRORS, DiagnosticCounts, Reporter};

#[cfg(test)]
mod diagnostic_test;
#[cfg(test)]
mod reporter_test;
