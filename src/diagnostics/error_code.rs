use serde::Serialize;

/// Which stage of the toolchain raises an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorType {
    Compiler,
    Loader,
}

/// A stable error code with its message template and optional hint.
///
/// Templates use `{}` placeholders filled in order by
/// [`format_message`](super::format::format_message).
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
    pub error_type: ErrorType,
    pub message: &'static str,
    pub hint: Option<&'static str>,
}
