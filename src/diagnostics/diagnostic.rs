use std::fmt;

use serde::Serialize;

use super::error_code::{ErrorCode, ErrorType};
use super::format::format_message;
use crate::syntax::position::{Location, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A diagnostic attributed to a resolved source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    severity: Severity,
    title: String,
    code: Option<String>,
    error_type: ErrorType,
    message: Option<String>,
    file: Option<String>,
    position: Option<Position>,
    hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(Severity::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title)
    }

    pub fn note(title: impl Into<String>) -> Self {
        Self::new(Severity::Note, title)
    }

    fn new(severity: Severity, title: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            code: None,
            error_type: ErrorType::Compiler,
            message: None,
            file: None,
            position: None,
            hints: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Attaches a position already resolved by a
    /// [`PositionTracker`](crate::syntax::PositionTracker).
    pub fn at(self, location: Location<'_>) -> Self {
        self.with_file(location.path).with_position(Position::new(
            location.file.0,
            location.row,
            location.column,
        ))
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub(crate) fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Builds an error from a code's message template.
    pub fn make_error(code: &ErrorCode, values: &[&str]) -> Self {
        Self::from_code(Severity::Error, code, values)
    }

    /// Builds a warning from a code's message template.
    pub fn make_warning(code: &ErrorCode, values: &[&str]) -> Self {
        Self::from_code(Severity::Warning, code, values)
    }

    fn from_code(severity: Severity, code: &ErrorCode, values: &[&str]) -> Self {
        let mut diagnostic = Self::new(severity, code.title)
            .with_code(code.code)
            .with_error_type(code.error_type)
            .with_message(format_message(code.message, values));
        if let Some(hint) = code.hint {
            diagnostic = diagnostic.with_hint(format_message(hint, values));
        }
        diagnostic
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// The one-line header: `file:row:column: severity[code]: message`.
    pub fn header(&self) -> String {
        let mut out = String::new();
        if let Some(position) = self.position {
            let file = self.file.as_deref().unwrap_or("<unknown>");
            out.push_str(&format!("{}:{}:{}: ", file, position.row, position.column));
        }
        out.push_str(self.severity.label());
        if let Some(code) = &self.code {
            out.push_str(&format!("[{}]", code));
        }
        out.push_str(": ");
        out.push_str(self.message.as_deref().unwrap_or(&self.title));
        out
    }

    /// Renders the header, the offending source line with a caret under
    /// the column when `source` holds the file's text, then any hints.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut lines = vec![self.header()];

        let excerpt = self.position.zip(source).and_then(|(position, source)| {
            let row = position.row.checked_sub(1)? as usize;
            let text = source.lines().nth(row)?;
            Some((position, text))
        });
        let mut gutter = String::from(" ");
        if let Some((position, text)) = excerpt {
            let number = position.row.to_string();
            gutter = " ".repeat(number.len() + 1);
            lines.push(format!("{} | {}", number, text));
            let offset = position.column.saturating_sub(1) as usize;
            let padding: String = text
                .chars()
                .take(offset)
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            lines.push(format!("{}| {}^", gutter, padding));
        }

        for hint in &self.hints {
            lines.push(format!("{}= hint: {}", gutter, hint));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())
    }
}
