use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use super::diagnostic::{Diagnostic, Severity};
use crate::config::SessionConfig;

/// Default max error limit to avoid overwhelming output.
pub const DEFAULT_MAX_ERRORS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticCounts {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
}

impl DiagnosticCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.notes
    }

    pub fn summary_line(&self) -> Option<String> {
        format_summary(self)
    }

    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note => self.notes += 1,
        }
    }
}

/// Collects the diagnostics of one compilation in batch.
///
/// Reporting never stops compilation. Warnings are promoted under
/// `werror` and dropped under `dependency_compile`; errors past
/// `max_errors` are counted but not kept. Output is sorted by source
/// position so it does not depend on the order problems were found in.
#[derive(Debug, Clone)]
pub struct Reporter {
    werror: bool,
    suppress_warnings: bool,
    max_errors: usize,
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    counts: DiagnosticCounts,
    dropped_errors: usize,
    sources: FxHashMap<String, String>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Reporter {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            werror: config.werror,
            suppress_warnings: config.dependency_compile,
            max_errors: config.max_errors,
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            counts: DiagnosticCounts::default(),
            dropped_errors: 0,
            sources: FxHashMap::default(),
        }
    }

    /// Makes `text` available for source excerpts of diagnostics in `file`.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(file.into(), text.into());
    }

    /// Records `diagnostic`. Returns false if it was suppressed, dropped
    /// over the error limit, or already reported.
    pub fn report(&mut self, mut diagnostic: Diagnostic) -> bool {
        if diagnostic.severity() == Severity::Warning {
            if self.suppress_warnings {
                return false;
            }
            if self.werror {
                diagnostic.set_severity(Severity::Error);
            }
        }
        if self.seen.contains(&diagnostic) {
            return false;
        }
        if diagnostic.severity() == Severity::Error && self.counts.errors >= self.max_errors {
            self.dropped_errors += 1;
            return false;
        }

        tracing::trace!(diagnostic = %diagnostic, "diagnostic reported");
        self.counts.record(diagnostic.severity());
        self.seen.insert(diagnostic.clone());
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn counts(&self) -> DiagnosticCounts {
        self.counts
    }

    pub fn error_count(&self) -> usize {
        self.counts.errors + self.dropped_errors
    }

    pub fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Errors reported after the limit was reached.
    pub fn dropped_errors(&self) -> usize {
        self.dropped_errors
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The kept diagnostics in source order.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));
        sorted
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by(compare);
        diagnostics
    }

    pub fn render(&self) -> String {
        let mut rendered = String::new();
        if let Some(summary) = format_summary(&self.counts) {
            rendered.push_str(&summary);
            rendered.push_str("\n\n");
        }

        let blocks: Vec<String> = self
            .diagnostics()
            .into_iter()
            .map(|diagnostic| {
                let source = diagnostic
                    .file()
                    .and_then(|file| self.sources.get(file))
                    .map(String::as_str);
                diagnostic.render(source)
            })
            .collect();
        rendered.push_str(&blocks.join("\n\n"));

        if self.dropped_errors > 0 {
            if !rendered.is_empty() {
                rendered.push('\n');
            }
            rendered.push_str(&format!(
                "... and {} more errors not shown (raise max_errors to see them).",
                self.dropped_errors
            ));
        }
        rendered
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.diagnostics())
    }
}

// Positioned diagnostics first, in source order; then the rest.
fn compare(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    match (a.position(), b.position()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.file().cmp(&b.file()),
    }
    .then_with(|| a.severity().cmp(&b.severity()))
    .then_with(|| a.message().cmp(&b.message()))
    .then_with(|| a.title().cmp(b.title()))
}

fn format_summary(counts: &DiagnosticCounts) -> Option<String> {
    let total = counts.total();
    if total <= 1 {
        return None;
    }

    let mut parts = Vec::new();
    if counts.errors > 0 {
        parts.push(format!("{} error{}", counts.errors, plural(counts.errors)));
    }
    if counts.warnings > 0 {
        parts.push(format!("{} warning{}", counts.warnings, plural(counts.warnings)));
    }
    if counts.notes > 0 {
        parts.push(format!("{} note{}", counts.notes, plural(counts.notes)));
    }

    Some(format!("Found {}.", join_parts(&parts)))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn join_parts(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
