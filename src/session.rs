//! One compilation unit's worth of state.

use std::sync::Arc;

use thiserror::Error;

use crate::config::SessionConfig;
use crate::diagnostics::compiler_errors::{
    IDENTIFIER_NOT_DECLARED, UNSUITABLE_DEFINITION_NAME, UNSUITABLE_MODULE_NAME,
};
use crate::diagnostics::convert::display_name;
use crate::diagnostics::{Diagnostic, Reporter};
use crate::module::builder::ModuleBuilder;
use crate::module::index::DefIndex;
use crate::module::kind::ModuleKind;
use crate::module::module::Module;
use crate::scope::meaning::Meaning;
use crate::scope::resolver::{ScopeError, ScopeResolver};
use crate::scope::suggestions::suggest_unqualified;
use crate::syntax::literal::{
    is_suitable_definition_name, is_suitable_module_name, parse_integer_literal,
    parse_real_literal, string_literal_body, unescape_string_literal,
};
use crate::syntax::position::{FileId, Position, PositionTracker};
use crate::syntax::shared_interner::SharedInterner;
use crate::syntax::symbol::Name;

const MAX_SUGGESTIONS: usize = 3;

/// A session that reported errors produces no module.
#[derive(Debug, Error)]
#[error("compilation of `{unit}` failed with {error_count} error(s)")]
pub struct CompileFailure {
    pub unit: String,
    pub error_count: usize,
    /// Everything that was kept, in source order.
    pub diagnostics: Vec<Diagnostic>,
    pub rendered: String,
}

#[derive(Debug)]
pub struct CompiledUnit {
    pub module: Module,
    /// Warnings and notes; never errors.
    pub diagnostics: Vec<Diagnostic>,
}

/// Owns the tracker, scope stack, module builder and reporter of one
/// compilation unit. Only the interner is shared with other sessions.
///
/// Every `report_*`, `declare` and `resolve` call records problems and lets
/// compilation continue; [`finish`](Self::finish) refuses to produce a
/// module if any error was recorded.
#[derive(Debug)]
pub struct CompilationSession {
    unit: String,
    interner: Arc<SharedInterner>,
    tracker: PositionTracker,
    scopes: ScopeResolver,
    builder: ModuleBuilder,
    reporter: Reporter,
}

impl CompilationSession {
    pub fn new(
        unit: impl Into<String>,
        interner: Arc<SharedInterner>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            unit: unit.into(),
            interner,
            tracker: PositionTracker::new(),
            scopes: ScopeResolver::new(),
            builder: ModuleBuilder::new(),
            reporter: Reporter::new(config),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn interner(&self) -> &Arc<SharedInterner> {
        &self.interner
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PositionTracker {
        &mut self.tracker
    }

    pub fn scopes(&self) -> &ScopeResolver {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeResolver {
        &mut self.scopes
    }

    pub fn builder(&self) -> &ModuleBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut ModuleBuilder {
        &mut self.builder
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Starts tracking a new source file. `text` is kept for excerpts in
    /// rendered diagnostics.
    pub fn begin_file(&mut self, path: &str, text: Option<&str>) -> FileId {
        let file = self.tracker.advance_to_next_file(path);
        if let Some(text) = text {
            self.reporter.add_source(path, text);
        }
        tracing::trace!(unit = %self.unit, file = path, "begin file");
        file
    }

    /// Starts the module, checking its name shape first.
    pub fn begin_module(&mut self, name: &str, kind: ModuleKind, position: Position) -> bool {
        if !is_suitable_module_name(name) {
            self.report_diagnostic(
                Some(position),
                Diagnostic::make_error(&UNSUITABLE_MODULE_NAME, &[name]),
            );
        }
        match self.builder.begin_module(name, kind) {
            Ok(()) => true,
            Err(error) => {
                self.report_diagnostic(Some(position), Diagnostic::from(&error));
                false
            }
        }
    }

    /// Records `diagnostic`, attributing it to `position` when given.
    pub fn report_diagnostic(&mut self, position: Option<Position>, diagnostic: Diagnostic) {
        let diagnostic = match position {
            Some(position) => diagnostic.at(self.tracker.resolve(position)),
            None => diagnostic,
        };
        self.reporter.report(diagnostic);
    }

    /// Reports an error at `position`.
    pub fn report(&mut self, position: Position, message: impl Into<String>) {
        self.report_diagnostic(
            Some(position),
            Diagnostic::error("ERROR").with_message(message),
        );
    }

    pub fn report_warning(&mut self, position: Position, message: impl Into<String>) {
        self.report_diagnostic(
            Some(position),
            Diagnostic::warning("WARNING").with_message(message),
        );
    }

    /// Binds `name` in the innermost scope. A duplicate in the same scope
    /// is reported and the earlier binding kept.
    pub fn declare(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        meaning: Meaning,
        position: Position,
    ) -> bool {
        if namespace.is_none() && !is_suitable_definition_name(name) {
            self.report_diagnostic(
                Some(position),
                Diagnostic::make_warning(&UNSUITABLE_DEFINITION_NAME, &[name]),
            );
        }
        let name = self.interner.intern(name);
        let namespace = namespace.map(|namespace| self.interner.intern(namespace));
        match self.scopes.define_at(name, namespace, meaning, position) {
            Ok(()) => true,
            Err(error) => {
                let mut diagnostic = Diagnostic::from_scope_error(&error, &self.interner);
                let ScopeError::Duplicate { previous, .. } = &error;
                if let Some(location) = previous.and_then(|p| self.tracker.try_resolve(p)) {
                    diagnostic = diagnostic.with_hint(format!("First declared at {}.", location));
                }
                self.report_diagnostic(Some(position), diagnostic);
                false
            }
        }
    }

    /// Looks `name` up through every enclosing scope. An unknown name is
    /// reported with the closest names in scope as suggestions.
    pub fn resolve(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        position: Position,
    ) -> Option<Meaning> {
        let interned = self.interner.intern(name);
        let namespace_name = namespace.map(|namespace| self.interner.intern(namespace));
        if let Some(meaning) = self.scopes.lookup(interned, namespace_name) {
            return Some(meaning);
        }

        let shown = display_name(&self.interner, namespace_name, interned);
        let mut diagnostic = Diagnostic::make_error(&IDENTIFIER_NOT_DECLARED, &[shown.as_str()]);
        if namespace.is_none() {
            let suggestions =
                suggest_unqualified(&self.scopes, &self.interner, interned, MAX_SUGGESTIONS);
            if !suggestions.is_empty() {
                let quoted: Vec<String> = suggestions
                    .iter()
                    .map(|suggestion| format!("`{}`", suggestion))
                    .collect();
                diagnostic = diagnostic.with_hint(format!("Did you mean {}?", quoted.join(", ")));
            }
        }
        self.report_diagnostic(Some(position), diagnostic);
        None
    }

    /// Parses an integer token, reporting it if malformed or too big.
    pub fn integer_literal(&mut self, token: &str, position: Position) -> Option<u32> {
        match parse_integer_literal(token) {
            Ok(value) => Some(value),
            Err(error) => {
                let diagnostic = Diagnostic::from_literal_error(&error, token);
                self.report_diagnostic(Some(position), diagnostic);
                None
            }
        }
    }

    pub fn real_literal(&mut self, token: &str, position: Position) -> Option<f64> {
        match parse_real_literal(token) {
            Ok(value) => Some(value),
            Err(error) => {
                let diagnostic = Diagnostic::from_literal_error(&error, token);
                self.report_diagnostic(Some(position), diagnostic);
                None
            }
        }
    }

    /// Decodes a quoted string token. Escape warnings are reported and the
    /// decoded text still returned.
    pub fn string_literal(&mut self, token: &str, position: Position) -> Option<String> {
        match unescape_string_literal(string_literal_body(token)) {
            Ok(unescaped) => {
                for warning in &unescaped.warnings {
                    self.report_diagnostic(Some(position), Diagnostic::from(warning));
                }
                Some(unescaped.text)
            }
            Err(error) => {
                let diagnostic = Diagnostic::from_literal_error(&error, token);
                self.report_diagnostic(Some(position), diagnostic);
                None
            }
        }
    }

    /// Exports `index` as `name`, reporting a duplicate or out of range
    /// export at `position`.
    pub fn export(&mut self, name: &str, index: DefIndex, position: Position) -> bool {
        match self.builder.export_symbol(name, index) {
            Ok(()) => true,
            Err(error) => {
                self.report_diagnostic(Some(position), Diagnostic::from(&error));
                false
            }
        }
    }

    /// Produces the module if no error was reported.
    pub fn finish(mut self) -> Result<CompiledUnit, CompileFailure> {
        if !self.reporter.has_errors() {
            match self.builder.finish() {
                Ok(module) => {
                    tracing::debug!(
                        unit = %self.unit,
                        module = module.name(),
                        warnings = self.reporter.warning_count(),
                        "unit compiled"
                    );
                    return Ok(CompiledUnit {
                        module,
                        diagnostics: self.reporter.into_diagnostics(),
                    });
                }
                Err(error) => self.report_diagnostic(None, Diagnostic::from(&error)),
            }
        }

        let error_count = self.reporter.error_count();
        tracing::debug!(unit = %self.unit, errors = error_count, "unit failed");
        let rendered = self.reporter.render();
        Err(CompileFailure {
            unit: self.unit,
            error_count,
            diagnostics: self.reporter.into_diagnostics(),
            rendered,
        })
    }
}
