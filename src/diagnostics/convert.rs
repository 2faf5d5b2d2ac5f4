//! Conversions from component errors to user-facing diagnostics.

use super::compiler_errors::*;
use super::diagnostic::Diagnostic;
use crate::module::codec::FormatError;
use crate::module::errors::ModuleError;
use crate::module::package::PackageError;
use crate::module::registry::LoadError;
use crate::scope::resolver::ScopeError;
use crate::syntax::literal::{EscapeWarning, LiteralError};
use crate::syntax::shared_interner::SharedInterner;
use crate::syntax::symbol::Name;

/// Spells a possibly qualified name the way it appears in source.
pub fn display_name(interner: &SharedInterner, namespace: Option<Name>, name: Name) -> String {
    match namespace {
        Some(namespace) => format!(
            "{}.{}",
            interner.text_of(namespace),
            interner.text_of(name)
        ),
        None => interner.text_of(name),
    }
}

impl Diagnostic {
    /// The position of the earlier declaration is not attached; callers
    /// holding a tracker add it.
    pub fn from_scope_error(error: &ScopeError, interner: &SharedInterner) -> Self {
        match error {
            ScopeError::Duplicate {
                name,
                namespace,
                existing,
                ..
            } => {
                let shown = display_name(interner, *namespace, *name);
                Diagnostic::make_error(&DUPLICATE_DECLARATION, &[&shown])
                    .with_hint(format!("The existing declaration is a {}.", existing.kind_name()))
            }
        }
    }

    /// `token` is the literal's source text.
    pub fn from_literal_error(error: &LiteralError, token: &str) -> Self {
        match error {
            LiteralError::InvalidInteger => {
                Diagnostic::make_error(&INTEGER_LITERAL_MALFORMED, &[token])
            }
            LiteralError::IntegerOutOfRange => {
                Diagnostic::make_error(&INTEGER_LITERAL_TOO_BIG, &[token])
            }
            LiteralError::InvalidReal => Diagnostic::make_error(&REAL_LITERAL_MALFORMED, &[token]),
            LiteralError::RealOutOfRange => Diagnostic::make_error(&REAL_LITERAL_TOO_BIG, &[token]),
            LiteralError::InvalidEscape { offset } => {
                Diagnostic::make_error(&ILLEGAL_STRING_ESCAPE, &[&offset.to_string()])
            }
        }
    }
}

impl From<&EscapeWarning> for Diagnostic {
    fn from(warning: &EscapeWarning) -> Self {
        match warning {
            EscapeWarning::EmptyUnicodeEscape { offset } => {
                Diagnostic::make_warning(&EMPTY_UNICODE_ESCAPE, &[&offset.to_string()])
            }
            EscapeWarning::UnicodeEscapeOutOfRange { offset } => {
                Diagnostic::make_warning(&UNICODE_ESCAPE_OUT_OF_RANGE, &[&offset.to_string()])
            }
        }
    }
}

impl From<&ModuleError> for Diagnostic {
    fn from(error: &ModuleError) -> Self {
        match error {
            ModuleError::DuplicateExport { name } => {
                Diagnostic::make_error(&DUPLICATE_EXPORT, &[name.as_str()])
            }
            other => Diagnostic::make_error(&INVALID_MODULE, &[&other.to_string()]),
        }
    }
}

impl From<&FormatError> for Diagnostic {
    fn from(error: &FormatError) -> Self {
        Diagnostic::make_error(&MALFORMED_MODULE_IMAGE, &[&error.to_string()])
    }
}

impl From<&PackageError> for Diagnostic {
    fn from(error: &PackageError) -> Self {
        let diagnostic = Diagnostic::make_error(&PACKAGE_UNREADABLE, &[&error.to_string()]);
        match error {
            PackageError::Io { path, .. }
            | PackageError::BadMagic { path }
            | PackageError::UnsupportedVersion { path, .. }
            | PackageError::Malformed { path, .. }
            | PackageError::Module { path, .. } => {
                diagnostic.with_file(path.display().to_string())
            }
        }
    }
}

impl From<&LoadError> for Diagnostic {
    fn from(error: &LoadError) -> Self {
        match error {
            LoadError::UnresolvedDependency { module, dependency } => {
                Diagnostic::make_error(
                    &UNRESOLVED_DEPENDENCY,
                    &[module.as_str(), dependency.as_str()],
                )
                .with_hint(format!(
                    "Register `{}` before loading `{}`.",
                    dependency, module
                ))
            }
            LoadError::MissingImport {
                module,
                dependency,
                name,
                ..
            } => Diagnostic::make_error(
                &MISSING_IMPORT,
                &[module.as_str(), name.as_str(), dependency.as_str()],
            ),
            LoadError::ImportKindMismatch {
                module,
                dependency,
                name,
                expected,
                found,
            } => Diagnostic::make_error(
                &IMPORT_KIND_MISMATCH,
                &[
                    module.as_str(),
                    expected.name(),
                    name.as_str(),
                    dependency.as_str(),
                    found.name(),
                ],
            ),
            LoadError::DependencyCycle { module } => {
                Diagnostic::make_error(&DEPENDENCY_CYCLE, &[module.as_str()])
            }
            other => Diagnostic::make_error(&MODULE_NOT_USABLE, &[&other.to_string()]),
        }
    }
}
