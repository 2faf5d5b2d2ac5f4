//! Compiles independent units in parallel over one shared interner.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::SessionConfig;
use crate::diagnostics::Diagnostic;
use crate::module::registry::ModuleRegistry;
use crate::session::{CompilationSession, CompileFailure, CompiledUnit};
use crate::syntax::shared_interner::SharedInterner;

/// Anything the driver can compile: a name for diagnostics plus whatever
/// the front end needs.
pub trait CompileUnit: Sync {
    fn unit_name(&self) -> &str;
}

pub type UnitResult = Result<CompiledUnit, CompileFailure>;

/// Runs `compile` for every unit on rayon's pool, each in its own session.
///
/// Results are in the order of `units`. Names interned by any unit are
/// valid in all of them.
pub fn compile_units<U, F>(
    units: &[U],
    interner: &Arc<SharedInterner>,
    config: &SessionConfig,
    compile: F,
) -> Vec<UnitResult>
where
    U: CompileUnit,
    F: Fn(&U, &mut CompilationSession) + Sync,
{
    tracing::debug!(units = units.len(), "compiling units");
    let results: Vec<UnitResult> = units
        .par_iter()
        .map(|unit| {
            let mut session =
                CompilationSession::new(unit.unit_name(), Arc::clone(interner), config);
            compile(unit, &mut session);
            session.finish()
        })
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    tracing::debug!(
        compiled = results.len() - failed,
        failed,
        interned = interner.len(),
        "units compiled"
    );
    results
}

/// What linking a batch of unit results produced.
#[derive(Debug)]
pub struct LinkOutcome {
    pub registry: ModuleRegistry,
    /// One error per distinct load problem, in the order found.
    pub diagnostics: Vec<Diagnostic>,
    /// Units that produced no module; nothing of theirs was registered.
    pub failures: Vec<CompileFailure>,
}

impl LinkOutcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.failures.is_empty()
    }
}

/// Registers every compiled module and checks each can be loaded.
///
/// A dependency's problems are reported once, however many modules depend
/// on it.
pub fn link_units(results: Vec<UnitResult>) -> LinkOutcome {
    let mut registry = ModuleRegistry::new();
    let mut diagnostics = Vec::new();
    let mut seen = FxHashSet::default();
    let mut failures = Vec::new();
    let mut names = Vec::new();

    let mut push = |diagnostic: Diagnostic| {
        if seen.insert(diagnostic.clone()) {
            diagnostics.push(diagnostic);
        }
    };
    for result in results {
        let compiled = match result {
            Ok(compiled) => compiled,
            Err(failure) => {
                tracing::debug!(unit = %failure.unit, "skipping failed unit");
                failures.push(failure);
                continue;
            }
        };
        let name = compiled.module.name().to_string();
        match registry.register(Arc::new(compiled.module)) {
            Ok(()) => names.push(name),
            Err(error) => push(Diagnostic::from(&error)),
        }
    }
    for name in &names {
        if let Err(errors) = registry.ensure_usable(name) {
            errors.iter().map(Diagnostic::from).for_each(&mut push);
        }
    }

    LinkOutcome {
        registry,
        diagnostics,
        failures,
    }
}
