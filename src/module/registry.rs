use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::module::definition::DefinitionKind;
use crate::module::module::{Module, PropertyTypes};
use crate::module::package::Package;
use crate::module::types::TypeDesc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("a module named `{name}` is already registered")]
    DuplicateModule { name: String },
    #[error("module `{name}` is not registered")]
    UnknownModule { name: String },
    #[error("module `{module}` depends on `{dependency}`, which is not registered")]
    UnresolvedDependency { module: String, dependency: String },
    #[error("module `{module}` depends on `{dependency}`, which is a widget")]
    WidgetDependency { module: String, dependency: String },
    #[error("module `{module}` depends on `{dependency}`, which is not usable")]
    UnusableDependency { module: String, dependency: String },
    #[error("module `{name}` has not been made usable")]
    NotUsable { name: String },
    #[error("module `{module}` does not export {kind} `{name}`")]
    NotExported {
        module: String,
        kind: DefinitionKind,
        name: String,
    },
    #[error("module `{module}` depends on itself")]
    DependencyCycle { module: String },
    #[error("module `{module}` imports {kind} `{name}` from `{dependency}`, which does not export it")]
    MissingImport {
        module: String,
        dependency: String,
        kind: DefinitionKind,
        name: String,
    },
    #[error(
        "module `{module}` imports {expected} `{name}` from `{dependency}`, which exports a {found}"
    )]
    ImportKindMismatch {
        module: String,
        dependency: String,
        name: String,
        expected: DefinitionKind,
        found: DefinitionKind,
    },
}

/// The loader's view of every module it knows by name.
///
/// Registration only records a module. Whether it can run is decided
/// lazily by [`ensure_usable`], which resolves its dependencies and imports
/// and remembers modules that passed.
///
/// [`ensure_usable`]: ModuleRegistry::ensure_usable
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: FxHashMap<String, Arc<Module>>,
    usable: FxHashSet<String>,
    // Packages stay open while their modules are registered.
    packages: Vec<Package>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn register(&mut self, module: Arc<Module>) -> Result<(), LoadError> {
        if self.modules.contains_key(module.name()) {
            return Err(LoadError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        tracing::debug!(module = module.name(), kind = %module.kind(), "module registered");
        self.modules.insert(module.name().to_string(), module);
        Ok(())
    }

    /// Registers every module of `package`, or none of them.
    pub fn register_package(&mut self, package: &Package) -> Result<(), LoadError> {
        let mut names = FxHashSet::default();
        for module in package.modules() {
            if self.modules.contains_key(module.name()) || !names.insert(module.name()) {
                return Err(LoadError::DuplicateModule {
                    name: module.name().to_string(),
                });
            }
        }
        for module in package.modules() {
            self.register(Arc::clone(module))?;
        }
        self.packages.push(package.clone());
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<Module>> {
        self.modules.get(name)
    }

    pub fn is_usable(&self, name: &str) -> bool {
        self.usable.contains(name)
    }

    /// The signature of `handler` as exported by `module`.
    ///
    /// The queries only answer for modules that passed
    /// [`ensure_usable`](Self::ensure_usable).
    pub fn query_handler(&self, module: &str, handler: &str) -> Result<&TypeDesc, LoadError> {
        let found = self.usable_module(module)?;
        found
            .query_handler(handler)
            .ok_or_else(|| not_exported(module, DefinitionKind::Handler, handler))
    }

    pub fn query_property(
        &self,
        module: &str,
        property: &str,
    ) -> Result<PropertyTypes<'_>, LoadError> {
        let found = self.usable_module(module)?;
        found
            .query_property(property)
            .ok_or_else(|| not_exported(module, DefinitionKind::Property, property))
    }

    pub fn query_event(&self, module: &str, event: &str) -> Result<&TypeDesc, LoadError> {
        let found = self.usable_module(module)?;
        found
            .query_event(event)
            .ok_or_else(|| not_exported(module, DefinitionKind::Event, event))
    }

    fn usable_module(&self, name: &str) -> Result<&Arc<Module>, LoadError> {
        let module = self.modules.get(name).ok_or_else(|| LoadError::UnknownModule {
            name: name.to_string(),
        })?;
        if !self.usable.contains(name) {
            return Err(LoadError::NotUsable {
                name: name.to_string(),
            });
        }
        Ok(module)
    }

    /// Checks that `name` and everything it depends on can be loaded.
    ///
    /// Every dependency must be registered, must not be a widget and must
    /// itself be usable; every import must name an export of a matching
    /// kind. All problems found are returned together.
    pub fn ensure_usable(&mut self, name: &str) -> Result<(), Vec<LoadError>> {
        let mut visiting = FxHashSet::default();
        self.check_usable(name, &mut visiting)
    }

    fn check_usable(
        &mut self,
        name: &str,
        visiting: &mut FxHashSet<String>,
    ) -> Result<(), Vec<LoadError>> {
        if self.usable.contains(name) {
            return Ok(());
        }
        let module = self.modules.get(name).cloned().ok_or_else(|| {
            vec![LoadError::UnknownModule {
                name: name.to_string(),
            }]
        })?;
        if !visiting.insert(name.to_string()) {
            return Err(vec![LoadError::DependencyCycle {
                module: name.to_string(),
            }]);
        }

        let mut errors = Vec::new();
        for dependency in module.dependencies() {
            let Some(target) = self.modules.get(&dependency.name).cloned() else {
                errors.push(LoadError::UnresolvedDependency {
                    module: name.to_string(),
                    dependency: dependency.name.clone(),
                });
                continue;
            };
            if target.is_widget() {
                errors.push(LoadError::WidgetDependency {
                    module: name.to_string(),
                    dependency: dependency.name.clone(),
                });
                continue;
            }
            if let Err(inner) = self.check_usable(&dependency.name, visiting) {
                errors.extend(inner);
                errors.push(LoadError::UnusableDependency {
                    module: name.to_string(),
                    dependency: dependency.name.clone(),
                });
            }
        }

        for import in module.imports() {
            let dependency = &module.dependencies()[import.dependency as usize];
            let Some(target) = self.modules.get(&dependency.name) else {
                continue;
            };
            match target.exported_definition(&import.name) {
                None => errors.push(LoadError::MissingImport {
                    module: name.to_string(),
                    dependency: dependency.name.clone(),
                    kind: import.kind,
                    name: import.name.clone(),
                }),
                Some(found) if !import.kind.accepts(found.kind()) => {
                    errors.push(LoadError::ImportKindMismatch {
                        module: name.to_string(),
                        dependency: dependency.name.clone(),
                        name: import.name.clone(),
                        expected: import.kind,
                        found: found.kind(),
                    })
                }
                Some(_) => {}
            }
        }

        visiting.remove(name);
        if errors.is_empty() {
            tracing::debug!(module = name, "module usable");
            self.usable.insert(name.to_string());
            Ok(())
        } else {
            tracing::warn!(module = name, errors = errors.len(), "module not usable");
            Err(errors)
        }
    }
}

fn not_exported(module: &str, kind: DefinitionKind, name: &str) -> LoadError {
    LoadError::NotExported {
        module: module.to_string(),
        kind,
        name: name.to_string(),
    }
}
