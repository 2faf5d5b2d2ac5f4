mod common;

use std::sync::Arc;

use modscript::diagnostics::{Diagnostic, Severity};
use modscript::module::{LoadError, ModuleRegistry, Package, PackageError};

use common::{library, temp_path};

#[test]
fn package_modules_resolve_against_each_other() {
    let path = temp_path("linked");
    let package = Package::from_modules(
        "com.example",
        &path,
        &[
            library("com.example.base", "Shape", None),
            library("com.example.app", "App", Some(("com.example.base", "Shape"))),
        ],
    )
    .unwrap();

    let mut registry = ModuleRegistry::new();
    registry.register_package(&package).unwrap();
    assert_eq!(registry.ensure_usable("com.example.app"), Ok(()));
    assert!(registry.is_usable("com.example.base"));
    assert_eq!(package.reference_count(), 2);

    drop(registry);
    drop(package);
    std::fs::remove_file(path).ok();
}

#[test]
fn load_errors_become_loader_diagnostics() {
    let mut registry = ModuleRegistry::new();
    registry
        .register(Arc::new(library(
            "com.example.app",
            "App",
            Some(("com.example.base", "Shape")),
        )))
        .unwrap();
    registry
        .register(Arc::new(library(
            "com.example.other",
            "Other",
            Some(("com.example.app", "Shape")),
        )))
        .unwrap();

    let errors = registry.ensure_usable("com.example.other").unwrap_err();
    assert_eq!(
        errors,
        vec![
            LoadError::UnresolvedDependency {
                module: "com.example.app".into(),
                dependency: "com.example.base".into(),
            },
            LoadError::UnusableDependency {
                module: "com.example.other".into(),
                dependency: "com.example.app".into(),
            },
            LoadError::MissingImport {
                module: "com.example.other".into(),
                dependency: "com.example.app".into(),
                kind: modscript::module::DefinitionKind::Type,
                name: "Shape".into(),
            },
        ]
    );

    let rendered: Vec<String> = errors
        .iter()
        .map(|error| Diagnostic::from(error).render(None))
        .collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    error[E132]: Module `com.example.app` depends on `com.example.base`, which cannot be found.
     = hint: Register `com.example.base` before loading `com.example.app`.
    error[E136]: module `com.example.other` depends on `com.example.app`, which is not usable.
    error[E133]: Module `com.example.other` imports `Shape` from `com.example.app`, which does not export it.
    ");
}

#[test]
fn unreadable_packages_report_their_path() {
    let path = temp_path("missing");
    let error = Package::open(&path).unwrap_err();
    assert!(matches!(error, PackageError::Io { .. }));

    let diagnostic = Diagnostic::from(&error);
    assert_eq!(diagnostic.severity(), Severity::Error);
    assert_eq!(diagnostic.code(), Some("E131"));
    assert_eq!(diagnostic.file(), Some(path.display().to_string().as_str()));
}
