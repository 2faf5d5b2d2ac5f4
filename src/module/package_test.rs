use std::{path::PathBuf, sync::Arc};

use crate::module::builder::ModuleBuilder;
use crate::module::codec::FormatError;
use crate::module::definition::Definition;
use crate::module::kind::ModuleKind;
use crate::module::module::Module;
use crate::module::package::{PACKAGE_MAGIC, Package, PackageError, hash_bytes};
use crate::module::registry::ModuleRegistry;
use crate::module::types::TypeDesc;

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let pid = std::process::id();
    path.push(format!("modscript_{}_{}_{}.mspk", name, pid, nanos));
    path
}

fn module(name: &str, export: &str) -> Module {
    let mut builder = ModuleBuilder::new();
    builder.begin_module(name, ModuleKind::Library).unwrap();
    let ty = builder.add_type(TypeDesc::Foreign {
        binding: "any".into(),
    });
    let def = builder.add_definition(Definition::Type { ty });
    builder.export_symbol(export, def).unwrap();
    builder.set_bytecode(vec![0xAA]).unwrap();
    builder.finish().unwrap()
}

#[test]
fn write_then_open_round_trips_modules() {
    let path = temp_path("round_trip");
    let modules = vec![module("com.example.a", "A"), module("com.example.b", "B")];

    let package = Package::from_modules("com.example", &path, &modules).unwrap();
    assert_eq!(package.name(), "com.example");
    assert_eq!(package.path(), path.as_path());
    assert_eq!(package.modules().len(), 2);
    assert_eq!(package.modules()[0].as_ref(), &modules[0]);
    let b = package.module("com.example.b").unwrap();
    assert_eq!(b.resolve_symbol("B"), Some(crate::module::index::DefIndex(0)));
    assert!(package.module("com.example.c").is_none());

    drop(package);
    std::fs::remove_file(path).ok();
}

#[test]
fn clones_share_one_package() {
    let path = temp_path("clones");
    let package = Package::from_modules("p", &path, &[module("com.example.a", "A")]).unwrap();
    assert_eq!(package.reference_count(), 1);

    let other = package.clone();
    assert_eq!(package.reference_count(), 2);
    assert!(Arc::ptr_eq(&package.modules()[0], &other.modules()[0]));

    drop(other);
    assert_eq!(package.reference_count(), 1);

    drop(package);
    std::fs::remove_file(path).ok();
}

#[test]
fn registry_keeps_package_alive() {
    let path = temp_path("registry");
    let package = Package::from_modules("p", &path, &[module("com.example.a", "A")]).unwrap();

    let mut registry = ModuleRegistry::new();
    registry.register_package(&package).unwrap();
    assert_eq!(package.reference_count(), 2);
    assert!(registry.lookup("com.example.a").is_some());

    assert!(matches!(
        registry.register_package(&package),
        Err(crate::module::registry::LoadError::DuplicateModule { .. })
    ));

    drop(registry);
    assert_eq!(package.reference_count(), 1);
    drop(package);
    std::fs::remove_file(path).ok();
}

#[test]
fn fingerprint_detects_changed_file() {
    let path = temp_path("stale");
    let package = Package::from_modules("p", &path, &[module("com.example.a", "A")]).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(package.fingerprint(), hash_bytes(&bytes));
    assert!(!package.is_stale().unwrap());

    Package::write(&path, "p", &[module("com.example.a", "Changed")]).unwrap();
    assert!(package.is_stale().unwrap());

    drop(package);
    std::fs::remove_file(path).ok();
}

#[test]
fn open_rejects_bad_files() {
    let missing = temp_path("missing");
    assert!(matches!(
        Package::open(&missing),
        Err(PackageError::Io { .. })
    ));

    let path = temp_path("bad_magic");
    std::fs::write(&path, b"NOPE\x01\x00").unwrap();
    assert!(matches!(
        Package::open(&path),
        Err(PackageError::BadMagic { .. })
    ));

    let mut bytes = PACKAGE_MAGIC.to_vec();
    bytes.extend_from_slice(&9u16.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        Package::open(&path),
        Err(PackageError::UnsupportedVersion { found: 9, .. })
    ));

    std::fs::remove_file(path).ok();
}

#[test]
fn corrupt_module_image_is_reported_with_its_index() {
    let path = temp_path("corrupt");
    Package::write(
        &path,
        "p",
        &[module("com.example.a", "A"), module("com.example.b", "B")],
    )
    .unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let second = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, window)| *window == b"MSCM")
        .map(|(at, _)| at)
        .nth(1)
        .unwrap();
    bytes[second] = b'X';
    std::fs::write(&path, &bytes).unwrap();

    match Package::open(&path) {
        Err(PackageError::Module { index, source, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(source, FormatError::BadMagic);
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.name().to_string())),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn trailing_data_is_rejected() {
    let path = temp_path("trailing");
    Package::write(&path, "p", &[module("com.example.a", "A")]).unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.push(0);
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Package::open(&path),
        Err(PackageError::Malformed {
            source: FormatError::TrailingBytes { count: 1 },
            ..
        })
    ));
    std::fs::remove_file(path).ok();
}
