#![allow(dead_code)]

use std::path::PathBuf;

use modscript::module::{Definition, DefinitionKind, Module, ModuleBuilder, ModuleKind, TypeDesc};

pub fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let pid = std::process::id();
    path.push(format!("modscript_it_{}_{}_{}.mspk", name, pid, nanos));
    path
}

/// A library exporting one type named `export`, optionally importing a
/// type `import` from `dependency`.
pub fn library(name: &str, export: &str, dependency: Option<(&str, &str)>) -> Module {
    let mut builder = ModuleBuilder::new();
    builder.begin_module(name, ModuleKind::Library).unwrap();
    if let Some((dependency, import)) = dependency {
        let dependency = builder.add_dependency(dependency);
        let import = builder.add_import(dependency, DefinitionKind::Type, import);
        builder.add_definition(Definition::External { import });
    }
    let ty = builder.add_type(TypeDesc::Foreign {
        binding: "any".into(),
    });
    let definition = builder.add_definition(Definition::Type { ty });
    builder.export_symbol(export, definition).unwrap();
    builder.set_bytecode(vec![0x00]).unwrap();
    builder.finish().unwrap()
}
