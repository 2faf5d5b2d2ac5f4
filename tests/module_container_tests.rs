use modscript::module::{
    DefIndex, Definition, DefinitionKind, Module, ModuleBuilder, ModuleError, ModuleKind,
    Parameter, ParameterMode, PropertyTypes, TypeDesc, TypeIndex, Value, decode_module,
};

fn three_definitions(builder: &mut ModuleBuilder) {
    builder
        .begin_module("com.example.three", ModuleKind::Library)
        .unwrap();
    let ty = builder.add_type(TypeDesc::Foreign {
        binding: "any".into(),
    });
    builder.add_definition(Definition::Type { ty });
    builder.add_definition(Definition::Variable { ty });
    builder.add_definition(Definition::Variable { ty });
    builder.set_slot_count(2);
}

#[test]
fn module_round_trip_keeps_symbols_bytecode_and_slots() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    builder.export_symbol("A", DefIndex(0)).unwrap();
    builder.export_symbol("B", DefIndex(2)).unwrap();
    builder.set_bytecode(vec![0x01, 0x02]).unwrap();
    builder.set_slot_count(4);
    let module = builder.finish().unwrap();

    let decoded = Module::from_bytes(&module.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.resolve_symbol("A"), Some(DefIndex(0)));
    assert_eq!(decoded.resolve_symbol("B"), Some(DefIndex(2)));
    assert_eq!(decoded.resolve_symbol("C"), None);
    assert_eq!(decoded.bytecode(), &[0x01, 0x02]);
    assert_eq!(decoded.slot_count(), 4);
    assert_eq!(decoded.instantiate_storage_layout(), 4);
    assert_eq!(decoded.variable_slot(DefIndex(1)), Some(0));
    assert_eq!(decoded.variable_slot(DefIndex(2)), Some(1));
    assert_eq!(decoded, module);
}

#[test]
fn out_of_range_export_fails_before_finish() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    assert_eq!(
        builder.export_symbol("X", DefIndex(99)),
        Err(ModuleError::DefinitionOutOfRange {
            index: DefIndex(99),
            count: 3,
        })
    );
    builder.set_bytecode(vec![]).unwrap();

    let module = builder.finish().unwrap();
    assert_eq!(module.resolve_symbol("X"), None);
    assert!(module.exports().is_empty());
}

#[test]
fn slot_count_cannot_undercut_variables() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    builder.set_bytecode(vec![]).unwrap();
    builder.set_slot_count(1);
    assert_eq!(
        builder.finish(),
        Err(ModuleError::SlotCountTooSmall {
            slot_count: 1,
            required: 2,
        })
    );
    assert!(!builder.is_building());
}

#[test]
fn finished_modules_are_shareable_across_threads() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    builder.export_symbol("A", DefIndex(0)).unwrap();
    builder.set_bytecode(vec![7]).unwrap();
    let module = std::sync::Arc::new(builder.finish().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let module = std::sync::Arc::clone(&module);
            std::thread::spawn(move || module.resolve_symbol("A"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(DefIndex(0)));
    }
}

#[test]
fn json_dump_describes_the_module() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    builder.export_symbol("A", DefIndex(0)).unwrap();
    builder.set_bytecode(vec![0xab, 0x01]).unwrap();
    let module = builder.finish().unwrap();

    let json: serde_json::Value = serde_json::from_str(&module.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["name"], "com.example.three");
    assert_eq!(json["bytecode"], "ab01");
    assert_eq!(json["exports"][0]["name"], "A");
}

#[test]
fn stripped_modules_still_round_trip() {
    let mut builder = ModuleBuilder::new();
    three_definitions(&mut builder);
    builder.name_definition(DefIndex(1), "mCount").unwrap();
    builder.set_bytecode(vec![1]).unwrap();
    let module = builder.finish().unwrap();
    assert_eq!(module.definition_name(DefIndex(1)), Some("mCount"));

    let stripped = module.without_debug_info();
    assert!(stripped.debug_info().is_empty());
    let decoded = decode_module(&stripped.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.definition_name(DefIndex(1)), None);
    assert_eq!(
        decoded.definition_at(DefIndex(2)),
        Some(&Definition::Variable { ty: TypeIndex(0) })
    );
}

fn foreign(name: &str) -> TypeDesc {
    TypeDesc::Foreign {
        binding: name.into(),
    }
}

fn clock_module() -> Module {
    let mut builder = ModuleBuilder::new();
    builder
        .begin_module("com.example.clock", ModuleKind::Library)
        .unwrap();
    let number = builder.add_type(foreign("number"));
    let string = builder.add_type(foreign("string"));
    let get = builder.add_type(TypeDesc::Handler {
        parameters: vec![],
        return_type: number,
    });
    let set = builder.add_type(TypeDesc::Handler {
        parameters: vec![Parameter {
            mode: ParameterMode::In,
            ty: string,
            name: "pValue".into(),
        }],
        return_type: number,
    });

    let get_tick = builder.add_definition(Definition::Handler {
        ty: get,
        locals: vec![],
        start: 0,
        finish: 1,
    });
    let set_tick = builder.add_definition(Definition::ForeignHandler {
        ty: set,
        binding: "clock_set_tick".into(),
    });
    let tick = builder.add_definition(Definition::Property {
        getter: get_tick,
        setter: Some(set_tick),
    });
    let label_var = builder.add_definition(Definition::Variable { ty: string });
    let label = builder.add_definition(Definition::Property {
        getter: label_var,
        setter: None,
    });
    let changed = builder.add_definition(Definition::Event { ty: set });

    builder.export_symbol("GetTick", get_tick).unwrap();
    builder.export_symbol("Tick", tick).unwrap();
    builder.export_symbol("SetTick", set_tick).unwrap();
    builder.export_symbol("Label", label).unwrap();
    builder.export_symbol("Changed", changed).unwrap();
    builder.set_bytecode(vec![0]).unwrap();
    builder.set_slot_count(1);
    builder.finish().unwrap()
}

#[test]
fn exported_names_are_listed_by_kind() {
    let module = clock_module();
    assert_eq!(module.exported_handlers(), vec!["GetTick", "SetTick"]);
    assert_eq!(module.exported_properties(), vec!["Tick", "Label"]);
    assert_eq!(module.exported_events(), vec!["Changed"]);
}

#[test]
fn handler_and_event_signatures_are_queried_by_name() {
    let module = clock_module();
    assert_eq!(module.query_handler("GetTick"), module.type_at(TypeIndex(2)));
    assert_eq!(module.query_handler("SetTick"), module.type_at(TypeIndex(3)));
    assert_eq!(module.query_event("Changed"), module.type_at(TypeIndex(3)));

    assert_eq!(module.query_handler("Tick"), None);
    assert_eq!(module.query_event("GetTick"), None);
    assert_eq!(module.query_handler("Missing"), None);
}

#[test]
fn property_types_come_from_accessors() {
    let module = clock_module();
    let number = foreign("number");
    let string = foreign("string");

    assert_eq!(
        module.query_property("Tick"),
        Some(PropertyTypes {
            getter: &number,
            setter: Some(&string),
        })
    );
    assert_eq!(
        module.query_property("Label"),
        Some(PropertyTypes {
            getter: &string,
            setter: None,
        })
    );
    assert_eq!(module.query_property("Changed"), None);
}

#[test]
fn references_to_the_wrong_kind_of_definition_are_rejected() {
    let mut builder = ModuleBuilder::new();
    builder
        .begin_module("com.example.kinds", ModuleKind::Library)
        .unwrap();
    let value = builder.add_value(Value::Integer(1));
    let constant = builder.add_definition(Definition::Constant { value });
    let property = builder.add_definition(Definition::Property {
        getter: constant,
        setter: Some(constant),
    });
    builder.add_definition(Definition::DefinitionGroup {
        handlers: vec![constant],
    });
    builder.set_bytecode(vec![]).unwrap();

    assert_eq!(
        builder.finish(),
        Err(ModuleError::DefinitionKindMismatch {
            definition: property,
            target: constant,
            expected: "variable or handler",
            found: DefinitionKind::Constant,
        })
    );
}
