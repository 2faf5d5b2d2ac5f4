use std::sync::Arc;

use crate::config::SessionConfig;
use crate::diagnostics::Severity;
use crate::module::definition::Definition;
use crate::module::index::{DefIndex, TypeIndex};
use crate::module::kind::ModuleKind;
use crate::module::types::TypeDesc;
use crate::scope::meaning::Meaning;
use crate::session::CompilationSession;
use crate::syntax::position::Position;
use crate::syntax::shared_interner::SharedInterner;

const CLOCK: &str = "\
module com.example.clock
handler Foo()
    variable tCount
    variable tCount
    put tCont into tOut
end Foo
";

fn session(config: &SessionConfig) -> CompilationSession {
    let mut session =
        CompilationSession::new("clock", Arc::new(SharedInterner::new()), config);
    session.begin_file("clock.mls", Some(CLOCK));
    session
}

// The tracker only moves forward, like the lexer driving it.
fn move_to(session: &mut CompilationSession, row: u32, column: u32) -> Position {
    let tracker = session.tracker_mut();
    while tracker.snapshot().row < row {
        tracker.advance_to_next_row();
    }
    let current = tracker.snapshot().column;
    tracker.advance(column - current);
    tracker.snapshot()
}

fn begin_clock(session: &mut CompilationSession) -> DefIndex {
    let position = move_to(session, 1, 8);
    assert!(session.begin_module("com.example.clock", ModuleKind::Library, position));
    session.scopes_mut().enter_scope();

    let builder = session.builder_mut();
    let ty = builder.add_type(TypeDesc::Handler {
        parameters: vec![],
        return_type: TypeIndex(0),
    });
    let foo = builder.add_definition(Definition::Handler {
        ty,
        locals: vec![],
        start: 0,
        finish: 0,
    });
    builder.set_bytecode(vec![]).unwrap();

    let position = move_to(session, 2, 9);
    assert!(session.declare("Foo", None, Meaning::Handler(foo), position));
    foo
}

#[test]
fn errors_are_collected_and_block_the_module() {
    let mut session = session(&SessionConfig::default());
    let foo = begin_clock(&mut session);
    session.scopes_mut().enter_scope();

    let first = move_to(&mut session, 3, 14);
    assert!(session.declare("tCount", None, Meaning::Local(0), first));
    let second = move_to(&mut session, 4, 14);
    assert!(!session.declare("tCount", None, Meaning::Local(1), second));
    assert_eq!(
        session.scopes().lookup_unqualified(session.intern("tCount")),
        Some(Meaning::Local(0))
    );

    let typo = move_to(&mut session, 5, 9);
    assert_eq!(session.resolve("tCont", None, typo), None);
    assert_eq!(
        session.resolve("Foo", None, typo),
        Some(Meaning::Handler(foo))
    );
    session.scopes_mut().leave_scope();
    assert!(session.export("Foo", foo, typo));

    let failure = session.finish().unwrap_err();
    assert_eq!(failure.error_count, 2);
    assert_eq!(failure.unit, "clock");
    insta::assert_snapshot!(failure.rendered, @r"
    Found 2 errors.

    clock.mls:4:14: error[E101]: `tCount` is already declared in this scope.
    4 |     variable tCount
      |              ^
      = hint: Rename one of the declarations or remove the earlier one.
      = hint: The existing declaration is a local.
      = hint: First declared at clock.mls:3:14.

    clock.mls:5:9: error[E102]: Identifier `tCont` is not declared.
    5 |     put tCont into tOut
      |         ^
      = hint: Did you mean `tCount`?
    ");
}

#[test]
fn clean_unit_produces_a_module_with_its_warnings() {
    let mut session = session(&SessionConfig::default());
    let foo = begin_clock(&mut session);
    session.scopes_mut().enter_scope();
    let position = move_to(&mut session, 3, 14);
    assert!(session.declare("count", None, Meaning::Local(0), position));
    session.scopes_mut().leave_scope();
    assert!(session.export("Foo", foo, position));

    let compiled = session.finish().unwrap();
    assert_eq!(compiled.module.name(), "com.example.clock");
    assert_eq!(compiled.module.resolve_symbol("Foo"), Some(foo));
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].severity(), Severity::Warning);
    assert_eq!(compiled.diagnostics[0].code(), Some("W113"));
}

#[test]
fn werror_turns_warnings_into_failure() {
    let config = SessionConfig {
        werror: true,
        ..SessionConfig::default()
    };
    let mut session = session(&config);
    begin_clock(&mut session);
    let position = move_to(&mut session, 3, 14);
    session.report_warning(position, "suspicious");

    let failure = session.finish().unwrap_err();
    assert_eq!(failure.error_count, 1);
    assert_eq!(failure.diagnostics[0].severity(), Severity::Error);
}

#[test]
fn duplicate_export_is_reported() {
    let mut session = session(&SessionConfig::default());
    let foo = begin_clock(&mut session);
    let position = move_to(&mut session, 6, 1);
    assert!(session.export("Foo", foo, position));
    assert!(!session.export("Foo", foo, position));
    assert!(!session.export("Bar", DefIndex(99), position));

    let failure = session.finish().unwrap_err();
    let codes: Vec<_> = failure
        .diagnostics
        .iter()
        .filter_map(|d| d.code())
        .collect();
    assert_eq!(codes, ["E111", "E110"]);
}

#[test]
fn module_name_must_be_qualified() {
    let mut session = session(&SessionConfig::default());
    let position = move_to(&mut session, 1, 8);
    assert!(session.begin_module("clock", ModuleKind::Application, position));
    session.builder_mut().set_bytecode(vec![]).unwrap();

    let failure = session.finish().unwrap_err();
    assert_eq!(failure.diagnostics[0].code(), Some("E112"));
}

#[test]
fn literals_are_checked_where_they_appear() {
    let mut session = session(&SessionConfig::default());
    let position = move_to(&mut session, 1, 1);

    assert_eq!(session.integer_literal("0x10", position), Some(16));
    assert_eq!(session.real_literal("1.5", position), Some(1.5));
    assert_eq!(session.integer_literal("4294967296", position), None);
    assert_eq!(
        session.string_literal("\"a\\u{}b\"", position).as_deref(),
        Some("a\u{0}b")
    );
    assert_eq!(session.string_literal("\"bad\\x\"", position), None);

    let codes: Vec<_> = session
        .reporter()
        .diagnostics()
        .into_iter()
        .filter_map(|d| d.code())
        .collect();
    assert_eq!(codes, ["E124", "E121", "W125"]);
}

#[test]
fn qualified_lookups_do_not_suggest() {
    let mut session = session(&SessionConfig::default());
    session.scopes_mut().enter_scope();
    let position = move_to(&mut session, 1, 1);
    assert!(session.declare("Tick", Some("clock"), Meaning::Module(0), position));
    assert_eq!(
        session.resolve("Tick", Some("clock"), position),
        Some(Meaning::Module(0))
    );
    assert_eq!(session.resolve("Tick", None, position), None);
    assert_eq!(session.resolve("Tock", Some("clock"), position), None);

    let diagnostics = session.reporter().diagnostics();
    assert_eq!(
        diagnostics[1].message(),
        Some("Identifier `clock.Tock` is not declared.")
    );
    assert!(diagnostics[1].hints().is_empty());
}
