use crate::diagnostics::compiler_errors::{DUPLICATE_DECLARATION, IDENTIFIER_NOT_DECLARED};
use crate::diagnostics::diagnostic::{Diagnostic, Severity};
use crate::syntax::position::{Position, PositionTracker};

const CLOCK: &str = "handler Foo()\n    variable x\nend Foo\n";

#[test]
fn header_without_position() {
    let diagnostic = Diagnostic::error("BROKEN").with_message("something broke");
    assert_eq!(diagnostic.header(), "error: something broke");
    assert_eq!(Diagnostic::warning("Only a title").header(), "warning: Only a title");
}

#[test]
fn make_error_fills_message_and_hint() {
    let diagnostic = Diagnostic::make_error(&IDENTIFIER_NOT_DECLARED, &["y"]);
    assert_eq!(diagnostic.severity(), Severity::Error);
    assert_eq!(diagnostic.title(), "IDENTIFIER NOT DECLARED");
    assert_eq!(diagnostic.code(), Some("E102"));
    assert_eq!(diagnostic.message(), Some("Identifier `y` is not declared."));
    assert!(diagnostic.hints().is_empty());
}

#[test]
fn at_uses_the_resolved_location() {
    let mut tracker = PositionTracker::new();
    tracker.advance_to_next_file("clock.mls");
    tracker.advance_to_next_row();
    tracker.advance(13);
    let position = tracker.snapshot();

    let diagnostic = Diagnostic::make_error(&DUPLICATE_DECLARATION, &["x"])
        .at(tracker.resolve(position));
    assert_eq!(diagnostic.file(), Some("clock.mls"));
    assert_eq!(diagnostic.position(), Some(Position::new(1, 2, 14)));
    assert_eq!(
        diagnostic.to_string(),
        "clock.mls:2:14: error[E101]: `x` is already declared in this scope."
    );
}

#[test]
fn render_with_source_excerpt() {
    let diagnostic = Diagnostic::make_error(&DUPLICATE_DECLARATION, &["x"])
        .with_file("clock.mls")
        .with_position(Position::new(1, 2, 14));

    insta::assert_snapshot!(diagnostic.render(Some(CLOCK)), @r"
    clock.mls:2:14: error[E101]: `x` is already declared in this scope.
    2 |     variable x
      |              ^
      = hint: Rename one of the declarations or remove the earlier one.
    ");
}

#[test]
fn render_without_source_keeps_hints() {
    let diagnostic = Diagnostic::warning("UNUSED")
        .with_message("`y` is never read")
        .with_file("clock.mls")
        .with_position(Position::new(1, 9, 1))
        .with_hint("Remove it.");

    assert_eq!(
        diagnostic.render(Some(CLOCK)),
        "clock.mls:9:1: warning: `y` is never read\n = hint: Remove it."
    );
    assert_eq!(
        diagnostic.render(None),
        "clock.mls:9:1: warning: `y` is never read\n = hint: Remove it."
    );
}

#[test]
fn severity_orders_errors_first() {
    assert!(Severity::Error < Severity::Warning);
    assert!(Severity::Warning < Severity::Note);
    assert_eq!(Severity::Note.to_string(), "note");
}
