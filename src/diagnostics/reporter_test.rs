use crate::config::SessionConfig;
use crate::diagnostics::diagnostic::{Diagnostic, Severity};
use crate::diagnostics::reporter::{DiagnosticCounts, Reporter};
use crate::syntax::position::Position;

fn error_at(row: u32, column: u32, message: &str) -> Diagnostic {
    Diagnostic::error("ERROR")
        .with_message(message)
        .with_file("main.mls")
        .with_position(Position::new(1, row, column))
}

fn warning_at(row: u32, column: u32, message: &str) -> Diagnostic {
    Diagnostic::warning("WARNING")
        .with_message(message)
        .with_file("main.mls")
        .with_position(Position::new(1, row, column))
}

#[test]
fn output_is_sorted_by_position() {
    let mut reporter = Reporter::default();
    reporter.report(error_at(3, 1, "third"));
    reporter.report(Diagnostic::error("MODULE").with_message("module level"));
    reporter.report(error_at(1, 5, "second"));
    reporter.report(warning_at(1, 2, "first"));

    let messages: Vec<_> = reporter
        .diagnostics()
        .into_iter()
        .map(|d| d.message().unwrap_or_default().to_string())
        .collect();
    assert_eq!(messages, ["first", "second", "third", "module level"]);
    assert_eq!(reporter.error_count(), 3);
    assert_eq!(reporter.warning_count(), 1);
}

#[test]
fn duplicates_are_reported_once() {
    let mut reporter = Reporter::default();
    assert!(reporter.report(error_at(1, 1, "same")));
    assert!(!reporter.report(error_at(1, 1, "same")));
    assert_eq!(reporter.counts().total(), 1);
}

#[test]
fn werror_promotes_warnings() {
    let config = SessionConfig {
        werror: true,
        ..SessionConfig::default()
    };
    let mut reporter = Reporter::new(&config);
    reporter.report(warning_at(1, 1, "careful"));
    assert!(reporter.has_errors());
    assert_eq!(reporter.warning_count(), 0);
    assert_eq!(reporter.diagnostics()[0].severity(), Severity::Error);
}

#[test]
fn dependency_compiles_drop_warnings() {
    let config = SessionConfig {
        werror: true,
        ..SessionConfig::default()
    }
    .for_dependency();
    let mut reporter = Reporter::new(&config);
    assert!(!reporter.report(warning_at(1, 1, "careful")));
    assert!(reporter.report(error_at(2, 1, "broken")));
    assert_eq!(reporter.counts().total(), 1);
}

#[test]
fn errors_past_the_limit_are_counted_not_kept() {
    let config = SessionConfig {
        max_errors: 2,
        ..SessionConfig::default()
    };
    let mut reporter = Reporter::new(&config);
    for row in 1..=5 {
        reporter.report(error_at(row, 1, &format!("error {}", row)));
    }
    assert!(reporter.report(warning_at(9, 1, "still kept")));

    assert_eq!(reporter.diagnostics().len(), 3);
    assert_eq!(reporter.dropped_errors(), 3);
    assert_eq!(reporter.error_count(), 5);

    insta::assert_snapshot!(reporter.render(), @r"
    Found 2 errors and 1 warning.

    main.mls:1:1: error: error 1

    main.mls:2:1: error: error 2

    main.mls:9:1: warning: still kept
    ... and 3 more errors not shown (raise max_errors to see them).
    ");
}

#[test]
fn render_uses_registered_sources() {
    let mut reporter = Reporter::default();
    reporter.add_source("main.mls", "variable x\nvariable x\n");
    reporter.report(error_at(2, 10, "`x` is already declared in this scope."));

    insta::assert_snapshot!(reporter.render(), @r"
    main.mls:2:10: error: `x` is already declared in this scope.
    2 | variable x
      |          ^
    ");
}

#[test]
fn empty_reporter_renders_nothing() {
    let reporter = Reporter::default();
    assert!(reporter.is_empty());
    assert!(!reporter.has_errors());
    assert_eq!(reporter.render(), "");
    assert_eq!(reporter.to_json().unwrap(), "[]");
}

#[test]
fn summary_lists_every_severity() {
    let counts = DiagnosticCounts {
        errors: 1,
        warnings: 2,
        notes: 3,
    };
    assert_eq!(
        counts.summary_line().as_deref(),
        Some("Found 1 error, 2 warnings, and 3 notes.")
    );
    assert_eq!(DiagnosticCounts::default().summary_line(), None);
}

#[test]
fn json_lists_fields() {
    let mut reporter = Reporter::default();
    reporter.report(error_at(1, 2, "bad"));
    let json: serde_json::Value = serde_json::from_str(&reporter.to_json().unwrap()).unwrap();
    assert_eq!(json[0]["severity"], "error");
    assert_eq!(json[0]["position"]["column"], 2);
    assert_eq!(json[0]["file"], "main.mls");
}
