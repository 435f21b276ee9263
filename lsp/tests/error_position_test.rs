use fqs_lsp::server::diagnostics_for_text;
use tower_lsp::lsp_types::{DiagnosticSeverity, NumberOrString};

#[test]
fn unterminated_string_error_points_at_open_quote() {
    let code = "x := \"unterminated";
    let diags = diagnostics_for_text(code);

    assert!(!diags.is_empty());
    let diag = &diags[0];
    assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diag.code, Some(NumberOrString::String("fqs_parse_error".to_string())));
    assert_eq!(diag.source.as_deref(), Some("fqs"));
    assert!(diag.message.contains("Unterminated string"));

    // The open quote sits at 0-based column 5 on the first line
    assert_eq!(diag.range.start.line, 0);
    assert_eq!(diag.range.start.character, 5);
}

#[test]
fn single_equals_error_suggests_assignment_operator() {
    let code = "y = 5";
    let diags = diagnostics_for_text(code);

    assert!(!diags.is_empty());
    let diag = &diags[0];
    assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
    assert!(diag.message.contains(":="), "message should steer to ':=': {}", diag.message);
    assert_eq!(diag.range.start.line, 0);
    assert_eq!(diag.range.start.character, 2);
}

#[test]
fn error_lands_on_the_offending_line() {
    let code = "a := 1\nb := 2\nfunction {\n";
    let diags = diagnostics_for_text(code);

    assert!(!diags.is_empty());
    let diag = &diags[0];
    assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diag.range.start.line, 2);
}

#[test]
fn unterminated_block_comment_reports_open_position() {
    let code = "a := 1\n/* never closed\nb := 2\n";
    let diags = diagnostics_for_text(code);

    assert!(!diags.is_empty());
    let diag = &diags[0];
    assert!(diag.message.contains("block comment"));
    assert_eq!(diag.range.start.line, 1);
    assert_eq!(diag.range.start.character, 0);
}

#[test]
fn clean_document_produces_no_diagnostics() {
    let code = "ma20 := MA( close, 20 )\nsignal := CROSS( close, ma20 )\n";
    assert!(diagnostics_for_text(code).is_empty());
}

#[test]
fn parse_error_and_lint_findings_coexist() {
    // Parse fails on line 2, lint still reports the spacing issue on line 1
    let code = "x := f(a)\ny = 5\n";
    let diags = diagnostics_for_text(code);

    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diags[1].severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(diags[1].range.start.line, 0);
}
