use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

pub const SOURCE: &str = "fqs";
pub const CALL_SPACING_CODE: &str = "fqs_call_spacing";

pub const MSG_BOTH_MISSING: &str = "Expected space after '(' and before ')'";
pub const MSG_SPACE_BEFORE_CLOSE: &str = "Expected space before ')'";
pub const MSG_SPACE_AFTER_OPEN: &str = "Expected space after '('";

static CALL_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*\(").unwrap());

/// Line-scanning state. The machine is reset for every document scan; block
/// comment state never leaks across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Default,
    InBlockComment,
}

/// Check the call-argument spacing convention over a whole document.
///
/// Per line, in order: lines inside a block comment, line-comment lines,
/// and lines containing any double quote are skipped wholesale (the quote
/// skip is a conservative approximation, not string parsing); then trailing
/// `//` text is stripped and any remaining quoted literal is blanked to
/// equal-length padding before call sites are inspected.
pub fn scan_document(text: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut state = LineState::Default;

    for (line_idx, raw_line) in text.lines().enumerate() {
        let mut line = raw_line.to_string();

        if state == LineState::InBlockComment {
            // Anything after a close marker on this line is still ignored
            if line.contains("*/") {
                state = LineState::Default;
            }
            continue;
        }

        if let Some(open) = line.find("/*") {
            match line[open..].find("*/") {
                Some(rel_close) => {
                    // Same-line block comment: blank it out, length preserved
                    let close = open + rel_close + 2;
                    let blanked: String = line
                        .chars()
                        .enumerate()
                        .map(|(i, c)| if i >= open && i < close { ' ' } else { c })
                        .collect();
                    line = blanked;
                }
                None => {
                    state = LineState::InBlockComment;
                    line.truncate(open);
                }
            }
        }

        if line.trim_start().starts_with("//") || line.contains('"') {
            continue;
        }

        if let Some(comment) = line.find("//") {
            line.truncate(comment);
        }
        let line = blank_string_literals(&line);

        check_line(&line, line_idx as u32, &mut diagnostics);
    }

    diagnostics
}

/// Replace the contents of double-quoted literals with spaces so parentheses
/// inside strings cannot produce false call matches. Handles `\"` and `\\`
/// escapes; output length equals input length.
pub fn blank_string_literals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(' ');
            } else if c == '\\' {
                escaped = true;
                out.push(' ');
            } else if c == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push(' ');
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

fn check_line(line: &str, line_idx: u32, diagnostics: &mut Vec<Diagnostic>) {
    let mut scan_from = 0usize;
    while let Some(caps) = CALL_OPEN_RE.captures(&line[scan_from..]) {
        let ident = caps.get(1).expect("capture group");
        let whole = caps.get(0).expect("whole match");
        let ident_start = scan_from + ident.start();
        let open = scan_from + whole.end() - 1; // byte index of '('

        // Nested calls are found by continuing the scan just past '('
        scan_from = open + 1;

        let Some(close) = matching_close_paren(line, open) else {
            continue;
        };
        let args = &line[open + 1..close];
        if args.trim().is_empty() {
            continue;
        }

        let has_leading = args.starts_with(|c: char| c.is_whitespace());
        let has_trailing = args.ends_with(|c: char| c.is_whitespace());
        let message = match (has_leading, has_trailing) {
            (true, true) => continue,
            (false, false) => MSG_BOTH_MISSING,
            (true, false) => MSG_SPACE_BEFORE_CLOSE,
            (false, true) => MSG_SPACE_AFTER_OPEN,
        };

        let start_col = char_col(line, ident_start);
        let end_col = char_col(line, close) + 1; // through ')' inclusive
        let range = Range::new(
            Position::new(line_idx, start_col),
            Position::new(line_idx, end_col),
        );
        let mut diagnostic = Diagnostic::new(
            range,
            Some(DiagnosticSeverity::WARNING),
            None,
            Some(SOURCE.to_string()),
            message.to_string(),
            None,
            None,
        );
        diagnostic.code = Some(NumberOrString::String(CALL_SPACING_CODE.to_string()));
        diagnostics.push(diagnostic);
    }
}

/// Byte index of the `)` matching the `(` at `open`, depth-counted so nested
/// parentheses inside the argument list are handled. Line-local: `None` when
/// the call does not close on this line.
fn matching_close_paren(line: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in line.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn char_col(line: &str, byte_idx: usize) -> u32 {
    line[..byte_idx].chars().count() as u32
}
