use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, Position, Range, TextEdit};

use super::lint::MSG_SPACE_BEFORE_CLOSE;

/// Minimal edit satisfying a call-spacing diagnostic, or `None`.
///
/// Only the "missing space before ')'" variant is fixable: the last `)`
/// inside the diagnostic's span is replaced with ` )`. The other variants
/// offer no fix. The diagnostic's range is read against the live text with
/// no staleness check; if the text moved, the `)` lookup simply misses.
pub fn fix_for(diagnostic: &Diagnostic, content: &Rope) -> Option<TextEdit> {
    if diagnostic.message != MSG_SPACE_BEFORE_CLOSE {
        return None;
    }

    let line_idx = diagnostic.range.start.line as usize;
    if diagnostic.range.end.line as usize != line_idx || line_idx >= content.len_lines() {
        return None;
    }
    let line: String = content.line(line_idx).to_string();
    let chars: Vec<char> = line.chars().collect();

    let span_start = diagnostic.range.start.character as usize;
    let span_end = (diagnostic.range.end.character as usize).min(chars.len());
    if span_start >= span_end {
        return None;
    }

    let close_col = (span_start..span_end).rev().find(|&i| chars[i] == ')')?;
    Some(TextEdit {
        range: Range::new(
            Position::new(diagnostic.range.start.line, close_col as u32),
            Position::new(diagnostic.range.start.line, close_col as u32 + 1),
        ),
        new_text: " )".to_string(),
    })
}
