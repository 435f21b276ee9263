use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            let clamped = target_utf16.min(s.len());
            return line_start_char + clamped;
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

// Apply incremental LSP changes to a rope buffer.
pub(crate) fn apply_incremental_change_rope(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    if let Some(range) = &change.range {
        let start_char = position_to_char_idx(text, range.start);
        let end_char = position_to_char_idx(text, range.end);
        let (s, e) = if start_char <= end_char {
            (start_char, end_char)
        } else {
            (end_char, start_char)
        };
        if s != e {
            text.remove(s..e);
        }
        if !change.text.is_empty() {
            text.insert(s, &change.text);
        }
    } else {
        *text = Rope::from_str(&change.text);
    }
}

/// Convert a UTF-16 column (the LSP wire unit) into a char index within
/// `line`, clamped to the line length.
pub(crate) fn utf16_to_char_col(line: &str, utf16_col: usize) -> usize {
    if line.is_ascii() {
        return utf16_col.min(line.len());
    }
    let mut seen_utf16 = 0usize;
    for (char_idx, ch) in line.chars().enumerate() {
        if seen_utf16 >= utf16_col {
            return char_idx;
        }
        seen_utf16 += ch.len_utf16();
    }
    line.chars().count()
}

/// Text of the given line without its trailing newline, if the line exists.
pub(crate) fn line_text(text: &Rope, line: u32) -> Option<String> {
    let line_idx = line as usize;
    if line_idx >= text.len_lines() {
        return None;
    }
    let mut s = text.line(line_idx).to_string();
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_col_passes_through_for_ascii() {
        assert_eq!(utf16_to_char_col("spread := 1", 4), 4);
        assert_eq!(utf16_to_char_col("abc", 10), 3);
        assert_eq!(utf16_to_char_col("", 0), 0);
    }

    #[test]
    fn utf16_col_accounts_for_surrogate_pairs() {
        // The rocket is one char but two UTF-16 units
        let line = "a\u{1F680}b := 1";
        assert_eq!(utf16_to_char_col(line, 0), 0);
        assert_eq!(utf16_to_char_col(line, 1), 1);
        assert_eq!(utf16_to_char_col(line, 3), 2);
        assert_eq!(utf16_to_char_col(line, 4), 3);
    }

    #[test]
    fn cursor_past_wide_char_resolves_the_right_word() {
        let line = "a\u{1F680}fast := 1";
        // UTF-16 column of the end of "fast"; the raw offset would miss it
        let col = utf16_to_char_col(line, 7);
        assert_eq!(crate::analyzer::word_at(line, col).as_deref(), Some("fast"));
        assert_eq!(crate::analyzer::word_at(line, 7), None);
    }
}
