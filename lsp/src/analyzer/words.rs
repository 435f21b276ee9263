use fqs_core::token::{is_ident_continue, is_ident_start};

/// Identifier under the cursor: the first maximal identifier run whose span
/// contains `offset`, counting both boundaries (a cursor sitting just past
/// the last character still hits the word). Offsets are character indices
/// into `line`.
pub fn word_at(line: &str, offset: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        if is_ident_start(chars[i]) {
            let start = i;
            let mut end = i + 1;
            while end < chars.len() && is_ident_continue(chars[end]) {
                end += 1;
            }
            if offset >= start && offset <= end {
                return Some(chars[start..end].iter().collect());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}
