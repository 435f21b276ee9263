use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::debug;

use super::{Symbol, SymbolKind};

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*function\s+([A-Za-z_]\w*)").unwrap());
static ASSIGN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*:=").unwrap());
static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*include\s+"([^"]+)""#).unwrap());

/// Textual indexer for documents with no parsable AST. Scans raw lines with
/// three patterns (function declaration, leading assignment target, include
/// directive) and follows includes relative to the document's directory.
/// A visited set of canonicalized paths stops include cycles: each file in
/// a cycle is indexed exactly once.
pub(crate) fn index_textual(uri: &Url, text: &str, base_dir: Option<&Path>, follow_includes: bool) -> Vec<Symbol> {
    let mut out = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    if let Ok(path) = uri.to_file_path() {
        if let Ok(canonical) = path.canonicalize() {
            visited.insert(canonical);
        }
    }
    index_lines(uri, text, base_dir, follow_includes, &mut visited, &mut out);
    out
}

fn index_lines(
    uri: &Url,
    text: &str,
    base_dir: Option<&Path>,
    follow_includes: bool,
    visited: &mut HashSet<PathBuf>,
    out: &mut Vec<Symbol>,
) {
    let file = uri
        .path_segments()
        .and_then(|mut s| s.next_back())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uri.to_string());

    for (line_idx, line) in text.lines().enumerate() {
        if let Some(caps) = FUNCTION_RE.captures(line) {
            if let Some(m) = caps.get(1) {
                out.push(line_symbol(
                    m.as_str(),
                    SymbolKind::Function,
                    uri,
                    line_idx,
                    m.start(),
                    m.end(),
                    format!("function declared in {} (textual scan)", file),
                ));
            }
            continue;
        }
        if let Some(caps) = ASSIGN_RE.captures(line) {
            if let Some(m) = caps.get(1) {
                out.push(line_symbol(
                    m.as_str(),
                    SymbolKind::Variable,
                    uri,
                    line_idx,
                    m.start(),
                    m.end(),
                    format!("declared in {} (textual scan)", file),
                ));
            }
            continue;
        }
        if follow_includes {
            if let Some(caps) = INCLUDE_RE.captures(line) {
                if let Some(m) = caps.get(1) {
                    follow_include(m.as_str(), base_dir, visited, out);
                }
            }
        }
    }
}

fn follow_include(rel_path: &str, base_dir: Option<&Path>, visited: &mut HashSet<PathBuf>, out: &mut Vec<Symbol>) {
    let Some(base) = base_dir else {
        return;
    };
    let target = base.join(rel_path);
    let canonical = match target.canonicalize() {
        Ok(p) => p,
        Err(_) => return,
    };
    if !visited.insert(canonical.clone()) {
        debug!("include cycle at {}, already indexed", canonical.display());
        return;
    }
    let Ok(included_text) = std::fs::read_to_string(&canonical) else {
        return;
    };
    let Ok(included_uri) = Url::from_file_path(&canonical) else {
        return;
    };
    let included_dir = canonical.parent().map(PathBuf::from);
    index_lines(
        &included_uri,
        &included_text,
        included_dir.as_deref(),
        true,
        visited,
        out,
    );
}

#[allow(clippy::too_many_arguments)]
fn line_symbol(
    name: &str,
    kind: SymbolKind,
    uri: &Url,
    line_idx: usize,
    start_byte: usize,
    end_byte: usize,
    info: String,
) -> Symbol {
    // Regex offsets are bytes, but the scanned patterns are ASCII-only, so
    // they line up with character columns.
    let range = Range::new(
        Position::new(line_idx as u32, start_byte as u32),
        Position::new(line_idx as u32, end_byte as u32),
    );
    Symbol {
        name: name.to_string(),
        kind,
        location: Location::new(uri.clone(), range),
        info,
    }
}
