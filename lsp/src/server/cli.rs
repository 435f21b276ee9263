use anyhow::Context;
use std::path::{Component, Path};

use tower_lsp::lsp_types::{DiagnosticSeverity, Url};

use crate::analyzer::AnalysisEngine;

use super::analysis::diagnostics_for_text;

/// One-shot analysis mode: `fqs-lsp --analyze [--errors-only] <relative-path>`.
/// Returns `Ok(None)` when no `--analyze` flag is present and the process
/// should start the stdio server instead.
pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() <= 1 {
        return Ok(None);
    }

    if let Some(i) = args.iter().position(|a| a == "--analyze") {
        let mut path_index = i + 1;
        while path_index < args.len() && args[path_index].starts_with("--") {
            path_index += 1;
        }

        let path = args.get(path_index).cloned().ok_or_else(|| {
            anyhow::anyhow!("Usage: fqs-lsp --analyze [--errors-only] <relative-file-path>\n  --analyze <file>     : Full analysis with JSON output\n  --errors-only        : Show only errors in simple format")
        })?;

        let errors_only = args.iter().any(|a| a == "--errors-only");
        let content = read_file_content(&path)?;

        let diagnostics = diagnostics_for_text(&content);

        if errors_only {
            let errors: Vec<String> = diagnostics
                .iter()
                .filter(|d| d.severity == Some(DiagnosticSeverity::ERROR))
                .map(|d| {
                    format!(
                        "Line {}:{}: {}",
                        d.range.start.line + 1,
                        d.range.start.character + 1,
                        d.message
                    )
                })
                .collect();

            if errors.is_empty() {
                return Ok(Some("No errors found".to_string()));
            } else {
                return Ok(Some(errors.join("\n")));
            }
        }

        let uri = analysis_uri(&path);
        let mut engine = AnalysisEngine::new();
        engine.reindex_document(&uri, &content);

        let symbols: Vec<serde_json::Value> = engine
            .all_symbols()
            .into_iter()
            .map(|sym| {
                serde_json::json!({
                    "name": sym.name,
                    "kind": sym.kind.label(),
                    "info": sym.info,
                    "location": sym.location,
                })
            })
            .collect();

        let output = serde_json::json!({
            "diagnostics": diagnostics,
            "symbols": symbols,
        });
        return Ok(Some(serde_json::to_string_pretty(&output)?));
    }

    Ok(None)
}

fn analysis_uri(path: &str) -> Url {
    std::fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .unwrap_or_else(|| {
            Url::parse("file:///untitled.fqs").expect("static URL parses")
        })
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }

    let s = path.to_string_lossy();
    let suspicious = ['\0', '\n', '\r', '\t'];
    if s.chars().any(|c| suspicious.contains(&c)) {
        return false;
    }
    // Reject drive-prefixed paths that slip past is_absolute on non-Windows hosts
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if bytes[1] == b':' {
            return false;
        }
    }
    true
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_absolute_and_parent_paths() {
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("../outside.fqs"));
        assert!(!is_safe_path("a/../../outside.fqs"));
        assert!(!is_safe_path(""));
        assert!(!is_safe_path("C:\\windows\\system32"));
    }

    #[test]
    fn accepts_plain_relative_paths() {
        assert!(is_safe_path("strategy.fqs"));
        assert!(is_safe_path("lib/indicators.fqs"));
    }
}
