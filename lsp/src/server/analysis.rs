use tokio::time::{sleep, Duration};
use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::analyzer::{lint, word_at};
use fqs_core::parser::parse_program;

use super::state::FqsLanguageServer;
use super::text::{line_text, utf16_to_char_col};

impl FqsLanguageServer {
    /// Full diagnostics pass for one document: parse failure (if any) plus
    /// the call-spacing lint. Recomputed from scratch every call; results
    /// are never merged with prior passes.
    pub(crate) fn compute_diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        let content = match self.documents.get(uri) {
            Some(doc) => doc.content.to_string(),
            None => return Vec::new(),
        };
        let max = self.config.lock().unwrap().max_diagnostics;
        let mut diagnostics = diagnostics_for_text(&content);
        diagnostics.truncate(max);
        diagnostics
    }

    /// Debounced reindex + diagnostics publish. The task sleeps for the
    /// quiet window, then aborts if the document's version or debounce seq
    /// moved in the meantime, so only the latest pending recompute fires.
    /// In-flight work is never cancelled; it is assumed fast.
    pub(crate) async fn schedule_reindex(&self, uri: Url, scheduled_version: i32, delay_ms: u64) {
        let documents = self.documents.clone();
        let engine = self.engine.clone();
        let config = self.config.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }

            let (content_snapshot, seq_snapshot, version_snapshot) = match documents.get(&uri) {
                Some(doc) => (doc.content.to_string(), doc.debounce_seq, doc.version),
                None => return,
            };
            if version_snapshot != scheduled_version {
                debug!("stale reindex for {} dropped (version moved)", uri);
                return;
            }

            // Indexing and diagnostics are independent passes over the same
            // snapshot; neither depends on the other's completion.
            let (follow_includes, max) = {
                let cfg = config.lock().unwrap();
                (cfg.follow_includes, cfg.max_diagnostics)
            };
            {
                let mut engine = engine.lock().unwrap();
                engine.follow_includes = follow_includes;
                engine.reindex_document(&uri, &content_snapshot);
            }

            let mut diagnostics = diagnostics_for_text(&content_snapshot);
            diagnostics.truncate(max);

            // Drop the publish if more edits arrived while computing
            if let Some(doc) = documents.get(&uri) {
                if doc.debounce_seq != seq_snapshot || doc.version != version_snapshot {
                    return;
                }
            }
            client
                .send_notification::<notification::PublishDiagnostics>(PublishDiagnosticsParams {
                    uri: uri.clone(),
                    version: Some(version_snapshot),
                    diagnostics,
                })
                .await;
        });
    }

    /// Identifier under the cursor, resolved through the document snapshot.
    /// The cursor column arrives in UTF-16 units and is converted before the
    /// word lookup.
    pub(crate) fn symbol_name_at(&self, uri: &Url, position: Position) -> Option<String> {
        let doc = self.documents.get(uri)?;
        let line = line_text(&doc.content, position.line)?;
        let col = utf16_to_char_col(&line, position.character as usize);
        word_at(&line, col)
    }

    pub(crate) fn resolve_definition(&self, uri: &Url, position: Position) -> Option<Location> {
        let name = self.symbol_name_at(uri, position)?;
        let engine = self.engine.lock().ok()?;
        engine.lookup(&name).map(|sym| sym.location.clone())
    }

    pub(crate) fn resolve_hover(&self, uri: &Url, position: Position) -> Option<Hover> {
        let name = self.symbol_name_at(uri, position)?;

        if let Ok(engine) = self.engine.lock() {
            if let Some(sym) = engine.lookup(&name) {
                let text = format!("{}: {}\n{}", sym.kind.label(), sym.name, sym.info);
                return Some(Hover {
                    contents: HoverContents::Scalar(MarkedString::String(text)),
                    range: None,
                });
            }
        }

        super::state::BUILTIN_FUNCTIONS
            .iter()
            .find(|(func, _)| *func == name)
            .map(|(func, desc)| Hover {
                contents: HoverContents::Scalar(MarkedString::String(format!("{}(…)\n{}", func, desc))),
                range: None,
            })
    }
}

/// Full diagnostics for a text snapshot: a parse-failure diagnostic when the
/// document does not parse, followed by the call-spacing lint findings.
pub fn diagnostics_for_text(content: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if let Err(err) = parse_program(content) {
        let range = err
            .span
            .map(crate::analyzer::span_to_range)
            .unwrap_or_else(|| Range::new(Position::new(0, 0), Position::new(0, 0)));
        diagnostics.push(Diagnostic::new(
            range,
            Some(DiagnosticSeverity::ERROR),
            Some(NumberOrString::String("fqs_parse_error".to_string())),
            Some(lint::SOURCE.to_string()),
            err.message,
            None,
            None,
        ));
    }
    diagnostics.extend(lint::scan_document(content));
    diagnostics
}
