use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Url};
use tower_lsp::Client;

use crate::analyzer::AnalysisEngine;

/// In-memory snapshot of an open FQS document.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    /// Bumped on every change; a scheduled reindex aborts if it moved.
    pub(crate) debounce_seq: u64,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct FqsLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) engine: Arc<Mutex<AnalysisEngine>>,
    pub(crate) config: Arc<Mutex<super::config::ServerConfig>>,
}

/// Built-in indicator functions known to every FQS installation.
pub(crate) const BUILTIN_FUNCTIONS: &[(&str, &str)] = &[
    ("MA", "Simple moving average of a series over n bars"),
    ("EMA", "Exponential moving average of a series over n bars"),
    ("SMA", "Smoothed moving average with weight m/n"),
    ("REF", "Value of a series n bars ago"),
    ("HHV", "Highest value of a series over the last n bars"),
    ("LLV", "Lowest value of a series over the last n bars"),
    ("SUM", "Sum of a series over the last n bars"),
    ("COUNT", "Number of bars satisfying a condition over the last n bars"),
    ("STD", "Standard deviation of a series over n bars"),
    ("ABS", "Absolute value"),
    ("MAX", "Larger of two values"),
    ("MIN", "Smaller of two values"),
    ("CROSS", "True on the bar where series a crosses above series b"),
    ("BARSLAST", "Bars since the condition last held"),
];

impl FqsLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            engine: Arc::new(Mutex::new(AnalysisEngine::new())),
            config: Arc::new(Mutex::new(super::config::ServerConfig::default())),
        }
    }

    /// Static completions: keywords and built-in indicator functions.
    pub(crate) fn get_static_completions(&self) -> Vec<CompletionItem> {
        let mut items = Vec::new();

        for keyword in ["function", "include", "return"] {
            items.push(CompletionItem {
                label: keyword.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                detail: Some("FQS keyword".to_string()),
                ..Default::default()
            });
        }

        for (func, desc) in BUILTIN_FUNCTIONS {
            items.push(CompletionItem {
                label: func.to_string(),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(desc.to_string()),
                ..Default::default()
            });
        }

        items
    }
}
