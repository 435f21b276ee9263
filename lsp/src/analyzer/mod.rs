use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::{CompletionItemKind, Location, SymbolKind as LspSymbolKind, Url};
use tracing::{debug, warn};

use fqs_core::ast::Program;
use fqs_core::parser::parse_program;

mod fallback;
mod indexer;
pub mod lint;
pub mod quickfix;
mod words;


pub use indexer::span_to_range;
pub use words::word_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
}

impl SymbolKind {
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Function => "Function",
            SymbolKind::Variable => "Variable",
        }
    }

    pub fn to_lsp(self) -> LspSymbolKind {
        match self {
            SymbolKind::Function => LspSymbolKind::FUNCTION,
            SymbolKind::Variable => LspSymbolKind::VARIABLE,
        }
    }

    pub fn to_completion(self) -> CompletionItemKind {
        match self {
            SymbolKind::Function => CompletionItemKind::FUNCTION,
            SymbolKind::Variable => CompletionItemKind::VARIABLE,
        }
    }
}

/// A named, located entity discoverable for navigation and completion.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub location: Location,
    /// Human-readable provenance ("declared in …", "referenced in …").
    pub info: String,
}

/// Last parse result for a document. A failed parse keeps the marker so
/// queries degrade instead of recomputing.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Ast(Arc<Program>),
    Failed,
}

impl ParseOutcome {
    pub fn ast(&self) -> Option<&Arc<Program>> {
        match self {
            ParseOutcome::Ast(program) => Some(program),
            ParseOutcome::Failed => None,
        }
    }
}

/// Owns the global symbol table and the per-document AST cache. One instance
/// per server process; all mutation goes through `&mut self`, so writers are
/// serialized by the surrounding lock and readers never observe a
/// half-merged table.
#[derive(Default)]
pub struct AnalysisEngine {
    symbols: FxHashMap<String, Symbol>,
    ast_cache: HashMap<Url, ParseOutcome>,
    pub follow_includes: bool,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            symbols: FxHashMap::default(),
            ast_cache: HashMap::new(),
            follow_includes: true,
        }
    }

    /// Cached AST for `uri`, reparsing when forced or absent. On a failed
    /// reparse the previous entry (possibly stale) keeps serving queries;
    /// only a document with no successful parse at all yields the failure
    /// marker.
    pub fn get_or_compute(&mut self, uri: &Url, text: &str, force_refresh: bool) -> ParseOutcome {
        if !force_refresh {
            if let Some(entry) = self.ast_cache.get(uri) {
                return entry.clone();
            }
        }
        match parse_program(text) {
            Ok(program) => {
                let outcome = ParseOutcome::Ast(Arc::new(program));
                self.ast_cache.insert(uri.clone(), outcome.clone());
                outcome
            }
            Err(err) => {
                debug!("parse failed for {}: {}", uri, err);
                match self.ast_cache.get(uri) {
                    Some(previous @ ParseOutcome::Ast(_)) => previous.clone(),
                    _ => {
                        self.ast_cache.insert(uri.clone(), ParseOutcome::Failed);
                        ParseOutcome::Failed
                    }
                }
            }
        }
    }

    /// Drop the cached AST for a closed document. Symbol-table entries are
    /// left alone unless `prune_symbols` is set (workspace-wide index
    /// behavior by default).
    pub fn invalidate(&mut self, uri: &Url, prune_symbols: bool) {
        self.ast_cache.remove(uri);
        if prune_symbols {
            self.symbols.retain(|_, sym| sym.location.uri != *uri);
        }
    }

    /// Reparse and reindex one document. The AST indexer runs when a parse
    /// (current or stale) is available; otherwise the textual fallback
    /// indexer takes over so broken documents still contribute symbols.
    pub fn reindex_document(&mut self, uri: &Url, text: &str) {
        let outcome = self.get_or_compute(uri, text, true);
        let produced = match outcome.ast() {
            Some(program) => indexer::index_program(program, uri),
            None => {
                warn!("no AST for {}, using textual fallback indexer", uri);
                let base_dir = uri.to_file_path().ok().and_then(|p| p.parent().map(PathBuf::from));
                fallback::index_textual(uri, text, base_dir.as_deref(), self.follow_includes)
            }
        };
        self.merge_symbols(produced);
    }

    /// Merge a completed pass into the table. Last writer wins per name,
    /// both within the pass and across passes.
    pub fn merge_symbols(&mut self, produced: Vec<Symbol>) {
        for sym in produced {
            self.symbols.insert(sym.name.clone(), sym);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// All known symbols, sorted by name for stable completion output.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        let mut out: Vec<&Symbol> = self.symbols.values().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
