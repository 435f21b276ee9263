use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;

use super::state::FqsLanguageServer;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    /// Quiet window before a change triggers a reindex.
    pub(crate) debounce_ms: u64,
    /// Drop a closed document's symbols from the global table.
    /// Off by default: the table deliberately behaves as a workspace-wide
    /// index that outlives individual editors.
    pub(crate) prune_symbols_on_close: bool,
    /// Let the textual fallback indexer follow `include` directives.
    pub(crate) follow_includes: bool,
    pub(crate) max_diagnostics: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            prune_symbols_on_close: false,
            follow_includes: true,
            max_diagnostics: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FqsLspConfigSection {
    #[serde(default)]
    analysis: AnalysisConfig,
    #[serde(default)]
    index: IndexConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnalysisConfig {
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    max_diagnostics: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct IndexConfig {
    #[serde(default)]
    prune_symbols_on_close: Option<bool>,
    #[serde(default)]
    follow_includes: Option<bool>,
}

impl FqsLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some("fqs.lsp".to_string()),
        }];

        if let Ok(values) = self.client.configuration(items).await {
            if let Some(val) = values.into_iter().next() {
                if let Ok(cfg) = serde_json::from_value::<FqsLspConfigSection>(val) {
                    let mut guard = self.config.lock().unwrap();
                    if let Some(v) = cfg.analysis.debounce_ms {
                        guard.debounce_ms = v;
                    }
                    if let Some(v) = cfg.analysis.max_diagnostics.filter(|v| *v > 0) {
                        guard.max_diagnostics = v;
                    }
                    if let Some(v) = cfg.index.prune_symbols_on_close {
                        guard.prune_symbols_on_close = v;
                    }
                    if let Some(v) = cfg.index.follow_includes {
                        guard.follow_includes = v;
                    }
                }
            }
        }
    }
}
