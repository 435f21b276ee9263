use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::info;

use crate::analyzer::quickfix;
use fqs_core::parser::parse_program;

use super::{
    state::{Document, FqsLanguageServer},
    symbols::document_symbol_tree,
    text::apply_incremental_change_rope,
};

#[tower_lsp::async_trait]
impl LanguageServer for FqsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("FQS Language Server initializing with root: {:?}", params.root_uri);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: None,
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some("fqs".to_string()),
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                    work_done_progress_options: Default::default(),
                })),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "FQS Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("FQS Language Server initialized");
        self.client
            .log_message(MessageType::INFO, "FQS Language Server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("FQS Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version,
            debounce_seq: 0,
        };
        self.documents.insert(uri.clone(), document);

        // Opens index immediately; only changes are debounced
        self.schedule_reindex(uri, version, 0).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = version;
            for change in &params.content_changes {
                apply_incremental_change_rope(&mut entry.content, change);
            }
            entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
        }

        let delay = self.config.lock().unwrap().debounce_ms;
        self.schedule_reindex(uri, version, delay).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);

        let prune = self.config.lock().unwrap().prune_symbols_on_close;
        if let Ok(mut engine) = self.engine.lock() {
            engine.invalidate(&uri, prune);
        }
        // Clear any published diagnostics for the closed document
        self.client
            .send_notification::<notification::PublishDiagnostics>(PublishDiagnosticsParams {
                uri,
                version: None,
                diagnostics: Vec::new(),
            })
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self.resolve_hover(uri, position))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .resolve_definition(uri, position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let _uri = &params.text_document_position.text_document.uri;
        let mut items = self.get_static_completions();

        // The whole global table contributes, not just the current document
        if let Ok(engine) = self.engine.lock() {
            for sym in engine.all_symbols() {
                items.push(CompletionItem {
                    label: sym.name.clone(),
                    kind: Some(sym.kind.to_completion()),
                    detail: Some(sym.info.clone()),
                    ..Default::default()
                });
            }
        }

        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn diagnostic(&self, params: DocumentDiagnosticParams) -> Result<DocumentDiagnosticReportResult> {
        let uri = &params.text_document.uri;
        let diagnostics = self.compute_diagnostics(uri);

        Ok(DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
            RelatedFullDocumentDiagnosticReport {
                related_documents: None,
                full_document_diagnostic_report: FullDocumentDiagnosticReport {
                    result_id: None,
                    items: diagnostics,
                },
            },
        )))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        let content = match self.documents.get(uri) {
            Some(doc) => doc.content.to_string(),
            None => return Ok(None),
        };
        // Independent re-parse; the shared symbol table is not consulted
        match parse_program(&content) {
            Ok(program) => {
                let tree = document_symbol_tree(&program);
                if tree.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(DocumentSymbolResponse::Nested(tree)))
                }
            }
            Err(_) => Ok(None),
        }
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        let content = match self.documents.get(uri) {
            Some(doc) => doc.content.clone(),
            None => return Ok(None),
        };

        let mut actions: Vec<CodeActionOrCommand> = Vec::new();
        for diag in &params.context.diagnostics {
            let Some(edit) = quickfix::fix_for(diag, &content) else {
                continue;
            };
            let we = WorkspaceEdit {
                changes: Some(std::collections::HashMap::from([(uri.clone(), vec![edit])])),
                ..Default::default()
            };
            actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                title: "Insert space before ')'".to_string(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diag.clone()]),
                edit: Some(we),
                command: None,
                is_preferred: Some(true),
                disabled: None,
                data: None,
            }));
        }

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }
}
