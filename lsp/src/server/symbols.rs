use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use crate::analyzer::span_to_range;
use fqs_core::ast::{Program, Stmt};

/// Build the outline tree for one document. This re-parses independently of
/// the shared symbol table so the outline always reflects the document's own
/// structure: includes as module nodes, functions with parameter and local
/// children, top-level assignments as variables.
pub fn document_symbol_tree(program: &Program) -> Vec<DocumentSymbol> {
    program.statements.iter().filter_map(statement_symbol).collect()
}

fn statement_symbol(stmt: &Stmt) -> Option<DocumentSymbol> {
    match stmt {
        Stmt::Include { path, span, .. } => Some(leaf(
            format!("include \"{}\"", path),
            Some("Include directive".to_string()),
            SymbolKind::MODULE,
            span_to_range(*span),
            span_to_range(*span),
        )),
        Stmt::Function {
            name,
            name_span,
            params,
            body,
            span,
        } => {
            let mut children: Vec<DocumentSymbol> = Vec::new();
            for param in params {
                children.push(leaf(
                    param.name.clone(),
                    Some("Parameter".to_string()),
                    SymbolKind::VARIABLE,
                    span_to_range(param.span),
                    span_to_range(param.span),
                ));
            }
            for inner in body {
                if let Stmt::Assign { name, name_span, .. } = inner {
                    children.push(leaf(
                        name.clone(),
                        Some("Local".to_string()),
                        SymbolKind::VARIABLE,
                        span_to_range(*name_span),
                        span_to_range(*name_span),
                    ));
                }
            }
            let detail = if params.is_empty() {
                "Function".to_string()
            } else {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                format!("Function({})", names.join(", "))
            };
            let mut sym = leaf(
                name.clone(),
                Some(detail),
                SymbolKind::FUNCTION,
                span_to_range(*span),
                span_to_range(*name_span),
            );
            if !children.is_empty() {
                sym.children = Some(children);
            }
            Some(sym)
        }
        Stmt::Assign { name, name_span, span, .. } => Some(leaf(
            name.clone(),
            Some("Variable declaration".to_string()),
            SymbolKind::VARIABLE,
            span_to_range(*span),
            span_to_range(*name_span),
        )),
        Stmt::Return { .. } | Stmt::Expr { .. } => None,
    }
}

fn leaf(
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    range: tower_lsp::lsp_types::Range,
    selection_range: tower_lsp::lsp_types::Range,
) -> DocumentSymbol {
    DocumentSymbol {
        name,
        detail,
        kind,
        tags: None,
        #[allow(deprecated)]
        deprecated: None,
        range,
        selection_range,
        children: None,
    }
}
