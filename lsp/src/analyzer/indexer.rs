use tower_lsp::lsp_types::{Location, Position, Range, Url};

use fqs_core::ast::{Expr, Program, Stmt};
use fqs_core::token::Span;

use super::{Symbol, SymbolKind};

/// Convert a core span (1-based line, 0-based column) to an LSP range.
pub fn span_to_range(span: Span) -> Range {
    Range::new(
        Position::new(span.start.line.saturating_sub(1), span.start.column),
        Position::new(span.end.line.saturating_sub(1), span.end.column),
    )
}

/// Walk an AST and emit the document's symbols in source order.
///
/// Declarations and references all land in one flat sequence: function
/// parameters and body locals are not scoped to their function, and a bare
/// identifier anywhere yields a "referenced" variable record. The caller's
/// table applies last-writer-wins per name.
pub(crate) fn index_program(program: &Program, uri: &Url) -> Vec<Symbol> {
    let mut out = Vec::new();
    let file = display_name(uri);
    for stmt in &program.statements {
        index_stmt(stmt, uri, &file, &mut out);
    }
    out
}

fn display_name(uri: &Url) -> String {
    uri.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uri.to_string())
}

fn symbol_at(name: &str, kind: SymbolKind, span: Span, uri: &Url, info: String) -> Symbol {
    Symbol {
        name: name.to_string(),
        kind,
        location: Location::new(uri.clone(), span_to_range(span)),
        info,
    }
}

fn index_stmt(stmt: &Stmt, uri: &Url, file: &str, out: &mut Vec<Symbol>) {
    match stmt {
        Stmt::Function {
            name,
            name_span,
            params,
            body,
            ..
        } => {
            out.push(symbol_at(
                name,
                SymbolKind::Function,
                *name_span,
                uri,
                format!("function declared in {}", file),
            ));
            for param in params {
                out.push(symbol_at(
                    &param.name,
                    SymbolKind::Variable,
                    param.span,
                    uri,
                    format!("parameter of {} in {}", name, file),
                ));
            }
            for inner in body {
                index_stmt(inner, uri, file, out);
            }
        }
        Stmt::Assign {
            name, name_span, value, ..
        } => {
            out.push(symbol_at(
                name,
                SymbolKind::Variable,
                *name_span,
                uri,
                format!("declared in {}", file),
            ));
            index_expr(value, uri, file, out);
        }
        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                index_expr(expr, uri, file, out);
            }
        }
        Stmt::Expr { expr, .. } => index_expr(expr, uri, file, out),
        // Include targets belong to the textual fallback indexer; the AST
        // pass records nothing for them.
        Stmt::Include { .. } => {}
    }
}

fn index_expr(expr: &Expr, uri: &Url, file: &str, out: &mut Vec<Symbol>) {
    match expr {
        Expr::Ident { name, span } => {
            out.push(symbol_at(
                name,
                SymbolKind::Variable,
                *span,
                uri,
                format!("referenced in {}", file),
            ));
        }
        Expr::Call { args, .. } => {
            for arg in args {
                index_expr(arg, uri, file, out);
            }
        }
        Expr::Unary { operand, .. } => index_expr(operand, uri, file, out),
        Expr::Binary { lhs, rhs, .. } => {
            index_expr(lhs, uri, file, out);
            index_expr(rhs, uri, file, out);
        }
        Expr::Paren { inner, .. } => index_expr(inner, uri, file, out),
        Expr::Num { .. } | Expr::Str { .. } => {}
    }
}
