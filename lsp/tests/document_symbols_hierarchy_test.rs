use fqs_core::parser::parse_program;
use fqs_lsp::server::document_symbol_tree;
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

fn get_symbol<'a>(symbols: &'a [DocumentSymbol], name: &str) -> Option<&'a DocumentSymbol> {
    symbols.iter().find(|s| s.name == name)
}

fn list_child_names(parent: &DocumentSymbol) -> Vec<String> {
    parent
        .children
        .as_ref()
        .map(|kids| kids.iter().map(|s| s.name.clone()).collect())
        .unwrap_or_default()
}

const CODE: &str = r#"include "indicators.fqs"

function band(price, n) {
    mid := MA( price, n )
    dev := STD( price, n )
    return mid + 2 * dev
}

upper := band( close, 20 )
"#;

#[test]
fn outline_contains_includes_functions_and_variables() {
    let program = parse_program(CODE).expect("sample parses");
    let symbols = document_symbol_tree(&program);

    let include = get_symbol(&symbols, "include \"indicators.fqs\"").expect("include node");
    assert_eq!(include.kind, SymbolKind::MODULE);

    let func = get_symbol(&symbols, "band").expect("function node");
    assert_eq!(func.kind, SymbolKind::FUNCTION);
    assert_eq!(func.detail.as_deref(), Some("Function(price, n)"));

    let var = get_symbol(&symbols, "upper").expect("variable node");
    assert_eq!(var.kind, SymbolKind::VARIABLE);
}

#[test]
fn function_children_are_parameters_then_locals() {
    let program = parse_program(CODE).expect("sample parses");
    let symbols = document_symbol_tree(&program);

    let func = get_symbol(&symbols, "band").unwrap();
    let kids = list_child_names(func);
    assert_eq!(kids, vec!["price", "n", "mid", "dev"]);

    let children = func.children.as_ref().unwrap();
    assert!(children.iter().all(|c| c.kind == SymbolKind::VARIABLE));
    assert_eq!(children[0].detail.as_deref(), Some("Parameter"));
    assert_eq!(children[2].detail.as_deref(), Some("Local"));
}

#[test]
fn selection_range_targets_the_name() {
    let program = parse_program(CODE).expect("sample parses");
    let symbols = document_symbol_tree(&program);

    let func = get_symbol(&symbols, "band").unwrap();
    // Full range spans the body; selection range is just the name
    assert_eq!(func.selection_range.start.line, 2);
    assert_eq!(func.selection_range.start.character, 9);
    assert_eq!(func.selection_range.end.character, 13);
    assert!(func.range.end.line > func.range.start.line);
}

#[test]
fn return_and_expression_statements_yield_no_nodes() {
    let program = parse_program("f( close, 2 )\n").expect("parses");
    assert!(document_symbol_tree(&program).is_empty());
}
