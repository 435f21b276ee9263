use fqs_lsp::analyzer::{lint, quickfix, word_at, AnalysisEngine, SymbolKind};
use ropey::Rope;
use tower_lsp::lsp_types::Url;

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///tmp/{name}")).unwrap()
}

#[test]
fn definitions_resolve_across_documents() {
    let mut engine = AnalysisEngine::new();
    let lib = uri("lib.fqs");
    let strategy = uri("strategy.fqs");

    engine.reindex_document(&lib, "function band(price, n) {\n    return MA( price, n )\n}\n");
    engine.reindex_document(&strategy, "upper := band( close, 20 )\n");

    // The lib's function is findable while editing the strategy
    let sym = engine.lookup("band").expect("band indexed");
    assert_eq!(sym.kind, SymbolKind::Function);
    assert_eq!(sym.location.uri, lib);
    assert_eq!(sym.location.range.start.line, 0);
    assert_eq!(sym.location.range.start.character, 9);
}

#[test]
fn later_definition_wins_across_documents() {
    let mut engine = AnalysisEngine::new();
    let a = uri("a.fqs");
    let b = uri("b.fqs");

    engine.reindex_document(&a, "threshold := 10\n");
    engine.reindex_document(&b, "threshold := 20\n");
    assert_eq!(engine.lookup("threshold").unwrap().location.uri, b);

    // Re-editing the first document takes the name back
    engine.reindex_document(&a, "threshold := 30\n");
    assert_eq!(engine.lookup("threshold").unwrap().location.uri, a);
}

#[test]
fn cursor_to_definition_round_trip() {
    let mut engine = AnalysisEngine::new();
    let doc = uri("doc.fqs");
    let text = "function avg(a, b) {\n    return ( a + b ) / 2\n}\nx := avg( 1, 2 )\n";
    engine.reindex_document(&doc, text);

    // Cursor inside "avg" on the call line
    let line = text.lines().nth(3).unwrap();
    let name = word_at(line, 6).expect("word under cursor");
    assert_eq!(name, "avg");

    let sym = engine.lookup(&name).expect("definition found");
    assert_eq!(sym.location.range.start.line, 0);
}

#[test]
fn quickfix_edit_applied_to_rope_clears_the_finding() {
    let original = "signal := CROSS( fast, slow)\n";
    let diags = lint::scan_document(original);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, lint::MSG_SPACE_BEFORE_CLOSE);

    let mut content = Rope::from_str(original);
    let edit = quickfix::fix_for(&diags[0], &content).expect("fixable diagnostic");

    let line_start = content.line_to_char(edit.range.start.line as usize);
    let start = line_start + edit.range.start.character as usize;
    let end = line_start + edit.range.end.character as usize;
    content.remove(start..end);
    content.insert(start, &edit.new_text);

    let fixed = content.to_string();
    assert_eq!(fixed, "signal := CROSS( fast, slow )\n");
    assert!(lint::scan_document(&fixed).is_empty());
}

#[test]
fn symbol_listing_is_sorted_for_completion() {
    let mut engine = AnalysisEngine::new();
    let doc = uri("doc.fqs");
    engine.reindex_document(&doc, "zeta := 1\nalpha := 2\nmid := 3\n");

    let names: Vec<&str> = engine.all_symbols().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}
