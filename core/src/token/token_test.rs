use crate::token::{Position, Span, Token, Tokenizer};

#[test]
fn basic_tokens() {
    let tokens = Tokenizer::tokenize(r#"fast := EMA( close, 12 ) // comment"#).unwrap();
    let expected = vec![
        Token::Id("fast".to_string()),
        Token::Assign,
        Token::Id("EMA".to_string()),
        Token::LParen,
        Token::Id("close".to_string()),
        Token::Comma,
        Token::Num(12.0),
        Token::RParen,
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn keywords_and_operators() {
    let tokens = Tokenizer::tokenize("function include return == != >= <= && || ! % ;").unwrap();
    let expected = vec![
        Token::Function,
        Token::Include,
        Token::Return,
        Token::Eq,
        Token::Ne,
        Token::Ge,
        Token::Le,
        Token::And,
        Token::Or,
        Token::Not,
        Token::Mod,
        Token::Semicolon,
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn string_escapes() {
    let tokens = Tokenizer::tokenize(r#""a\"b\\c""#).unwrap();
    assert_eq!(tokens, vec![Token::Str("a\"b\\c".to_string())]);
}

#[test]
fn spans_are_one_based_lines_zero_based_columns() {
    let (tokens, spans) = Tokenizer::tokenize_with_spans("x := 1\ny := 2").unwrap();
    assert_eq!(tokens.len(), 6);
    // 'x' on line 1, column 0
    assert_eq!(spans[0], Span::new(Position::new(1, 0, 0), Position::new(1, 1, 1)));
    // 'y' on line 2, column 0
    assert_eq!(spans[3].start, Position::new(2, 0, 7));
    assert_eq!(spans[3].end.column, 1);
}

#[test]
fn block_comments_may_span_lines() {
    let tokens = Tokenizer::tokenize("a /* one\ntwo */ b").unwrap();
    assert_eq!(tokens, vec![Token::Id("a".to_string()), Token::Id("b".to_string())]);
}

#[test]
fn unterminated_string_is_an_error() {
    let err = Tokenizer::tokenize(r#"x := "oops"#).unwrap_err();
    assert!(err.message.contains("Unterminated string"));
    let span = err.span.expect("expected span");
    assert_eq!(span.start.line, 1);
    assert_eq!(span.start.column, 5);
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let err = Tokenizer::tokenize("x /* no end").unwrap_err();
    assert!(err.message.contains("Unterminated block comment"));
}

#[test]
fn lone_equals_is_rejected() {
    let err = Tokenizer::tokenize("x = 1").unwrap_err();
    assert!(err.message.contains(":="));
}

#[test]
fn number_then_call_dot() {
    let tokens = Tokenizer::tokenize("0.5 3").unwrap();
    assert_eq!(tokens, vec![Token::Num(0.5), Token::Num(3.0)]);
}
