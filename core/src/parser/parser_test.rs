use crate::ast::{BinOp, Expr, Stmt};
use crate::parser::parse_program;

#[test]
fn parses_include_function_and_assignment() {
    let src = r#"
        include "common.fqs"
        function sma_cross(fast, slow) {
            signal := CROSS( fast, slow )
            return signal
        }
        trend := sma_cross( MA( close, 5 ), MA( close, 20 ) )
    "#;
    let program = parse_program(src).unwrap();
    assert_eq!(program.statements.len(), 3);

    match &program.statements[0] {
        Stmt::Include { path, .. } => assert_eq!(path, "common.fqs"),
        other => panic!("expected include, got {:?}", other),
    }
    match &program.statements[1] {
        Stmt::Function { name, params, body, .. } => {
            assert_eq!(name, "sma_cross");
            assert_eq!(params.len(), 2);
            assert_eq!(params[0].name, "fast");
            assert_eq!(body.len(), 2);
            assert!(matches!(body[1], Stmt::Return { value: Some(_), .. }));
        }
        other => panic!("expected function, got {:?}", other),
    }
    match &program.statements[2] {
        Stmt::Assign { name, value, .. } => {
            assert_eq!(name, "trend");
            match value {
                Expr::Call { callee, args, .. } => {
                    assert_eq!(callee, "sma_cross");
                    assert_eq!(args.len(), 2);
                }
                other => panic!("expected call, got {:?}", other),
            }
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn binary_precedence() {
    let program = parse_program("x := a + b * c > d && e").unwrap();
    let Stmt::Assign { value, .. } = &program.statements[0] else {
        panic!("expected assignment");
    };
    // (((a + (b * c)) > d) && e)
    let Expr::Binary { op: BinOp::And, lhs, .. } = value else {
        panic!("expected '&&' at the root, got {:?}", value);
    };
    let Expr::Binary { op: BinOp::Gt, lhs, .. } = lhs.as_ref() else {
        panic!("expected '>' under '&&'");
    };
    let Expr::Binary { op: BinOp::Add, rhs, .. } = lhs.as_ref() else {
        panic!("expected '+' under '>'");
    };
    assert!(matches!(rhs.as_ref(), Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn name_span_points_at_identifier() {
    let program = parse_program("function f(x) { return x }").unwrap();
    let Stmt::Function { name_span, .. } = &program.statements[0] else {
        panic!("expected function");
    };
    assert_eq!(name_span.start.line, 1);
    assert_eq!(name_span.start.column, 9);
    assert_eq!(name_span.end.column, 10);
}

#[test]
fn statement_error_carries_span() {
    let err = parse_program("function { }").unwrap_err();
    assert!(err.message.contains("Expected function name"));
    let span = err.span.expect("span expected");
    assert_eq!(span.start.line, 1);
    assert_eq!(span.start.column, 9);
}

#[test]
fn failure_is_all_or_nothing() {
    // Only the second statement is malformed, but the whole parse fails
    assert!(parse_program("a := 1\nb := := 2").is_err());
}

#[test]
fn zero_argument_call() {
    let program = parse_program("t := BARSLAST()").unwrap();
    let Stmt::Assign { value, .. } = &program.statements[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(value, Expr::Call { args, .. } if args.is_empty()));
}

#[test]
fn semicolons_are_optional_separators() {
    let program = parse_program("a := 1; b := 2;; c := 3").unwrap();
    assert_eq!(program.statements.len(), 3);
}
