use crate::ast::{BinOp, Expr, Param, Program, Stmt, UnaryOp};
use crate::token::{ParseError, Span, Token, Tokenizer};

#[cfg(test)]
mod parser_test;

/// Parse a whole formula document. All-or-nothing: the first tokenization or
/// syntax error fails the document, no recovery is attempted.
pub fn parse_program(input: &str) -> Result<Program, ParseError> {
    let (tokens, spans) = Tokenizer::tokenize_with_spans(input)?;
    Parser::new(&tokens, &spans).parse_program()
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    spans: &'a [Span],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], spans: &'a [Span]) -> Self {
        Self { tokens, spans, pos: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.statement()?);
            // Statement terminators are optional
            while self.eat(&Token::Semicolon) {}
        }
        Ok(Program { statements })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn span(&self) -> Span {
        self.spans
            .get(self.pos.min(self.spans.len().saturating_sub(1)))
            .copied()
            .unwrap_or_else(|| Span::single(crate::token::Position::start()))
    }

    fn prev_span(&self) -> Span {
        self.spans
            .get(self.pos.saturating_sub(1))
            .copied()
            .unwrap_or_else(|| Span::single(crate::token::Position::start()))
    }

    fn bump(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<Span, ParseError> {
        if self.peek() == Some(expected) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error_here(format!("Expected {}", what)))
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        match self.spans.get(self.pos).or_else(|| self.spans.last()) {
            Some(span) => ParseError::with_span(message, *span),
            None => ParseError::new(message),
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Token::Include) => self.include_stmt(),
            Some(Token::Function) => self.function_stmt(),
            Some(Token::Return) => self.return_stmt(),
            Some(Token::Id(_)) if self.peek_at(1) == Some(&Token::Assign) => self.assign_stmt(),
            Some(_) => {
                let expr = self.expression()?;
                let span = expr.span();
                Ok(Stmt::Expr { expr, span })
            }
            None => Err(self.error_here("Expected statement".to_string())),
        }
    }

    fn include_stmt(&mut self) -> Result<Stmt, ParseError> {
        let kw_span = self.span();
        self.pos += 1;
        match self.bump().cloned() {
            Some(Token::Str(path)) => {
                let path_span = self.prev_span();
                Ok(Stmt::Include {
                    path,
                    path_span,
                    span: kw_span.merge(path_span),
                })
            }
            _ => Err(self.error_here("Expected string path after 'include'".to_string())),
        }
    }

    fn function_stmt(&mut self) -> Result<Stmt, ParseError> {
        let kw_span = self.span();
        self.pos += 1;
        let (name, name_span) = match self.bump().cloned() {
            Some(Token::Id(name)) => (name, self.prev_span()),
            _ => return Err(self.error_here("Expected function name".to_string())),
        };
        self.expect(&Token::LParen, "'(' after function name")?;
        let mut params = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                match self.bump().cloned() {
                    Some(Token::Id(pname)) => params.push(Param {
                        name: pname,
                        span: self.prev_span(),
                    }),
                    _ => return Err(self.error_here("Expected parameter name".to_string())),
                }
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')' after parameters")?;
        self.expect(&Token::LBrace, "'{' to open function body")?;
        let mut body = Vec::new();
        while self.peek().is_some() && self.peek() != Some(&Token::RBrace) {
            body.push(self.statement()?);
            while self.eat(&Token::Semicolon) {}
        }
        let close_span = self.expect(&Token::RBrace, "'}' to close function body")?;
        Ok(Stmt::Function {
            name,
            name_span,
            params,
            body,
            span: kw_span.merge(close_span),
        })
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let kw_span = self.span();
        self.pos += 1;
        // A bare 'return' before '}' or ';' carries no value
        let value = match self.peek() {
            None | Some(Token::RBrace) | Some(Token::Semicolon) => None,
            _ => Some(self.expression()?),
        };
        let span = match &value {
            Some(expr) => kw_span.merge(expr.span()),
            None => kw_span,
        };
        Ok(Stmt::Return { value, span })
    }

    fn assign_stmt(&mut self) -> Result<Stmt, ParseError> {
        let (name, name_span) = match self.bump().cloned() {
            Some(Token::Id(name)) => (name, self.prev_span()),
            _ => return Err(self.error_here("Expected assignment target".to_string())),
        };
        self.expect(&Token::Assign, "':='")?;
        let value = self.expression()?;
        let span = name_span.merge(value.span());
        Ok(Stmt::Assign {
            name,
            name_span,
            value,
            span,
        })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::Or) {
            let rhs = self.and_expr()?;
            lhs = Self::binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::And) {
            let rhs = self.comparison()?;
            lhs = Self::binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Ge) => BinOp::Ge,
                Some(Token::Le) => BinOp::Le,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = Self::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Add) => BinOp::Add,
                Some(Token::Sub) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Self::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Mul) => BinOp::Mul,
                Some(Token::Div) => BinOp::Div,
                Some(Token::Mod) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Self::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Sub) => Some(UnaryOp::Neg),
            Some(Token::Not) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_span = self.span();
            self.pos += 1;
            let operand = self.unary()?;
            let span = op_span.merge(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().cloned() {
            Some(Token::Num(value)) => {
                let span = self.span();
                self.pos += 1;
                Ok(Expr::Num { value, span })
            }
            Some(Token::Str(value)) => {
                let span = self.span();
                self.pos += 1;
                Ok(Expr::Str { value, span })
            }
            Some(Token::Id(name)) => {
                let ident_span = self.span();
                self.pos += 1;
                if self.eat(&Token::LParen) {
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.eat(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    let close_span = self.expect(&Token::RParen, "')' to close argument list")?;
                    Ok(Expr::Call {
                        callee: name,
                        callee_span: ident_span,
                        args,
                        span: ident_span.merge(close_span),
                    })
                } else {
                    Ok(Expr::Ident {
                        name,
                        span: ident_span,
                    })
                }
            }
            Some(Token::LParen) => {
                let open_span = self.span();
                self.pos += 1;
                let inner = self.expression()?;
                let close_span = self.expect(&Token::RParen, "')' to close group")?;
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    span: open_span.merge(close_span),
                })
            }
            Some(other) => Err(self.error_here(format!("Unexpected token {:?} in expression", other))),
            None => Err(self.error_here("Unexpected end of input in expression".to_string())),
        }
    }

    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span().merge(rhs.span());
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    }
}
