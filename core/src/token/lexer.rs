use crate::token::{ParseError, Position, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semicolon, // ;
    Assign,    // :=
    Eq,        // ==
    Ne,        // !=
    Gt,        // >
    Lt,        // <
    Ge,        // >=
    Le,        // <=
    And,       // &&
    Or,        // ||
    Not,       // !
    Add,       // +
    Sub,       // -
    Mul,       // *
    Div,       // /
    Mod,       // %
    // Keywords
    Function, // function
    Include,  // include
    Return,   // return
    // Literals
    Num(f64),    // 12, 0.5
    Str(String), // "close.csv"
    Id(String),  // identifier
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    pos: Position,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            pos: Position::start(),
        }
    }

    /// Tokenize `input` into parallel token and span vectors.
    pub fn tokenize_with_spans(input: &str) -> Result<(Vec<Token>, Vec<Span>), ParseError> {
        let mut lexer = Tokenizer::new(input);
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        while let Some((token, span)) = lexer.next_token()? {
            tokens.push(token);
            spans.push(span);
        }
        Ok((tokens, spans))
    }

    #[cfg(test)]
    pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
        Self::tokenize_with_spans(input).map(|(tokens, _)| tokens)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos.offset += 1;
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 0;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some('/') => {
                            while let Some(&c) = self.chars.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            let open = self.pos;
                            self.bump();
                            self.bump();
                            let mut closed = false;
                            while let Some(c) = self.bump() {
                                if c == '*' && self.eat('/') {
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(ParseError::with_position("Unterminated block comment", open));
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, Span)>, ParseError> {
        self.skip_trivia()?;
        let start = self.pos;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '+' => Token::Add,
            '-' => Token::Sub,
            '*' => Token::Mul,
            '/' => Token::Div,
            '%' => Token::Mod,
            ':' => {
                if self.eat('=') {
                    Token::Assign
                } else {
                    return Err(ParseError::with_position("Expected '=' after ':'", start));
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::Eq
                } else {
                    return Err(ParseError::with_position("Expected '==' (assignment uses ':=')", start));
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Not
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '&' => {
                if self.eat('&') {
                    Token::And
                } else {
                    return Err(ParseError::with_position("Expected '&&'", start));
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::Or
                } else {
                    return Err(ParseError::with_position("Expected '||'", start));
                }
            }
            '"' => self.string_literal(start)?,
            c if c.is_ascii_digit() => self.number_literal(c, start)?,
            c if is_ident_start(c) => self.identifier(c),
            other => {
                return Err(ParseError::with_position(
                    format!("Unexpected character '{}'", other),
                    start,
                ));
            }
        };

        Ok(Some((token, Span::new(start, self.pos))))
    }

    fn string_literal(&mut self, open: Position) -> Result<Token, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => {
                        // Unknown escapes pass through verbatim
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err(ParseError::with_position("Unterminated string literal", open)),
                },
                Some('\n') | None => return Err(ParseError::with_position("Unterminated string literal", open)),
                Some(c) => value.push(c),
            }
        }
    }

    fn number_literal(&mut self, first: char, start: Position) -> Result<Token, ParseError> {
        let mut text = String::new();
        text.push(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if self.chars.peek() == Some(&'.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                text.push('.');
                self.bump();
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }
        text.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| ParseError::with_position(format!("Invalid number literal '{}'", text), start))
    }

    fn identifier(&mut self, first: char) -> Token {
        let mut name = String::new();
        name.push(first);
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match name.as_str() {
            "function" => Token::Function,
            "include" => Token::Include,
            "return" => Token::Return,
            _ => Token::Id(name),
        }
    }
}
