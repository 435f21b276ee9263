mod error;
mod lexer;
#[cfg(test)]
mod token_test;

pub use error::{ParseError, Position, Span};
pub use lexer::{is_ident_continue, is_ident_start, Token, Tokenizer};
