//! Parse-stage errors.

use thiserror::Error;

use crate::lexer::{DirectiveError, LexError, TokenizeError};
use crate::token::Location;

/// Errors produced while turning source text into an [`crate::ast::Idl`].
/// Parsing stops at the first error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error("{location}: syntax error: {message}")]
    Syntax { message: String, location: Location },

    #[error("{file}: unexpected end of file, expected {expected}")]
    UnexpectedEof { file: String, expected: String },
}

impl From<TokenizeError> for ParseError {
    fn from(err: TokenizeError) -> Self {
        match err {
            TokenizeError::Lex(e) => ParseError::Lex(e),
            TokenizeError::Directive(e) => ParseError::Directive(e),
        }
    }
}
