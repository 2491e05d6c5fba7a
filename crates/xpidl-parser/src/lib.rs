//! XPIDL Lexer and Parser
//!
//! Turns cross-platform IDL source text into an unresolved syntax tree.
//! Name resolution, type checking and constant evaluation live in the
//! `xpidl-resolver` crate.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Idl;
pub use error::ParseError;
pub use lexer::{DirectiveError, Lexer, LexError, TokenizeError};
pub use parser::{parse, Parser};
pub use token::{Location, Span, Tok, Token};
