//! Token and source-location types for the XPIDL lexer.

use std::fmt;

/// A source span with byte offsets and 1-based line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Span {
            start,
            end,
            line,
            column,
        }
    }
}

/// A span qualified with the file it came from. Errors and declarations
/// carry these so diagnostics can point across `#include` boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub span: Span,
}

impl Location {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Location {
            file: file.into(),
            span,
        }
    }

    /// The location used for registry builtins, which have no source.
    pub fn builtin() -> Self {
        Location {
            file: "<builtin type>".into(),
            span: Span::new(0, 0, 0, 0),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.file == "<builtin type>"
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_builtin() {
            write!(f, "<builtin type>")
        } else {
            write!(f, "{} line {}:{}", self.file, self.span.line, self.span.column)
        }
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identifier, including the merged multi-word integer names
    /// (`unsigned long long` is one token).
    Identifier(String),
    /// Decimal integer literal (digits only).
    Number(String),
    /// Hex integer literal including the `0x` prefix.
    HexNum(String),
    /// A bare UUID literal (`01234567-89ab-cdef-0123-456789abcdef`).
    Iid(String),
    /// Raw `%{C++ ... %}` passthrough block contents.
    Cdata(String),
    /// The filename of an `#include "..."` directive.
    Include(String),
    /// Raw native type text captured between the parens of a `native`
    /// declaration.
    NativeId(String),

    // Keywords
    Const,
    Interface,
    In,
    InOut,
    Out,
    Attribute,
    Raises,
    ReadOnly,
    Native,
    Typedef,
    Webidl,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Less,
    Greater,
    Comma,
    Semi,
    Colon,
    Equals,
    Pipe,
    Plus,
    Minus,
    Star,
    Shl,
    Shr,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) => write!(f, "'{s}'"),
            Token::Number(s) => write!(f, "'{s}'"),
            Token::HexNum(s) => write!(f, "'{s}'"),
            Token::Iid(s) => write!(f, "'{s}'"),
            Token::Cdata(_) => write!(f, "%{{C++ block"),
            Token::Include(s) => write!(f, "#include \"{s}\""),
            Token::NativeId(s) => write!(f, "'{s}'"),
            Token::Const => write!(f, "'const'"),
            Token::Interface => write!(f, "'interface'"),
            Token::In => write!(f, "'in'"),
            Token::InOut => write!(f, "'inout'"),
            Token::Out => write!(f, "'out'"),
            Token::Attribute => write!(f, "'attribute'"),
            Token::Raises => write!(f, "'raises'"),
            Token::ReadOnly => write!(f, "'readonly'"),
            Token::Native => write!(f, "'native'"),
            Token::Typedef => write!(f, "'typedef'"),
            Token::Webidl => write!(f, "'webidl'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Less => write!(f, "'<'"),
            Token::Greater => write!(f, "'>'"),
            Token::Comma => write!(f, "','"),
            Token::Semi => write!(f, "';'"),
            Token::Colon => write!(f, "':'"),
            Token::Equals => write!(f, "'='"),
            Token::Pipe => write!(f, "'|'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Shl => write!(f, "'<<'"),
            Token::Shr => write!(f, "'>>'"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

/// A token with its span and the documentation comments accumulated since
/// the previous non-passthrough token.
#[derive(Debug, Clone, PartialEq)]
pub struct Tok {
    pub token: Token,
    pub span: Span,
    pub doc_comments: Vec<String>,
}
