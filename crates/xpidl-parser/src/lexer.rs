//! Lexer for XPIDL source text.
//!
//! Tokenization runs through logos with a conversion loop that computes
//! 1-based line/column positions and attaches accumulated documentation
//! comments (`/** ... */` blocks) to the following token. `%{C++ ... %}`
//! passthrough blocks become single tokens and do not consume pending
//! documentation comments.

use crate::token::{Location, Span, Tok, Token};
use logos::{FilterResult, Logos};
use thiserror::Error;

/// Lexer state shared with logos callbacks.
#[derive(Debug, Default, Clone)]
pub struct LexExtras {
    /// Documentation comments seen since the last non-passthrough token.
    docs: Vec<String>,
}

/// Error payload produced inside logos callbacks, before locations are
/// known. The tokenize loop maps these onto positioned errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LexErrorKind {
    #[default]
    Unrecognized,
    UnterminatedComment,
    UnterminatedCdata,
    Directive(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = LexExtras)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n]+")]
enum LogosToken {
    // Comments. Block comments starting with `/**` are documentation and
    // accumulate in the extras; everything else is discarded.
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // Raw C++ passthrough block.
    #[regex(r"%\{[ ]*C\+\+[ ]*\n", lex_cdata)]
    Cdata(String),

    #[regex(r#"#include[ \t]+"[^"\n]+""#, lex_include)]
    Include(String),

    // Any other #-directive is unsupported.
    #[regex(r"#[a-zA-Z]+", lex_directive)]
    Directive,

    #[regex(
        r"[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}",
        |lex| lex.slice().to_owned(),
        priority = 10
    )]
    Iid(String),

    #[regex(r"_?[A-Za-z][A-Za-z_0-9]*", |lex| lex.slice().to_owned())]
    Identifier(String),

    #[regex(r"0x[a-fA-F0-9]+", |lex| lex.slice().to_owned())]
    HexNum(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_owned())]
    Number(String),

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token(",")]
    Comma,

    #[token(";")]
    Semi,

    #[token(":")]
    Colon,

    #[token("=")]
    Equals,

    #[token("|")]
    Pipe,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> FilterResult<(), LexErrorKind> {
    // "/*" is consumed; find the matching "*/".
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            let body = &remainder[..end];
            lex.bump(end + 2);
            // `/**`-prefixed blocks are documentation comments.
            if body.starts_with('*') {
                let full = format!("/*{}*/", body);
                lex.extras.docs.push(full);
            }
            FilterResult::Skip
        }
        None => {
            lex.bump(remainder.len());
            FilterResult::Error(LexErrorKind::UnterminatedComment)
        }
    }
}

fn lex_cdata(lex: &mut logos::Lexer<LogosToken>) -> Result<String, LexErrorKind> {
    let remainder = lex.remainder();
    let end = match remainder.find("%}") {
        Some(end) => end,
        None => {
            lex.bump(remainder.len());
            return Err(LexErrorKind::UnterminatedCdata);
        }
    };
    let data = remainder[..end].to_owned();

    // Consume "%}" plus the optional trailing " C++" tag.
    let mut consumed = end + 2;
    let after = &remainder[consumed..];
    let spaces = after.len() - after.trim_start_matches(' ').len();
    if after[spaces..].starts_with("C++") {
        consumed += spaces + 3;
    }
    lex.bump(consumed);
    Ok(data)
}

fn lex_include(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let slice = lex.slice();
    let open = slice.find('"')?;
    let inner = &slice[open + 1..slice.len() - 1];
    Some(inner.to_owned())
}

fn lex_directive(lex: &mut logos::Lexer<LogosToken>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::Directive(lex.slice()[1..].to_owned()))
}

/// Lexing failures with source positions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unrecognized input, {location}")]
    Unrecognized { location: Location },

    #[error("unterminated comment, {location}")]
    UnterminatedComment { location: Location },

    #[error("unterminated C++ block, {location}")]
    UnterminatedCdata { location: Location },
}

impl LexError {
    pub fn location(&self) -> &Location {
        match self {
            LexError::Unrecognized { location }
            | LexError::UnterminatedComment { location }
            | LexError::UnterminatedCdata { location } => location,
        }
    }
}

/// An unsupported `#`-directive, reported separately from plain lex errors
/// so callers can name the directive.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unrecognized directive '{directive}', {location}")]
pub struct DirectiveError {
    pub directive: String,
    pub location: Location,
}

/// The XPIDL lexer.
pub struct Lexer<'a> {
    source: &'a str,
    file: String,
}

/// Either kind of tokenization failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenizeError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<String>) -> Self {
        Lexer {
            source,
            file: file.into(),
        }
    }

    /// Tokenize the whole input. The first error aborts the file.
    pub fn tokenize(self) -> Result<Vec<Tok>, TokenizeError> {
        let mut lex = LogosToken::lexer(self.source);
        let mut toks: Vec<Tok> = Vec::new();
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0usize;

        let advance = |line: &mut u32, column: &mut u32, text: &str| {
            for c in text.chars() {
                if c == '\n' {
                    *line += 1;
                    *column = 1;
                } else {
                    *column += 1;
                }
            }
        };

        while let Some(result) = lex.next() {
            let range = lex.span();
            advance(&mut line, &mut column, &self.source[last_end..range.start]);
            let span = Span::new(range.start, range.end, line, column);

            match result {
                Ok(logos_token) => {
                    let token = convert_token(logos_token);
                    let doc_comments = if matches!(token, Token::Cdata(_)) {
                        // Passthrough blocks leave pending docs for the
                        // next real token.
                        Vec::new()
                    } else {
                        std::mem::take(&mut lex.extras.docs)
                    };

                    if !merge_multiword(&mut toks, &token, span, self.source) {
                        toks.push(Tok {
                            token,
                            span,
                            doc_comments,
                        });
                    }
                }
                Err(kind) => {
                    let location = Location::new(self.file.clone(), span);
                    return Err(match kind {
                        LexErrorKind::Unrecognized => {
                            LexError::Unrecognized { location }.into()
                        }
                        LexErrorKind::UnterminatedComment => {
                            LexError::UnterminatedComment { location }.into()
                        }
                        LexErrorKind::UnterminatedCdata => {
                            LexError::UnterminatedCdata { location }.into()
                        }
                        LexErrorKind::Directive(directive) => DirectiveError {
                            directive,
                            location,
                        }
                        .into(),
                    });
                }
            }

            advance(&mut line, &mut column, &self.source[range.start..range.end]);
            last_end = range.end;

            // `native Name( ... )` captures the parenthesized text raw; the
            // grammar only reaches this token shape in that production.
            if native_id_follows(&toks) {
                let remainder = lex.remainder();
                let close = match remainder.find(')') {
                    Some(close) => close,
                    None => {
                        let location = Location::new(
                            self.file.clone(),
                            Span::new(last_end, self.source.len(), line, column),
                        );
                        return Err(LexError::Unrecognized { location }.into());
                    }
                };
                let text = &remainder[..close];
                if text.is_empty() || text.contains('\n') || text.contains('(') {
                    let location = Location::new(
                        self.file.clone(),
                        Span::new(last_end, last_end + close, line, column),
                    );
                    return Err(LexError::Unrecognized { location }.into());
                }
                toks.push(Tok {
                    token: Token::NativeId(text.to_owned()),
                    span: Span::new(last_end, last_end + close, line, column),
                    doc_comments: std::mem::take(&mut lex.extras.docs),
                });
                lex.bump(close);
                advance(&mut line, &mut column, text);
                last_end += close;
            }
        }

        toks.push(Tok {
            token: Token::Eof,
            span: Span::new(self.source.len(), self.source.len(), line, column),
            doc_comments: Vec::new(),
        });
        Ok(toks)
    }
}

/// True when the last three tokens form `native IDENT (`, meaning the raw
/// native-id capture mode applies.
fn native_id_follows(toks: &[Tok]) -> bool {
    if toks.len() < 3 {
        return false;
    }
    matches!(
        (
            &toks[toks.len() - 3].token,
            &toks[toks.len() - 2].token,
            &toks[toks.len() - 1].token,
        ),
        (Token::Native, Token::Identifier(_), Token::LParen)
    )
}

/// Merge `unsigned short`, `unsigned long`, `long long` and
/// `unsigned long long` into single identifier tokens. The words must be
/// separated by exactly one space, matching the IDL builtin spellings.
fn merge_multiword(toks: &mut Vec<Tok>, token: &Token, span: Span, source: &str) -> bool {
    let word = match token {
        Token::Identifier(word) => word.as_str(),
        _ => return false,
    };
    let prev = match toks.last_mut() {
        Some(prev) => prev,
        None => return false,
    };
    let prev_word = match &prev.token {
        Token::Identifier(prev_word) => prev_word.as_str(),
        _ => return false,
    };
    let merged = match (prev_word, word) {
        ("unsigned", "short") => "unsigned short",
        ("unsigned", "long") => "unsigned long",
        ("long", "long") => "long long",
        ("unsigned long", "long") => "unsigned long long",
        _ => return false,
    };
    if &source[prev.span.end..span.start] != " " {
        return false;
    }
    prev.token = Token::Identifier(merged.to_owned());
    prev.span.end = span.end;
    true
}

fn convert_token(logos_token: LogosToken) -> Token {
    match logos_token {
        LogosToken::Identifier(s) => keyword_or_identifier(s),
        LogosToken::Number(s) => Token::Number(s),
        LogosToken::HexNum(s) => Token::HexNum(s),
        LogosToken::Iid(s) => Token::Iid(s),
        LogosToken::Cdata(s) => Token::Cdata(s),
        LogosToken::Include(s) => Token::Include(s),
        LogosToken::Shl => Token::Shl,
        LogosToken::Shr => Token::Shr,
        LogosToken::LParen => Token::LParen,
        LogosToken::RParen => Token::RParen,
        LogosToken::LBrace => Token::LBrace,
        LogosToken::RBrace => Token::RBrace,
        LogosToken::LBracket => Token::LBracket,
        LogosToken::RBracket => Token::RBracket,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Comma => Token::Comma,
        LogosToken::Semi => Token::Semi,
        LogosToken::Colon => Token::Colon,
        LogosToken::Equals => Token::Equals,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::LineComment | LogosToken::BlockComment | LogosToken::Directive => {
            unreachable!("skipped or error-only tokens are never emitted")
        }
    }
}

fn keyword_or_identifier(s: String) -> Token {
    match s.as_str() {
        "const" => Token::Const,
        "interface" => Token::Interface,
        "in" => Token::In,
        "inout" => Token::InOut,
        "out" => Token::Out,
        "attribute" => Token::Attribute,
        "raises" => Token::Raises,
        "readonly" => Token::ReadOnly,
        "native" => Token::Native,
        "typedef" => Token::Typedef,
        "webidl" => Token::Webidl,
        _ => Token::Identifier(s),
    }
}
