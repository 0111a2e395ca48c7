//! # Lexer - Tokenizing Markup Source
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Nothing is skipped,
//! which is what lets the tree reproduce its source:
//!
//! ```
//! use quire_syntax::lexer::lex;
//!
//! let input = "<p class=\"lead\">Hello</p>";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! Tokens are context-free. The lexer does not know whether `name` is a tag
//! name, an attribute name or a word of running text; the parser decides from
//! its position. Inside text content every token that is not the start of a
//! tag is folded back into a single `TEXT` run by the parser.
//!
//! Quoted strings never contain `<`, so a stray quote in running text cannot
//! swallow the tags that follow it.
//!
//! ## Public API
//!
//! - [`lex`] - Tokenize input, returning `Vec<Token>`
//! - [`lex_with_spans`] - Tokenize with byte offset spans
//! - [`Token`] - A token with its kind and text slice

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Spaces, tabs and line endings
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    /// `<!-- ... -->`, running to EOF when unterminated
    #[token("<!--", lex_comment)]
    Comment,

    /// `<!DOCTYPE html>` and similar declarations
    #[regex(r"<![A-Za-z][^>]*>")]
    Doctype,

    /// `</` opening an end tag
    #[token("</")]
    LAngleSlash,

    /// `<` opening a start tag
    #[token("<")]
    LAngle,

    /// `/>` closing a self-closing tag
    #[token("/>")]
    SlashRAngle,

    /// `>` closing a tag
    #[token(">")]
    RAngle,

    /// `=` separating attribute name and value
    #[token("=")]
    Eq,

    /// Double or single quoted string
    #[regex(r#""[^"<]*""#)]
    #[regex(r"'[^'<]*'")]
    String,

    /// Tag names, attribute names and words
    #[regex(r"[A-Za-z_:][A-Za-z0-9_:.\-]*")]
    Name,

    /// Anything else that is not whitespace, a tag delimiter or a name start
    #[regex(r#"[^ \t\r\n\x0C<>="'A-Za-z_:]+"#)]
    Text,
}

fn lex_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    let rest = lex.remainder();
    let len = match rest.find("-->") {
        Some(end) => end + "-->".len(),
        None => rest.len(),
    };
    lex.bump(len);
    true
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Doctype => SyntaxKind::DOCTYPE,
            TokenKind::LAngleSlash => SyntaxKind::L_ANGLE_SLASH,
            TokenKind::LAngle => SyntaxKind::L_ANGLE,
            TokenKind::SlashRAngle => SyntaxKind::SLASH_R_ANGLE,
            TokenKind::RAngle => SyntaxKind::R_ANGLE,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Name => SyntaxKind::NAME,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Unterminated quotes and other leftovers are plain text
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
