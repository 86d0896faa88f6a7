//! Repeat-count expressions.
//!
//! A repeated field names its element count with a small expression such as
//! `count` or `num_words * 2`. Identifiers that match an earlier field of the
//! same component are rewritten to a member reference (`self.count`) so the
//! emitter can tell "value of a parsed field" apart from an external constant.
//! Matching works on whole identifier tokens: a field called `count` never
//! touches an identifier `countMax`.

use std::collections::HashSet;

/// Prefix marking an identifier as a reference to a field of the same record.
pub const FIELD_REF_PREFIX: &str = "self.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Ident,
    /// Starts with a digit; swallows trailing alphanumerics so `0x1F` stays one token.
    Number,
    /// Whitespace, operators and anything else, one character at a time.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
}

/// Splits `src` into tokens. Concatenating the token texts yields `src` again.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = src;

    while let Some(first) = rest.chars().next() {
        let (kind, len) = if first.is_ascii_alphabetic() || first == '_' {
            (TokenKind::Ident, word_len(rest))
        } else if first.is_ascii_digit() {
            (TokenKind::Number, word_len(rest))
        } else {
            (TokenKind::Other, first.len_utf8())
        };

        let (text, tail) = rest.split_at(len);
        tokens.push(Token { kind, text });
        rest = tail;
    }

    tokens
}

fn word_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len())
}

/// A repeat-count expression, as written and as qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RepeatExpr {
    /// Text as the schema author wrote it.
    pub source: String,
    /// Text with field references rewritten to `self.<name>`.
    pub qualified: String,
    /// Fields the expression reads, in order of first appearance.
    pub references: Vec<String>,
}

impl RepeatExpr {
    /// An unqualified expression; [RepeatExpr::qualify] fills in the references.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            qualified: source.clone(),
            source,
            references: Vec::new(),
        }
    }

    /// Rewrites identifiers found in `known` into field references.
    ///
    /// Returns the identifiers that were left alone, which the caller treats
    /// as external constants.
    pub fn qualify(&mut self, known: &HashSet<&str>) -> Vec<String> {
        let mut qualified = String::with_capacity(self.source.len());
        let mut references: Vec<String> = Vec::new();
        let mut external: Vec<String> = Vec::new();

        for token in tokenize(&self.source) {
            if token.kind == TokenKind::Ident && known.contains(token.text) {
                qualified.push_str(FIELD_REF_PREFIX);
                if !references.iter().any(|r| r == token.text) {
                    references.push(token.text.to_string());
                }
            } else if token.kind == TokenKind::Ident && !external.iter().any(|e| e == token.text) {
                external.push(token.text.to_string());
            }
            qualified.push_str(token.text);
        }

        self.qualified = qualified;
        self.references = references;
        external
    }
}
