pub mod token;

use crate::diagnostics::LexError;
use crate::span::Span;
use logos::Logos;
pub use token::TokenKind;

/// A bracket-literal token. Handlers see the raw text, not a decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }

    /// Shorthand for identifier tokens, mostly for tests and handler authors.
    pub fn ident(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Ident, text, Span::dummy())
    }

    pub fn value(&self) -> &str {
        &self.text
    }
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token::new(kind, lexer.slice(), Span::new(span.start, span.end))),
            Err(()) => {
                return Err(LexError::UnexpectedChar {
                    text: source[span.start..span.end].to_string(),
                    span: Span::new(span.start, span.end),
                });
            }
        }
    }

    Ok(tokens)
}

/// Lex a full `<...>` literal. Returned tokens exclude the delimiters; their
/// spans point into `literal`.
pub fn lex_bracket(literal: &str) -> Result<Vec<Token>, LexError> {
    let leading = literal.len() - literal.trim_start().len();
    let trimmed = literal.trim();
    let whole = Span::new(leading, leading + trimmed.len());

    if trimmed.len() < 2 || !trimmed.starts_with('<') || !trimmed.ends_with('>') {
        return Err(LexError::Unbracketed { span: whole });
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let tokens: Vec<Token> = lex(inner)
        .map_err(|err| match err {
            LexError::UnexpectedChar { text, span } => LexError::UnexpectedChar {
                text,
                span: span.offset(leading + 1),
            },
            other => other,
        })?
        .into_iter()
        .map(|t| Token { span: t.span.offset(leading + 1), ..t })
        .collect();

    if tokens.is_empty() {
        return Err(LexError::Empty { span: whole });
    }
    Ok(tokens)
}

/// Join token texts in order with no separators.
pub fn concat(tokens: &[Token]) -> String {
    let mut text = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        text.push_str(&token.text);
    }
    text
}

/// Span covering every token, or `None` for an empty run.
pub fn covering_span(tokens: &[Token]) -> Option<Span> {
    let first = tokens.first()?.span;
    Some(tokens.iter().fold(first, |acc, t| acc.to(t.span)))
}
