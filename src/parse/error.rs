use crate::token::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("[line {line}] Error: Unexpected character `{ch}`")]
    UnexpectedCharacter { ch: char, line: usize },

    #[error("[line {0}] Error: Unterminated string")]
    UnclosedString(usize),

    #[error("[line {}] Error {}: {}", .found.line, .found.location(), diagnostic_expect_token(.expected))]
    UnexpectedToken {
        found: Token,
        expected: Option<TokenKind>,
    },

    #[error("[line {}] Error {}: Expect expression", .0.line, .0.location())]
    ExpectExpression(Token),

    #[error("[line {}] Error {}: Invalid assignment target", .0.line, .0.location())]
    InvalidAssignmentTarget(Token),

    #[error("[line {}] Error {}: Can't have more than {} arguments", .0.line, .0.location(), MAX_ARGUMENTS)]
    TooManyArguments(Token),
}

pub const MAX_ARGUMENTS: usize = 255;

impl ParseError {
    pub fn line(&self) -> usize {
        use ParseError::*;
        match self {
            UnexpectedCharacter { line, .. } => *line,
            UnclosedString(line) => *line,
            UnexpectedToken { found, .. } => found.line,
            ExpectExpression(t) | InvalidAssignmentTarget(t) | TooManyArguments(t) => t.line,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedCharacter { .. } | ParseError::UnclosedString(_)
        )
    }
}

fn diagnostic_expect_token(o: &Option<TokenKind>) -> String {
    match o {
        None => "Unexpected token".to_string(),
        Some(t) => format!("Expect `{}`", t),
    }
}

/// Every error found in one pass over a source, in source order.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", join_lines(.0))]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn join_lines(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
