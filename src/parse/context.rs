use crate::token::{Token, TokenKind};

use super::error::ParseError;

pub struct Context<'a> {
    items: &'a [Token],
    curr_pos: usize,
    // returned past the end of `items` so lookups never fail
    eof: Token,
    errors: Vec<ParseError>,
}

impl<'a> Context<'a> {
    pub fn new(items: &'a [Token]) -> Self {
        let last_line = items.last().map(|t| t.line).unwrap_or(1);
        Self {
            items,
            curr_pos: 0,
            eof: Token::eof(last_line),
            errors: vec![],
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.get_curr().kind == TokenKind::Eof
    }

    pub fn get_curr(&self) -> &Token {
        self.items.get(self.curr_pos).unwrap_or(&self.eof)
    }

    pub fn get_previous(&self) -> Option<&Token> {
        self.curr_pos
            .checked_sub(1)
            .and_then(|pos| self.items.get(pos))
    }

    /// Moves past the current token and returns it. Never moves past `Eof`.
    pub fn advance(&mut self) -> Token {
        let li = self.get_curr().clone();
        if li.kind != TokenKind::Eof {
            self.curr_pos += 1;
        }
        li
    }

    pub fn peek(&self, match_tokens: &[TokenKind]) -> bool {
        match_tokens.contains(&self.get_curr().kind)
    }

    pub fn match_token(&mut self, match_tokens: &[TokenKind]) -> Option<Token> {
        if self.peek(match_tokens) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn consume_token(&mut self, token: TokenKind) -> Result<Token, ParseError> {
        if !self.peek(&[token]) {
            return Err(ParseError::UnexpectedToken {
                found: self.get_curr().clone(),
                expected: Some(token),
            });
        }
        Ok(self.advance())
    }

    /// Records an error that does not unwind the current declaration.
    pub fn report(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Discards tokens until the start of the next statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self
                .get_previous()
                .is_some_and(|li| li.kind == TokenKind::Semicolon)
            {
                return;
            }

            match self.get_curr().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
