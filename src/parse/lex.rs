use super::error::{ParseError, ParseErrors};
use crate::token::{Literal, Token, TokenKind};

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Scans the whole input. Every lexical error is collected and scanning
/// resumes after the offending construct; the tokens are only returned when
/// the input scanned cleanly. The token list always ends with `Eof`.
pub fn lex(input: &str) -> Result<Vec<Token>, ParseErrors> {
    let mut lexer = Lexer::new(input);
    lexer.run();

    if lexer.errors.is_empty() {
        Ok(lexer.tokens)
    } else {
        Err(ParseErrors(lexer.errors))
    }
}

struct Lexer {
    chars: Vec<char>,
    start: usize,
    curr_offset: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            start: 0,
            curr_offset: 0,
            line: 1,
            tokens: vec![],
            errors: vec![],
        }
    }

    fn run(&mut self) {
        while !self.is_at_end() {
            self.start = self.curr_offset;
            self.lex_token();
        }
        self.tokens.push(Token::eof(self.line));
    }

    fn lex_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.push(TokenKind::LeftParen),
            ')' => self.push(TokenKind::RightParen),
            '{' => self.push(TokenKind::LeftBrace),
            '}' => self.push(TokenKind::RightBrace),
            ',' => self.push(TokenKind::Comma),
            '.' => self.push(TokenKind::Dot),
            '-' => self.push(TokenKind::Minus),
            '+' => self.push(TokenKind::Plus),
            ';' => self.push(TokenKind::Semicolon),
            '*' => self.push(TokenKind::Star),
            '!' => self.push_either('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.push_either('=', TokenKind::EqualEqual, TokenKind::Equal),
            '>' => self.push_either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.push_either('=', TokenKind::LessEqual, TokenKind::Less),
            '/' => {
                if self.match_char('/') {
                    // comment runs to the end of the line
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.curr_offset += 1;
                    }
                } else {
                    self.push(TokenKind::Slash);
                }
            }
            '"' => self.lex_string(),
            '\n' => self.line += 1,
            ' ' | '\t' | '\r' => {}
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_identifier_start(c) => self.lex_keyword_or_identifier(),
            ch => self.errors.push(ParseError::UnexpectedCharacter {
                ch,
                line: self.line,
            }),
        }
    }

    fn lex_string(&mut self) {
        let start_line = self.line;
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.curr_offset += 1;
        }

        if self.is_at_end() {
            self.errors.push(ParseError::UnclosedString(start_line));
            return;
        }

        // closing '"'
        self.curr_offset += 1;

        let value = self.chars[self.start + 1..self.curr_offset - 1]
            .iter()
            .collect::<String>();
        self.push_literal(TokenKind::String, Some(Literal::Str(value)));
    }

    fn lex_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.curr_offset += 1;
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.curr_offset += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.curr_offset += 1;
            }
        }

        let lexeme = self.lexeme();
        match lexeme.parse::<f64>() {
            Ok(num) => self.push_literal(TokenKind::Number, Some(Literal::Number(num))),
            // digits with at most one inner '.' always parse
            Err(_) => self.errors.push(ParseError::UnexpectedCharacter {
                ch: self.chars[self.start],
                line: self.line,
            }),
        }
    }

    fn lex_keyword_or_identifier(&mut self) {
        while self.peek().is_some_and(is_identifier_char) {
            self.curr_offset += 1;
        }

        let lexeme = self.lexeme();
        match TokenKind::keyword(&lexeme) {
            Some(TokenKind::True) => self.push_literal(TokenKind::True, Some(Literal::Bool(true))),
            Some(TokenKind::False) => {
                self.push_literal(TokenKind::False, Some(Literal::Bool(false)))
            }
            Some(TokenKind::Nil) => self.push_literal(TokenKind::Nil, Some(Literal::Nil)),
            Some(kind) => self.push(kind),
            None => self.push(TokenKind::Identifier),
        }
    }

    fn push(&mut self, kind: TokenKind) {
        self.push_literal(kind, None);
    }

    fn push_either(&mut self, expected: char, matched: TokenKind, otherwise: TokenKind) {
        let kind = if self.match_char(expected) {
            matched
        } else {
            otherwise
        };
        self.push(kind);
    }

    fn push_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.lexeme();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.curr_offset].iter().collect()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.curr_offset];
        self.curr_offset += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.curr_offset += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.curr_offset).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.curr_offset + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.curr_offset >= self.chars.len()
    }
}
