use derive_more::Display;
use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    #[display("(")]
    LeftParen,
    #[display(")")]
    RightParen,
    #[display("{{")]
    LeftBrace,
    #[display("}}")]
    RightBrace,
    #[display(",")]
    Comma,
    #[display(".")]
    Dot,
    #[display("-")]
    Minus,
    #[display("+")]
    Plus,
    #[display(";")]
    Semicolon,
    #[display("/")]
    Slash,
    #[display("*")]
    Star,

    #[display("!")]
    Bang,
    #[display("!=")]
    BangEqual,
    #[display("=")]
    Equal,
    #[display("==")]
    EqualEqual,
    #[display(">")]
    Greater,
    #[display(">=")]
    GreaterEqual,
    #[display("<")]
    Less,
    #[display("<=")]
    LessEqual,

    #[display("identifier")]
    Identifier,
    #[display("string")]
    String,
    #[display("number")]
    Number,

    #[display("and")]
    And,
    #[display("class")]
    Class,
    #[display("else")]
    Else,
    #[display("false")]
    False,
    #[display("for")]
    For,
    #[display("fun")]
    Fun,
    #[display("if")]
    If,
    #[display("nil")]
    Nil,
    #[display("or")]
    Or,
    #[display("print")]
    Print,
    #[display("return")]
    Return,
    #[display("super")]
    Super,
    #[display("this")]
    This,
    #[display("true")]
    True,
    #[display("var")]
    Var,
    #[display("while")]
    While,

    #[display("end of input")]
    Eof,
}

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "fun" => TokenKind::Fun,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS.get(word).copied()
    }
}

/// Value carried by literal tokens and by `Expression::Literal`.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum Literal {
    #[display("nil")]
    Nil,

    #[display("{}", _0)]
    Bool(bool),

    #[display("{}", _0)]
    Number(f64),

    #[display("{}", _0)]
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
#[display("{:?} {} {:?} (line {})", kind, lexeme, literal, line)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: usize,
    ) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", None, line)
    }

    /// Where the token sits in a diagnostic: `at end` or `at 'lexeme'`.
    pub fn location(&self) -> String {
        match self.kind {
            TokenKind::Eof => "at end".to_string(),
            _ => format!("at '{}'", self.lexeme),
        }
    }
}
