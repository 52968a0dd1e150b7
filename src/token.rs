use std::fmt;

/// Byte range of a token inside the fragment it was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,

    // Keywords
    Rd,
    Wr,
    If,
    Then,
    Else,
    While,
    Do,
    Begin,
    End,

    // Operators
    Assign,       // =
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    NotEqual,     // <>
    EqualEqual,   // ==

    // Delimiters
    LParen,    // (
    RParen,    // )
    Semicolon, // ;

    // Structural
    EOF,
}

impl TokenKind {
    pub fn keyword(lexeme: &str) -> Option<Self> {
        match lexeme {
            "rd" => Some(TokenKind::Rd),
            "wr" => Some(TokenKind::Wr),
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "do" => Some(TokenKind::Do),
            "begin" => Some(TokenKind::Begin),
            "end" => Some(TokenKind::End),
            _ => None,
        }
    }

    pub fn operator(lexeme: &str) -> Option<Self> {
        match lexeme {
            "=" => Some(TokenKind::Assign),
            "+" => Some(TokenKind::Plus),
            "-" => Some(TokenKind::Minus),
            "*" => Some(TokenKind::Star),
            "/" => Some(TokenKind::Slash),
            "<" => Some(TokenKind::Less),
            "<=" => Some(TokenKind::LessEqual),
            ">" => Some(TokenKind::Greater),
            ">=" => Some(TokenKind::GreaterEqual),
            "<>" => Some(TokenKind::NotEqual),
            "==" => Some(TokenKind::EqualEqual),
            "(" => Some(TokenKind::LParen),
            ")" => Some(TokenKind::RParen),
            ";" => Some(TokenKind::Semicolon),
            _ => None,
        }
    }

    /// Category name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "id",
            TokenKind::Number => "num",
            TokenKind::Rd => "rd",
            TokenKind::Wr => "wr",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::NotEqual => "<>",
            TokenKind::EqualEqual => "==",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Semicolon => ";",
            TokenKind::EOF => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, lexeme: &'a str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    pub fn eof(at: usize) -> Self {
        Self::new(TokenKind::EOF, "", Span { start: at, end: at })
    }

    /// Grammar matching only looks at the category, never the lexeme.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = if self.kind == TokenKind::EOF {
            self.kind.name()
        } else {
            self.lexeme
        };
        write!(f, "<{},{}>", self.kind, lexeme)
    }
}

/// Owned copy of a token, carried by errors that outlive the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl From<Token<'_>> for TokenInfo {
    fn from(token: Token<'_>) -> Self {
        Self {
            kind: token.kind,
            lexeme: token.lexeme.to_string(),
        }
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = Token::new(self.kind, &self.lexeme, Span::default());
        fmt::Display::fmt(&token, f)
    }
}
