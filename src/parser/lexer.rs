//! Lexer for miniscript source text.
//!
//! Scanning is best-effort: an unrecognized character or an unterminated
//! string is reported to the [`Reporter`] and scanning continues, so
//! [`tokenize`] always returns a token sequence ending in a single
//! [`TokenKind::Eof`].

use crate::ast::Value;
use crate::error::Reporter;

/// Every syntactic category the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Single-character punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Question,
    Colon,

    // One- or two-character operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    False,
    Nil,
    True,

    Eof,
}

/// One classified unit of source text. Created only by the lexer and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source substring the token was built from.
    pub lexeme: String,
    /// Present only for `Number` and `String` tokens.
    pub literal: Option<Value>,
    /// 1-based line of the token's first character.
    pub line: usize,
}

/// Scans the whole source into tokens, reporting problems as it goes.
pub fn tokenize(source: &str, reporter: &mut Reporter) -> Vec<Token> {
    Lexer::new(source, reporter).scan_tokens()
}

struct Lexer<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    reporter: &'a mut Reporter,
}

impl<'a> Lexer<'a> {
    fn new(source: &str, reporter: &'a mut Reporter) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            reporter,
        }
    }

    fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            literal: None,
            line: self.line,
        });
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            '?' => self.add_token(TokenKind::Question),
            ':' => self.add_token(TokenKind::Colon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => {
                if self.match_char('/') {
                    // Line comment, no token.
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.current += 1;
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            _ if c.is_ascii_digit() => self.number(),
            _ if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            _ => self.reporter.report(self.line, "Unexpected character."),
        }
    }

    fn string(&mut self) {
        // A string token is tagged with the line its opening quote is on,
        // while an unterminated-string error reports the line reached.
        let opening_line = self.line;
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_at_end() {
            self.reporter.report(self.line, "Unterminated string.");
            return;
        }

        self.current += 1; // closing quote

        // The value is the text strictly between the quotes; no escape
        // sequences are processed.
        let value: String =
            self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_at(TokenKind::String, Some(Value::Str(value)), opening_line);
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }

        // A '.' only belongs to the number when a digit follows it.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.current += 1;
            while self.peek().is_ascii_digit() {
                self.current += 1;
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value = text.parse().unwrap_or(0.0);
        self.add_token_at(TokenKind::Number, Some(Value::Number(value)), self.line);
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.current += 1;
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = match text.as_str() {
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            _ => TokenKind::Identifier,
        };
        self.add_token(kind);
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_at(kind, None, self.line);
    }

    fn add_token_at(&mut self, kind: TokenKind, literal: Option<Value>, line: usize) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token {
            kind,
            lexeme,
            literal,
            line,
        });
    }
}
