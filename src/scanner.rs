//! Streaming lexer for Lox.
//!
//! [`Scanner`] walks the source once and yields `Result<Token>` items. A bad
//! character or an unterminated string produces an `Err` item and scanning
//! resumes after it, so a single pass reports every lexical problem. The
//! stream always ends with exactly one `EOF` token and is fused afterwards.
//!
//! Recognised input:
//!
//! - punctuation `( ) { } , . - + ; * /` and the pairs `!= == <= >=`
//! - `"..."` strings, which may span lines and have no escapes
//! - numbers with an optional fraction (`1`, `2.5`; `3.` is a number then a dot)
//! - identifiers `[A-Za-z_][A-Za-z0-9_]*`, with keywords looked up in [`KEYWORDS`]
//! - `//` comments to the end of the line
//!
//! ```rust
//! use rlox::scanner::scan;
//!
//! let (tokens, errors) = scan("print 1 + 2;");
//! assert!(errors.is_empty());
//! assert_eq!(tokens.len(), 6);
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

/// Reserved words, hashed at compile time.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to examine.
    pos: usize,
    line: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            finished: false,
        }
    }

    #[inline(always)]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Byte `offset` positions ahead, or `0` past the end.
    #[inline(always)]
    fn byte_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b: u8 = self.byte_at(0);
        self.pos += 1;
        b
    }

    #[inline(always)]
    fn eat(&mut self, expected: u8) -> bool {
        let hit: bool = !self.at_end() && self.byte_at(0) == expected;
        if hit {
            self.pos += 1;
        }
        hit
    }

    /// `with_eq` if the next byte is `=`, otherwise `alone`.
    fn either(&mut self, with_eq: TokenType, alone: TokenType) -> TokenType {
        if self.eat(b'=') {
            with_eq
        } else {
            alone
        }
    }

    /// Lexemes start and stop on ASCII bytes, so this never splits a character.
    #[inline(always)]
    fn lexeme(&self) -> &'a str {
        &self.src[self.start..self.pos]
    }

    /// Consume one lexeme. `Ok(None)` means whitespace or a comment.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind: TokenType = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.eat(b'/') => {
                // Stop on the newline so the line counter still sees it.
                let rest: &[u8] = &self.bytes[self.pos..];
                self.pos += memchr(b'\n', rest).unwrap_or(rest.len());
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),
            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                let c: char = self.src[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.pos = self.start + c.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// The opening quote is already consumed.
    fn string(&mut self) -> Result<TokenType> {
        let rest: &[u8] = &self.bytes[self.pos..];
        let Some(len) = memchr(b'"', rest) else {
            self.line += rest.iter().filter(|&&b| b == b'\n').count();
            self.pos = self.bytes.len();
            return Err(LoxError::lex(self.line, "Unterminated string."));
        };

        let body: &str = &self.src[self.pos..self.pos + len];
        self.line += body.bytes().filter(|&b| b == b'\n').count();
        self.pos += len + 1;

        Ok(TokenType::STRING(body.to_owned()))
    }

    fn skip_digits(&mut self) {
        while self.byte_at(0).is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.byte_at(0) == b'.' && self.byte_at(1).is_ascii_digit() {
            self.pos += 1;
            self.skip_digits();
        }

        // Only ASCII digits and at most one interior dot reach here.
        TokenType::NUMBER(self.lexeme().parse().unwrap_or_default())
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.byte_at(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        KEYWORDS
            .get(self.lexeme().as_bytes())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while !self.at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    debug!("Scanned token ({:?}) on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.finished = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan the whole of `src`, collecting tokens and lexical errors separately.
/// The token list always ends with `EOF`.
pub fn scan(src: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(src) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scanned {} token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}
