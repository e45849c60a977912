//! Lexer for formulas.
//!
//! Converts source text into a stream of [`Token`]s. Formulas are usually a
//! single line but newlines are accepted as whitespace so positions stay
//! meaningful for pasted multi-line input.

use super::error::CompileError;
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let ch = self.peek();
            let token = match ch {
                '+' => self.single_char(TokenKind::Plus),
                '-' => self.single_char(TokenKind::Minus),
                '*' => self.single_char(TokenKind::Star),
                '/' => self.single_char(TokenKind::Slash),
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                ',' => self.single_char(TokenKind::Comma),
                '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                    self.lex_number()?
                }
                '0'..='9' => self.lex_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident(),
                _ => {
                    return Err(CompileError::lex(
                        format!("unexpected character: '{ch}'"),
                        self.line,
                        self.col,
                    ));
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;

        if self.peek() == '0' && matches!(self.peek_next(), Some('x' | 'X')) {
            return self.lex_hex(line, col);
        }

        let mut s = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance());
        }

        if !self.is_at_end() && self.peek() == '.' {
            s.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                s.push(self.advance());
            }
        }

        // Exponent only when digits follow; otherwise `e` is left for the
        // identifier lexer and the parser reports the stray name.
        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let digits_at = match self.peek_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    s.push(self.advance());
                }
                while !self.is_at_end() && self.peek().is_ascii_digit() {
                    s.push(self.advance());
                }
            }
        }

        let value = s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CompileError::lex(format!("invalid number: {s}"), line, col))?;

        Ok(Token {
            kind: TokenKind::Number(value),
            line,
            col,
        })
    }

    fn lex_hex(&mut self, line: usize, col: usize) -> Result<Token, CompileError> {
        self.advance(); // '0'
        self.advance(); // 'x'
        let mut digits = String::new();
        while !self.is_at_end() && self.peek().is_ascii_alphanumeric() {
            digits.push(self.advance());
        }
        let value = u64::from_str_radix(&digits, 16)
            .map_err(|_| CompileError::lex(format!("invalid number: 0x{digits}"), line, col))?;
        Ok(Token {
            kind: TokenKind::Number(value as f64),
            line,
            col,
        })
    }

    fn lex_ident(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut s = String::new();

        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            s.push(self.advance());
        }

        Token {
            kind: TokenKind::Ident(s),
            line,
            col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_empty() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_operators_and_delimiters() {
        assert_eq!(
            kinds("+-*/(),"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(kinds("42")[0], TokenKind::Number(42.0));
        assert_eq!(kinds("2.5")[0], TokenKind::Number(2.5));
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
        assert_eq!(kinds("3.")[0], TokenKind::Number(3.0));
        assert_eq!(kinds("1e3")[0], TokenKind::Number(1000.0));
        assert_eq!(kinds("2.5E-1")[0], TokenKind::Number(0.25));
        assert_eq!(kinds("0x1f")[0], TokenKind::Number(31.0));
    }

    #[test]
    fn minus_is_never_part_of_a_number() {
        assert_eq!(
            kinds("-1"),
            vec![TokenKind::Minus, TokenKind::Number(1.0), TokenKind::Eof]
        );
    }

    #[test]
    fn exponent_requires_digits() {
        assert_eq!(
            kinds("2e"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Ident("e".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_identifiers() {
        assert_eq!(
            kinds("sin(x_1)"),
            vec![
                TokenKind::Ident("sin".into()),
                TokenKind::LParen,
                TokenKind::Ident("x_1".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_are_tracked() {
        let tokens = Lexer::new("x +\n  y").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].col), (2, 3));
    }

    #[test]
    fn unexpected_character() {
        let err = Lexer::new("x % 2").tokenize().unwrap_err();
        assert_eq!(err.kind, super::super::error::ErrorKind::Lex);
        assert_eq!(err.col, 3);
    }

    #[test]
    fn bad_hex_literal() {
        assert!(Lexer::new("0xzz").tokenize().is_err());
        assert!(Lexer::new("0x").tokenize().is_err());
    }

    #[test]
    fn out_of_range_literal() {
        let err = Lexer::new("x + 1e400").tokenize().unwrap_err();
        assert_eq!(err.kind, super::super::error::ErrorKind::Lex);
        assert_eq!(err.col, 5);
        assert!(err.message.contains("1e400"));
        assert_eq!(kinds("1e300")[0], TokenKind::Number(1e300));
    }
}
