use std::fmt;

use crate::error::{LexError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {n}"),
            TokenKind::Identifier(name) => write!(f, "'{name}'"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Eof => f.write_str("end of formula"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    /// Consumes chars matching `predicate` and returns the end offset of the run.
    fn consume_while<F>(&mut self, start: usize, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let mut end = start;
        while let Some((idx, ch)) = self.peek() {
            if !predicate(ch) {
                break;
            }
            end = idx + ch.len_utf8();
            self.chars.next();
        }
        end
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        while self.peek().is_some_and(|(_, ch)| ch.is_whitespace()) {
            self.chars.next();
        }
        let Some((start, ch)) = self.peek() else {
            let end = self.input.len();
            return Ok(Token::new(TokenKind::Eof, end, end));
        };

        let single = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            _ => None,
        };
        if let Some(kind) = single {
            self.chars.next();
            return Ok(Token::new(kind, start, start + 1));
        }

        if ch.is_ascii_digit() || ch == '.' {
            let end = self.consume_while(start, |c| c.is_ascii_digit() || c == '.');
            let text = &self.input[start..end];
            let malformed = || LexError::MalformedNumber {
                text: text.to_string(),
                offset: start,
            };
            if text.matches('.').count() > 1 {
                return Err(malformed());
            }
            let value: f64 = text.parse().map_err(|_| malformed())?;
            if !value.is_finite() {
                return Err(malformed());
            }
            return Ok(Token::new(TokenKind::Number(value), start, end));
        }

        if ch.is_ascii_alphabetic() {
            let end = self.consume_while(start, |c| c.is_ascii_alphanumeric() || c == '_');
            let name = self.input[start..end].to_string();
            return Ok(Token::new(TokenKind::Identifier(name), start, end));
        }

        Err(LexError::UnexpectedChar { ch, offset: start })
    }
}

/// Splits `source` into tokens. The returned list always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_operators_numbers_and_identifiers() {
        assert_eq!(
            kinds("(ARV * 0.65) - Repairs / 2 + x_1"),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier("ARV".into()),
                TokenKind::Star,
                TokenKind::Number(0.65),
                TokenKind::RParen,
                TokenKind::Minus,
                TokenKind::Identifier("Repairs".into()),
                TokenKind::Slash,
                TokenKind::Number(2.0),
                TokenKind::Plus,
                TokenKind::Identifier("x_1".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \t\n "), vec![TokenKind::Eof]);
    }

    #[test]
    fn identifiers_are_whole_tokens() {
        assert_eq!(
            kinds("ARV2"),
            vec![TokenKind::Identifier("ARV2".into()), TokenKind::Eof]
        );
        // A leading digit splits into a number followed by an identifier.
        assert_eq!(
            kinds("2ARV"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Identifier("ARV".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn accepts_leading_and_trailing_decimal_point() {
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5), TokenKind::Eof]);
        assert_eq!(kinds("5."), vec![TokenKind::Number(5.0), TokenKind::Eof]);
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert_eq!(
            tokenize("ARV * 1.2.3"),
            Err(LexError::MalformedNumber {
                text: "1.2.3".into(),
                offset: 6
            })
        );
        assert_eq!(
            tokenize("."),
            Err(LexError::MalformedNumber {
                text: ".".into(),
                offset: 0
            })
        );
    }

    #[test]
    fn rejects_literals_beyond_f64_range() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(
            tokenize(&format!("ARV + {huge}")),
            Err(LexError::MalformedNumber {
                text: huge,
                offset: 6
            })
        );
        let largest = format!("1{}", "0".repeat(308));
        assert_eq!(kinds(&largest), vec![TokenKind::Number(1e308), TokenKind::Eof]);
    }

    #[test]
    fn rejects_unexpected_characters_with_offset() {
        assert_eq!(
            tokenize("ARV % 2"),
            Err(LexError::UnexpectedChar { ch: '%', offset: 4 })
        );
        assert_eq!(
            tokenize("_ARV"),
            Err(LexError::UnexpectedChar { ch: '_', offset: 0 })
        );
        assert_eq!(
            tokenize("ARV·2"),
            Err(LexError::UnexpectedChar { ch: '·', offset: 3 })
        );
    }

    #[test]
    fn spans_are_byte_ranges() {
        let tokens = tokenize("  Repairs+10").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(2, 9), (9, 10), (10, 12), (12, 12)]);
    }
}
