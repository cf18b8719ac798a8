//! Recursive-descent parser.
//!
//! ```text
//! expr     := term (("+" | "-") term)*
//! term     := factor (("*" | "/") factor)*
//! factor   := "-" factor | primary
//! primary  := Number | Identifier | "(" expr ")"
//! ```
//!
//! Identifiers are not resolved here; see [`crate::validate`].
//!
//! Binary chains are parsed iteratively but still build a left-deep tree, so the
//! source length is bounded before parsing; tree walks stay shallow enough for the
//! default thread stack.

use crate::ast::{BinaryOp, Expr};
use crate::error::{FormulaError, ParseError};
use crate::lexer::{tokenize, Token, TokenKind};

/// Maximum combined depth of parentheses and unary minus.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Longest formula accepted, in characters.
pub const MAX_FORMULA_CHARS: usize = 4_096;

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &'t Token {
        // `tokenize` always terminates the stream with `Eof`; clamp so a hand-built
        // slice without one still reads as end of input.
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => token,
            None => &EOF_TOKEN,
        }
    }

    fn bump(&mut self) -> &'t Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        let next = self.peek();
        match next.kind {
            TokenKind::Eof => Ok(expr),
            TokenKind::RParen => Err(ParseError::UnmatchedCloseParen {
                offset: next.span.start,
            }),
            ref other => Err(ParseError::TrailingInput {
                found: other.to_string(),
                offset: next.span.start,
            }),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if self.peek().kind == TokenKind::Minus {
            self.bump();
            self.enter()?;
            let operand = self.parse_factor()?;
            self.leave();
            return Ok(Expr::negate(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.bump();
        match &token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(*n)),
            TokenKind::Identifier(name) => Ok(Expr::Variable(name.clone())),
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.parse_expr()?;
                self.leave();
                let close = self.peek();
                match close.kind {
                    TokenKind::RParen => {
                        self.bump();
                        Ok(inner)
                    }
                    TokenKind::Eof => Err(ParseError::UnclosedParen {
                        open: token.span.start,
                    }),
                    ref other => Err(ParseError::ExpectedCloseParen {
                        found: other.to_string(),
                        offset: close.span.start,
                    }),
                }
            }
            other => Err(ParseError::ExpectedOperand {
                found: other.to_string(),
                offset: token.span.start,
            }),
        }
    }
}

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    span: crate::error::Span { start: 0, end: 0 },
};

/// Parses a token stream produced by [`tokenize`].
///
/// Every token but `Eof` covers at least one character, so streams longer than
/// [`MAX_FORMULA_CHARS`] + 1 cannot come from an acceptable formula.
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    let max = MAX_FORMULA_CHARS + 1;
    if tokens.len() > max {
        return Err(ParseError::TooManyTokens {
            len: tokens.len(),
            max,
        });
    }
    Parser::new(tokens).parse()
}

/// Lexes and parses `source` without checking identifiers against the registry.
pub fn parse_formula(source: &str) -> Result<Expr, FormulaError> {
    let len = source.chars().count();
    if len > MAX_FORMULA_CHARS {
        return Err(FormulaError::TooLong {
            len,
            max: MAX_FORMULA_CHARS,
        });
    }
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}
