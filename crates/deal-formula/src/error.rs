use serde::{Deserialize, Serialize};

use crate::defaults::FormulaSlot;
use crate::variables::VariableId;

/// Byte range into the formula source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("Malformed number '{text}' at position {offset}")]
    MalformedNumber { text: String, offset: usize },
}

impl LexError {
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. } | LexError::MalformedNumber { offset, .. } => {
                *offset
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Expected number, variable, or '(' but found {found} at position {offset}")]
    ExpectedOperand { found: String, offset: usize },

    #[error("Missing closing ')' for '(' at position {open}")]
    UnclosedParen { open: usize },

    #[error("Expected ')' but found {found} at position {offset}")]
    ExpectedCloseParen { found: String, offset: usize },

    #[error("Unmatched ')' at position {offset}")]
    UnmatchedCloseParen { offset: usize },

    #[error("Unexpected {found} after end of formula at position {offset}")]
    TrailingInput { found: String, offset: usize },

    #[error("Formula is nested too deeply (maximum depth {max})")]
    TooDeep { max: usize },

    #[error("Formula has too many tokens ({len}, maximum {max})")]
    TooManyTokens { len: usize, max: usize },
}

/// Everything that makes formula text unacceptable for saving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("Formula cannot be empty")]
    Empty,

    #[error("Formula is too long ({len} characters, maximum {max})")]
    TooLong { len: usize, max: usize },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    #[error("invalid calculator formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("calculator name cannot be empty")]
    EmptyName,

    #[error("duplicate calculator input: {0}")]
    DuplicateInput(VariableId),

    #[error("calculator has no input for {0}")]
    MissingInput(VariableId),

    #[error("invalid calculator json: {0}")]
    InvalidJson(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("invalid formula state json: {0}")]
    InvalidJson(String),

    #[error("invalid saved {slot} formula: {source}")]
    InvalidFormula {
        slot: FormulaSlot,
        #[source]
        source: FormulaError,
    },
}
