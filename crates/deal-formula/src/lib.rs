#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Arithmetic formulas over a closed vocabulary of deal underwriting variables.
//!
//! Users write formulas such as `ARV * 0.65 - Repairs`. The engine:
//! - validates text before it is saved ([`validate_formula`] / [`check_formula`]),
//! - builds a variable context from live form inputs ([`build_formula_context`]),
//! - evaluates formulas on every edit ([`evaluate_formula`]).
//!
//! Text is lexed and parsed into an [`Expr`] tree and walked explicitly; nothing is
//! ever handed to a general-purpose interpreter. Every call is a pure function of its
//! arguments, so evaluation from several threads needs no locking.
//!
//! The grammar, lowest precedence first:
//!
//! ```text
//! expr     := term (("+" | "-") term)*
//! term     := factor (("*" | "/") factor)*
//! factor   := "-" factor | primary
//! primary  := Number | Identifier | "(" expr ")"
//! ```
//!
//! Evaluation never fails: unparsable text, variables missing from the context, division
//! by zero and non-finite results all evaluate to `0.0`.
//!
//! ```
//! use deal_formula::{
//!     build_formula_context, evaluate_formula, validate_formula, UnderwritingInputs,
//! };
//!
//! let inputs = UnderwritingInputs {
//!     arv: 200_000.0,
//!     repair_costs: 30_000.0,
//!     ..Default::default()
//! };
//! let ctx = build_formula_context(&inputs);
//! assert!(validate_formula("(ARV * 0.70) - Repairs").valid);
//! assert_eq!(evaluate_formula("(ARV * 0.70) - Repairs", &ctx), 110_000.0);
//! ```

mod ast;
mod calculator;
mod context;
mod defaults;
mod error;
mod eval;
pub mod lexer;
pub mod parser;
mod settings;
mod state;
mod validate;
mod variables;

pub use crate::ast::{BinaryOp, Expr};
pub use crate::calculator::{CustomCalculator, CustomCalculatorInput};
pub use crate::context::{build_formula_context, FormulaContext, UnderwritingInputs};
pub use crate::defaults::{
    default_formula, default_formulas, CustomFormula, DefaultFormulas, FormulaSlot,
    BUY_BOX_EXPRESSION, MAO_EXPRESSION, RULE70_EXPRESSION,
};
pub use crate::error::{CalculatorError, FormulaError, LexError, ParseError, Span, StateError};
pub use crate::eval::{evaluate, evaluate_formula};
pub use crate::lexer::{tokenize, Token, TokenKind};
pub use crate::parser::{parse, parse_formula, MAX_FORMULA_CHARS, MAX_NESTING_DEPTH};
pub use crate::settings::{DefaultMatch, FormulaSettings};
pub use crate::state::FormulaState;
pub use crate::validate::{check_formula, validate_formula, Formula, Validation};
pub use crate::variables::{
    is_known_variable, lookup_variable, variables, FormulaVariable, VariableId,
};
