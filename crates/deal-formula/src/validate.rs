//! Save-time gate for formula text.

use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::FormulaError;
use crate::parser::parse_formula;
use crate::variables::is_known_variable;

/// Verdict returned to the formula editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

impl From<Result<Formula, FormulaError>> for Validation {
    fn from(result: Result<Formula, FormulaError>) -> Self {
        match result {
            Ok(_) => Validation::ok(),
            Err(err) => Validation::invalid(err.to_string()),
        }
    }
}

/// A formula that lexed, parsed and only references registry variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Registry names referenced by the formula, in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        self.expr.variables()
    }
}

/// Structured form of [`validate_formula`].
pub fn check_formula(source: &str) -> Result<Formula, FormulaError> {
    if source.trim().is_empty() {
        return Err(FormulaError::Empty);
    }

    let expr = parse_formula(source)?;

    let mut unknown = None;
    expr.visit_variables(&mut |name| {
        if unknown.is_none() && !is_known_variable(name) {
            unknown = Some(name.to_string());
        }
    });
    if let Some(name) = unknown {
        return Err(FormulaError::UnknownVariable(name));
    }

    Ok(Formula {
        source: source.to_string(),
        expr,
    })
}

/// Validates user-entered formula text before it may be saved.
///
/// Never panics; every failure is reported as `valid: false` with a message suitable
/// for showing inline next to the editor.
#[must_use]
pub fn validate_formula(source: &str) -> Validation {
    check_formula(source).into()
}
