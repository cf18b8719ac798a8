//! Tree-walking evaluator.
//!
//! Evaluation runs on every edit of the underwriting form, so it is total: malformed
//! text, missing variables and division by zero all yield `0.0` instead of an error,
//! and the result is always finite.

use crate::ast::{BinaryOp, Expr};
use crate::context::FormulaContext;
use crate::parser::parse_formula;
use crate::validate::Formula;

/// Evaluates a parsed expression. Non-finite intermediate values are possible (e.g.
/// from NaN context entries); [`evaluate_formula`] and [`Formula::evaluate`] clamp the
/// final result.
#[must_use]
pub fn evaluate(expr: &Expr, ctx: &FormulaContext) -> f64 {
    match expr {
        Expr::Literal(n) => *n,
        Expr::Variable(name) => ctx.get(name).unwrap_or_else(|| {
            log::debug!("variable {name} missing from formula context; using 0");
            0.0
        }),
        Expr::UnaryMinus(operand) => -evaluate(operand, ctx),
        Expr::BinaryOp { op, left, right } => {
            let a = evaluate(left, ctx);
            let b = evaluate(right, ctx);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => {
                    if b == 0.0 {
                        log::debug!("division by zero in formula; using 0");
                        0.0
                    } else {
                        a / b
                    }
                }
            }
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::debug!("formula produced non-finite value {value}; using 0");
        0.0
    }
}

/// Parses and evaluates `source`. Returns `0.0` when the text does not parse.
///
/// Callers are expected to gate text through [`crate::validate_formula`] before
/// saving it, but this function does not rely on that.
#[must_use]
pub fn evaluate_formula(source: &str, ctx: &FormulaContext) -> f64 {
    match parse_formula(source) {
        Ok(expr) => finite_or_zero(evaluate(&expr, ctx)),
        Err(err) => {
            log::debug!("cannot evaluate formula {source:?}: {err}");
            0.0
        }
    }
}

impl Formula {
    /// Evaluates an already-validated formula; same fallbacks as [`evaluate_formula`].
    #[must_use]
    pub fn evaluate(&self, ctx: &FormulaContext) -> f64 {
        finite_or_zero(evaluate(self.expr(), ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_formula;
    use pretty_assertions::assert_eq;

    fn ctx(pairs: &[(&str, f64)]) -> FormulaContext {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn respects_precedence_and_grouping() {
        let empty = FormulaContext::new();
        assert_eq!(evaluate_formula("2 + 3 * 4", &empty), 14.0);
        assert_eq!(evaluate_formula("(2 + 3) * 4", &empty), 20.0);
        assert_eq!(evaluate_formula("-2 * 3", &empty), -6.0);
        assert_eq!(evaluate_formula("10 - 4 - 3", &empty), 3.0);
        assert_eq!(evaluate_formula("16 / 4 / 2", &empty), 2.0);
        assert_eq!(evaluate_formula("--5", &empty), 5.0);
    }

    #[test]
    fn division_by_zero_is_zero() {
        let c = ctx(&[("ARV", 100.0), ("Repairs", 0.0)]);
        assert_eq!(evaluate_formula("ARV / 0", &c), 0.0);
        assert_eq!(evaluate_formula("ARV / Repairs", &c), 0.0);
        assert_eq!(evaluate_formula("ARV / (Repairs * -1)", &c), 0.0);
        assert_eq!(evaluate_formula("1 + ARV / 0", &c), 1.0);
    }

    #[test]
    fn missing_variable_is_zero() {
        let c = ctx(&[("ARV", 100.0)]);
        assert_eq!(evaluate_formula("ARV - Repairs", &c), 100.0);
        assert_eq!(evaluate_formula("Nope * 3 + 1", &c), 1.0);
    }

    #[test]
    fn malformed_input_is_zero() {
        let c = FormulaContext::from_defaults();
        for source in ["", "(ARV", "ARV)", "ARV %", "1..2", "*"] {
            assert_eq!(evaluate_formula(source, &c), 0.0, "{source}");
        }
    }

    #[test]
    fn non_finite_results_are_zero() {
        let c = ctx(&[("ARV", f64::NAN), ("Repairs", f64::INFINITY)]);
        assert_eq!(evaluate_formula("ARV + 1", &c), 0.0);
        assert_eq!(evaluate_formula("Repairs", &c), 0.0);
        let huge = format!("1{} * 10", "0".repeat(308));
        assert_eq!(evaluate_formula(&huge, &FormulaContext::new()), 0.0);
    }

    #[test]
    fn long_sums_evaluate_up_to_the_length_limit() {
        let c = FormulaContext::from_defaults();
        let terms = (crate::MAX_FORMULA_CHARS - 1) / 2;
        let at_limit = format!("1{}", "+1".repeat(terms));
        assert_eq!(evaluate_formula(&at_limit, &c), (terms + 1) as f64);

        let pasted = format!("1{}", "+1".repeat(50_000));
        assert_eq!(evaluate_formula(&pasted, &c), 0.0);
    }

    #[test]
    fn compiled_formula_matches_source_evaluation() {
        let c = FormulaContext::from_defaults();
        let formula = check_formula("(ARV * 0.70) - Repairs").unwrap();
        assert_eq!(formula.evaluate(&c), 110_000.0);
        assert_eq!(
            formula.evaluate(&c),
            evaluate_formula(formula.source(), &c)
        );
    }
}
