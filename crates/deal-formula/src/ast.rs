use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide => 2,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(f64),
    Variable(String),
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryMinus(Box<Expr>),
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Expr) -> Self {
        Expr::UnaryMinus(Box::new(operand))
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => ATOM_PRECEDENCE,
            Expr::UnaryMinus(_) => UNARY_PRECEDENCE,
            Expr::BinaryOp { op, .. } => op.precedence(),
        }
    }

    /// Calls `f` for every variable reference, left to right. Repeats are reported
    /// each time they occur.
    pub fn visit_variables<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a str),
    {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(name) => f(name),
            Expr::UnaryMinus(operand) => operand.visit_variables(f),
            Expr::BinaryOp { left, right, .. } => {
                left.visit_variables(f);
                right.visit_variables(f);
            }
        }
    }

    /// Distinct variable names in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.visit_variables(&mut |name| {
            if !out.contains(&name) {
                out.push(name);
            }
        });
        out
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Renders canonical formula text: single spaces around binary operators and only
/// the parentheses needed to re-parse into the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{n}"),
            Expr::Variable(name) => f.write_str(name),
            Expr::UnaryMinus(operand) => {
                f.write_str("-")?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            Expr::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                write_operand(f, left, left.precedence() < prec)?;
                write!(f, " {} ", op.symbol())?;
                // Operators are left-associative, so an equal-precedence right operand
                // needs parentheses to keep its grouping.
                write_operand(f, right, right.precedence() <= prec)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    #[test]
    fn display_uses_minimal_parentheses() {
        let expr = Expr::binary(
            BinaryOp::Subtract,
            Expr::binary(BinaryOp::Multiply, var("ARV"), Expr::Literal(0.7)),
            var("Repairs"),
        );
        assert_eq!(expr.to_string(), "ARV * 0.7 - Repairs");

        let expr = Expr::binary(
            BinaryOp::Subtract,
            var("ARV"),
            Expr::binary(BinaryOp::Add, var("Repairs"), var("HoldingCosts")),
        );
        assert_eq!(expr.to_string(), "ARV - (Repairs + HoldingCosts)");

        let expr = Expr::negate(Expr::binary(BinaryOp::Add, var("ARV"), Expr::Literal(1.0)));
        assert_eq!(expr.to_string(), "-(ARV + 1)");
    }

    #[test]
    fn variables_are_unique_and_leftmost_first() {
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Multiply, var("Repairs"), var("ARV")),
            Expr::negate(var("Repairs")),
        );
        assert_eq!(expr.variables(), vec!["Repairs", "ARV"]);
    }
}
