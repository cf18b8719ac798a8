//! The closed vocabulary of names a formula may reference.
//!
//! The registry is static and ordered; the order is the order the editor offers
//! variables in its "insert variable" menu.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier for a registry entry.
///
/// Serialized as a camelCase string (`"arv"`, `"holdingCosts"`, ...) so persisted
/// calculator inputs stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableId {
    Arv,
    Repairs,
    AskingPrice,
    HoldingMonths,
    MonthlyHoldingCost,
    HoldingCosts,
    BuyingClosingCosts,
    SellingClosingCosts,
    TargetProfitPercent,
    BuyBoxPercent,
}

impl VariableId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariableId::Arv => "arv",
            VariableId::Repairs => "repairs",
            VariableId::AskingPrice => "askingPrice",
            VariableId::HoldingMonths => "holdingMonths",
            VariableId::MonthlyHoldingCost => "monthlyHoldingCost",
            VariableId::HoldingCosts => "holdingCosts",
            VariableId::BuyingClosingCosts => "buyingClosingCosts",
            VariableId::SellingClosingCosts => "sellingClosingCosts",
            VariableId::TargetProfitPercent => "targetProfitPercent",
            VariableId::BuyBoxPercent => "buyBoxPercent",
        }
    }

    /// The registry entry for this id.
    #[must_use]
    pub fn variable(self) -> &'static FormulaVariable {
        // `FORMULA_VARIABLES` is declared in enum order.
        &FORMULA_VARIABLES[self as usize]
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableId {
    type Err = String;

    /// Accepts either the id (`holdingCosts`) or the expression token (`HoldingCosts`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMULA_VARIABLES
            .iter()
            .find(|v| v.id.as_str() == s || v.name == s)
            .map(|v| v.id)
            .ok_or_else(|| format!("unknown variable: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaVariable {
    pub id: VariableId,
    /// Token used inside expressions.
    pub name: &'static str,
    pub label: &'static str,
    pub default_value: f64,
}

const fn var(
    id: VariableId,
    name: &'static str,
    label: &'static str,
    default_value: f64,
) -> FormulaVariable {
    FormulaVariable {
        id,
        name,
        label,
        default_value,
    }
}

static FORMULA_VARIABLES: [FormulaVariable; 10] = [
    var(VariableId::Arv, "ARV", "After Repair Value", 200_000.0),
    var(VariableId::Repairs, "Repairs", "Repair Costs", 30_000.0),
    var(VariableId::AskingPrice, "AskingPrice", "Asking Price", 180_000.0),
    var(
        VariableId::HoldingMonths,
        "HoldingMonths",
        "Holding Period (months)",
        6.0,
    ),
    var(
        VariableId::MonthlyHoldingCost,
        "MonthlyHoldingCost",
        "Monthly Holding Cost",
        1_500.0,
    ),
    var(
        VariableId::HoldingCosts,
        "HoldingCosts",
        "Total Holding Costs",
        9_000.0,
    ),
    var(
        VariableId::BuyingClosingCosts,
        "BuyingClosingCosts",
        "Buying Closing Costs",
        5_000.0,
    ),
    var(
        VariableId::SellingClosingCosts,
        "SellingClosingCosts",
        "Selling Closing Costs",
        16_000.0,
    ),
    var(
        VariableId::TargetProfitPercent,
        "TargetProfitPercent",
        "Target Profit (%)",
        20.0,
    ),
    var(VariableId::BuyBoxPercent, "BuyBoxPercent", "Buy Box (%)", 70.0),
];

/// All registry entries, in display order.
#[must_use]
pub fn variables() -> &'static [FormulaVariable] {
    &FORMULA_VARIABLES
}

/// Looks up a variable by its expression token. Matching is case-sensitive.
#[must_use]
pub fn lookup_variable(name: &str) -> Option<&'static FormulaVariable> {
    FORMULA_VARIABLES.iter().find(|v| v.name == name)
}

#[must_use]
pub fn is_known_variable(name: &str) -> bool {
    lookup_variable(name).is_some()
}
