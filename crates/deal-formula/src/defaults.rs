//! Built-in formulas for the three named calculation slots.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::settings::DefaultMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormulaSlot {
    /// Maximum allowable offer.
    Mao,
    /// The 70% rule of thumb.
    Rule70,
    BuyBox,
}

impl FormulaSlot {
    pub const ALL: [FormulaSlot; 3] = [FormulaSlot::Mao, FormulaSlot::Rule70, FormulaSlot::BuyBox];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FormulaSlot::Mao => "mao",
            FormulaSlot::Rule70 => "rule70",
            FormulaSlot::BuyBox => "buyBox",
        }
    }
}

impl fmt::Display for FormulaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulaSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormulaSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown formula slot: {s}"))
    }
}

/// A named slot's formula as the user last saved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFormula {
    name: String,
    expression: String,
    description: String,
    is_default: bool,
}

impl CustomFormula {
    fn canonical(name: &str, expression: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
            description: description.to_string(),
            is_default: true,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the expression still equals the slot's canonical default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Replaces the expression and recomputes `is_default` against `canonical`.
    pub(crate) fn set_expression(
        &mut self,
        expression: impl Into<String>,
        canonical: &str,
        rule: DefaultMatch,
    ) {
        self.expression = expression.into();
        self.refresh_is_default(canonical, rule);
    }

    pub(crate) fn refresh_is_default(&mut self, canonical: &str, rule: DefaultMatch) {
        self.is_default = rule.matches(&self.expression, canonical);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultFormulas {
    pub mao: CustomFormula,
    pub rule70: CustomFormula,
    pub buy_box: CustomFormula,
}

impl DefaultFormulas {
    #[must_use]
    pub fn get(&self, slot: FormulaSlot) -> &CustomFormula {
        match slot {
            FormulaSlot::Mao => &self.mao,
            FormulaSlot::Rule70 => &self.rule70,
            FormulaSlot::BuyBox => &self.buy_box,
        }
    }
}

pub const MAO_EXPRESSION: &str =
    "ARV - Repairs - HoldingCosts - BuyingClosingCosts - SellingClosingCosts - (ARV * TargetProfitPercent / 100)";
pub const RULE70_EXPRESSION: &str = "(ARV * 0.70) - Repairs";
pub const BUY_BOX_EXPRESSION: &str = "(ARV * BuyBoxPercent / 100) - Repairs";

/// The canonical formula for every slot.
#[must_use]
pub fn default_formulas() -> &'static DefaultFormulas {
    static DEFAULTS: OnceLock<DefaultFormulas> = OnceLock::new();
    DEFAULTS.get_or_init(|| DefaultFormulas {
        mao: CustomFormula::canonical(
            "Maximum Allowable Offer",
            MAO_EXPRESSION,
            "Resale value less repairs, holding and closing costs, and the target profit.",
        ),
        rule70: CustomFormula::canonical(
            "70% Rule",
            RULE70_EXPRESSION,
            "70% of the after repair value less repairs.",
        ),
        buy_box: CustomFormula::canonical(
            "Buy Box",
            BUY_BOX_EXPRESSION,
            "The buy box percentage of the after repair value less repairs.",
        ),
    })
}

#[must_use]
pub fn default_formula(slot: FormulaSlot) -> &'static CustomFormula {
    default_formulas().get(slot)
}
