//! Maps live underwriting inputs onto registry variable names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::variables::{variables, VariableId};

/// Underwriting form state, as edited by the user.
///
/// Percentages are whole-number percents (`20.0` means 20%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnderwritingInputs {
    pub arv: f64,
    pub repair_costs: f64,
    pub asking_price: f64,
    pub holding_months: f64,
    pub monthly_holding_cost: f64,
    pub buying_closing_costs: f64,
    pub selling_closing_costs: f64,
    pub target_profit_percent: f64,
    pub buy_box_percent: f64,
}

impl UnderwritingInputs {
    /// Value of one registry variable, computing derived variables as needed.
    #[must_use]
    pub fn value_of(&self, id: VariableId) -> f64 {
        match id {
            VariableId::Arv => self.arv,
            VariableId::Repairs => self.repair_costs,
            VariableId::AskingPrice => self.asking_price,
            VariableId::HoldingMonths => self.holding_months,
            VariableId::MonthlyHoldingCost => self.monthly_holding_cost,
            VariableId::HoldingCosts => self.holding_months * self.monthly_holding_cost,
            VariableId::BuyingClosingCosts => self.buying_closing_costs,
            VariableId::SellingClosingCosts => self.selling_closing_costs,
            VariableId::TargetProfitPercent => self.target_profit_percent,
            VariableId::BuyBoxPercent => self.buy_box_percent,
        }
    }
}

/// Variable name to current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormulaContext {
    values: BTreeMap<String, f64>,
}

impl FormulaContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context holding every registry variable at its default value.
    #[must_use]
    pub fn from_defaults() -> Self {
        variables()
            .iter()
            .map(|v| (v.name.to_string(), v.default_value))
            .collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    /// Sets a registry variable by id.
    pub fn set(&mut self, id: VariableId, value: f64) {
        self.values.insert(id.variable().name.to_string(), value);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FormulaContext {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Builds the evaluation context for one recompute. Total: every registry name
/// gets a value.
#[must_use]
pub fn build_formula_context(inputs: &UnderwritingInputs) -> FormulaContext {
    variables()
        .iter()
        .map(|v| (v.name, inputs.value_of(v.id)))
        .collect()
}
