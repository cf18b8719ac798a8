//! A user's formula configuration: the three named slots plus the optional
//! custom calculator. Loading and storing it is the host's job; this type only
//! enforces the save gate and the `is_default` bookkeeping.

use serde::{Deserialize, Serialize};

use crate::calculator::CustomCalculator;
use crate::context::FormulaContext;
use crate::defaults::{default_formula, CustomFormula, FormulaSlot};
use crate::error::{CalculatorError, FormulaError, StateError};
use crate::eval::evaluate_formula;
use crate::settings::FormulaSettings;
use crate::validate::check_formula;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaState {
    #[serde(skip)]
    settings: FormulaSettings,
    mao: CustomFormula,
    rule70: CustomFormula,
    buy_box: CustomFormula,
    #[serde(default)]
    custom_calculator: Option<CustomCalculator>,
}

impl Default for FormulaState {
    fn default() -> Self {
        Self::with_settings(FormulaSettings::default())
    }
}

impl FormulaState {
    /// Every slot at its default and no custom calculator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: FormulaSettings) -> Self {
        Self {
            settings,
            mao: default_formula(FormulaSlot::Mao).clone(),
            rule70: default_formula(FormulaSlot::Rule70).clone(),
            buy_box: default_formula(FormulaSlot::BuyBox).clone(),
            custom_calculator: None,
        }
    }

    /// Loads persisted state. Every saved expression must still pass the save gate;
    /// a stored calculator is checked while it is deserialized. `isDefault` flags in
    /// the JSON are ignored and recomputed under `settings`.
    pub fn from_json_str(json: &str, settings: FormulaSettings) -> Result<Self, StateError> {
        let mut state: FormulaState =
            serde_json::from_str(json).map_err(|err| StateError::InvalidJson(err.to_string()))?;
        state.settings = settings;
        for slot in FormulaSlot::ALL {
            check_formula(state.formula(slot).expression())
                .map_err(|source| StateError::InvalidFormula { slot, source })?;
            let canonical = default_formula(slot).expression();
            let rule = state.settings.default_match;
            state.formula_mut(slot).refresh_is_default(canonical, rule);
        }
        Ok(state)
    }

    pub fn to_json_string(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(|err| StateError::InvalidJson(err.to_string()))
    }

    #[must_use]
    pub fn settings(&self) -> FormulaSettings {
        self.settings
    }

    #[must_use]
    pub fn formula(&self, slot: FormulaSlot) -> &CustomFormula {
        match slot {
            FormulaSlot::Mao => &self.mao,
            FormulaSlot::Rule70 => &self.rule70,
            FormulaSlot::BuyBox => &self.buy_box,
        }
    }

    fn formula_mut(&mut self, slot: FormulaSlot) -> &mut CustomFormula {
        match slot {
            FormulaSlot::Mao => &mut self.mao,
            FormulaSlot::Rule70 => &mut self.rule70,
            FormulaSlot::BuyBox => &mut self.buy_box,
        }
    }

    /// Stores `expression` in `slot` if it validates. Invalid text is refused and the
    /// slot keeps its previous expression.
    pub fn save_formula(
        &mut self,
        slot: FormulaSlot,
        expression: &str,
    ) -> Result<&CustomFormula, FormulaError> {
        if let Err(err) = check_formula(expression) {
            log::debug!("refusing to save {slot} formula: {err}");
            return Err(err);
        }
        let canonical = default_formula(slot).expression();
        let rule = self.settings.default_match;
        let formula = self.formula_mut(slot);
        formula.set_expression(expression, canonical, rule);
        Ok(formula)
    }

    /// Restores the three named slots. The custom calculator is left alone.
    pub fn reset_to_defaults(&mut self) {
        for slot in FormulaSlot::ALL {
            self.reset_formula(slot);
        }
    }

    pub fn reset_formula(&mut self, slot: FormulaSlot) {
        *self.formula_mut(slot) = default_formula(slot).clone();
    }

    #[must_use]
    pub fn evaluate(&self, slot: FormulaSlot, ctx: &FormulaContext) -> f64 {
        evaluate_formula(self.formula(slot).expression(), ctx)
    }

    #[must_use]
    pub fn custom_calculator(&self) -> Option<&CustomCalculator> {
        self.custom_calculator.as_ref()
    }

    /// Creates or replaces the custom calculator after validating it.
    pub fn set_custom_calculator(&mut self, calc: CustomCalculator) -> Result<(), CalculatorError> {
        calc.validate()?;
        self.custom_calculator = Some(calc);
        Ok(())
    }

    /// Removes the custom calculator, returning it.
    pub fn delete_custom_calculator(&mut self) -> Option<CustomCalculator> {
        self.custom_calculator.take()
    }
}
