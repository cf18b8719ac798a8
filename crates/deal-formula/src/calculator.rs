//! The single free-form calculator a user may define.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::context::FormulaContext;
use crate::error::CalculatorError;
use crate::eval::evaluate_formula;
use crate::validate::{check_formula, Formula};
use crate::variables::{lookup_variable, VariableId};

/// A registry variable exposed as an adjustable calculator field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCalculatorInput {
    pub variable_id: VariableId,
    pub label: String,
    pub default_value: f64,
}

impl CustomCalculatorInput {
    /// Binds `id` with the registry's label and default value.
    #[must_use]
    pub fn from_variable(id: VariableId) -> Self {
        let variable = id.variable();
        Self {
            variable_id: id,
            label: variable.label.to_string(),
            default_value: variable.default_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCalculator {
    id: String,
    name: String,
    formula: String,
    inputs: Vec<CustomCalculatorInput>,
    description: String,
}

impl<'de> Deserialize<'de> for CustomCalculator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Helper {
            id: String,
            name: String,
            formula: String,
            #[serde(default)]
            inputs: Vec<CustomCalculatorInput>,
            #[serde(default)]
            description: String,
        }

        let helper = Helper::deserialize(deserializer)?;
        let mut calc =
            CustomCalculator::new(helper.id, helper.name, helper.formula, helper.description);
        for input in helper.inputs {
            let id = input.variable_id;
            if !calc.add_input_with(input) {
                return Err(D::Error::custom(CalculatorError::DuplicateInput(id)));
            }
        }
        calc.validate().map_err(D::Error::custom)?;
        Ok(calc)
    }
}

impl CustomCalculator {
    /// Creates a calculator without inputs. The formula is not checked until
    /// [`CustomCalculator::validate`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        formula: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            formula: formula.into(),
            inputs: Vec::new(),
            description: description.into(),
        }
    }

    /// Loads a persisted definition. Duplicate inputs and anything
    /// [`CustomCalculator::validate`] refuses are reported as `InvalidJson`.
    pub fn from_json_str(json: &str) -> Result<Self, CalculatorError> {
        serde_json::from_str(json).map_err(|err| CalculatorError::InvalidJson(err.to_string()))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn formula(&self) -> &str {
        &self.formula
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn inputs(&self) -> &[CustomCalculatorInput] {
        &self.inputs
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces the formula if it validates; otherwise leaves the calculator unchanged.
    pub fn set_formula(&mut self, formula: impl Into<String>) -> Result<(), CalculatorError> {
        let formula = formula.into();
        check_formula(&formula)?;
        self.formula = formula;
        Ok(())
    }

    /// Binds a registry variable as an input. Returns `false` (and changes nothing)
    /// if the variable is already an input.
    pub fn add_input(&mut self, id: VariableId) -> bool {
        self.add_input_with(CustomCalculatorInput::from_variable(id))
    }

    /// Like [`CustomCalculator::add_input`] with a caller-chosen label and default.
    pub fn add_input_with(&mut self, input: CustomCalculatorInput) -> bool {
        if self.has_input(input.variable_id) {
            log::debug!(
                "calculator {} already has input {}",
                self.id,
                input.variable_id
            );
            return false;
        }
        self.inputs.push(input);
        true
    }

    pub fn remove_input(&mut self, id: VariableId) -> bool {
        let before = self.inputs.len();
        self.inputs.retain(|input| input.variable_id != id);
        self.inputs.len() != before
    }

    pub fn set_input_default(&mut self, id: VariableId, value: f64) -> Result<(), CalculatorError> {
        let input = self
            .inputs
            .iter_mut()
            .find(|input| input.variable_id == id)
            .ok_or(CalculatorError::MissingInput(id))?;
        input.default_value = value;
        Ok(())
    }

    #[must_use]
    pub fn has_input(&self, id: VariableId) -> bool {
        self.inputs.iter().any(|input| input.variable_id == id)
    }

    /// Save gate: the name must be non-blank and the formula must validate.
    pub fn validate(&self) -> Result<Formula, CalculatorError> {
        if self.name.trim().is_empty() {
            return Err(CalculatorError::EmptyName);
        }
        Ok(check_formula(&self.formula)?)
    }

    /// Registry variables the formula references that are not bound as inputs.
    /// Those evaluate at their registry defaults.
    #[must_use]
    pub fn unbound_variables(&self) -> Vec<VariableId> {
        let Ok(formula) = check_formula(&self.formula) else {
            return Vec::new();
        };
        formula
            .variables()
            .into_iter()
            .filter_map(lookup_variable)
            .map(|v| v.id)
            .filter(|id| !self.has_input(*id))
            .collect()
    }

    /// Registry defaults, overlaid with each input's default, overlaid with `values`.
    ///
    /// Values for variables that are not inputs of this calculator are ignored.
    pub fn context<I>(&self, values: I) -> FormulaContext
    where
        I: IntoIterator<Item = (VariableId, f64)>,
    {
        let mut ctx = FormulaContext::from_defaults();
        for input in &self.inputs {
            ctx.set(input.variable_id, input.default_value);
        }
        for (id, value) in values {
            if self.has_input(id) {
                ctx.set(id, value);
            } else {
                log::debug!("ignoring value for {id}: not an input of calculator {}", self.id);
            }
        }
        ctx
    }

    /// Evaluates the calculator formula with the given input values.
    pub fn evaluate<I>(&self, values: I) -> f64
    where
        I: IntoIterator<Item = (VariableId, f64)>,
    {
        evaluate_formula(&self.formula, &self.context(values))
    }
}
