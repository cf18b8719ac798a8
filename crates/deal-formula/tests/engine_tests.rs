use deal_formula::{
    build_formula_context, check_formula, default_formula, default_formulas, evaluate_formula,
    validate_formula, variables, CustomCalculator, FormulaContext, FormulaSlot, FormulaState,
    UnderwritingInputs, Validation, VariableId,
};
use pretty_assertions::assert_eq;

fn deal_inputs() -> UnderwritingInputs {
    UnderwritingInputs {
        arv: 200_000.0,
        repair_costs: 30_000.0,
        holding_months: 6.0,
        monthly_holding_cost: 1_500.0,
        buying_closing_costs: 5_000.0,
        selling_closing_costs: 16_000.0,
        target_profit_percent: 20.0,
        buy_box_percent: 70.0,
        asking_price: 180_000.0,
    }
}

#[test]
fn seventy_percent_rule_end_to_end() {
    let ctx = build_formula_context(&deal_inputs());
    assert_eq!(evaluate_formula("(ARV * 0.70) - Repairs", &ctx), 110_000.0);
}

#[test]
fn default_formulas_evaluate_against_deal_inputs() {
    let ctx = build_formula_context(&deal_inputs());
    let state = FormulaState::new();
    // 200000 - 30000 - 9000 - 5000 - 16000 - 40000
    assert_eq!(state.evaluate(FormulaSlot::Mao, &ctx), 100_000.0);
    assert_eq!(state.evaluate(FormulaSlot::Rule70, &ctx), 110_000.0);
    assert_eq!(state.evaluate(FormulaSlot::BuyBox, &ctx), 110_000.0);
}

#[test]
fn every_default_formula_validates_and_evaluates_on_registry_defaults() {
    let ctx = FormulaContext::from_defaults();
    for slot in FormulaSlot::ALL {
        let formula = default_formula(slot);
        assert_eq!(validate_formula(formula.expression()), Validation::ok(), "{slot}");
        assert!(evaluate_formula(formula.expression(), &ctx).is_finite());
    }
}

#[test]
fn default_formulas_serialize_by_slot_name() {
    let json = serde_json::to_value(default_formulas()).unwrap();
    assert_eq!(json["rule70"]["expression"], "(ARV * 0.70) - Repairs");
    assert_eq!(json["buyBox"]["isDefault"], true);
    assert_eq!(json["mao"]["name"], "Maximum Allowable Offer");
}

#[test]
fn evaluation_is_deterministic() {
    let ctx = build_formula_context(&deal_inputs());
    let source = "ARV - Repairs - HoldingCosts * 1.1 / (TargetProfitPercent - 3)";
    let first = evaluate_formula(source, &ctx);
    for _ in 0..100 {
        assert_eq!(evaluate_formula(source, &ctx).to_bits(), first.to_bits());
    }
}

#[test]
fn precedence_and_unary_minus() {
    let ctx = FormulaContext::from_defaults();
    assert_eq!(evaluate_formula("2 + 3 * 4", &ctx), 14.0);
    assert_eq!(evaluate_formula("(2 + 3) * 4", &ctx), 20.0);
    assert_eq!(evaluate_formula("-2 * 3", &ctx), -6.0);
}

#[test]
fn division_by_zero_policy() {
    let ctx: FormulaContext = [("ARV", 100.0)].into_iter().collect();
    assert_eq!(evaluate_formula("ARV / 0", &ctx), 0.0);
}

#[test]
fn validation_rejects_bad_formulas() {
    let unknown = validate_formula("ARV * Foo");
    assert!(!unknown.valid);
    assert!(unknown.error.unwrap().contains("Foo"));

    for source in ["(ARV * 2", "ARV * 2)", "", "ARV %", "1.2.3", "ARV Repairs", "* ARV"] {
        let result = validate_formula(source);
        assert!(!result.valid, "{source:?} should be invalid");
        assert!(result.error.is_some_and(|e| !e.is_empty()));
    }
}

#[test]
fn whole_token_matching() {
    assert_eq!(
        validate_formula("ARV2 + 1"),
        Validation::invalid("Unknown variable: ARV2")
    );
    assert_eq!(
        validate_formula("repairs"),
        Validation::invalid("Unknown variable: repairs")
    );
}

#[test]
fn every_registry_variable_is_usable_in_a_formula() {
    let ctx = build_formula_context(&deal_inputs());
    for v in variables() {
        assert!(validate_formula(v.name).valid, "{}", v.name);
        assert_eq!(evaluate_formula(v.name, &ctx), ctx.get(v.name).unwrap());
    }
}

#[test]
fn reset_keeps_custom_calculator() {
    let mut state = FormulaState::new();
    let mut calc = CustomCalculator::new("c1", "Wholesale fee", "AskingPrice * 0.05", "");
    calc.add_input(VariableId::AskingPrice);
    state.set_custom_calculator(calc.clone()).unwrap();

    let saved = state
        .save_formula(FormulaSlot::Mao, default_formula(FormulaSlot::Mao).expression())
        .unwrap();
    assert!(saved.is_default());
    assert!(!state.save_formula(FormulaSlot::Mao, "ARV * 0.5").unwrap().is_default());

    state.reset_to_defaults();
    assert!(FormulaSlot::ALL
        .into_iter()
        .all(|slot| state.formula(slot).is_default()));
    assert_eq!(state.custom_calculator(), Some(&calc));
}

#[test]
fn custom_calculator_end_to_end() {
    let mut calc = CustomCalculator::new("c1", "Wholesale fee", "AskingPrice / 20", "");
    calc.add_input(VariableId::AskingPrice);
    calc.validate().unwrap();
    assert_eq!(calc.evaluate([(VariableId::AskingPrice, 100_000.0)]), 5_000.0);
}

#[test]
fn checked_formula_is_reusable() {
    let formula = check_formula("ARV * BuyBoxPercent / 100 - Repairs").unwrap();
    let mut inputs = deal_inputs();
    assert_eq!(formula.evaluate(&build_formula_context(&inputs)), 110_000.0);
    inputs.buy_box_percent = 75.0;
    assert_eq!(formula.evaluate(&build_formula_context(&inputs)), 120_000.0);
}
