#![no_main]

use libfuzzer_sys::fuzz_target;

const MAX_EVAL_FORMULA_CHARS: usize = 2_048;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    // Scales every context value, including to zero and negative values.
    let scale = f64::from(selector) - 128.0;
    let input = String::from_utf8_lossy(rest);
    let formula: String = input.chars().take(MAX_EVAL_FORMULA_CHARS).collect();

    let ctx: deal_formula::FormulaContext = deal_formula::variables()
        .iter()
        .map(|v| (v.name, v.default_value * scale))
        .collect();

    let value = deal_formula::evaluate_formula(&formula, &ctx);
    assert!(value.is_finite());
    assert_eq!(
        value.to_bits(),
        deal_formula::evaluate_formula(&formula, &ctx).to_bits()
    );
});
