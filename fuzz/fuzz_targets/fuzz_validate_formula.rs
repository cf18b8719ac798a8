#![no_main]

use libfuzzer_sys::fuzz_target;

/// A little past the validator's own limit so the length check is exercised too.
const MAX_FUZZ_FORMULA_CHARS: usize = deal_formula::MAX_FORMULA_CHARS + 256;
const MAX_INPUT_BYTES: usize = MAX_FUZZ_FORMULA_CHARS * 4; // max UTF-8 bytes per char

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };
    let formula = String::from_utf8_lossy(data);

    let verdict = deal_formula::validate_formula(&formula);
    assert_eq!(verdict.valid, verdict.error.is_none());

    // Canonical text of a valid formula must re-parse to the same tree. Canonical
    // spacing can push a formula near the limit past it.
    if let Ok(checked) = deal_formula::check_formula(&formula) {
        let canonical = checked.expr().to_string();
        if canonical.chars().count() <= deal_formula::MAX_FORMULA_CHARS {
            let reparsed = deal_formula::parse_formula(&canonical);
            assert_eq!(reparsed.as_ref(), Ok(checked.expr()));
        }
    }
});
