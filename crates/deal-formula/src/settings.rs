use serde::{Deserialize, Serialize};

/// Engine options chosen by the host application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormulaSettings {
    /// How saved formula text is compared with a slot's canonical default.
    pub default_match: DefaultMatch,
}

/// Comparison used to decide whether a saved formula is still the default.
///
/// The same rule is applied on save and when loading persisted state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultMatch {
    /// Byte-for-byte equality: `ARV*0.7` differs from `ARV * 0.7`.
    #[default]
    Exact,
    /// Equality after removing all whitespace.
    IgnoreWhitespace,
}

impl DefaultMatch {
    #[must_use]
    pub fn matches(self, candidate: &str, canonical: &str) -> bool {
        match self {
            DefaultMatch::Exact => candidate == canonical,
            DefaultMatch::IgnoreWhitespace => {
                let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
                strip(candidate) == strip(canonical)
            }
        }
    }
}
