//! Role classifier
//!
//! Case-insensitive substring match against a priority-ordered table.
//! "desembargador" precedes "juiz" because some titles contain both.

use super::{first_match, KeywordRule};
use crate::models::Cargo;

/// Role rules, evaluated top to bottom
pub const CARGO_RULES: &[KeywordRule<Cargo>] = &[
    KeywordRule { keywords: &["desembargador"], result: Cargo::Desembargador },
    KeywordRule { keywords: &["juiz", "juíz"], result: Cargo::Juiz },
    KeywordRule { keywords: &["ministro"], result: Cargo::Ministro },
    KeywordRule { keywords: &["promotor"], result: Cargo::Promotor },
    KeywordRule { keywords: &["procurador"], result: Cargo::Procurador },
    KeywordRule { keywords: &["defensor"], result: Cargo::DefensorPublico },
];

/// Classify a free-text role for the given upstream organ id
///
/// Unmatched roles fall back to the organ's typical member role.
pub fn classify_cargo(role: &str, orgao_id: &str) -> Cargo {
    let role = role.to_lowercase();
    first_match(CARGO_RULES, &role).unwrap_or_else(|| fallback_cargo(orgao_id))
}

fn fallback_cargo(orgao_id: &str) -> Cargo {
    if orgao_id.to_lowercase().starts_with("mp") {
        Cargo::Promotor
    } else {
        Cargo::Juiz
    }
}
