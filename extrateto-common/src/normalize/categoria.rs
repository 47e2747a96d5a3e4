//! Pay-component categories
//!
//! Each upstream line item carries a `categoria_contracheque` discriminator
//! and, for `outras`, a free-text `desambiguacao_macro` tag used to place the
//! amount into one of three legal buckets.

use std::fmt;

use super::{first_match, KeywordRule};

/// Line-item discriminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Categoria {
    /// Base salary
    Base,
    /// Benefits, sub-classified by tag
    Outras,
    /// Withholdings; always skipped (totals are gross)
    Descontos,
    /// Anything else upstream may send; skipped
    Other(String),
}

impl Categoria {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "base" => Categoria::Base,
            "outras" => Categoria::Outras,
            "descontos" => Categoria::Descontos,
            other => Categoria::Other(other.to_string()),
        }
    }
}

/// Destination bucket for an `outras` line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Verbas indenizatórias: aid, allowances, housing, health, transport
    Indenizatorias,
    /// Direitos eventuais: vacation, 13th-month, per-diems, leave, cash conversion
    Eventuais,
    /// Direitos pessoais: tenure, gratification, acting-role premiums
    Pessoais,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bucket::Indenizatorias => "verbas_indenizatorias",
            Bucket::Eventuais => "direitos_eventuais",
            Bucket::Pessoais => "direitos_pessoais",
        };
        f.write_str(name)
    }
}

/// `outras` sub-classification rules, evaluated top to bottom
pub const OUTRAS_RULES: &[KeywordRule<Bucket>] = &[
    KeywordRule {
        keywords: &["aux-", "alimentacao", "saude", "moradia", "transporte"],
        result: Bucket::Indenizatorias,
    },
    KeywordRule {
        keywords: &["ferias", "natalina", "abono", "licenca", "diarias", "pecunia"],
        result: Bucket::Eventuais,
    },
    KeywordRule {
        keywords: &["tempo-de-servico", "gratificacao", "substituicao"],
        result: Bucket::Pessoais,
    },
];

/// Bucket for unrecognized tags: fail open into the indemnity bucket
pub const FALLBACK_BUCKET: Bucket = Bucket::Indenizatorias;

/// Matching bucket for a tag, or `None` when no rule applies
pub fn match_outras(tag: &str) -> Option<Bucket> {
    first_match(OUTRAS_RULES, &tag.to_lowercase())
}

/// Bucket for a tag, using [`FALLBACK_BUCKET`] when unrecognized
pub fn classify_outras(tag: &str) -> Bucket {
    match_outras(tag).unwrap_or(FALLBACK_BUCKET)
}
