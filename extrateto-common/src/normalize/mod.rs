//! Field normalizers
//!
//! Pure functions turning raw upstream strings into domain values. Every
//! classifier with a fallback chain is written as an ordered rule table
//! evaluated top to bottom, so precedence can be read (and tested) directly.

pub mod categoria;
pub mod cargo;
pub mod currency;
pub mod estado;
pub mod orgao;

pub use categoria::{classify_outras, Bucket, Categoria};
pub use cargo::classify_cargo;
pub use currency::{classify_valor, parse_valor, ValorParse};
pub use estado::{resolve_estado, EstadoResolution};
pub use orgao::{is_federal, map_orgao_id, ORGAOS};

/// One row of an ordered keyword rule table
///
/// Matches when the (already lowercased) input contains any of `keywords`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T: 'static> {
    pub keywords: &'static [&'static str],
    pub result: T,
}

impl<T: Copy> KeywordRule<T> {
    pub fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|kw| haystack.contains(kw))
    }
}

/// First matching rule's result, or `None`
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], haystack: &str) -> Option<T> {
    rules.iter().find(|rule| rule.matches(haystack)).map(|rule| rule.result)
}
