//! Output types of the external linguistic analyzer.
//!
//! The extractor never computes these itself; an adapter produces
//! them and the morphology and dependency phases consume them as
//! opaque input.

use serde::{Deserialize, Serialize};

/// Latin grammatical case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Nominative,
    Genitive,
    Dative,
    Accusative,
    Ablative,
    Vocative,
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Number {
    Singular,
    Plural,
}

/// Coarse part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pos {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Numeral,
    Other,
}

/// Morphological analysis of one token.
///
/// Offsets refer to the normalized text the analyzer was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticTag {
    pub start: usize,
    pub end: usize,
    pub pos: Pos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<Case>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Number>,
}

impl LinguisticTag {
    /// Whether this token carries the given case.
    #[must_use]
    pub fn has_case(&self, case: Case) -> bool {
        self.case == Some(case)
    }
}

/// One edge of a dependency parse.
///
/// `head` and `dependent` are token indices into the tag sequence
/// produced for the same text; `relation` is a Universal
/// Dependencies-style label such as `nsubj` or `nmod`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub head: usize,
    pub dependent: usize,
    pub relation: String,
}
