//! Entity model for funerary inscription extraction.
//!
//! Candidates flow through three shapes: [`RawCandidate`] out of the
//! extraction phases, [`ConsolidatedEntity`] out of cross-phase
//! resolution, and [`FinalEntity`] past the confidence filter. Spans
//! always refer to the normalized text.

use crate::confidence::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The closed set of entity categories the extractor produces.
///
/// Declaration order doubles as the overlap-resolution priority for
/// the pattern-matching categories (earlier wins ties).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Personal forename (Gaius, Marcus, ...).
    Praenomen,
    /// Family (gens) name.
    Nomen,
    /// Surname / nickname.
    Cognomen,
    /// Roman voting tribe.
    Tribe,
    /// Dedication formula or civic standing (e.g. "dis manibus").
    Status,
    /// Kinship or social-relation noun.
    Relationship,
    /// Rank or unit of military service.
    MilitaryService,
    /// Age at death in years.
    Age,
    /// Place of origin or residence.
    Location,
    /// Full name of the deceased (grammar phase).
    DeceasedName,
    /// Relationship of the deceased to the dedicator (grammar phase).
    DeceasedRelationship,
    /// Name of a person who set up the monument (grammar phase).
    Dedicator,
    /// Relationship of a dedicator to the deceased (grammar phase).
    DedicatorRelationship,
    /// Filiation statement, e.g. "son of Marcus" (grammar phase).
    Filiation,
    /// Affective formula such as "bene merenti" (grammar phase).
    DedicationSentiment,
}

impl EntityKind {
    /// Snake-case name used in output maps and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Praenomen => "praenomen",
            Self::Nomen => "nomen",
            Self::Cognomen => "cognomen",
            Self::Tribe => "tribe",
            Self::Status => "status",
            Self::Relationship => "relationship",
            Self::MilitaryService => "military_service",
            Self::Age => "age",
            Self::Location => "location",
            Self::DeceasedName => "deceased_name",
            Self::DeceasedRelationship => "deceased_relationship",
            Self::Dedicator => "dedicator",
            Self::DedicatorRelationship => "dedicator_relationship",
            Self::Filiation => "filiation",
            Self::DedicationSentiment => "dedication_sentiment",
        }
    }

    /// Overlap-resolution rank for pattern-phase candidates.
    /// Lower wins when span length and confidence tie.
    #[must_use]
    pub fn priority(self) -> u8 {
        self as u8
    }

    /// Kinds only the grammar and linguistic phases may produce.
    #[must_use]
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::DeceasedName
                | Self::DeceasedRelationship
                | Self::Dedicator
                | Self::DedicatorRelationship
                | Self::Filiation
                | Self::DedicationSentiment
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one extracted slot.
///
/// `index` distinguishes repeated roles (several dedicators on one
/// stone) and is `None` for singleton categories. String keys like
/// `dedicator_2` exist only at the output boundary; inside the
/// pipeline the key stays structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub index: Option<u8>,
}

impl EntityKey {
    /// Key for a singleton category.
    #[must_use]
    pub fn solo(kind: EntityKind) -> Self {
        Self { kind, index: None }
    }

    /// Key for the `n`-th occurrence of a repeatable category
    /// (1-based).
    #[must_use]
    pub fn indexed(kind: EntityKind, n: u8) -> Self {
        Self {
            kind,
            index: Some(n),
        }
    }

    /// Output-map label. `force_index` controls whether a solitary
    /// indexed key keeps its suffix: one dedicator renders as
    /// `dedicator`, two render as `dedicator_1` and `dedicator_2`.
    #[must_use]
    pub fn label(&self, force_index: bool) -> String {
        match self.index {
            Some(n) if force_index => format!("{}_{}", self.kind.as_str(), n),
            _ => self.kind.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(n) => write!(f, "{}_{}", self.kind, n),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Extraction phases, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Regex rule table over normalized text.
    Pattern,
    /// Token-level grammar templates.
    Grammar,
    /// Case/gender tags from the external analyzer.
    Morphology,
    /// Dependency edges from the external analyzer.
    Dependency,
}

impl Phase {
    /// Name used in reports and verbose output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern_matching",
            Self::Grammar => "grammar_templates",
            Self::Morphology => "morphology",
            Self::Dependency => "dependencies",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly the phases agreed on a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agreement {
    /// Two or more phases produced the same value.
    High,
    /// Phases produced conflicting values.
    Low,
    /// Only one phase saw this slot.
    None,
}

/// One candidate emitted by a single phase, before consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub key: EntityKey,
    /// Byte offset into the normalized text (inclusive).
    pub start: usize,
    /// Byte offset into the normalized text (exclusive).
    pub end: usize,
    /// Canonical rendered value, e.g. `Gaius` or `dis manibus`.
    pub value: String,
    pub confidence: Confidence,
    pub phase: Phase,
}

impl RawCandidate {
    #[must_use]
    pub fn new(
        key: EntityKey,
        start: usize,
        end: usize,
        value: impl Into<String>,
        confidence: Confidence,
        phase: Phase,
    ) -> Self {
        Self {
            key,
            start,
            end,
            value: value.into(),
            confidence,
            phase,
        }
    }

    /// Span length in bytes of normalized text.
    #[must_use]
    pub fn span_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether two candidates occupy intersecting spans.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A rejected value retained for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeValue {
    pub value: String,
    pub confidence: Confidence,
}

/// One slot after cross-phase resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedEntity {
    pub key: EntityKey,
    pub value: String,
    pub confidence: Confidence,
    pub agreement: Agreement,
    pub source_phases: BTreeSet<Phase>,
    /// Losing values, descending by confidence. Never contains the
    /// chosen value.
    pub alternatives: Vec<AlternativeValue>,
}

/// One slot in the caller-facing output map.
///
/// `agreement` and `source_phases` are populated only in verbose
/// mode and omitted from serialized output otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEntity {
    pub value: String,
    pub confidence: Confidence,
    pub ambiguous: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<Agreement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_phases: Option<Vec<String>>,
}
