//! Diagnostic extraction report.
//!
//! A verbose view over the same extraction run: which phases ran,
//! how many entities each contributed, and a coarse structural
//! reading of the inscription.

use crate::lexicon::is_dedication_verb;
use crate::normalize::NormalizedText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use titulus_core::{FinalEntity, Phase, RawCandidate};

/// Coarse structural classification of an inscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// One person group at most.
    Simple,
    /// Two or more distinct dedicator/deceased groups.
    MultiPerson,
}

/// High-level structure of the dedication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralAnalysis {
    pub word_count: usize,
    pub main_verb: Option<String>,
    pub has_coordination: bool,
    pub person_groups: usize,
    pub complexity: Complexity,
}

/// Per-run extraction counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub total_entities: usize,
    /// Raw candidate counts per phase, before consolidation.
    pub candidates_by_phase: BTreeMap<String, usize>,
}

/// The full diagnostic view returned by
/// [`HybridExtractor::extraction_report`](crate::HybridExtractor::extraction_report).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub text: String,
    pub entities: BTreeMap<String, FinalEntity>,
    pub phases_used: Vec<String>,
    pub statistics: ReportStatistics,
    pub structural_analysis: StructuralAnalysis,
}

pub(crate) fn statistics(
    candidates: &[RawCandidate],
    entities: &BTreeMap<String, FinalEntity>,
) -> ReportStatistics {
    let mut by_phase: BTreeMap<String, usize> = BTreeMap::new();
    for cand in candidates {
        *by_phase.entry(cand.phase.as_str().to_string()).or_default() += 1;
    }
    ReportStatistics {
        total_entities: entities.len(),
        candidates_by_phase: by_phase,
    }
}

pub(crate) fn structural_analysis(
    norm: &NormalizedText,
    entities: &BTreeMap<String, FinalEntity>,
) -> StructuralAnalysis {
    let tokens = norm.tokens();
    let main_verb = tokens
        .iter()
        .find(|t| is_dedication_verb(t.text))
        .map(|t| t.text.to_string());
    let has_coordination = tokens.iter().any(|t| t.text == "ET");

    let dedicator_groups = entities
        .keys()
        .filter(|k| k.starts_with("dedicator") && !k.starts_with("dedicator_relationship"))
        .count();
    let deceased_groups = usize::from(entities.contains_key("deceased_name"));
    let person_groups = dedicator_groups + deceased_groups;

    let complexity = if person_groups >= 2 {
        Complexity::MultiPerson
    } else {
        Complexity::Simple
    };

    StructuralAnalysis {
        word_count: tokens.len(),
        main_verb,
        has_coordination,
        person_groups,
        complexity,
    }
}

pub(crate) fn phase_names(phases: &[Phase]) -> Vec<String> {
    phases.iter().map(|p| p.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_analysis_simple() {
        let norm = NormalizedText::new("D M GAIVS IVLIVS CAESAR");
        let analysis = structural_analysis(&norm, &BTreeMap::new());
        assert_eq!(analysis.word_count, 5);
        assert_eq!(analysis.main_verb, None);
        assert!(!analysis.has_coordination);
        assert_eq!(analysis.complexity, Complexity::Simple);
    }

    #[test]
    fn coordination_detected() {
        let norm = NormalizedText::new("VIBIUS ET VIBIA FECERUNT");
        let analysis = structural_analysis(&norm, &BTreeMap::new());
        assert!(analysis.has_coordination);
        assert_eq!(analysis.main_verb.as_deref(), Some("FECERUNT"));
    }

    #[test]
    fn complexity_serializes_snake_case() {
        let json = serde_json::to_string(&Complexity::MultiPerson).unwrap();
        assert_eq!(json, "\"multi_person\"");
    }
}
