//! The hybrid extraction pipeline.
//!
//! Orchestrates the four phases, the consolidator, and the threshold
//! filter behind one entry point. Per-inscription extraction is a
//! pure computation; the only shared resource is the lazily-loaded
//! linguistic analyzer, which batch workers reuse by reference.

use crate::adapter::LazyAnalyzer;
use crate::normalize::NormalizedText;
use crate::report::{self, ExtractionReport};
use crate::{consolidate, filter, phases};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use titulus_core::{EntityKind, Error, FinalEntity, Phase, RawCandidate, Result};

/// Extraction configuration.
///
/// Validated once at the API boundary; an out-of-range threshold is
/// the only caller-facing error in the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    pub use_grammar: bool,
    pub use_morphology: bool,
    pub use_dependencies: bool,
    pub confidence_threshold: f64,
    pub flag_ambiguous: bool,
    pub verbose: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            use_grammar: true,
            use_morphology: false,
            use_dependencies: false,
            confidence_threshold: 0.5,
            flag_ambiguous: false,
            verbose: false,
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn with_grammar(mut self, enabled: bool) -> Self {
        self.use_grammar = enabled;
        self
    }

    #[must_use]
    pub fn with_morphology(mut self, enabled: bool) -> Self {
        self.use_morphology = enabled;
        self
    }

    #[must_use]
    pub fn with_dependencies(mut self, enabled: bool) -> Self {
        self.use_dependencies = enabled;
        self
    }

    #[must_use]
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_flag_ambiguous(mut self, enabled: bool) -> Self {
        self.flag_ambiguous = enabled;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Fail fast on misconfiguration, before any extraction runs.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold)
            || self.confidence_threshold.is_nan()
        {
            return Err(Error::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

struct GatheredCandidates {
    candidates: Vec<RawCandidate>,
    phases_used: Vec<Phase>,
}

/// Multi-phase entity extractor for Latin funerary inscriptions.
///
/// Construct once and reuse; the instance is immutable apart from
/// the analyzer's one-time initialization and is safe to share
/// across threads.
#[derive(Debug, Default)]
pub struct HybridExtractor {
    analyzer: Option<LazyAnalyzer>,
}

impl HybridExtractor {
    /// Extractor without a linguistic analyzer; the morphology and
    /// dependency phases contribute nothing even when enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor backed by an external analyzer.
    #[must_use]
    pub fn with_analyzer(analyzer: LazyAnalyzer) -> Self {
        Self {
            analyzer: Some(analyzer),
        }
    }

    /// Extract entities from one inscription.
    ///
    /// Empty or whitespace-only text yields an empty map. Phase
    /// failures are isolated; only invalid options produce an error.
    pub fn extract(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<BTreeMap<String, FinalEntity>> {
        options.validate()?;
        let norm = NormalizedText::new(text);
        if norm.is_empty() {
            return Ok(BTreeMap::new());
        }
        let gathered = self.gather(&norm, options);
        let consolidated = consolidate::consolidate(gathered.candidates);
        Ok(filter::apply(
            consolidated,
            options.confidence_threshold,
            options.flag_ambiguous,
            options.verbose,
        ))
    }

    /// Extract a batch in parallel; output order matches input order.
    pub fn extract_batch(
        &self,
        texts: &[String],
        options: &ExtractOptions,
    ) -> Result<Vec<BTreeMap<String, FinalEntity>>> {
        options.validate()?;
        texts
            .par_iter()
            .map(|text| self.extract(text, options))
            .collect()
    }

    /// Run the same extraction verbose and wrap it in a diagnostic
    /// report.
    pub fn extraction_report(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionReport> {
        options.validate()?;
        let verbose_options = options.clone().with_verbose(true);
        let norm = NormalizedText::new(text);
        let gathered = if norm.is_empty() {
            GatheredCandidates {
                candidates: Vec::new(),
                phases_used: Vec::new(),
            }
        } else {
            self.gather(&norm, &verbose_options)
        };
        let consolidated = consolidate::consolidate(gathered.candidates.clone());
        let entities = filter::apply(
            consolidated,
            verbose_options.confidence_threshold,
            verbose_options.flag_ambiguous,
            true,
        );

        Ok(ExtractionReport {
            text: text.to_string(),
            statistics: report::statistics(&gathered.candidates, &entities),
            structural_analysis: report::structural_analysis(&norm, &entities),
            phases_used: report::phase_names(&gathered.phases_used),
            entities,
        })
    }

    /// Run every enabled phase over one normalized inscription.
    ///
    /// The analyzer is consulted at most once per inscription; a
    /// failed operation simply leaves its phase out of the run.
    fn gather(&self, norm: &NormalizedText, options: &ExtractOptions) -> GatheredCandidates {
        let mut candidates = phases::pattern::extract(norm);
        let mut phases_used = vec![Phase::Pattern];

        if options.use_grammar {
            let pattern_kinds: BTreeSet<EntityKind> =
                candidates.iter().map(|c| c.key.kind).collect();
            // Grammar never overwrites a rule-table category; it only
            // fills gaps and its own structural kinds.
            candidates.extend(
                phases::grammar::extract(norm)
                    .into_iter()
                    .filter(|c| c.key.kind.is_structural() || !pattern_kinds.contains(&c.key.kind)),
            );
            phases_used.push(Phase::Grammar);
        }

        let wants_analysis = options.use_morphology || options.use_dependencies;
        if let (true, Some(analyzer)) = (wants_analysis, self.analyzer.as_ref()) {
            let tags = analyzer.tags(norm.text());
            if options.use_morphology {
                if let Some(tags) = tags.as_deref() {
                    candidates.extend(phases::morphology::extract(norm, tags));
                    phases_used.push(Phase::Morphology);
                }
            }
            if options.use_dependencies {
                if let (Some(tags), Some(edges)) =
                    (tags.as_deref(), analyzer.edges(norm.text()))
                {
                    candidates.extend(phases::dependency::extract(norm, tags, &edges));
                    phases_used.push(Phase::Dependency);
                }
            }
        }

        GatheredCandidates {
            candidates,
            phases_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(ExtractOptions::default().validate().is_ok());
    }

    #[test]
    fn threshold_out_of_range_is_config_error() {
        let options = ExtractOptions::default().with_confidence_threshold(1.5);
        assert!(matches!(options.validate(), Err(Error::Config(_))));

        let options = ExtractOptions::default().with_confidence_threshold(-0.1);
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn invalid_options_fail_before_extraction() {
        let extractor = HybridExtractor::new();
        let options = ExtractOptions::default().with_confidence_threshold(2.0);
        assert!(extractor.extract("D M", &options).is_err());
    }

    #[test]
    fn empty_text_yields_empty_map() {
        let extractor = HybridExtractor::new();
        let options = ExtractOptions::default();
        assert!(extractor.extract("", &options).unwrap().is_empty());
        assert!(extractor.extract("   \n ", &options).unwrap().is_empty());
    }

    #[test]
    fn missing_analyzer_degrades_gracefully() {
        let extractor = HybridExtractor::new();
        let options = ExtractOptions::default()
            .with_morphology(true)
            .with_dependencies(true);
        let out = extractor
            .extract("D M GAIVS IVLIVS CAESAR", &options)
            .unwrap();
        assert_eq!(out["status"].value, "dis manibus");
    }

    #[test]
    fn batch_preserves_input_order() {
        let extractor = HybridExtractor::new();
        let options = ExtractOptions::default();
        let texts = vec![
            "D M GAIVS IVLIVS CAESAR".to_string(),
            String::new(),
            "VIBIUS PAULUS PATER FECIT".to_string(),
        ];
        let results = extractor.extract_batch(&texts, &options).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].contains_key("status"));
        assert!(results[1].is_empty());
        assert!(results[2].contains_key("dedicator"));
    }

    #[test]
    fn report_lists_phases_and_counts() {
        let extractor = HybridExtractor::new();
        let options = ExtractOptions::default();
        let report = extractor
            .extraction_report("VIBIUS PAULUS PATER FECIT", &options)
            .unwrap();
        assert_eq!(
            report.phases_used,
            vec!["pattern_matching".to_string(), "grammar_templates".to_string()]
        );
        assert_eq!(report.statistics.total_entities, report.entities.len());
        assert!(report.entities.contains_key("dedicator"));
        assert_eq!(
            report.structural_analysis.main_verb.as_deref(),
            Some("FECIT")
        );
    }
}
