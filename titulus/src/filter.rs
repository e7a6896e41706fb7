//! Threshold filter and output materialization.
//!
//! The last step before results cross the API boundary: apply the
//! confidence cutoff, set the ambiguous flag, and turn structured
//! entity keys into output-map strings. Indexed suffixes appear only
//! when a kind genuinely occurs more than once, so a lone dedicator
//! stays `dedicator` while a coordinated pair becomes `dedicator_1`
//! and `dedicator_2`.

use std::collections::BTreeMap;
use titulus_core::{ConsolidatedEntity, EntityKey, EntityKind, FinalEntity};

/// Apply the cutoff policy and materialize string keys.
///
/// Entities at or above `threshold` pass unchanged. Below it they
/// are dropped, unless `flag_ambiguous` asks for them back marked
/// `ambiguous = true` with confidence untouched. An empty map is a
/// valid result.
#[must_use]
pub fn apply(
    consolidated: BTreeMap<EntityKey, ConsolidatedEntity>,
    threshold: f64,
    flag_ambiguous: bool,
    verbose: bool,
) -> BTreeMap<String, FinalEntity> {
    let mut kind_counts: BTreeMap<EntityKind, usize> = BTreeMap::new();
    for key in consolidated.keys() {
        *kind_counts.entry(key.kind).or_default() += 1;
    }

    let mut out = BTreeMap::new();
    for (key, entity) in consolidated {
        let below = !entity.confidence.passes(threshold);
        if below && !flag_ambiguous {
            continue;
        }

        let force_index = kind_counts.get(&key.kind).copied().unwrap_or(0) > 1;
        let label = key.label(force_index);

        let final_entity = FinalEntity {
            value: entity.value,
            confidence: entity.confidence,
            ambiguous: below,
            alternatives: entity.alternatives,
            agreement: verbose.then_some(entity.agreement),
            source_phases: verbose.then(|| {
                entity
                    .source_phases
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect()
            }),
        };
        out.insert(label, final_entity);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use titulus_core::{Agreement, Confidence, Phase};

    fn entity(key: EntityKey, value: &str, conf: f64) -> (EntityKey, ConsolidatedEntity) {
        (
            key,
            ConsolidatedEntity {
                key,
                value: value.to_string(),
                confidence: Confidence::saturating(conf),
                agreement: Agreement::None,
                source_phases: BTreeSet::from([Phase::Pattern]),
                alternatives: Vec::new(),
            },
        )
    }

    #[test]
    fn at_threshold_passes() {
        let map = BTreeMap::from([entity(EntityKey::solo(EntityKind::Nomen), "Iulius", 0.5)]);
        let out = apply(map, 0.5, false, false);
        assert!(!out["nomen"].ambiguous);
    }

    #[test]
    fn below_threshold_dropped() {
        let map = BTreeMap::from([entity(EntityKey::solo(EntityKind::Nomen), "Iulius", 0.75)]);
        let out = apply(map, 0.9, false, false);
        assert!(out.is_empty());
    }

    #[test]
    fn below_threshold_flagged_when_asked() {
        let map = BTreeMap::from([entity(EntityKey::solo(EntityKind::Nomen), "Iulius", 0.75)]);
        let out = apply(map, 0.9, true, false);
        let kept = &out["nomen"];
        assert!(kept.ambiguous);
        assert_eq!(kept.confidence.get(), 0.75);
    }

    #[test]
    fn verbose_attaches_metadata_without_changing_set() {
        let map = BTreeMap::from([entity(EntityKey::solo(EntityKind::Nomen), "Iulius", 0.88)]);
        let quiet = apply(map.clone(), 0.5, false, false);
        let loud = apply(map, 0.5, false, true);
        assert_eq!(quiet.len(), loud.len());
        assert!(quiet["nomen"].agreement.is_none());
        assert_eq!(loud["nomen"].agreement, Some(Agreement::None));
        assert_eq!(
            loud["nomen"].source_phases.as_deref(),
            Some(&["pattern_matching".to_string()][..])
        );
    }

    #[test]
    fn lone_indexed_key_loses_suffix() {
        let map = BTreeMap::from([entity(
            EntityKey::indexed(EntityKind::Dedicator, 1),
            "Vibius Paulus",
            0.8,
        )]);
        let out = apply(map, 0.5, false, false);
        assert!(out.contains_key("dedicator"));
    }

    #[test]
    fn repeated_kind_keeps_suffixes() {
        let map = BTreeMap::from([
            entity(EntityKey::indexed(EntityKind::Dedicator, 1), "Vibius", 0.8),
            entity(EntityKey::indexed(EntityKind::Dedicator, 2), "Vibia", 0.8),
        ]);
        let out = apply(map, 0.5, false, false);
        assert!(out.contains_key("dedicator_1"));
        assert!(out.contains_key("dedicator_2"));
    }

    #[test]
    fn empty_input_is_valid() {
        let out = apply(BTreeMap::new(), 0.5, true, true);
        assert!(out.is_empty());
    }
}
