//! Cross-phase consolidation.
//!
//! Two ordered stages, both pure functions over the candidate
//! multiset so the outcome is independent of phase invocation order.
//!
//! Stage A resolves span overlaps among pattern-phase candidates:
//! longer span wins, then higher confidence, then the fixed category
//! priority. The loser is discarded outright.
//!
//! Stage B merges the survivors of all phases per entity key. A
//! single contributing phase passes through unchanged; agreeing
//! phases boost confidence toward a hard ceiling; disagreeing phases
//! keep the strongest value and record the rest as alternatives.

use std::collections::BTreeMap;
use titulus_core::{
    Agreement, AlternativeValue, ConsolidatedEntity, EntityKey, Phase, RawCandidate,
};

/// Stage A: drop the weaker of every overlapping pattern-phase pair.
///
/// Candidates from other phases pass through untouched; structural
/// phases are allowed to re-read spans the rule table also matched.
#[must_use]
pub fn resolve_overlaps(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let (mut pattern, rest): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.phase == Phase::Pattern);

    pattern.sort_by(|a, b| {
        b.span_len()
            .cmp(&a.span_len())
            .then_with(|| b.confidence.get().total_cmp(&a.confidence.get()))
            .then_with(|| a.key.kind.priority().cmp(&b.key.kind.priority()))
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.value.cmp(&b.value))
    });

    let mut kept: Vec<RawCandidate> = Vec::with_capacity(pattern.len());
    for cand in pattern {
        if kept.iter().all(|k| !k.overlaps(&cand)) {
            kept.push(cand);
        }
    }
    kept.sort_by_key(|c| (c.start, c.end));

    kept.extend(rest);
    kept
}

/// Stage B: merge surviving candidates of every phase, one
/// consolidated entity per key.
#[must_use]
pub fn merge(candidates: &[RawCandidate]) -> BTreeMap<EntityKey, ConsolidatedEntity> {
    let mut by_key: BTreeMap<EntityKey, Vec<&RawCandidate>> = BTreeMap::new();
    for cand in candidates {
        by_key.entry(cand.key).or_default().push(cand);
    }

    by_key
        .into_iter()
        .map(|(key, group)| (key, merge_key(key, &group)))
        .collect()
}

/// Stage A then Stage B.
#[must_use]
pub fn consolidate(candidates: Vec<RawCandidate>) -> BTreeMap<EntityKey, ConsolidatedEntity> {
    let survivors = resolve_overlaps(candidates);
    merge(&survivors)
}

/// One representative per phase: highest confidence, then earliest
/// span, then smallest value, so ties cannot depend on input order.
fn phase_representatives<'a>(group: &[&'a RawCandidate]) -> Vec<&'a RawCandidate> {
    let mut best: BTreeMap<Phase, &RawCandidate> = BTreeMap::new();
    for cand in group {
        match best.get(&cand.phase) {
            Some(current) if !beats(cand, current) => {}
            _ => {
                best.insert(cand.phase, cand);
            }
        }
    }
    best.into_values().collect()
}

fn beats(a: &RawCandidate, b: &RawCandidate) -> bool {
    a.confidence
        .get()
        .total_cmp(&b.confidence.get())
        .then_with(|| b.start.cmp(&a.start))
        .then_with(|| b.value.cmp(&a.value))
        .is_gt()
}

/// Case/whitespace-insensitive form used to decide agreement.
fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn merge_key(key: EntityKey, group: &[&RawCandidate]) -> ConsolidatedEntity {
    let reps = phase_representatives(group);
    let source_phases = reps.iter().map(|c| c.phase).collect();

    if reps.len() == 1 {
        let only = reps[0];
        return ConsolidatedEntity {
            key,
            value: only.value.clone(),
            // boosted(1) adds nothing but still applies the ceiling
            confidence: only.confidence.boosted(1),
            agreement: Agreement::None,
            source_phases,
            alternatives: Vec::new(),
        };
    }

    // Group representatives by canonicalized value.
    let mut value_groups: BTreeMap<String, Vec<&RawCandidate>> = BTreeMap::new();
    for rep in reps.iter().copied() {
        value_groups.entry(canonical(&rep.value)).or_default().push(rep);
    }

    // Within each value group the strongest representative speaks
    // for it; the group's confidence is that maximum boosted by the
    // number of agreeing phases.
    struct Scored<'a> {
        spokesman: &'a RawCandidate,
        boosted: titulus_core::Confidence,
    }
    let mut scored: Vec<Scored<'_>> = value_groups
        .values()
        .map(|members| {
            let spokesman = members
                .iter()
                .copied()
                .reduce(|best, c| if beats(c, best) { c } else { best })
                .unwrap_or(members[0]);
            Scored {
                spokesman,
                boosted: spokesman.confidence.boosted(members.len()),
            }
        })
        .collect();
    scored.sort_by(|a, b| {
        b.boosted
            .get()
            .total_cmp(&a.boosted.get())
            .then_with(|| a.spokesman.value.cmp(&b.spokesman.value))
    });

    let agreement = if scored.len() == 1 {
        Agreement::High
    } else {
        Agreement::Low
    };
    let primary = &scored[0];
    // Each alternative carries its group's boosted score, so the
    // recorded confidences descend along with the ordering.
    let alternatives = scored[1..]
        .iter()
        .map(|s| AlternativeValue {
            value: s.spokesman.value.clone(),
            confidence: s.boosted,
        })
        .collect();

    ConsolidatedEntity {
        key,
        value: primary.spokesman.value.clone(),
        confidence: primary.boosted,
        agreement,
        source_phases,
        alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titulus_core::{Confidence, EntityKind};

    fn cand(
        kind: EntityKind,
        start: usize,
        end: usize,
        value: &str,
        conf: f64,
        phase: Phase,
    ) -> RawCandidate {
        RawCandidate::new(
            EntityKey::solo(kind),
            start,
            end,
            value,
            Confidence::saturating(conf),
            phase,
        )
    }

    #[test]
    fn overlap_longer_span_wins() {
        // `D M` formula versus its single-letter components
        let status = cand(EntityKind::Status, 0, 3, "dis manibus", 0.95, Phase::Pattern);
        let d = cand(EntityKind::Praenomen, 0, 1, "Decimus", 0.85, Phase::Pattern);
        let m = cand(EntityKind::Praenomen, 2, 3, "Marcus", 0.85, Phase::Pattern);
        let kept = resolve_overlaps(vec![d, status.clone(), m]);
        assert_eq!(kept, vec![status]);
    }

    #[test]
    fn overlap_tie_breaks_on_confidence_then_priority() {
        let nomen = cand(EntityKind::Nomen, 0, 7, "Claudia", 0.88, Phase::Pattern);
        let tribe = cand(EntityKind::Tribe, 0, 7, "Claudia", 0.85, Phase::Pattern);
        let kept = resolve_overlaps(vec![tribe.clone(), nomen.clone()]);
        assert_eq!(kept, vec![nomen.clone()]);

        // same span, same confidence: category priority decides
        let tribe_same = cand(EntityKind::Tribe, 0, 7, "Claudia", 0.88, Phase::Pattern);
        let kept = resolve_overlaps(vec![tribe_same, nomen.clone()]);
        assert_eq!(kept, vec![nomen]);
    }

    #[test]
    fn non_pattern_candidates_bypass_overlap_resolution() {
        let pattern = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let grammar = cand(EntityKind::DeceasedName, 0, 6, "Iulius", 0.82, Phase::Grammar);
        let kept = resolve_overlaps(vec![pattern, grammar]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn surviving_pattern_spans_never_overlap() {
        let candidates = vec![
            cand(EntityKind::Status, 0, 3, "dis manibus", 0.95, Phase::Pattern),
            cand(EntityKind::Praenomen, 2, 3, "Marcus", 0.85, Phase::Pattern),
            cand(EntityKind::Nomen, 4, 10, "Iulius", 0.88, Phase::Pattern),
            cand(EntityKind::Cognomen, 8, 14, "Caesar", 0.88, Phase::Pattern),
        ];
        let kept = resolve_overlaps(candidates);
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn single_phase_passes_through() {
        let c = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let merged = merge(&[c]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.value, "Iulius");
        assert_eq!(entity.confidence.get(), 0.88);
        assert_eq!(entity.agreement, Agreement::None);
        assert!(entity.alternatives.is_empty());
    }

    #[test]
    fn single_phase_confidence_capped_at_ceiling() {
        let c = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.99, Phase::Pattern);
        let merged = merge(&[c]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.confidence.get(), 0.98);
    }

    #[test]
    fn alternatives_confidences_descend_after_boost() {
        let primary = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.90, Phase::Pattern);
        let alt_a1 = cand(EntityKind::Nomen, 0, 6, "Claudius", 0.80, Phase::Grammar);
        let alt_a2 = cand(EntityKind::Nomen, 0, 6, "Claudius", 0.80, Phase::Morphology);
        let alt_b = cand(EntityKind::Nomen, 0, 6, "Aelius", 0.84, Phase::Dependency);
        let merged = merge(&[primary, alt_a1, alt_a2, alt_b]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.value, "Iulius");
        // the two agreeing Claudius phases outscore the lone Aelius
        assert_eq!(entity.alternatives[0].value, "Claudius");
        assert!((entity.alternatives[0].confidence.get() - 0.85).abs() < 1e-12);
        assert_eq!(entity.alternatives[1].value, "Aelius");
        let confs: Vec<f64> = entity
            .alternatives
            .iter()
            .map(|alt| alt.confidence.get())
            .collect();
        assert!(confs.windows(2).all(|w| w[0] >= w[1]), "{confs:?}");
    }

    #[test]
    fn agreeing_phases_boost_confidence() {
        let a = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let b = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.82, Phase::Morphology);
        let merged = merge(&[a, b]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert!((entity.confidence.get() - 0.93).abs() < 1e-12);
        assert_eq!(entity.agreement, Agreement::High);
        assert!(entity.alternatives.is_empty());
    }

    #[test]
    fn agreement_is_case_and_whitespace_insensitive() {
        let a = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let b = cand(EntityKind::Nomen, 0, 6, "  IULIUS ", 0.80, Phase::Grammar);
        let merged = merge(&[a, b]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.agreement, Agreement::High);
    }

    #[test]
    fn boost_never_exceeds_ceiling() {
        let a = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.95, Phase::Pattern);
        let b = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.95, Phase::Grammar);
        let c = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.95, Phase::Morphology);
        let merged = merge(&[a, b, c]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.confidence.get(), 0.98);
    }

    #[test]
    fn disagreeing_phases_keep_strongest_and_record_alternatives() {
        let a = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let b = cand(EntityKind::Nomen, 0, 6, "Claudius", 0.82, Phase::Morphology);
        let c = cand(EntityKind::Nomen, 0, 6, "Aelius", 0.75, Phase::Dependency);
        let merged = merge(&[a, b, c]);
        let entity = &merged[&EntityKey::solo(EntityKind::Nomen)];
        assert_eq!(entity.value, "Iulius");
        assert_eq!(entity.agreement, Agreement::Low);
        assert_eq!(entity.alternatives.len(), 2);
        assert_eq!(entity.alternatives[0].value, "Claudius");
        assert_eq!(entity.alternatives[1].value, "Aelius");
    }

    #[test]
    fn order_independent() {
        let a = cand(EntityKind::Nomen, 0, 6, "Iulius", 0.88, Phase::Pattern);
        let b = cand(EntityKind::Nomen, 0, 6, "Claudius", 0.82, Phase::Morphology);
        let c = cand(EntityKind::Relationship, 8, 13, "father", 0.90, Phase::Pattern);
        let forward = merge(&[a.clone(), b.clone(), c.clone()]);
        let backward = merge(&[c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn one_phase_many_candidates_reduces_to_best() {
        let weak = cand(EntityKind::Relationship, 0, 5, "father", 0.85, Phase::Pattern);
        let strong = cand(EntityKind::Relationship, 8, 14, "daughter", 0.90, Phase::Pattern);
        let merged = merge(&[weak, strong]);
        let entity = &merged[&EntityKey::solo(EntityKind::Relationship)];
        assert_eq!(entity.value, "daughter");
        assert_eq!(entity.agreement, Agreement::None);
    }

    #[test]
    fn confidence_bound_holds() {
        let a = cand(EntityKind::Age, 0, 10, "25", 0.92, Phase::Pattern);
        let b = cand(EntityKind::Age, 0, 10, "25", 0.96, Phase::Grammar);
        for entity in merge(&[a, b]).values() {
            assert!(entity.confidence.get() <= 0.98);
        }
    }
}
