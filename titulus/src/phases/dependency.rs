//! Phase 3: relation-driven extraction from dependency edges.
//!
//! Consumes the external analyzer's parse. Edges address tokens by
//! index into the tag sequence for the same text; the tags supply
//! spans, case, and part of speech.

use crate::lexicon::is_dedication_verb;
use crate::normalize::NormalizedText;
use crate::phases::stem_rendered_genitive;
use titulus_core::{
    Case, Confidence, DependencyEdge, EntityKey, EntityKind, LinguisticTag, Phase, Pos,
    RawCandidate,
};

const MAX_NAME_TOKENS: usize = 3;

/// Run the dependency templates over one parsed inscription.
#[must_use]
pub fn extract(
    norm: &NormalizedText,
    tags: &[LinguisticTag],
    edges: &[DependencyEdge],
) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    let has_verb = norm.tokens().iter().any(|t| is_dedication_verb(t.text));
    let coordinated = has_verb
        && edges.iter().any(|e| {
            e.relation == "conj"
                && dependent_tag(tags, e).is_some_and(|t| t.pos == Pos::ProperNoun)
        });
    if has_verb {
        // Conj dedicators are numbered after the primary subject, so
        // they are only emitted when that subject was found.
        let primary_found = extract_subjects(norm, tags, edges, coordinated, &mut out);
        if primary_found {
            extract_coordinated(norm, tags, edges, &mut out);
        }
    }
    extract_relationship(norm, tags, edges, &mut out);
    extract_deceased(norm, tags, edges, &mut out);
    out
}

fn surface<'a>(norm: &'a NormalizedText, tag: &LinguisticTag) -> &'a str {
    norm.text().get(tag.start..tag.end).unwrap_or_default()
}

fn dependent_tag<'a>(tags: &'a [LinguisticTag], edge: &DependencyEdge) -> Option<&'a LinguisticTag> {
    tags.get(edge.dependent)
}

/// `nsubj` dependents of a dedication verb name the dedicator.
/// Under coordination the primary subject takes index 1 so it lines
/// up with the conj dedicators numbered behind it.
fn extract_subjects(
    norm: &NormalizedText,
    tags: &[LinguisticTag],
    edges: &[DependencyEdge],
    coordinated: bool,
    out: &mut Vec<RawCandidate>,
) -> bool {
    let subjects: Vec<&LinguisticTag> = edges
        .iter()
        .filter(|e| matches!(e.relation.as_str(), "nsubj" | "nsubj:pass"))
        .filter_map(|e| dependent_tag(tags, e))
        .filter(|t| t.pos == Pos::ProperNoun)
        .take(MAX_NAME_TOKENS)
        .collect();
    if subjects.is_empty() {
        return false;
    }
    let value = subjects
        .iter()
        .map(|t| norm.classical_value(t.start, t.end))
        .collect::<Vec<_>>()
        .join(" ");
    let key = if coordinated {
        EntityKey::indexed(EntityKind::Dedicator, 1)
    } else {
        EntityKey::solo(EntityKind::Dedicator)
    };
    out.push(RawCandidate::new(
        key,
        subjects[0].start,
        subjects[subjects.len() - 1].end,
        value,
        Confidence::saturating(0.88),
        Phase::Dependency,
    ));
    true
}

/// An `iobj`/`obl` dependent that is a kinship noun carries the
/// relationship.
fn extract_relationship(
    norm: &NormalizedText,
    tags: &[LinguisticTag],
    edges: &[DependencyEdge],
    out: &mut Vec<RawCandidate>,
) {
    for edge in edges {
        if !matches!(edge.relation.as_str(), "iobj" | "obl") {
            continue;
        }
        let Some(tag) = dependent_tag(tags, edge) else {
            continue;
        };
        let Some((value, _, _)) = crate::lexicon::dative_relationship(surface(norm, tag)) else {
            continue;
        };
        out.push(RawCandidate::new(
            EntityKey::solo(EntityKind::Relationship),
            tag.start,
            tag.end,
            value,
            Confidence::saturating(0.90),
            Phase::Dependency,
        ));
        return;
    }
}

/// A genitive `nmod` chain names the deceased.
fn extract_deceased(
    norm: &NormalizedText,
    tags: &[LinguisticTag],
    edges: &[DependencyEdge],
    out: &mut Vec<RawCandidate>,
) {
    let names: Vec<&LinguisticTag> = edges
        .iter()
        .filter(|e| matches!(e.relation.as_str(), "nmod" | "nmod:poss"))
        .filter_map(|e| dependent_tag(tags, e))
        .filter(|t| t.has_case(Case::Genitive) && matches!(t.pos, Pos::ProperNoun | Pos::Noun))
        .take(MAX_NAME_TOKENS)
        .collect();
    if names.is_empty() {
        return;
    }
    let value = names
        .iter()
        .map(|t| stem_rendered_genitive(&norm.classical_value(t.start, t.end), t.gender))
        .collect::<Vec<_>>()
        .join(" ");
    out.push(RawCandidate::new(
        EntityKey::solo(EntityKind::DeceasedName),
        names[0].start,
        names[names.len() - 1].end,
        value,
        Confidence::saturating(0.86),
        Phase::Dependency,
    ));
}

/// `conj` proper-noun dependents under coordination are additional
/// dedicators, numbered after the primary subject.
fn extract_coordinated(
    norm: &NormalizedText,
    tags: &[LinguisticTag],
    edges: &[DependencyEdge],
    out: &mut Vec<RawCandidate>,
) {
    let mut index: u8 = 2;
    for edge in edges {
        if edge.relation != "conj" {
            continue;
        }
        let Some(tag) = dependent_tag(tags, edge) else {
            continue;
        };
        if tag.pos != Pos::ProperNoun {
            continue;
        }
        out.push(RawCandidate::new(
            EntityKey::indexed(EntityKind::Dedicator, index),
            tag.start,
            tag.end,
            norm.classical_value(tag.start, tag.end),
            Confidence::saturating(0.82),
            Phase::Dependency,
        ));
        index = index.saturating_add(1);
    }
}
