//! Phase 2: case-driven extraction from morphological tags.
//!
//! Consumes tags produced by the external analyzer; no tagging
//! happens here. Case carries the role: genitive proper nouns name
//! the deceased, nominative proper nouns before a dedication verb
//! name the dedicator, a dative kinship noun names the relationship,
//! and an ablative proper noun suggests a place.

use crate::lexicon::is_dedication_verb;
use crate::normalize::NormalizedText;
use crate::phases::stem_rendered_genitive;
use titulus_core::{
    Case, Confidence, EntityKey, EntityKind, LinguisticTag, Phase, Pos, RawCandidate,
};

/// Max tokens joined into one name (tria nomina).
const MAX_NAME_TOKENS: usize = 3;

/// Dative kinship form ⇒ (value, prior). Morphology priors run
/// higher than the literal table because the case is confirmed.
fn dative_kinship(surface: &str) -> Option<(&'static str, f64)> {
    let hit = match surface {
        "PATRI" => ("father", 0.92),
        "MATRI" => ("mother", 0.92),
        "FILIO" => ("son", 0.92),
        "FILIAE" => ("daughter", 0.92),
        "CONIUGI" => ("spouse", 0.90),
        "UXORI" => ("wife", 0.90),
        "MARITO" => ("husband", 0.90),
        "HEREDI" => ("heir", 0.90),
        "FRATRI" => ("brother", 0.88),
        "SORORI" => ("sister", 0.88),
        "AUO" => ("grandfather", 0.88),
        "AUIAE" => ("grandmother", 0.88),
        "NEPOTI" => ("grandchild", 0.88),
        _ => return None,
    };
    Some(hit)
}

/// Run the morphology templates over one tagged inscription.
#[must_use]
pub fn extract(norm: &NormalizedText, tags: &[LinguisticTag]) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    extract_deceased(norm, tags, &mut out);
    extract_dedicator(norm, tags, &mut out);
    extract_relationship(norm, tags, &mut out);
    extract_location(norm, tags, &mut out);
    out
}

fn surface<'a>(norm: &'a NormalizedText, tag: &LinguisticTag) -> &'a str {
    norm.text().get(tag.start..tag.end).unwrap_or_default()
}

fn is_name_pos(tag: &LinguisticTag) -> bool {
    matches!(tag.pos, Pos::ProperNoun | Pos::Noun)
}

fn extract_deceased(norm: &NormalizedText, tags: &[LinguisticTag], out: &mut Vec<RawCandidate>) {
    let names: Vec<&LinguisticTag> = tags
        .iter()
        .filter(|t| t.has_case(Case::Genitive) && is_name_pos(t))
        .filter(|t| dative_kinship(surface(norm, t)).is_none())
        .take(MAX_NAME_TOKENS)
        .collect();
    if names.is_empty() {
        return;
    }
    let value = names
        .iter()
        .map(|t| {
            stem_rendered_genitive(&norm.classical_value(t.start, t.end), t.gender)
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push(RawCandidate::new(
        EntityKey::solo(EntityKind::DeceasedName),
        names[0].start,
        names[names.len() - 1].end,
        value,
        Confidence::saturating(0.85),
        Phase::Morphology,
    ));
}

fn extract_dedicator(norm: &NormalizedText, tags: &[LinguisticTag], out: &mut Vec<RawCandidate>) {
    let has_verb = norm.tokens().iter().any(|t| is_dedication_verb(t.text));
    if !has_verb {
        return;
    }
    let names: Vec<&LinguisticTag> = tags
        .iter()
        .filter(|t| t.has_case(Case::Nominative) && t.pos == Pos::ProperNoun)
        .take(MAX_NAME_TOKENS)
        .collect();
    if names.is_empty() {
        return;
    }
    let value = names
        .iter()
        .map(|t| norm.classical_value(t.start, t.end))
        .collect::<Vec<_>>()
        .join(" ");
    out.push(RawCandidate::new(
        EntityKey::solo(EntityKind::Dedicator),
        names[0].start,
        names[names.len() - 1].end,
        value,
        Confidence::saturating(0.82),
        Phase::Morphology,
    ));
}

fn extract_relationship(norm: &NormalizedText, tags: &[LinguisticTag], out: &mut Vec<RawCandidate>) {
    for tag in tags {
        if !tag.has_case(Case::Dative) {
            continue;
        }
        if let Some((value, conf)) = dative_kinship(surface(norm, tag)) {
            out.push(RawCandidate::new(
                EntityKey::solo(EntityKind::Relationship),
                tag.start,
                tag.end,
                value,
                Confidence::saturating(conf),
                Phase::Morphology,
            ));
            return;
        }
    }
}

fn extract_location(norm: &NormalizedText, tags: &[LinguisticTag], out: &mut Vec<RawCandidate>) {
    for tag in tags {
        if tag.has_case(Case::Ablative) && tag.pos == Pos::ProperNoun {
            out.push(RawCandidate::new(
                EntityKey::solo(EntityKind::Location),
                tag.start,
                tag.end,
                norm.classical_value(tag.start, tag.end),
                Confidence::saturating(0.75),
                Phase::Morphology,
            ));
            return;
        }
    }
}
