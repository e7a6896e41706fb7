//! Phase 1: grammatical template extraction.
//!
//! Handles names the rule table does not list by recognizing the
//! formulaic structure of funerary dedications: genitive name runs
//! before a dative kinship noun name the deceased, nominative runs
//! before a dedication verb name the dedicators, and a genitive
//! token before a filiation abbreviation names the father. Works on
//! whitespace tokens of the normalized text.

use crate::lexicon::{
    dative_relationship, is_dedication_verb, is_formula_word, nominative_relationship,
};
use crate::normalize::{NormalizedText, Token};
use crate::phases::stem_rendered_genitive;
use titulus_core::{Confidence, EntityKey, EntityKind, Gender, Phase, RawCandidate};

/// Longest run of tokens treated as one personal name.
const MAX_NAME_TOKENS: usize = 3;

/// Run every template over one normalized inscription.
#[must_use]
pub fn extract(norm: &NormalizedText) -> Vec<RawCandidate> {
    let tokens = norm.tokens();
    let mut out = Vec::new();
    extract_deceased(norm, &tokens, &mut out);
    extract_dedicators(norm, &tokens, &mut out);
    extract_filiation(norm, &tokens, &mut out);
    extract_sentiment(norm, &tokens, &mut out);
    out
}

/// Genitive name run followed by a dative relationship noun names
/// the deceased: `VIBIAE SABINAE FILIAE` reads "to Vibia Sabina,
/// the daughter".
fn extract_deceased(norm: &NormalizedText, tokens: &[Token<'_>], out: &mut Vec<RawCandidate>) {
    for (i, tok) in tokens.iter().enumerate() {
        let Some((rel_value, rel_conf, gender)) = dative_relationship(tok.text) else {
            continue;
        };

        let mut names: Vec<&Token<'_>> = Vec::new();
        let mut j = i;
        while j > 0 && names.len() < MAX_NAME_TOKENS {
            let prev = &tokens[j - 1];
            if !is_genitive_name(prev.text, gender) {
                break;
            }
            names.push(prev);
            j -= 1;
        }
        if names.is_empty() {
            continue;
        }
        names.reverse();

        let value = names
            .iter()
            .map(|t| stem_rendered_genitive(&norm.classical_value(t.start, t.end), Some(gender)))
            .collect::<Vec<_>>()
            .join(" ");
        let name_conf = match gender {
            Gender::Feminine => 0.82,
            _ => 0.80,
        };

        out.push(RawCandidate::new(
            EntityKey::solo(EntityKind::DeceasedName),
            names[0].start,
            names[names.len() - 1].end,
            value,
            Confidence::saturating(name_conf),
            Phase::Grammar,
        ));
        out.push(RawCandidate::new(
            EntityKey::solo(EntityKind::DeceasedRelationship),
            tok.start,
            tok.end,
            rel_value,
            Confidence::saturating(rel_conf),
            Phase::Grammar,
        ));
        return;
    }
}

/// One coordinated dedicator group, read right-to-left from the
/// dedication verb.
struct DedicatorGroup {
    name_start: usize,
    name_end: usize,
    value: String,
    relationship: Option<(usize, usize, &'static str, f64)>,
}

/// Nominative name run(s) before a dedication verb name the
/// dedicator(s); `ET` joins coordinated groups and an adjacent
/// kinship noun supplies the relationship.
fn extract_dedicators(norm: &NormalizedText, tokens: &[Token<'_>], out: &mut Vec<RawCandidate>) {
    let Some(verb_idx) = tokens.iter().position(|t| is_dedication_verb(t.text)) else {
        return;
    };

    let mut groups: Vec<DedicatorGroup> = Vec::new();
    let mut i = verb_idx;
    loop {
        let mut relationship = None;
        if i > 0 {
            let prev = &tokens[i - 1];
            if let Some((value, conf)) = nominative_relationship(prev.text) {
                relationship = Some((prev.start, prev.end, value, conf));
                i -= 1;
            }
        }

        let mut names: Vec<&Token<'_>> = Vec::new();
        while i > 0 && names.len() < MAX_NAME_TOKENS {
            let prev = &tokens[i - 1];
            if is_nominative_name(prev.text) {
                names.push(prev);
                i -= 1;
            } else if !names.is_empty() && is_praenomen_abbrev(prev.text) {
                // Leading abbreviated praenomen, e.g. `C IULIUS RUFUS`.
                names.push(prev);
                i -= 1;
                break;
            } else {
                break;
            }
        }
        if names.is_empty() {
            break;
        }
        names.reverse();

        let value = names
            .iter()
            .map(|t| {
                if t.text.len() <= 3 {
                    t.text.to_string()
                } else {
                    norm.classical_value(t.start, t.end)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        groups.push(DedicatorGroup {
            name_start: names[0].start,
            name_end: names[names.len() - 1].end,
            value,
            relationship,
        });

        if i > 0 && tokens[i - 1].text == "ET" {
            i -= 1;
        } else {
            break;
        }
    }

    if groups.is_empty() {
        return;
    }
    // Collected right-to-left; first-seen order is left-to-right.
    groups.reverse();

    let coordinated = groups.len() > 1;
    for (n, group) in groups.iter().enumerate() {
        let idx = u8::try_from(n + 1).unwrap_or(u8::MAX);
        let (name_key, rel_key) = if coordinated {
            (
                EntityKey::indexed(EntityKind::Dedicator, idx),
                EntityKey::indexed(EntityKind::DedicatorRelationship, idx),
            )
        } else {
            (
                EntityKey::solo(EntityKind::Dedicator),
                EntityKey::solo(EntityKind::DedicatorRelationship),
            )
        };
        let name_conf = if coordinated {
            0.80
        } else if group.relationship.is_some() {
            0.85
        } else {
            0.82
        };
        out.push(RawCandidate::new(
            name_key,
            group.name_start,
            group.name_end,
            group.value.clone(),
            Confidence::saturating(name_conf),
            Phase::Grammar,
        ));
        if let Some((start, end, value, conf)) = group.relationship {
            let conf = if coordinated { 0.85 } else { conf };
            out.push(RawCandidate::new(
                rel_key,
                start,
                end,
                value,
                Confidence::saturating(conf),
                Phase::Grammar,
            ));
        }
    }
}

/// Name + genitive father name + filiation abbreviation:
/// `MARCUS GAII F` reads "Marcus, son of Gaius".
fn extract_filiation(norm: &NormalizedText, tokens: &[Token<'_>], out: &mut Vec<RawCandidate>) {
    for window in tokens.windows(3) {
        let [name, father, marker] = window else {
            continue;
        };
        let Some(role) = filiation_role(marker.text) else {
            continue;
        };
        if !is_nominative_name(name.text) || !is_genitive_token(father.text) {
            continue;
        }
        let father_nom = stem_rendered_genitive(
            &norm.classical_value(father.start, father.end),
            Some(Gender::Masculine),
        );
        out.push(RawCandidate::new(
            EntityKey::solo(EntityKind::Filiation),
            father.start,
            marker.end,
            format!("{role} of {father_nom}"),
            Confidence::saturating(0.90),
            Phase::Grammar,
        ));
        return;
    }
}

/// Affective adjective adjacent to a kinship noun, or the fixed
/// `BENE MERENTI` formula.
fn extract_sentiment(_norm: &NormalizedText, tokens: &[Token<'_>], out: &mut Vec<RawCandidate>) {
    for (i, tok) in tokens.iter().enumerate() {
        if tok.text == "BENE" {
            if let Some(next) = tokens.get(i + 1) {
                if next.text == "MERENTI" {
                    out.push(RawCandidate::new(
                        EntityKey::solo(EntityKind::DedicationSentiment),
                        tok.start,
                        next.end,
                        "well-deserving",
                        Confidence::saturating(0.75),
                        Phase::Grammar,
                    ));
                    return;
                }
            }
        }

        let Some(value) = sentiment_adjective(tok.text) else {
            continue;
        };
        let adjacent_kin = [i.checked_sub(1), Some(i + 1)]
            .into_iter()
            .flatten()
            .filter_map(|j| tokens.get(j))
            .any(|t| dative_relationship(t.text).is_some() || nominative_relationship(t.text).is_some());
        if adjacent_kin {
            out.push(RawCandidate::new(
                EntityKey::solo(EntityKind::DedicationSentiment),
                tok.start,
                tok.end,
                value,
                Confidence::saturating(0.75),
                Phase::Grammar,
            ));
            return;
        }
    }
}

fn sentiment_adjective(word: &str) -> Option<&'static str> {
    if word.starts_with("CARISSIM") {
        Some("dearest")
    } else if word.starts_with("PIISSIM") {
        Some("most devoted")
    } else if word.starts_with("DULCISSIM") {
        Some("sweetest")
    } else if word.starts_with("INCOMPARABIL") {
        Some("incomparable")
    } else {
        None
    }
}

fn filiation_role(marker: &str) -> Option<&'static str> {
    match marker.trim_end_matches('.') {
        "F" | "FIL" => Some("child"),
        "FILIUS" => Some("son"),
        "FILIA" => Some("daughter"),
        _ => None,
    }
}

fn is_genitive_name(word: &str, gender: Gender) -> bool {
    if is_formula_word(word) || dative_relationship(word).is_some() {
        return false;
    }
    if !word.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match gender {
        Gender::Feminine => word.len() >= 5 && word.ends_with("AE"),
        _ => word.len() >= 4 && word.ends_with('I'),
    }
}

fn is_genitive_token(word: &str) -> bool {
    word.len() >= 4
        && word.bytes().all(|b| b.is_ascii_uppercase())
        && !is_formula_word(word)
        && (word.ends_with('I') || word.ends_with("IS"))
}

fn is_nominative_name(word: &str) -> bool {
    if is_formula_word(word)
        || nominative_relationship(word).is_some()
        || dative_relationship(word).is_some()
    {
        return false;
    }
    word.len() >= 4
        && word.bytes().all(|b| b.is_ascii_uppercase())
        && (word.ends_with("US") || word.ends_with('A'))
}

fn is_praenomen_abbrev(word: &str) -> bool {
    let trimmed = word.trim_end_matches('.');
    (1..=3).contains(&trimmed.len())
        && trimmed.bytes().all(|b| b.is_ascii_uppercase())
        && !is_formula_word(trimmed)
}
