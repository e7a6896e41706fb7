//! Phase 0: ordered literal/structural rule matching.
//!
//! The rule table is immutable and data-driven: each row pairs a
//! category with a regex over normalized text, a confidence prior,
//! and a value policy. Within a category, rows are ordered
//! most-specific first, so a full form outranks an abbreviation.
//! Extending coverage is appending a row, never new control flow.
//!
//! Overlapping matches are allowed here; the consolidator's overlap
//! stage resolves them.

use crate::lexicon::parse_age;
use crate::normalize::NormalizedText;
use once_cell::sync::Lazy;
use regex::Regex;
use titulus_core::{Confidence, EntityKey, EntityKind, Phase, RawCandidate};

/// Ages outside this range are domain-validity rejections.
const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=150;

/// How a rule turns a regex match into an entity value.
#[derive(Clone, Copy)]
enum ValueSpec {
    /// Emit this canonical value verbatim.
    Literal(&'static str),
    /// Render the match (group 1 if present, else the whole match)
    /// in classical orthography.
    Classical,
    /// Parse group 1 as an age and render Arabic digits; out-of-range
    /// ages emit nothing.
    Age,
    /// Parse group 1 as a legion numeral, emitting `legion N`.
    Legion,
}

struct PatternRule {
    kind: EntityKind,
    pattern: &'static str,
    confidence: f64,
    value: ValueSpec,
}

struct CompiledRule {
    kind: EntityKind,
    re: Regex,
    confidence: Confidence,
    value: ValueSpec,
}

const fn rule(
    kind: EntityKind,
    pattern: &'static str,
    confidence: f64,
    value: ValueSpec,
) -> PatternRule {
    PatternRule {
        kind,
        pattern,
        confidence,
        value,
    }
}

#[rustfmt::skip]
static RULE_TABLE: &[PatternRule] = &[
    // -- status: dedication formulas, longest literal first --
    rule(EntityKind::Status, r"\bDIS MANIBUS SACRUM\b", 0.95, ValueSpec::Literal("dis manibus sacrum")),
    rule(EntityKind::Status, r"\bD M S\b", 0.95, ValueSpec::Literal("dis manibus sacrum")),
    rule(EntityKind::Status, r"\bDIS MANIBUS\b", 0.95, ValueSpec::Literal("dis manibus")),
    rule(EntityKind::Status, r"\bD M\b", 0.95, ValueSpec::Literal("dis manibus")),
    rule(EntityKind::Status, r"\bHIC SITUS EST\b", 0.92, ValueSpec::Literal("hic situs est")),
    rule(EntityKind::Status, r"\bHIC SITA EST\b", 0.92, ValueSpec::Literal("hic sita est")),
    rule(EntityKind::Status, r"\bH S E\b", 0.90, ValueSpec::Literal("hic situs est")),
    rule(EntityKind::Status, r"\bSIT TIBI TERRA LEUIS\b", 0.92, ValueSpec::Literal("sit tibi terra levis")),
    rule(EntityKind::Status, r"\bS T T L\b", 0.90, ValueSpec::Literal("sit tibi terra levis")),
    rule(EntityKind::Status, r"\bLIBERTUS\b", 0.85, ValueSpec::Literal("freedman")),
    rule(EntityKind::Status, r"\bLIBERTA\b", 0.85, ValueSpec::Literal("freedwoman")),
    rule(EntityKind::Status, r"\bSERUUS\b", 0.85, ValueSpec::Literal("slave")),
    rule(EntityKind::Status, r"\bSERUA\b", 0.85, ValueSpec::Literal("slave")),

    // -- praenomen: full forms outrank abbreviations --
    rule(EntityKind::Praenomen, r"\bGAIUS\b", 0.88, ValueSpec::Literal("Gaius")),
    rule(EntityKind::Praenomen, r"\bGNAEUS\b", 0.88, ValueSpec::Literal("Gnaeus")),
    rule(EntityKind::Praenomen, r"\bMARCUS\b", 0.88, ValueSpec::Literal("Marcus")),
    rule(EntityKind::Praenomen, r"\bLUCIUS\b", 0.88, ValueSpec::Literal("Lucius")),
    rule(EntityKind::Praenomen, r"\bPUBLIUS\b", 0.88, ValueSpec::Literal("Publius")),
    rule(EntityKind::Praenomen, r"\bQUINTUS\b", 0.88, ValueSpec::Literal("Quintus")),
    rule(EntityKind::Praenomen, r"\bTITUS\b", 0.88, ValueSpec::Literal("Titus")),
    rule(EntityKind::Praenomen, r"\bAULUS\b", 0.88, ValueSpec::Literal("Aulus")),
    rule(EntityKind::Praenomen, r"\bSEXTUS\b", 0.88, ValueSpec::Literal("Sextus")),
    rule(EntityKind::Praenomen, r"\bDECIMUS\b", 0.88, ValueSpec::Literal("Decimus")),
    rule(EntityKind::Praenomen, r"\bTIBERIUS\b", 0.88, ValueSpec::Literal("Tiberius")),
    rule(EntityKind::Praenomen, r"\bMANIUS\b", 0.88, ValueSpec::Literal("Manius")),
    rule(EntityKind::Praenomen, r"\bSPURIUS\b", 0.88, ValueSpec::Literal("Spurius")),
    rule(EntityKind::Praenomen, r"\bSERUIUS\b", 0.88, ValueSpec::Literal("Servius")),
    rule(EntityKind::Praenomen, r"\bAPPIUS\b", 0.88, ValueSpec::Literal("Appius")),
    rule(EntityKind::Praenomen, r"\bC\b", 0.85, ValueSpec::Literal("Gaius")),
    rule(EntityKind::Praenomen, r"\bCN\b", 0.85, ValueSpec::Literal("Gnaeus")),
    rule(EntityKind::Praenomen, r"\bM\b", 0.85, ValueSpec::Literal("Marcus")),
    rule(EntityKind::Praenomen, r"\bL\b", 0.85, ValueSpec::Literal("Lucius")),
    rule(EntityKind::Praenomen, r"\bP\b", 0.85, ValueSpec::Literal("Publius")),
    rule(EntityKind::Praenomen, r"\bQ\b", 0.85, ValueSpec::Literal("Quintus")),
    rule(EntityKind::Praenomen, r"\bT\b", 0.85, ValueSpec::Literal("Titus")),
    rule(EntityKind::Praenomen, r"\bA\b", 0.85, ValueSpec::Literal("Aulus")),
    rule(EntityKind::Praenomen, r"\bD\b", 0.85, ValueSpec::Literal("Decimus")),
    rule(EntityKind::Praenomen, r"\bTI\b", 0.85, ValueSpec::Literal("Tiberius")),
    rule(EntityKind::Praenomen, r"\bSEX\b", 0.85, ValueSpec::Literal("Sextus")),
    rule(EntityKind::Praenomen, r"\bSER\b", 0.85, ValueSpec::Literal("Servius")),
    rule(EntityKind::Praenomen, r"\bSP\b", 0.85, ValueSpec::Literal("Spurius")),
    rule(EntityKind::Praenomen, r"\bAP\b", 0.85, ValueSpec::Literal("Appius")),

    // -- nomen: common gentilicia, masculine and feminine --
    rule(EntityKind::Nomen, r"\bIULI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bCLAUDI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bCORNELI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bFLAUI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bAURELI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bANTONI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bUALERI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bUIBI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bSEMPRONI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bPOMPEI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bDOMITI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bSULPICI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bFABI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bIUNI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bCASSI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bOCTAUI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bULPI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Nomen, r"\bAELI(?:US|A)\b", 0.88, ValueSpec::Classical),

    // -- cognomen --
    rule(EntityKind::Cognomen, r"\bCAESAR\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bSEUER(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bRUF(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bMAXIM(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bFELIX\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bPRIM(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bSECUND(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bTERTI(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bTERTULLA\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bSABIN(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bPAUL(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bCRISP(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bFAUST(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bPROCUL(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bSATURNIN(?:US|A)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bUICTOR\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Cognomen, r"\bFORTUNAT(?:US|A)\b", 0.88, ValueSpec::Classical),

    // -- tribe --
    rule(EntityKind::Tribe, r"\bTRIBU ([A-Z]+)\b", 0.88, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bQUIRINA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bGALERIA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bPALATINA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bUELINA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bUOLTINIA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bPOLLIA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bPAPIRIA\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Tribe, r"\bMENENIA\b", 0.85, ValueSpec::Classical),

    // -- location --
    rule(EntityKind::Location, r"\bDOMO ([A-Z]+)\b", 0.85, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bROMA\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bOSTIA\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bCAPUA\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bAQUILEIA\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bCARTHAGINE\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bLUGDUNO\b", 0.80, ValueSpec::Classical),
    rule(EntityKind::Location, r"\bNICOMEDIA\b", 0.80, ValueSpec::Classical),

    // -- relationship: dative (addressee) forms outrank nominative --
    rule(EntityKind::Relationship, r"\bFILIAE\b", 0.90, ValueSpec::Literal("daughter")),
    rule(EntityKind::Relationship, r"\bFILIO\b", 0.90, ValueSpec::Literal("son")),
    rule(EntityKind::Relationship, r"\bPATRI\b", 0.90, ValueSpec::Literal("father")),
    rule(EntityKind::Relationship, r"\bMATRI\b", 0.90, ValueSpec::Literal("mother")),
    rule(EntityKind::Relationship, r"\bCONIUGI\b", 0.88, ValueSpec::Literal("spouse")),
    rule(EntityKind::Relationship, r"\bUXORI\b", 0.88, ValueSpec::Literal("wife")),
    rule(EntityKind::Relationship, r"\bFRATRI\b", 0.88, ValueSpec::Literal("brother")),
    rule(EntityKind::Relationship, r"\bSORORI\b", 0.88, ValueSpec::Literal("sister")),
    rule(EntityKind::Relationship, r"\bNEPOTI\b", 0.85, ValueSpec::Literal("grandchild")),
    rule(EntityKind::Relationship, r"\bAUIAE\b", 0.85, ValueSpec::Literal("grandmother")),
    rule(EntityKind::Relationship, r"\bAUO\b", 0.85, ValueSpec::Literal("grandfather")),
    rule(EntityKind::Relationship, r"\bPATER\b", 0.85, ValueSpec::Literal("father")),
    rule(EntityKind::Relationship, r"\bMATER\b", 0.85, ValueSpec::Literal("mother")),
    rule(EntityKind::Relationship, r"\bFILIUS\b", 0.85, ValueSpec::Literal("son")),
    rule(EntityKind::Relationship, r"\bFILIA\b", 0.85, ValueSpec::Literal("daughter")),
    rule(EntityKind::Relationship, r"\bCONIUX\b", 0.85, ValueSpec::Literal("spouse")),
    rule(EntityKind::Relationship, r"\bUXOR\b", 0.85, ValueSpec::Literal("wife")),
    rule(EntityKind::Relationship, r"\bFRATER\b", 0.85, ValueSpec::Literal("brother")),
    rule(EntityKind::Relationship, r"\bSOROR\b", 0.85, ValueSpec::Literal("sister")),
    rule(EntityKind::Relationship, r"\bHERES\b", 0.85, ValueSpec::Literal("heir")),

    // -- military service --
    rule(EntityKind::MilitaryService, r"\bCENTURIO\b", 0.90, ValueSpec::Literal("centurion")),
    rule(EntityKind::MilitaryService, r"\bMILES\b", 0.88, ValueSpec::Literal("soldier")),
    rule(EntityKind::MilitaryService, r"\bMIL\b", 0.80, ValueSpec::Literal("soldier")),
    rule(EntityKind::MilitaryService, r"\bUETERANUS\b", 0.88, ValueSpec::Literal("veteran")),
    rule(EntityKind::MilitaryService, r"\bEQUES\b", 0.85, ValueSpec::Literal("cavalryman")),
    rule(EntityKind::MilitaryService, r"\bPRAEFECTUS\b", 0.88, ValueSpec::Literal("prefect")),
    rule(EntityKind::MilitaryService, r"\bTRIBUNUS\b", 0.88, ValueSpec::Literal("tribune")),
    rule(EntityKind::MilitaryService, r"\bLEG(?:IONIS)? ([IUXLCDM]+)\b", 0.88, ValueSpec::Legion),

    // -- age: fuller formulas carry higher priors --
    rule(EntityKind::Age, r"\bUIXIT ANNIS ([IUXLCDM]+|[0-9]+)\b", 0.92, ValueSpec::Age),
    rule(EntityKind::Age, r"\bUIXIT ANNOS ([IUXLCDM]+|[0-9]+)\b", 0.92, ValueSpec::Age),
    rule(EntityKind::Age, r"\bUIX ANNIS ([IUXLCDM]+|[0-9]+)\b", 0.88, ValueSpec::Age),
    rule(EntityKind::Age, r"\bUIX ANNOS ([IUXLCDM]+|[0-9]+)\b", 0.88, ValueSpec::Age),
    rule(EntityKind::Age, r"\bANNORUM ([IUXLCDM]+|[0-9]+)\b", 0.85, ValueSpec::Age),
    rule(EntityKind::Age, r"\bU A ([IUXLCDM]+|[0-9]+)\b", 0.85, ValueSpec::Age),
];

static RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .map(|r| CompiledRule {
            kind: r.kind,
            re: Regex::new(r.pattern)
                .unwrap_or_else(|e| panic!("rule table regex {:?}: {e}", r.pattern)),
            confidence: Confidence::saturating(r.confidence),
            value: r.value,
        })
        .collect()
});

/// Run the rule table over one normalized inscription.
///
/// Candidates may overlap each other; spans cover the whole rule
/// match so formula rows can shadow their single-letter components
/// during overlap resolution.
#[must_use]
pub fn extract(norm: &NormalizedText) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    for rule in RULES.iter() {
        for caps in rule.re.captures_iter(norm.text()) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let payload = caps.get(1).unwrap_or(whole);
            let value = match rule.value {
                ValueSpec::Literal(s) => s.to_string(),
                ValueSpec::Classical => norm.classical_value(payload.start(), payload.end()),
                ValueSpec::Age => match parse_age(payload.as_str()) {
                    Some(age) if AGE_RANGE.contains(&age) => age.to_string(),
                    Some(age) => {
                        log::debug!("age {age} outside {AGE_RANGE:?}, dropping candidate");
                        continue;
                    }
                    None => continue,
                },
                ValueSpec::Legion => match parse_age(payload.as_str()) {
                    Some(n) => format!("legion {n}"),
                    None => continue,
                },
            };
            out.push(RawCandidate::new(
                EntityKey::solo(rule.kind),
                whole.start(),
                whole.end(),
                value,
                rule.confidence,
                Phase::Pattern,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_of(text: &str, kind: EntityKind) -> Vec<String> {
        let norm = NormalizedText::new(text);
        extract(&norm)
            .into_iter()
            .filter(|c| c.key.kind == kind)
            .map(|c| c.value)
            .collect()
    }

    #[test]
    fn dedication_formula_abbreviated() {
        let values = values_of("D M GAIVS", EntityKind::Status);
        assert_eq!(values, vec!["dis manibus"]);
    }

    #[test]
    fn dedication_formula_full() {
        let values = values_of("DIS MANIBUS SACRUM", EntityKind::Status);
        assert!(values.contains(&"dis manibus sacrum".to_string()));
    }

    #[test]
    fn praenomen_full_form() {
        assert_eq!(values_of("GAIVS IVLIVS", EntityKind::Praenomen), vec!["Gaius"]);
    }

    #[test]
    fn praenomen_abbreviation() {
        assert_eq!(values_of("C IVLIVS", EntityKind::Praenomen), vec!["Gaius"]);
    }

    #[test]
    fn nomen_classical_rendering() {
        assert_eq!(values_of("IVLIVS", EntityKind::Nomen), vec!["Iulius"]);
        assert_eq!(values_of("VIBIVS", EntityKind::Nomen), vec!["Vibius"]);
    }

    #[test]
    fn nomen_skips_genitive_forms() {
        assert!(values_of("VIBIAE SABINAE", EntityKind::Nomen).is_empty());
    }

    #[test]
    fn cognomen_match() {
        assert_eq!(values_of("CAESAR", EntityKind::Cognomen), vec!["Caesar"]);
    }

    #[test]
    fn age_roman_numeral_converted() {
        assert_eq!(values_of("VIXIT ANNOS XXV", EntityKind::Age), vec!["25"]);
    }

    #[test]
    fn age_arabic_accepted() {
        assert_eq!(values_of("VIXIT ANNIS 42", EntityKind::Age), vec!["42"]);
    }

    #[test]
    fn age_out_of_range_rejected() {
        assert!(values_of("VIX ANNOS CC", EntityKind::Age).is_empty());
    }

    #[test]
    fn age_one_and_onefifty_accepted() {
        assert_eq!(values_of("VIXIT ANNIS I", EntityKind::Age), vec!["1"]);
        assert_eq!(values_of("VIXIT ANNIS CL", EntityKind::Age), vec!["150"]);
    }

    #[test]
    fn legion_number_rendered() {
        let values = values_of("MILES LEG X", EntityKind::MilitaryService);
        assert!(values.contains(&"soldier".to_string()));
        assert!(values.contains(&"legion 10".to_string()));
    }

    #[test]
    fn relationship_dative_and_nominative() {
        assert_eq!(values_of("FILIAE", EntityKind::Relationship), vec!["daughter"]);
        assert_eq!(values_of("PATER", EntityKind::Relationship), vec!["father"]);
    }

    #[test]
    fn location_from_domo() {
        assert_eq!(values_of("DOMO ROMA", EntityKind::Location).len(), 2);
    }

    #[test]
    fn deterministic() {
        let norm = NormalizedText::new("D M GAIVS IVLIVS CAESAR VIXIT ANNOS XXV");
        assert_eq!(extract(&norm), extract(&norm));
    }
}
