//! Shared epigraphic vocabulary.
//!
//! Relationship nouns, dedication verbs, formula stopwords, and the
//! Roman-numeral reader used by both the pattern and grammar phases.
//! All entries are written in normalized orthography (uppercase, `V`
//! folded to `U`).

use titulus_core::Gender;

/// Verbs that mark the dedicator clause of an inscription.
pub const DEDICATION_VERBS: &[&str] = &[
    "FECIT",
    "FECERUNT",
    "POSUIT",
    "POSUERUNT",
    "CURAUIT",
    "CURAUERUNT",
    "DEDICAUIT",
    "DEDICAUERUNT",
];

/// Formula tokens that can never be part of a personal name.
pub const FORMULA_WORDS: &[&str] = &[
    "D",
    "M",
    "S",
    "DIS",
    "MANIBUS",
    "SACRUM",
    "HIC",
    "SITUS",
    "SITA",
    "EST",
    "SIT",
    "TIBI",
    "TERRA",
    "LEUIS",
    "UIXIT",
    "UIX",
    "ANNIS",
    "ANNOS",
    "ANNORUM",
    "MENSIBUS",
    "DIEBUS",
    "ET",
    "FECIT",
    "FECERUNT",
    "POSUIT",
    "POSUERUNT",
    "CURAUIT",
    "CURAUERUNT",
    "DEDICAUIT",
    "DEDICAUERUNT",
    "BENE",
    "MERENTI",
    "LEG",
    "LEGIONIS",
    "MIL",
    "MILES",
    "CENTURIO",
    "TRIBU",
    "DOMO",
];

/// Is `word` a dedication verb?
#[must_use]
pub fn is_dedication_verb(word: &str) -> bool {
    DEDICATION_VERBS.contains(&word)
}

/// Is `word` excluded from name runs?
#[must_use]
pub fn is_formula_word(word: &str) -> bool {
    FORMULA_WORDS.contains(&word)
}

/// Nominative relationship noun ⇒ (English value, confidence prior).
#[must_use]
pub fn nominative_relationship(word: &str) -> Option<(&'static str, f64)> {
    let hit = match word {
        "PATER" => ("father", 0.88),
        "MATER" => ("mother", 0.88),
        "FILIUS" => ("son", 0.88),
        "FILIA" => ("daughter", 0.88),
        "CONIUX" => ("spouse", 0.85),
        "UXOR" => ("wife", 0.85),
        "MARITUS" => ("husband", 0.85),
        "FRATER" => ("brother", 0.85),
        "SOROR" => ("sister", 0.85),
        "HERES" => ("heir", 0.88),
        _ => return None,
    };
    Some(hit)
}

/// Dative relationship noun ⇒ (English value, prior, gender of the
/// person it names). The gender drives genitive-name stemming in the
/// grammar phase.
#[must_use]
pub fn dative_relationship(word: &str) -> Option<(&'static str, f64, Gender)> {
    let hit = match word {
        "FILIAE" => ("daughter", 0.90, Gender::Feminine),
        "MATRI" => ("mother", 0.90, Gender::Feminine),
        "CONIUGI" => ("wife", 0.88, Gender::Feminine),
        "UXORI" => ("wife", 0.88, Gender::Feminine),
        "SORORI" => ("sister", 0.88, Gender::Feminine),
        "AUIAE" => ("grandmother", 0.85, Gender::Feminine),
        "PATRI" => ("father", 0.90, Gender::Masculine),
        "FILIO" => ("son", 0.90, Gender::Masculine),
        "FRATRI" => ("brother", 0.88, Gender::Masculine),
        "AUO" => ("grandfather", 0.85, Gender::Masculine),
        "NEPOTI" => ("grandchild", 0.85, Gender::Masculine),
        _ => return None,
    };
    Some(hit)
}

/// Parse a Roman numeral written in normalized orthography, where
/// `U` stands for the numeral `V`. Returns `None` on anything that
/// is not a well-formed numeral token.
#[must_use]
pub fn roman_to_arabic(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }
    let digit = |c: char| -> Option<u32> {
        match c {
            'I' => Some(1),
            'U' => Some(5),
            'X' => Some(10),
            'L' => Some(50),
            'C' => Some(100),
            'D' => Some(500),
            'M' => Some(1000),
            _ => None,
        }
    };
    let values: Option<Vec<u32>> = token.chars().map(digit).collect();
    let values = values?;
    let mut total: i64 = 0;
    for (i, &v) in values.iter().enumerate() {
        if values.get(i + 1).is_some_and(|&next| next > v) {
            total -= i64::from(v);
        } else {
            total += i64::from(v);
        }
    }
    u32::try_from(total).ok().filter(|&n| n > 0)
}

/// Read an age token: Roman numeral (normalized) or Arabic digits.
#[must_use]
pub fn parse_age(token: &str) -> Option<u32> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        roman_to_arabic(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_basic() {
        assert_eq!(roman_to_arabic("I"), Some(1));
        assert_eq!(roman_to_arabic("U"), Some(5));
        assert_eq!(roman_to_arabic("XXU"), Some(25));
        assert_eq!(roman_to_arabic("XL"), Some(40));
        assert_eq!(roman_to_arabic("LXXIII"), Some(73));
        assert_eq!(roman_to_arabic("CC"), Some(200));
    }

    #[test]
    fn roman_subtractive() {
        assert_eq!(roman_to_arabic("IU"), Some(4));
        assert_eq!(roman_to_arabic("IX"), Some(9));
        assert_eq!(roman_to_arabic("XC"), Some(90));
    }

    #[test]
    fn roman_rejects_non_numerals() {
        assert_eq!(roman_to_arabic("ANNOS"), None);
        assert_eq!(roman_to_arabic(""), None);
        assert_eq!(roman_to_arabic("X2"), None);
    }

    #[test]
    fn parse_age_accepts_arabic() {
        assert_eq!(parse_age("25"), Some(25));
        assert_eq!(parse_age("XXU"), Some(25));
    }

    #[test]
    fn relationship_lookups() {
        assert_eq!(nominative_relationship("PATER"), Some(("father", 0.88)));
        assert!(nominative_relationship("GAIUS").is_none());
        let (value, conf, gender) = dative_relationship("FILIAE").unwrap();
        assert_eq!(value, "daughter");
        assert!((conf - 0.90).abs() < 1e-12);
        assert_eq!(gender, Gender::Feminine);
    }

    #[test]
    fn formula_words_exclude_names() {
        assert!(is_formula_word("FECIT"));
        assert!(is_formula_word("D"));
        assert!(!is_formula_word("UIBIUS"));
    }
}
