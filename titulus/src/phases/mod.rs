//! The four extraction phases.
//!
//! Each phase is a pure function from (normalized text, optional
//! analyzer output) to raw candidates; the consolidator reconciles
//! their overlaps and disagreements afterwards.

pub mod dependency;
pub mod grammar;
pub mod morphology;
pub mod pattern;

use titulus_core::Gender;

/// Turn a rendered genitive name into its nominative form:
/// `Vibiae` becomes `Vibia`, `Marci` becomes `Marcus`. Names ending
/// in `-is` keep their ending. Without a gender, the suffix decides.
pub(crate) fn stem_rendered_genitive(rendered: &str, gender: Option<Gender>) -> String {
    let feminine = match gender {
        Some(Gender::Feminine) => true,
        Some(_) => false,
        None => rendered.ends_with("ae"),
    };
    if feminine {
        return rendered
            .strip_suffix('e')
            .map_or_else(|| rendered.to_string(), str::to_string);
    }
    if rendered.ends_with("is") {
        rendered.to_string()
    } else if let Some(stem) = rendered.strip_suffix('i') {
        format!("{stem}us")
    } else {
        rendered.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_feminine_genitive() {
        assert_eq!(
            stem_rendered_genitive("Vibiae", Some(Gender::Feminine)),
            "Vibia"
        );
    }

    #[test]
    fn stems_masculine_genitive() {
        assert_eq!(
            stem_rendered_genitive("Marci", Some(Gender::Masculine)),
            "Marcus"
        );
        assert_eq!(
            stem_rendered_genitive("Caesaris", Some(Gender::Masculine)),
            "Caesaris"
        );
    }

    #[test]
    fn guesses_gender_from_suffix() {
        assert_eq!(stem_rendered_genitive("Sabinae", None), "Sabina");
        assert_eq!(stem_rendered_genitive("Iulii", None), "Iulius");
    }
}
