//! Inscription text normalization.
//!
//! Epigraphic transcriptions arrive with line-break markers, ragged
//! whitespace, and either classical (V-only) or modern (U/V)
//! orthography. Normalization folds all of that into a canonical
//! uppercase form so one rule table matches every convention, while
//! keeping an aligned copy of the source letterforms so extracted
//! values can be rendered back in classical style.

use once_cell::sync::Lazy;
use regex::Regex;

static BREAK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap_or_else(|e| panic!("break marker regex: {e}")));

const VOWELS: &[char] = &['A', 'E', 'I', 'O', 'U'];

/// Normalized inscription text with an aligned record of the source
/// letterforms.
///
/// `text` is uppercase, single-spaced, with every `V` folded to `U`.
/// `raw` is byte-aligned with `text` but preserves the source's U/V
/// distinction. Normalization is idempotent: normalizing `text`
/// again yields `text` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    raw: String,
    mixed_orthography: bool,
}

impl NormalizedText {
    /// Normalize a raw transcription.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let cleaned = BREAK_MARKER.replace_all(input, " ");

        let mut text = String::with_capacity(cleaned.len());
        let mut raw = String::with_capacity(cleaned.len());
        let mut pending_space = false;
        for ch in cleaned.chars() {
            if ch.is_whitespace() {
                pending_space = !text.is_empty();
                continue;
            }
            if pending_space {
                text.push(' ');
                raw.push(' ');
                pending_space = false;
            }
            for upper in ch.to_uppercase() {
                raw.push(upper);
                text.push(if upper == 'V' { 'U' } else { upper });
            }
        }

        let has_u = raw.contains('U');
        let has_v = raw.contains('V');

        Self {
            text,
            raw,
            mixed_orthography: has_u && has_v,
        }
    }

    /// The canonical uppercase text all phases match against.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source letterforms, byte-aligned with [`Self::text`].
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the source used both `U` and `V` (modern orthography).
    #[must_use]
    pub fn mixed_orthography(&self) -> bool {
        self.mixed_orthography
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Words of the normalized text with their byte spans.
    #[must_use]
    pub fn tokens(&self) -> Vec<Token<'_>> {
        let mut out = Vec::new();
        let mut start = None;
        for (i, b) in self.text.bytes().enumerate() {
            if b == b' ' {
                if let Some(s) = start.take() {
                    out.push(Token {
                        start: s,
                        end: i,
                        text: &self.text[s..i],
                    });
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            out.push(Token {
                start: s,
                end: self.text.len(),
                text: &self.text[s..],
            });
        }
        out
    }

    /// Render a span of the normalized text in classical style:
    /// title-cased words with the consonantal `v` restored.
    ///
    /// When the source distinguished `U` from `V` its letterforms are
    /// authoritative. In V-only transcriptions a folded `U` becomes
    /// `v` when it opens onto a vowel and does not follow `Q`.
    #[must_use]
    pub fn classical_value(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        if start >= end {
            return String::new();
        }

        let bytes = self.text.as_bytes();
        let raw_bytes = self.raw.as_bytes();
        let mut out = String::with_capacity(end - start);
        let mut word_start = true;
        for i in start..end {
            let ch = bytes[i] as char;
            if ch == ' ' {
                out.push(' ');
                word_start = true;
                continue;
            }
            let rendered = if ch == 'U' {
                if self.mixed_orthography {
                    if raw_bytes[i] == b'V' {
                        'v'
                    } else {
                        'u'
                    }
                } else if self.consonantal_u(i) {
                    'v'
                } else {
                    'u'
                }
            } else {
                ch.to_ascii_lowercase()
            };
            if word_start {
                out.extend(rendered.to_uppercase());
                word_start = false;
            } else {
                out.push(rendered);
            }
        }
        out
    }

    /// Heuristic for V-only transcriptions: a `U` at byte `i` is
    /// consonantal when the next letter is a vowel and the previous
    /// letter is not `Q`.
    fn consonantal_u(&self, i: usize) -> bool {
        let bytes = self.text.as_bytes();
        let next_is_vowel = bytes
            .get(i + 1)
            .is_some_and(|&b| VOWELS.contains(&(b as char)));
        let after_q = i > 0 && bytes[i - 1] == b'Q';
        next_is_vowel && !after_q
    }
}

/// A word of normalized text with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_v_and_uppercases() {
        let n = NormalizedText::new("d m gaivs");
        assert_eq!(n.text(), "D M GAIUS");
        assert_eq!(n.raw(), "D M GAIVS");
    }

    #[test]
    fn strips_break_markers_and_collapses_whitespace() {
        let n = NormalizedText::new("  D M<BR>GAIVS   IVLIVS<br/> CAESAR ");
        assert_eq!(n.text(), "D M GAIUS IULIUS CAESAR");
    }

    #[test]
    fn idempotent() {
        let once = NormalizedText::new("D M VIBIAE<BR>SABINAE");
        let twice = NormalizedText::new(once.text());
        assert_eq!(once.text(), twice.text());
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert!(NormalizedText::new("").is_empty());
        assert!(NormalizedText::new("   \n\t ").is_empty());
    }

    #[test]
    fn detects_mixed_orthography() {
        assert!(NormalizedText::new("VIBIUS PAULUS").mixed_orthography());
        assert!(!NormalizedText::new("GAIVS IVLIVS").mixed_orthography());
        assert!(!NormalizedText::new("IULIUS").mixed_orthography());
    }

    #[test]
    fn tokens_have_correct_spans() {
        let n = NormalizedText::new("D M GAIVS");
        let toks = n.tokens();
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[2].text, "GAIUS");
        assert_eq!(&n.text()[toks[2].start..toks[2].end], "GAIUS");
    }

    #[test]
    fn classical_rendering_v_only_source() {
        let n = NormalizedText::new("GAIVS IVLIVS CAESAR");
        let toks = n.tokens();
        assert_eq!(n.classical_value(toks[0].start, toks[0].end), "Gaius");
        assert_eq!(n.classical_value(toks[1].start, toks[1].end), "Iulius");
        assert_eq!(n.classical_value(toks[2].start, toks[2].end), "Caesar");
    }

    #[test]
    fn classical_rendering_consonantal_u() {
        let n = NormalizedText::new("VIBIAE");
        assert_eq!(n.classical_value(0, n.text().len()), "Vibiae");
    }

    #[test]
    fn classical_rendering_mixed_source_trusts_letterforms() {
        let n = NormalizedText::new("VIBIUS PAULUS");
        assert_eq!(n.classical_value(0, n.text().len()), "Vibius Paulus");
    }

    #[test]
    fn qu_never_consonantal() {
        let n = NormalizedText::new("QVINTVS");
        assert_eq!(n.classical_value(0, n.text().len()), "Quintus");
    }

    #[test]
    fn multi_word_span_titlecased_per_word() {
        let n = NormalizedText::new("VIBIAE SABINAE");
        assert_eq!(n.classical_value(0, n.text().len()), "Vibiae Sabinae");
    }
}
