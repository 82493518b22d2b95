//! Text normalization applied to every patient-supplied field before matching.
//!
//! Lower-cases and strips characters that can split a phrase without being
//! visible ("can't\u{200B}breathe"). No stemming, no spelling correction.
//! Text is never truncated: a disclosure at the end of a long note must
//! still be matched.

/// Normalized text plus whether anything beyond lower-casing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub was_modified: bool,
}

pub fn normalize(raw: &str) -> String {
    normalize_text(raw).text
}

/// Strip invisible and control characters, fold apostrophes, collapse
/// whitespace runs, and lower-case.
pub fn normalize_text(raw: &str) -> NormalizedText {
    let stripped = remove_control_characters(&remove_invisible_unicode(raw));
    let collapsed = collapse_whitespace(&fold_apostrophes(&stripped));
    let was_modified = collapsed != raw.trim();
    NormalizedText {
        text: collapsed.to_lowercase(),
        was_modified,
    }
}

/// Remove zero-width and invisible Unicode characters.
fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'  // Zero-width chars
                | '\u{202A}'..='\u{202E}' // Directional formatting
                | '\u{2060}'..='\u{2064}' // Invisible operators
                | '\u{2066}'..='\u{2069}' // Directional isolates
                | '\u{FEFF}'              // BOM
                | '\u{00AD}'              // Soft hyphen
                | '\u{034F}'              // Combining grapheme joiner
                | '\u{180E}'              // Mongolian vowel separator
            )
        })
        .collect()
}

/// Control characters become spaces so adjacent words stay separate.
fn remove_control_characters(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Typographic apostrophes become ASCII so "can’t" matches "can't".
fn fold_apostrophes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{FF07}' => '\'',
            other => other,
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_plain_text() {
        assert_eq!(normalize("I Can't BREATHE"), "i can't breathe");
    }

    #[test]
    fn zero_width_space_is_removed() {
        let result = normalize_text("can't\u{200B} breathe");
        assert_eq!(result.text, "can't breathe");
        assert!(result.was_modified);
    }

    #[test]
    fn zero_width_inside_word_rejoins_it() {
        assert_eq!(normalize("chest pa\u{200D}in"), "chest pain");
    }

    #[test]
    fn curly_apostrophe_is_folded() {
        assert_eq!(normalize("I can\u{2019}t breathe"), "i can't breathe");
    }

    #[test]
    fn newlines_and_tabs_become_single_spaces() {
        assert_eq!(normalize("chest\n\tpain"), "chest pain");
    }

    #[test]
    fn clean_text_is_not_marked_modified() {
        let result = normalize_text("Mild headache");
        assert!(!result.was_modified);
        assert_eq!(result.text, "mild headache");
    }

    #[test]
    fn long_text_is_kept_whole() {
        let raw = format!("{}I want to kill myself", "word ".repeat(600));
        let result = normalize_text(&raw);
        assert!(result.text.ends_with("i want to kill myself"));
        assert_eq!(result.text.chars().count(), raw.chars().count());
        assert!(!result.was_modified);
    }

    #[test]
    fn non_ascii_text_survives() {
        assert_eq!(normalize("Fièvre ÉLEVÉE"), "fièvre élevée");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }
}
