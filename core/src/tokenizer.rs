use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anything that is neither alphanumeric nor whitespace is deleted outright.
    static ref STRIP: Regex = Regex::new(r"[^\p{Alphabetic}\p{N}\s]").expect("valid regex");
}

/// Tokenize text into normalized terms: lowercase, delete punctuation and symbols
/// (so "don't" becomes "dont"), split on runs of whitespace, drop empties.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    STRIP
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalize a single query term the same way corpus terms are normalized.
pub fn normalize_term(term: &str) -> String {
    let lowered = term.to_lowercase();
    STRIP.replace_all(&lowered, "").trim().to_string()
}

/// Display word count: plain whitespace split of the raw text, no case folding or stripping.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        assert_eq!(tokenize("The cat SAT."), vec!["the", "cat", "sat"]);
    }

    #[test]
    fn apostrophes_are_deleted_not_split() {
        assert_eq!(tokenize("Don't stop"), vec!["dont", "stop"]);
    }

    #[test]
    fn punctuation_only_yields_nothing() {
        assert!(tokenize("!!! ... ???").is_empty());
        assert_eq!(word_count("!!! ... ???"), 3);
    }

    #[test]
    fn normalize_matches_tokenizer() {
        assert_eq!(normalize_term("  Cat! "), "cat");
        assert_eq!(normalize_term("Don't"), tokenize("Don't")[0]);
    }
}
