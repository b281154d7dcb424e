//! Keyword extraction for queries and message text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const STOPWORDS: &[&str] = &[
    "welche", "was", "kannst", "kann", "mir", "dir", "du", "ich", "wir", "ihr", "sie", "ist",
    "sind", "war", "waren", "wurde", "wurden", "schon", "auch", "und", "oder", "nicht", "kein",
    "keine", "ohne", "mit", "zu", "über", "ueber", "für", "fuer", "von", "im", "in", "auf", "am",
    "die", "der", "das", "ein", "eine", "einer", "eines", "dem", "den", "dass", "wie", "wo",
    "wann", "warum", "wieso", "weshalb", "frage", "suche", "informationen", "info", "infos",
    "ergebnisse", "gefunden",
];

/// Checked in order; only the first match is stripped.
const SUFFIXES: &[&str] = &["en", "er", "e", "s", "n"];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-zäöüß0-9]+").expect("static pattern"))
}

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Extracts normalized keywords: lower-cased, stopwords and short words
/// removed, lightly stemmed, deduplicated in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stopwords = stopwords();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for raw in word_pattern().find_iter(&lowered).map(|m| m.as_str()) {
        if stopwords.contains(raw) || raw.chars().count() <= 2 {
            continue;
        }
        let token = stem(raw);
        if seen.insert(token.clone()) {
            keywords.push(token);
        }
    }

    keywords
}

fn stem(token: &str) -> String {
    let len = token.chars().count();
    for suffix in SUFFIXES {
        if token.ends_with(suffix) && len > suffix.len() + 2 {
            return token[..token.len() - suffix.len()].to_string();
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_and_short_words_dropped() {
        let tokens = extract_keywords("Was ist die beste Schriftart für UI?");
        assert_eq!(tokens, vec!["best", "schriftart"]);
    }

    #[test]
    fn test_suffix_priority_and_guard() {
        // "reisen" -> "en" wins over "n"
        assert_eq!(extract_keywords("reisen"), vec!["reis"]);
        // "fonts" -> "s"
        assert_eq!(extract_keywords("fonts"), vec!["font"]);
        // too short to strip: len 3 is not > 1 + 2
        assert_eq!(extract_keywords("gas"), vec!["gas"]);
        assert_eq!(extract_keywords("tipps"), vec!["tipp"]);
    }

    #[test]
    fn test_umlauts_kept_inside_tokens() {
        assert_eq!(extract_keywords("Bafög Anträge"), vec!["bafög", "anträg"]);
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let tokens = extract_keywords("Figma figma FIGMA Mockup mockup");
        assert_eq!(tokens, vec!["figma", "mockup"]);
    }

    #[test]
    fn test_reapplying_adds_no_tokens() {
        let inputs = [
            "Welche Fonts hatten wir für die Webseiten-Projekte gefunden?",
            "Reise nach Portugal: Lissabon, Porto und Strände",
            "tft comps patch 14.2 Ergebnisse",
            "",
        ];
        for input in inputs {
            let once = extract_keywords(input);
            let twice = extract_keywords(&once.join(" "));
            assert!(twice.len() <= once.len(), "input: {input}");
            for token in &twice {
                assert!(!token.is_empty());
                assert!(!STOPWORDS.contains(&token.as_str()));
            }
        }
    }

    #[test]
    fn test_output_has_no_stopwords_or_duplicates() {
        let tokens = extract_keywords("die die und Katzen Katzen wie Hunde");
        let unique: HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());
        assert!(tokens.iter().all(|t| !STOPWORDS.contains(&t.as_str())));
    }
}
