//! Text canonicalization shared by the parser and the domain handlers.
//!
//! Everything here is pure: no state, no I/O, never panics on odd input.

use unicode_normalization::UnicodeNormalization;

/// Articles and contracted prepositions dropped before matching.
pub const STOPWORDS: &[&str] = &[
    "a", "o", "as", "os",
    "do", "da", "de", "dos", "das",
    "no", "na", "nos", "nas",
    "para", "pra", "pro",
    "pelo", "pela",
];

const DENIALS: &[&str] = &["nao", "cancela", "cancelar", "deixa", "esquece", "nenhum", "nenhuma"];

/// Lower-case ASCII: diacritics stripped, every word kept.
pub fn fold(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect::<String>().to_lowercase()
}

/// Lower-cases, strips diacritics, drops stopwords and collapses whitespace.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    fold(text)
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits normalized text into bare words, trimming punctuation at the edges.
/// Hyphenated compounds ("ar-condicionado") stay a single token.
pub fn tokens(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalization used for hub friendly names: lower-case, no `do/da/de`,
/// single spaces. Diacritics are kept so it matches names as the hub stores them.
pub fn normalize_name(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| !matches!(*w, "do" | "da" | "de"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when a reply reads as "no / cancel".
pub fn is_denial(text: &str) -> bool {
    tokens(&normalize(text))
        .iter()
        .any(|t| DENIALS.contains(&t.as_str()))
}
