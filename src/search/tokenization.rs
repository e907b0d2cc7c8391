//! Shared tokenization, depended on identically by the batch indexer and
//! the query engine. Any divergence here silently breaks recall, since a
//! term the indexer produces must be byte-identical to the term the query
//! engine looks up.

use once_cell::sync::OnceCell;
use rust_stemmers::{Algorithm, Stemmer};
use scraper::Html;

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceCell<Stemmer> = OnceCell::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Lowercases `text`, extracts maximal runs of `[a-z0-9']`, and stems each
/// run. Pure, total, deterministic: empty input yields an empty sequence,
/// and the output never contains an empty string.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_ascii_lowercase();
    let stemmer = stemmer();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in lower.chars() {
        if c.is_ascii_digit() || (c.is_ascii_lowercase()) || c == '\'' {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(stemmer.stem(&current).into_owned());
            current.clear();
        }
    }
    if !current.is_empty() {
        tokens.push(stemmer.stem(&current).into_owned());
    }

    tokens
}

/// Extracts visible text from an HTML-like content blob by concatenating
/// the text of every node in the parsed document, separated by spaces. The
/// exact stripping strategy only affects ranking quality, not correctness.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}
