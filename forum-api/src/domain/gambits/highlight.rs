use itertools::Itertools;

use super::parser::GambitToken;

/// Terms a renderer should highlight in conversation titles and snippets.
///
/// Quoted phrases stay whole, free text is split on whitespace. Negated
/// terms are never highlighted. First occurrence wins on duplicates.
pub fn highlight_terms(tokens: &[GambitToken]) -> Vec<String> {
    tokens
        .iter()
        .flat_map(|token| match token {
            GambitToken::QuotedPhrase {
                text,
                negated: false,
            } => vec![text.trim()],
            GambitToken::FreeText {
                text,
                negated: false,
            } => text.split_whitespace().collect(),
            _ => Vec::new(),
        })
        .filter(|term| !term.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

/// The full-text part of a query, re-serialized for display.
pub fn fulltext_string(tokens: &[GambitToken]) -> String {
    tokens
        .iter()
        .filter_map(|token| {
            let (text, negated, quoted) = match token {
                GambitToken::FreeText { text, negated } => (text, *negated, false),
                GambitToken::QuotedPhrase { text, negated } => (text, *negated, true),
                GambitToken::Named { .. } => return None,
            };
            let sign = if negated { "-" } else { "" };
            Some(if quoted {
                format!("{sign}\"{text}\"")
            } else {
                format!("{sign}{text}")
            })
        })
        .join(" ")
}
