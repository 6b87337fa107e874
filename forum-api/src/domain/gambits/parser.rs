//! Query parser for the gambit mini-language.
//!
//! Transforms strings like `sticky "hello world" -locked + author:toby` into
//! an ordered list of tokens. Parsing never fails: anything that is not a
//! registered gambit becomes free text.

use serde::Serialize;

use super::registry::{GambitRegistry, TermRef};

/// A single parsed unit of a query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GambitToken {
    FreeText {
        text: String,
        negated: bool,
    },
    QuotedPhrase {
        text: String,
        negated: bool,
    },
    Named {
        name: String,
        negated: bool,
        argument: Option<String>,
    },
}

impl GambitToken {
    #[cfg(test)]
    pub fn named(name: &str) -> Self {
        GambitToken::Named {
            name: name.to_string(),
            negated: false,
            argument: None,
        }
    }
}

/// A query string broken into tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub raw: String,
    pub tokens: Vec<GambitToken>,
    nondeterministic: bool,
}

impl ParsedQuery {
    /// True when re-running the query will not reproduce its ordering, so
    /// polling must not diff its results.
    pub fn is_nondeterministic(&self) -> bool {
        self.nondeterministic
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Parse a raw query string against the registry.
///
/// Never drops a non-empty query: input made only of signs, markers or
/// separators comes back as a single free-text token.
pub fn parse_query(registry: &GambitRegistry, query: &str) -> ParsedQuery {
    let terms = scan(query);
    let mut tokens = Vec::with_capacity(terms.len());
    let mut nondeterministic = false;
    let mut position = 0;

    while position < terms.len() {
        let term = &terms[position];

        if term.quoted {
            tokens.push(GambitToken::QuotedPhrase {
                text: term.text.clone(),
                negated: term.negated,
            });
            position += 1;
            continue;
        }

        // Template matching only looks at the unquoted run ahead.
        let run: Vec<TermRef<'_>> = terms[position..]
            .iter()
            .take_while(|term| !term.quoted)
            .map(|term| TermRef {
                text: &term.text,
                negated: term.negated,
            })
            .collect();

        match registry.match_terms(&run) {
            Some(found) => {
                if found.definition.nondeterministic && !term.negated {
                    nondeterministic = true;
                }
                tokens.push(GambitToken::Named {
                    name: found.definition.name.clone(),
                    negated: term.negated,
                    argument: found.argument,
                });
                position += found.consumed;
            }
            None => {
                if term.explicit {
                    tracing::debug!(term = %term.text, "unknown gambit, treating as free text");
                }
                tokens.push(GambitToken::FreeText {
                    text: term.text.clone(),
                    negated: term.negated,
                });
                position += 1;
            }
        }
    }

    if tokens.is_empty() && !query.is_empty() {
        let literal = match query.trim() {
            "" => query,
            trimmed => trimmed,
        };
        tokens.push(GambitToken::FreeText {
            text: literal.to_string(),
            negated: false,
        });
    }

    ParsedQuery {
        raw: query.to_string(),
        tokens,
        nondeterministic,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawTerm {
    text: String,
    negated: bool,
    quoted: bool,
    /// Written with a leading `#`, as the gambit menu does.
    explicit: bool,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '+'
}

fn scan(input: &str) -> Vec<RawTerm> {
    let mut terms = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| is_separator(*c)).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let negated = chars.next_if_eq(&'-').is_some();
        let explicit = chars.next_if_eq(&'#').is_some();

        if chars.next_if_eq(&'"').is_some() {
            // An unclosed quote runs to the end of the input.
            let phrase: String = chars.by_ref().take_while(|c| *c != '"').collect();
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                terms.push(RawTerm {
                    text: phrase.to_string(),
                    negated,
                    quoted: true,
                    explicit,
                });
            }
            continue;
        }

        let mut text = String::new();
        while let Some(c) = chars.next_if(|c| !is_separator(*c)) {
            if c == '"' {
                // title:"two words" keeps the quoted part inside the term.
                text.extend(chars.by_ref().take_while(|c| *c != '"'));
            } else {
                text.push(c);
            }
        }

        if !text.is_empty() {
            terms.push(RawTerm {
                text,
                negated,
                quoted: false,
                explicit,
            });
        }
    }

    terms
}
