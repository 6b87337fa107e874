//! Ordered table of the gambits the query parser recognises.
//!
//! The registry is assembled once at startup: the built-in set first, then
//! any extensions from configuration. Registration is a pure builder step;
//! nothing is mutated after the registry is shared.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Stable gambit names the filter compiler understands.
pub mod names {
    pub const STICKY: &str = "sticky";
    pub const PRIVATE: &str = "private";
    pub const STARRED: &str = "starred";
    pub const DRAFT: &str = "draft";
    pub const IGNORED: &str = "ignored";
    pub const UNREAD: &str = "unread";
    pub const ORDER_BY_NEWEST: &str = "order_by_newest";
    pub const ACTIVE_LAST_HOURS: &str = "active_last_hours";
    pub const ACTIVE_LAST_DAYS: &str = "active_last_days";
    pub const ACTIVE_TODAY: &str = "active_today";
    pub const DEAD: &str = "dead";
    pub const LOCKED: &str = "locked";
    pub const AUTHOR: &str = "author";
    pub const CONTRIBUTOR: &str = "contributor";
    pub const HAS_REPLIES: &str = "has_replies";
    pub const REPLIES: &str = "replies";
    pub const ORDER_BY_REPLIES: &str = "order_by_replies";
    pub const TITLE: &str = "title";
    pub const RANDOM: &str = "random";
    pub const REVERSE: &str = "reverse";
}

/// Section of the gambit menu an entry is listed under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GambitGroup {
    Main,
    Time,
    Member,
    Replies,
    Text,
    #[default]
    Misc,
}

/// Who the gambit is offered to in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Everyone,
    Members,
}

/// One registry entry: how to recognise a gambit and how to display it.
///
/// `template` is a space-separated word pattern. A `?` word captures one
/// query term as the argument; a word ending in `?` (like `author:?`)
/// matches any term starting with the rest of the word and captures the
/// remainder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GambitDefinition {
    pub name: String,
    pub template: String,
    /// Menu text. Defaults to the template.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: GambitGroup,
    #[serde(default)]
    pub css_class: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub audience: Audience,
    /// Results differ on every execution, so polling must not diff them.
    #[serde(default)]
    pub nondeterministic: bool,
}

impl GambitDefinition {
    pub fn new(name: &str, template: &str, group: GambitGroup) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            label: None,
            group,
            css_class: None,
            icon: None,
            audience: Audience::Everyone,
            nondeterministic: false,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn css_class(mut self, css_class: &str) -> Self {
        self.css_class = Some(css_class.to_string());
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn members_only(mut self) -> Self {
        self.audience = Audience::Members;
        self
    }

    pub fn nondeterministic(mut self) -> Self {
        self.nondeterministic = true;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.template)
    }

    pub fn display_class(&self) -> String {
        self.css_class
            .clone()
            .unwrap_or_else(|| format!("gambit-{}", self.name))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GambitRegistryError {
    #[error("gambit '{0}' has an empty name")]
    EmptyName(String),
    #[error("gambit '{0}' has an empty template")]
    EmptyTemplate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateWord {
    Literal(String),
    Capture,
    Prefix(String),
}

impl TemplateWord {
    fn compile(template: &str) -> Vec<TemplateWord> {
        template
            .split_whitespace()
            .map(|word| match word {
                "?" => TemplateWord::Capture,
                _ if word.len() > 1 && word.ends_with('?') => {
                    TemplateWord::Prefix(word[..word.len() - 1].to_lowercase())
                }
                _ => TemplateWord::Literal(word.to_lowercase()),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct RegisteredGambit {
    definition: GambitDefinition,
    pattern: Vec<TemplateWord>,
}

/// One unquoted query term, as seen by template matching.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TermRef<'a> {
    pub text: &'a str,
    pub negated: bool,
}

/// Result of matching the registry against the terms at some position.
#[derive(Debug, Clone)]
pub(crate) struct GambitMatch<'r> {
    pub definition: &'r GambitDefinition,
    pub consumed: usize,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GambitRegistry {
    entries: Vec<RegisteredGambit>,
}

impl GambitRegistry {
    /// A registry with no entries: every term parses as free text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in gambits, in menu order.
    pub fn builtin() -> Self {
        use names::*;
        use GambitGroup::*;

        let definitions = [
            GambitDefinition::new(STICKY, "sticky", Main).icon("icon-pushpin"),
            GambitDefinition::new(PRIVATE, "private", Main)
                .icon("icon-envelope-alt")
                .members_only(),
            GambitDefinition::new(STARRED, "starred", Main)
                .icon("icon-star")
                .members_only(),
            GambitDefinition::new(DRAFT, "draft", Main)
                .icon("icon-pencil")
                .members_only(),
            GambitDefinition::new(IGNORED, "ignored", Main)
                .icon("icon-eye-close")
                .members_only(),
            GambitDefinition::new(UNREAD, "unread", Time)
                .icon("icon-inbox")
                .members_only(),
            GambitDefinition::new(ORDER_BY_NEWEST, "order by newest", Time)
                .css_class("gambit-orderByNewest")
                .icon("icon-list-ol"),
            GambitDefinition::new(ACTIVE_LAST_HOURS, "active last ? hours", Time)
                .css_class("gambit-activeLastHours")
                .icon("icon-time"),
            GambitDefinition::new(ACTIVE_LAST_DAYS, "active last ? days", Time)
                .css_class("gambit-activeLastDays")
                .icon("icon-calendar"),
            GambitDefinition::new(ACTIVE_TODAY, "active today", Time)
                .css_class("gambit-activeToday")
                .icon("icon-asterisk"),
            GambitDefinition::new(DEAD, "dead", Time).icon("icon-remove"),
            GambitDefinition::new(LOCKED, "locked", Time).icon("icon-lock"),
            GambitDefinition::new(AUTHOR, "author:?", Member)
                .label("author:myself")
                .css_class("gambit-authorMyself")
                .icon("icon-smile")
                .members_only(),
            GambitDefinition::new(AUTHOR, "author:?", Member)
                .label("author:member")
                .icon("icon-user"),
            GambitDefinition::new(CONTRIBUTOR, "contributor:?", Member)
                .label("contributor:myself")
                .css_class("gambit-contributorMyself")
                .icon("icon-smile")
                .members_only(),
            GambitDefinition::new(CONTRIBUTOR, "contributor:?", Member)
                .label("contributor:member")
                .icon("icon-user"),
            GambitDefinition::new(HAS_REPLIES, "has replies", Replies)
                .css_class("gambit-hasReplies")
                .icon("icon-comment"),
            GambitDefinition::new(REPLIES, "has ? replies", Replies)
                .label("has >10 replies")
                .icon("icon-comments"),
            GambitDefinition::new(ORDER_BY_REPLIES, "order by replies", Replies)
                .css_class("gambit-orderByReplies")
                .icon("icon-list-ol"),
            GambitDefinition::new(TITLE, "title:?", Text)
                .label("title: ?")
                .icon("icon-font"),
            GambitDefinition::new(RANDOM, "random", Misc)
                .icon("icon-random")
                .nondeterministic(),
            GambitDefinition::new(REVERSE, "reverse", Misc).icon("icon-exchange"),
        ];

        definitions
            .into_iter()
            .fold(Self::empty(), |registry, definition| {
                registry.push(definition)
            })
    }

    /// Add an entry after the existing ones.
    pub fn register(self, definition: GambitDefinition) -> Result<Self, GambitRegistryError> {
        if definition.name.trim().is_empty() {
            return Err(GambitRegistryError::EmptyName(definition.template));
        }
        if definition.template.trim().is_empty() {
            return Err(GambitRegistryError::EmptyTemplate(definition.name));
        }
        Ok(self.push(definition))
    }

    pub fn extend(
        self,
        definitions: impl IntoIterator<Item = GambitDefinition>,
    ) -> Result<Self, GambitRegistryError> {
        definitions
            .into_iter()
            .try_fold(self, |registry, definition| registry.register(definition))
    }

    fn push(mut self, definition: GambitDefinition) -> Self {
        let pattern = TemplateWord::compile(&definition.template);
        self.entries.push(RegisteredGambit {
            definition,
            pattern,
        });
        self
    }

    pub fn definitions(&self) -> impl Iterator<Item = &GambitDefinition> {
        self.entries.iter().map(|entry| &entry.definition)
    }

    /// Longest registry match for the terms starting at `terms[0]`. Ties go
    /// to the entry registered first.
    pub(crate) fn match_terms<'r>(&'r self, terms: &[TermRef<'_>]) -> Option<GambitMatch<'r>> {
        let mut best: Option<GambitMatch<'r>> = None;

        for entry in &self.entries {
            let Some(argument) = match_pattern(&entry.pattern, terms) else {
                continue;
            };
            let consumed = entry.pattern.len();
            if best.as_ref().map_or(true, |best| consumed > best.consumed) {
                best = Some(GambitMatch {
                    definition: &entry.definition,
                    consumed,
                    argument,
                });
            }
        }

        best
    }
}

/// Returns the captured argument (if the pattern has one) on a match.
fn match_pattern(pattern: &[TemplateWord], terms: &[TermRef<'_>]) -> Option<Option<String>> {
    if pattern.is_empty() || terms.len() < pattern.len() {
        return None;
    }

    let mut captures: Vec<&str> = Vec::new();
    for (position, (word, term)) in pattern.iter().zip(terms).enumerate() {
        // Only the first term of a gambit may carry the negation sign.
        if position > 0 && term.negated {
            return None;
        }
        match word {
            TemplateWord::Literal(literal) => {
                if term.text.to_lowercase() != *literal {
                    return None;
                }
            }
            // A capture never swallows one of its own template's literal
            // words, so `has replies replies` stays `has replies` + text.
            TemplateWord::Capture => {
                let lowered = term.text.to_lowercase();
                if pattern
                    .iter()
                    .any(|other| matches!(other, TemplateWord::Literal(l) if *l == lowered))
                {
                    return None;
                }
                captures.push(term.text);
            }
            TemplateWord::Prefix(prefix) => {
                let split = prefix.len();
                if term.text.len() <= split
                    || !term.text.is_char_boundary(split)
                    || term.text[..split].to_lowercase() != *prefix
                {
                    return None;
                }
                captures.push(&term.text[split..]);
            }
        }
    }

    Some((!captures.is_empty()).then(|| captures.join(" ")))
}
