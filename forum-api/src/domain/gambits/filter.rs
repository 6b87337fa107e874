//! Compiles parsed gambit tokens into a storage-neutral [`ConversationFilter`].

use regex::Regex;
use std::sync::LazyLock;
use time::Duration;

use super::parser::GambitToken;
use super::registry::names;
use crate::domain::models::{MemberId, Viewer};

/// Conversations with no activity for this long count as dead.
pub const DEAD_AFTER: Duration = Duration::days(30);

/// Upper bound on `active last ? hours/days` so durations cannot overflow.
const MAX_WINDOW_UNITS: i64 = 100_000;

static REPLY_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([<>=]?)(\d+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    Id(MemberId),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equal,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::GreaterThan => ">",
            Comparison::LessThan => "<",
            Comparison::Equal => "=",
        }
    }

    pub fn holds(&self, left: i32, right: i32) -> bool {
        match self {
            Comparison::GreaterThan => left > right,
            Comparison::LessThan => left < right,
            Comparison::Equal => left == right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Sticky,
    Locked,
    Private,
    Draft,
    Starred,
    Ignored,
    Unread,
    Author(MemberRef),
    Contributor(MemberRef),
    ActiveWithin(Duration),
    ActiveToday,
    Dead,
    HasReplies,
    Replies(Comparison, i32),
    TitleContains(String),
    /// A registered gambit this compiler has no translation for.
    Custom {
        name: String,
        argument: Option<String>,
    },
}

impl Predicate {
    /// Predicates that only make sense for a signed-in member.
    fn requires_member(&self) -> bool {
        matches!(
            self,
            Predicate::Private
                | Predicate::Draft
                | Predicate::Starred
                | Predicate::Ignored
                | Predicate::Unread
                | Predicate::Author(MemberRef::Id(_))
                | Predicate::Contributor(MemberRef::Id(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub predicate: Predicate,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulltextTerm {
    pub text: String,
    pub phrase: bool,
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    LastActivity,
    Newest,
    Replies,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub reversed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    pub conditions: Vec<Condition>,
    pub fulltext: Vec<FulltextTerm>,
    pub order: SortOrder,
    /// Ignored conversations are hidden unless the query asks for them.
    pub include_ignored: bool,
    pub warnings: Vec<String>,
}

impl ConversationFilter {
    fn push(&mut self, predicate: Predicate, negated: bool) {
        self.conditions.push(Condition { predicate, negated });
    }
}

pub fn compile_filter(tokens: &[GambitToken], viewer: &Viewer) -> ConversationFilter {
    let mut filter = ConversationFilter::default();

    for token in tokens {
        match token {
            GambitToken::FreeText { text, negated } => filter.fulltext.push(FulltextTerm {
                text: text.clone(),
                phrase: false,
                negated: *negated,
            }),
            GambitToken::QuotedPhrase { text, negated } => filter.fulltext.push(FulltextTerm {
                text: text.clone(),
                phrase: true,
                negated: *negated,
            }),
            GambitToken::Named {
                name,
                negated,
                argument,
            } => compile_named(&mut filter, name, *negated, argument.as_deref(), viewer),
        }
    }

    filter
}

fn compile_named(
    filter: &mut ConversationFilter,
    name: &str,
    negated: bool,
    argument: Option<&str>,
    viewer: &Viewer,
) {
    let predicate = match name {
        names::STICKY => Predicate::Sticky,
        names::LOCKED => Predicate::Locked,
        names::PRIVATE => Predicate::Private,
        names::DRAFT => Predicate::Draft,
        names::STARRED => Predicate::Starred,
        names::UNREAD => Predicate::Unread,
        names::ACTIVE_TODAY => Predicate::ActiveToday,
        names::DEAD => Predicate::Dead,
        names::HAS_REPLIES => Predicate::HasReplies,
        names::IGNORED => {
            if viewer.is_member() && !negated {
                filter.include_ignored = true;
            }
            Predicate::Ignored
        }
        names::AUTHOR | names::CONTRIBUTOR => {
            let Some(member) = member_ref(argument, viewer) else {
                tracing::debug!(gambit = name, "dropping member gambit without a usable member");
                return;
            };
            if name == names::AUTHOR {
                Predicate::Author(member)
            } else {
                Predicate::Contributor(member)
            }
        }
        names::ACTIVE_LAST_HOURS | names::ACTIVE_LAST_DAYS => {
            let Some(amount) = positive_count(argument) else {
                filter.warnings.push(format!(
                    "'{}' is not a valid number of {}",
                    argument.unwrap_or_default(),
                    if name == names::ACTIVE_LAST_HOURS { "hours" } else { "days" }
                ));
                return;
            };
            if name == names::ACTIVE_LAST_HOURS {
                Predicate::ActiveWithin(Duration::hours(amount))
            } else {
                Predicate::ActiveWithin(Duration::days(amount))
            }
        }
        names::REPLIES => {
            let Some((comparison, count)) = reply_comparison(argument) else {
                filter.warnings.push(format!(
                    "'{}' is not a valid reply count",
                    argument.unwrap_or_default()
                ));
                return;
            };
            Predicate::Replies(comparison, count)
        }
        names::TITLE => match argument.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => Predicate::TitleContains(text.to_string()),
            None => return,
        },
        names::ORDER_BY_NEWEST | names::ORDER_BY_REPLIES | names::RANDOM | names::REVERSE => {
            if !negated {
                apply_order(&mut filter.order, name);
            }
            return;
        }
        _ => Predicate::Custom {
            name: name.to_string(),
            argument: argument.map(str::to_string),
        },
    };

    if predicate.requires_member() && !viewer.is_member() {
        tracing::debug!(gambit = name, "dropping member-only gambit for guest");
        return;
    }

    filter.push(predicate, negated);
}

fn apply_order(order: &mut SortOrder, name: &str) {
    match name {
        names::ORDER_BY_NEWEST => order.key = SortKey::Newest,
        names::ORDER_BY_REPLIES => order.key = SortKey::Replies,
        names::RANDOM => order.key = SortKey::Random,
        names::REVERSE => order.reversed = true,
        _ => {}
    }
}

/// `myself` resolves to the viewer; guests have no self to refer to.
fn member_ref(argument: Option<&str>, viewer: &Viewer) -> Option<MemberRef> {
    let argument = argument.map(str::trim).filter(|name| !name.is_empty())?;
    if argument.eq_ignore_ascii_case("myself") {
        viewer.member_id().map(MemberRef::Id)
    } else {
        Some(MemberRef::Name(argument.to_string()))
    }
}

fn positive_count(argument: Option<&str>) -> Option<i64> {
    argument?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|amount| (1..=MAX_WINDOW_UNITS).contains(amount))
}

fn reply_comparison(argument: Option<&str>) -> Option<(Comparison, i32)> {
    let captures = REPLY_COUNT_PATTERN.captures(argument?.trim())?;
    let comparison = match captures.get(1).map(|m| m.as_str()) {
        Some(">") => Comparison::GreaterThan,
        Some("<") => Comparison::LessThan,
        _ => Comparison::Equal,
    };
    let count = captures.get(2)?.as_str().parse::<i32>().ok()?;
    Some((comparison, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gambits::{parse_query, GambitRegistry};

    fn compile(query: &str, viewer: Viewer) -> ConversationFilter {
        let parsed = parse_query(&GambitRegistry::builtin(), query);
        compile_filter(&parsed.tokens, &viewer)
    }

    fn member() -> Viewer {
        Viewer::member(MemberId::new(7))
    }

    fn predicates(filter: &ConversationFilter) -> Vec<(Predicate, bool)> {
        filter
            .conditions
            .iter()
            .map(|c| (c.predicate.clone(), c.negated))
            .collect()
    }

    #[test]
    fn empty_query_compiles_to_default_filter() {
        let filter = compile("", member());
        assert_eq!(filter, ConversationFilter::default());
        assert_eq!(filter.order.key, SortKey::LastActivity);
    }

    #[test]
    fn flags_and_negation() {
        let filter = compile(r#"sticky "hello world" -locked"#, member());
        assert_eq!(
            predicates(&filter),
            vec![(Predicate::Sticky, false), (Predicate::Locked, true)]
        );
        assert_eq!(
            filter.fulltext,
            vec![FulltextTerm {
                text: "hello world".to_string(),
                phrase: true,
                negated: false
            }]
        );
    }

    #[test]
    fn member_only_gambits_are_dropped_for_guests() {
        let filter = compile("starred unread private draft author:myself sticky", Viewer::guest());
        assert_eq!(predicates(&filter), vec![(Predicate::Sticky, false)]);
        assert!(filter.warnings.is_empty());
    }

    #[test]
    fn myself_resolves_to_viewer() {
        let filter = compile("author:myself contributor:Toby", member());
        assert_eq!(
            predicates(&filter),
            vec![
                (Predicate::Author(MemberRef::Id(MemberId::new(7))), false),
                (
                    Predicate::Contributor(MemberRef::Name("Toby".to_string())),
                    false
                ),
            ]
        );
    }

    #[test]
    fn guests_may_still_filter_by_named_author() {
        let filter = compile("author:Toby", Viewer::guest());
        assert_eq!(
            predicates(&filter),
            vec![(Predicate::Author(MemberRef::Name("Toby".to_string())), false)]
        );
    }

    #[test]
    fn ignored_lifts_default_hiding() {
        assert!(compile("ignored", member()).include_ignored);
        assert!(!compile("-ignored", member()).include_ignored);
        assert!(!compile("ignored", Viewer::guest()).include_ignored);
    }

    #[test]
    fn activity_windows() {
        let filter = compile("active last 3 hours active last 2 days active today dead", member());
        assert_eq!(
            predicates(&filter),
            vec![
                (Predicate::ActiveWithin(Duration::hours(3)), false),
                (Predicate::ActiveWithin(Duration::days(2)), false),
                (Predicate::ActiveToday, false),
                (Predicate::Dead, false),
            ]
        );
    }

    #[test]
    fn malformed_counts_warn_and_are_ignored() {
        let filter = compile("active last many days has lots replies", member());
        assert!(filter.conditions.is_empty());
        assert_eq!(filter.warnings.len(), 2);
        assert!(filter.warnings[0].contains("many"));
        assert!(filter.warnings[1].contains("lots"));
    }

    #[test]
    fn reply_comparisons() {
        let filter = compile(
            "has >10 replies has <3 replies has =2 replies has 5 replies",
            member(),
        );
        assert_eq!(
            predicates(&filter),
            vec![
                (Predicate::Replies(Comparison::GreaterThan, 10), false),
                (Predicate::Replies(Comparison::LessThan, 3), false),
                (Predicate::Replies(Comparison::Equal, 2), false),
                (Predicate::Replies(Comparison::Equal, 5), false),
            ]
        );
        assert!(Comparison::GreaterThan.holds(11, 10));
        assert!(!Comparison::LessThan.holds(3, 3));
    }

    #[test]
    fn order_gambits_set_sort() {
        let filter = compile("order by replies reverse", member());
        assert_eq!(
            filter.order,
            SortOrder {
                key: SortKey::Replies,
                reversed: true
            }
        );
        assert!(filter.conditions.is_empty());

        assert_eq!(compile("random", member()).order.key, SortKey::Random);
        assert_eq!(compile("-order by newest", member()).order, SortOrder::default());
    }

    #[test]
    fn title_contains_keeps_argument() {
        let filter = compile(r#"title:"release notes""#, member());
        assert_eq!(
            predicates(&filter),
            vec![(Predicate::TitleContains("release notes".to_string()), false)]
        );
    }

    #[test]
    fn extension_gambits_become_custom_predicates() {
        use crate::domain::gambits::{GambitDefinition, GambitGroup};

        let registry = GambitRegistry::builtin()
            .register(GambitDefinition::new("solved", "solved", GambitGroup::Main))
            .unwrap();
        let parsed = parse_query(&registry, "-solved");
        let filter = compile_filter(&parsed.tokens, &member());
        assert_eq!(
            predicates(&filter),
            vec![(
                Predicate::Custom {
                    name: "solved".to_string(),
                    argument: None
                },
                true
            )]
        );
    }
}
