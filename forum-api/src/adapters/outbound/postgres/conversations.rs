//! PostgreSQL implementation of the SearchExecutor port.
//!
//! The compiled [`ConversationFilter`](crate::domain::gambits::ConversationFilter)
//! is translated into one dynamic query with `QueryBuilder`. Free text goes
//! through PostgreSQL full-text search over titles and post bodies.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Duration, OffsetDateTime};

use crate::domain::{
    gambits::{Condition, FulltextTerm, MemberRef, Predicate, SortKey, DEAD_AFTER},
    models::{ChannelId, ConversationId, ConversationSummary, SearchOutcome, Viewer},
    ports::outbound::SearchExecutor,
    DiscoveryError, SearchQuery,
};

/// Last activity of a conversation.
const ACTIVITY: &str = "COALESCE(c.last_post_time, c.start_time)";

/// Whether the joined member has seen the latest activity.
const UNREAD: &str = "COALESCE(c.last_post_time, c.start_time) > GREATEST(\
     COALESCE(mc.last_read_at, '-infinity'::timestamptz), \
     COALESCE(vm.marked_all_read_at, '-infinity'::timestamptz))";

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    title: String,
    channel_id: Option<i32>,
    sticky: bool,
    locked: bool,
    private: bool,
    reply_count: i32,
    start_time: OffsetDateTime,
    last_post_time: Option<OffsetDateTime>,
    start_member_name: Option<String>,
    last_post_member_name: Option<String>,
    unread: bool,
}

impl From<SummaryRow> for ConversationSummary {
    fn from(row: SummaryRow) -> Self {
        ConversationSummary {
            id: ConversationId::new(row.id),
            title: row.title,
            channel_id: row.channel_id.map(ChannelId::new),
            sticky: row.sticky,
            locked: row.locked,
            private: row.private,
            reply_count: row.reply_count,
            start_time: row.start_time,
            last_post_time: row.last_post_time,
            start_member_name: row.start_member_name,
            last_post_member_name: row.last_post_member_name,
            unread: row.unread,
        }
    }
}

#[derive(Clone)]
pub struct PostgresConversationSearch {
    pool: PgPool,
}

impl PostgresConversationSearch {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Member IDs for every name referenced by `author:` or `contributor:`.
    async fn resolve_members(
        &self,
        conditions: &[Condition],
    ) -> Result<HashMap<String, Option<i32>>, DiscoveryError> {
        let mut members = HashMap::new();

        for condition in conditions {
            let (Predicate::Author(MemberRef::Name(name))
            | Predicate::Contributor(MemberRef::Name(name))) = &condition.predicate
            else {
                continue;
            };
            if members.contains_key(name) {
                continue;
            }

            let id = sqlx::query_scalar::<_, i32>(
                "SELECT id FROM members WHERE LOWER(username) = LOWER($1)",
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
            members.insert(name.clone(), id);
        }

        Ok(members)
    }
}

#[async_trait]
impl SearchExecutor for PostgresConversationSearch {
    async fn find_conversation_ids(
        &self,
        query: &SearchQuery,
        viewer: &Viewer,
        limit: usize,
    ) -> Result<SearchOutcome, DiscoveryError> {
        if query.scope_ids.is_empty() || limit == 0 {
            return Ok(SearchOutcome::default());
        }

        let members = self.resolve_members(&query.filter.conditions).await?;
        let viewer_id = viewer.member_id().map(|id| id.as_i32());
        let (mut builder, warnings) =
            build_search(query, viewer_id, &members, OffsetDateTime::now_utc(), limit);

        let rows: Vec<i32> = builder
            .build_query_scalar::<i32>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Conversation search failed: {}", err);
                DiscoveryError::from(err)
            })?;

        Ok(SearchOutcome {
            more_results: rows.len() > limit,
            ids: rows.into_iter().take(limit).map(ConversationId::new).collect(),
            warnings,
        })
    }

    async fn load_summaries(
        &self,
        ids: &[ConversationId],
        viewer: &Viewer,
    ) -> Result<Vec<ConversationSummary>, DiscoveryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let viewer_id = viewer.member_id().map(|id| id.as_i32());

        let sql = format!(
            r#"
            SELECT
                c.id,
                c.title,
                c.channel_id,
                c.sticky,
                c.locked,
                c.private,
                c.reply_count,
                c.start_time,
                c.last_post_time,
                sm.username AS start_member_name,
                lm.username AS last_post_member_name,
                ($2::INT IS NOT NULL AND {UNREAD}) AS unread
            FROM conversations c
            LEFT JOIN members sm ON sm.id = c.start_member_id
            LEFT JOIN members lm ON lm.id = c.last_post_member_id
            LEFT JOIN member_conversations mc
                ON mc.conversation_id = c.id AND mc.member_id = $2
            LEFT JOIN members vm ON vm.id = $2
            WHERE c.id = ANY($1)
              AND (NOT c.private OR c.start_member_id = $2 OR COALESCE(mc.allowed, FALSE))
            "#
        );

        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(&raw_ids)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to load conversation summaries: {}", err);
                DiscoveryError::from(err)
            })?;

        let mut by_id: HashMap<i32, ConversationSummary> = rows
            .into_iter()
            .map(|row| (row.id, ConversationSummary::from(row)))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(&id.as_i32()))
            .collect())
    }
}

/// Build the ID query for a compiled search. Fetches one row past `limit`
/// so the caller can tell whether more results exist.
fn build_search(
    query: &SearchQuery,
    viewer_id: Option<i32>,
    members: &HashMap<String, Option<i32>>,
    now: OffsetDateTime,
    limit: usize,
) -> (QueryBuilder<'static, Postgres>, Vec<String>) {
    let mut warnings = Vec::new();
    let scope: Vec<i32> = query.scope_ids.iter().map(|id| id.as_i32()).collect();

    let mut builder = QueryBuilder::new(
        "SELECT c.id FROM conversations c \
         LEFT JOIN member_conversations mc ON mc.conversation_id = c.id AND mc.member_id = ",
    );
    builder.push_bind(viewer_id);
    builder.push(" LEFT JOIN members vm ON vm.id = ");
    builder.push_bind(viewer_id);
    builder.push(" WHERE c.channel_id = ANY(");
    builder.push_bind(scope);
    builder.push(") AND (NOT c.private OR c.start_member_id = ");
    builder.push_bind(viewer_id);
    builder.push(" OR COALESCE(mc.allowed, FALSE))");

    if !query.filter.include_ignored {
        builder.push(" AND NOT COALESCE(mc.ignored, FALSE)");
    }

    for condition in &query.filter.conditions {
        push_condition(&mut builder, condition, members, now, &mut warnings);
    }

    // One clause per term: a negated term excludes the conversation when it
    // appears in the title or in any post.
    for term in &query.filter.fulltext {
        let Some(tsquery) = tsquery_text(term) else {
            continue;
        };
        builder.push(if term.negated { " AND NOT (" } else { " AND (" });
        builder.push("c.search_vector @@ websearch_to_tsquery('english', ");
        builder.push_bind(tsquery.clone());
        builder.push(
            ") OR EXISTS (SELECT 1 FROM posts p WHERE p.conversation_id = c.id \
             AND p.search_vector @@ websearch_to_tsquery('english', ",
        );
        builder.push_bind(tsquery);
        builder.push(")))");
    }

    push_order(&mut builder, query);

    builder.push(" LIMIT ");
    builder.push_bind(i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX));

    (builder, warnings)
}

fn push_condition(
    builder: &mut QueryBuilder<'static, Postgres>,
    condition: &Condition,
    members: &HashMap<String, Option<i32>>,
    now: OffsetDateTime,
    warnings: &mut Vec<String>,
) {
    if let Predicate::Custom { name, .. } = &condition.predicate {
        warnings.push(format!("The gambit '{name}' is not supported"));
        return;
    }

    builder.push(if condition.negated { " AND NOT (" } else { " AND (" });

    match &condition.predicate {
        Predicate::Sticky => {
            builder.push("c.sticky");
        }
        Predicate::Locked => {
            builder.push("c.locked");
        }
        Predicate::Private => {
            builder.push("c.private");
        }
        Predicate::Draft => {
            builder.push("mc.draft IS NOT NULL");
        }
        Predicate::Starred => {
            builder.push("COALESCE(mc.starred, FALSE)");
        }
        Predicate::Ignored => {
            builder.push("COALESCE(mc.ignored, FALSE)");
        }
        Predicate::Unread => {
            builder.push(UNREAD);
        }
        Predicate::Author(member) => match member_id(member, members, warnings) {
            Some(id) => {
                builder.push("c.start_member_id = ");
                builder.push_bind(id);
            }
            None => {
                builder.push("FALSE");
            }
        },
        Predicate::Contributor(member) => match member_id(member, members, warnings) {
            Some(id) => {
                builder.push(
                    "EXISTS (SELECT 1 FROM posts p WHERE p.conversation_id = c.id AND p.member_id = ",
                );
                builder.push_bind(id);
                builder.push(")");
            }
            None => {
                builder.push("FALSE");
            }
        },
        Predicate::ActiveWithin(window) => {
            builder.push(ACTIVITY).push(" >= ");
            builder.push_bind(now - *window);
        }
        Predicate::ActiveToday => {
            builder.push(ACTIVITY).push(" >= ");
            builder.push_bind(now - Duration::days(1));
        }
        Predicate::Dead => {
            builder.push(ACTIVITY).push(" < ");
            builder.push_bind(now - DEAD_AFTER);
        }
        Predicate::HasReplies => {
            builder.push("c.reply_count > 0");
        }
        Predicate::Replies(comparison, count) => {
            builder
                .push("c.reply_count ")
                .push(comparison.as_sql())
                .push(" ");
            builder.push_bind(*count);
        }
        Predicate::TitleContains(text) => {
            builder.push("c.title ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(text)));
        }
        Predicate::Custom { .. } => {
            builder.push("TRUE");
        }
    }

    builder.push(")");
}

fn member_id(
    member: &MemberRef,
    members: &HashMap<String, Option<i32>>,
    warnings: &mut Vec<String>,
) -> Option<i32> {
    match member {
        MemberRef::Id(id) => Some(id.as_i32()),
        MemberRef::Name(name) => {
            let id = members.get(name).copied().flatten();
            if id.is_none() {
                let warning = format!("There is no member named '{name}'");
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
            id
        }
    }
}

fn push_order(builder: &mut QueryBuilder<'static, Postgres>, query: &SearchQuery) {
    let order = query.filter.order;
    let direction = if order.reversed { " ASC" } else { " DESC" };

    builder.push(" ORDER BY ");
    if query.sticky_first {
        builder.push("c.sticky DESC, ");
    }

    let column = match order.key {
        SortKey::LastActivity => ACTIVITY,
        SortKey::Newest => "c.start_time",
        SortKey::Replies => "c.reply_count",
        SortKey::Random => {
            builder.push("RANDOM()");
            return;
        }
    };
    builder
        .push(column)
        .push(direction)
        .push(", c.id")
        .push(direction);
}

/// A single term in the syntax `websearch_to_tsquery` reads, without its
/// sign. Terms with nothing to search for are skipped.
fn tsquery_text(term: &FulltextTerm) -> Option<String> {
    if !term.text.chars().any(char::is_alphanumeric) {
        return None;
    }
    let text = term.text.replace('"', " ");
    Some(if term.phrase {
        format!("\"{text}\"")
    } else {
        text
    })
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        gambits::{parse_query, GambitRegistry},
        models::MemberId,
    };

    fn search(raw: &str, viewer: Viewer, sticky_first: bool) -> SearchQuery {
        let parsed = parse_query(&GambitRegistry::builtin(), raw);
        SearchQuery::new(vec![ChannelId::new(1), ChannelId::new(2)], parsed, &viewer)
            .sticky_first(sticky_first)
    }

    fn sql(query: &SearchQuery, members: &HashMap<String, Option<i32>>) -> (String, Vec<String>) {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(365);
        let (builder, warnings) = build_search(query, Some(1), members, now, 20);
        (builder.sql().to_string(), warnings)
    }

    #[test]
    fn default_query_hides_ignored_and_orders_by_activity() {
        let (sql, warnings) = sql(&search("", Viewer::guest(), false), &HashMap::new());
        assert!(sql.contains("c.channel_id = ANY($3)"));
        assert!(sql.contains("AND NOT COALESCE(mc.ignored, FALSE)"));
        assert!(sql.ends_with(
            "ORDER BY COALESCE(c.last_post_time, c.start_time) DESC, c.id DESC LIMIT $5"
        ));
        assert!(warnings.is_empty());
    }

    #[test]
    fn sticky_first_leads_ordering() {
        let (sql, _) = sql(&search("", Viewer::guest(), true), &HashMap::new());
        assert!(sql.contains("ORDER BY c.sticky DESC, COALESCE"));
    }

    #[test]
    fn negated_conditions_are_wrapped() {
        let viewer = Viewer::member(MemberId::new(1));
        let (sql, _) = sql(&search("sticky -locked", viewer, false), &HashMap::new());
        assert!(sql.contains(" AND (c.sticky)"));
        assert!(sql.contains(" AND NOT (c.locked)"));
    }

    #[test]
    fn ignored_gambit_lifts_default_exclusion() {
        let viewer = Viewer::member(MemberId::new(1));
        let (sql, _) = sql(&search("ignored", viewer, false), &HashMap::new());
        assert!(!sql.contains("AND NOT COALESCE(mc.ignored, FALSE)"));
        assert!(sql.contains("AND (COALESCE(mc.ignored, FALSE))"));
    }

    #[test]
    fn unknown_author_warns_and_matches_nothing() {
        let members = HashMap::from([("ghost".to_string(), None)]);
        let (sql, warnings) = sql(&search("author:ghost", Viewer::guest(), false), &members);
        assert!(sql.contains(" AND (FALSE)"));
        assert_eq!(warnings, vec!["There is no member named 'ghost'"]);
    }

    #[test]
    fn known_author_binds_member_id() {
        let members = HashMap::from([("toby".to_string(), Some(9))]);
        let (sql, warnings) = sql(&search("author:toby", Viewer::guest(), false), &members);
        assert!(sql.contains("c.start_member_id = $"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn reply_comparison_uses_operator() {
        let (sql, _) = sql(&search("has <3 replies", Viewer::guest(), false), &HashMap::new());
        assert!(sql.contains("c.reply_count < $"));
    }

    #[test]
    fn order_gambits_change_sort() {
        let (sql, _) = sql(
            &search("order by replies reverse", Viewer::guest(), false),
            &HashMap::new(),
        );
        assert!(sql.contains("ORDER BY c.reply_count ASC, c.id ASC"));

        let (random_sql, _) = self::sql(&search("random", Viewer::guest(), false), &HashMap::new());
        assert!(random_sql.contains("ORDER BY RANDOM()"));
    }

    #[test]
    fn fulltext_terms_use_websearch_syntax() {
        let query = search(r#"sticky "hello world" spam"#, Viewer::guest(), false);
        let texts: Vec<String> = query.filter.fulltext.iter().filter_map(tsquery_text).collect();
        assert_eq!(texts, vec![r#""hello world""#, "spam"]);

        let (sql, _) = sql(&query, &HashMap::new());
        assert_eq!(sql.matches(" AND (c.search_vector @@ websearch_to_tsquery(").count(), 2);
        assert!(sql.ends_with("LIMIT $9"));
    }

    #[test]
    fn negated_fulltext_excludes_title_and_post_matches() {
        let query = search("-spam", Viewer::guest(), false);
        let (sql, _) = sql(&query, &HashMap::new());
        assert!(sql.contains(
            " AND NOT (c.search_vector @@ websearch_to_tsquery('english', $5) \
             OR EXISTS (SELECT 1 FROM posts p WHERE p.conversation_id = c.id \
             AND p.search_vector @@ websearch_to_tsquery('english', $6)))"
        ));
        assert_eq!(tsquery_text(&query.filter.fulltext[0]).as_deref(), Some("spam"));
    }

    #[test]
    fn fulltext_without_searchable_characters_is_skipped() {
        let query = search("-", Viewer::guest(), false);
        assert_eq!(query.filter.fulltext.len(), 1);
        let (sql, _) = sql(&query, &HashMap::new());
        assert!(!sql.contains("websearch_to_tsquery"));
        assert!(sql.ends_with("LIMIT $5"));
    }

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like(r"100%_a\b"), r"100\%\_a\\b");
    }
}
