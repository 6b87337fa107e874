use serde::Serialize;

use super::registry::{Audience, GambitGroup, GambitRegistry};
use crate::domain::models::Viewer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GambitMenuItem {
    pub name: String,
    pub label: String,
    pub css_class: String,
    pub icon: Option<String>,
    /// The search string a client gets by applying this gambit.
    pub search: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GambitMenuSection {
    pub group: GambitGroup,
    pub items: Vec<GambitMenuItem>,
}

/// Menu sections in registry order, skipping member-only entries for guests
/// and sections left empty.
pub fn gambit_menu(
    registry: &GambitRegistry,
    current_search: &str,
    viewer: &Viewer,
) -> Vec<GambitMenuSection> {
    let current_search = current_search.trim();
    let mut sections: Vec<GambitMenuSection> = Vec::new();

    for definition in registry.definitions() {
        if definition.audience == Audience::Members && !viewer.is_member() {
            continue;
        }

        let label = definition.display_label();
        let search = if current_search.is_empty() {
            format!("#{label}")
        } else {
            format!("{current_search} + #{label}")
        };
        let item = GambitMenuItem {
            name: definition.name.clone(),
            label: label.to_string(),
            css_class: definition.display_class(),
            icon: definition.icon.clone(),
            search,
        };

        match sections
            .iter_mut()
            .find(|section| section.group == definition.group)
        {
            Some(section) => section.items.push(item),
            None => sections.push(GambitMenuSection {
                group: definition.group,
                items: vec![item],
            }),
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MemberId;

    fn labels(sections: &[GambitMenuSection], group: GambitGroup) -> Vec<&str> {
        sections
            .iter()
            .find(|section| section.group == group)
            .map(|section| section.items.iter().map(|item| item.label.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn guests_see_public_gambits_only() {
        let menu = gambit_menu(&GambitRegistry::builtin(), "", &Viewer::guest());
        assert_eq!(labels(&menu, GambitGroup::Main), vec!["sticky"]);
        assert_eq!(
            labels(&menu, GambitGroup::Member),
            vec!["author:member", "contributor:member"]
        );
        assert!(!labels(&menu, GambitGroup::Time).contains(&"unread"));
    }

    #[test]
    fn members_see_personal_gambits_in_menu_order() {
        let menu = gambit_menu(
            &GambitRegistry::builtin(),
            "",
            &Viewer::member(MemberId::new(1)),
        );
        assert_eq!(
            labels(&menu, GambitGroup::Main),
            vec!["sticky", "private", "starred", "draft", "ignored"]
        );
        assert_eq!(
            labels(&menu, GambitGroup::Member),
            vec![
                "author:myself",
                "author:member",
                "contributor:myself",
                "contributor:member"
            ]
        );
        let groups: Vec<GambitGroup> = menu.iter().map(|section| section.group).collect();
        assert_eq!(
            groups,
            vec![
                GambitGroup::Main,
                GambitGroup::Time,
                GambitGroup::Member,
                GambitGroup::Replies,
                GambitGroup::Text,
                GambitGroup::Misc
            ]
        );
    }

    #[test]
    fn items_append_to_current_search() {
        let menu = gambit_menu(&GambitRegistry::builtin(), " tokio ", &Viewer::guest());
        let sticky = &menu[0].items[0];
        assert_eq!(sticky.search, "tokio + #sticky");
        assert_eq!(sticky.css_class, "gambit-sticky");
        assert_eq!(sticky.icon.as_deref(), Some("icon-pushpin"));

        let menu = gambit_menu(&GambitRegistry::builtin(), "", &Viewer::guest());
        assert_eq!(menu[0].items[0].search, "#sticky");
    }

    #[test]
    fn menu_searches_parse_back_to_their_gambit() {
        use crate::domain::gambits::{parse_query, GambitToken};

        let registry = GambitRegistry::builtin();
        let menu = gambit_menu(&registry, "", &Viewer::member(MemberId::new(1)));
        for item in menu.iter().flat_map(|section| &section.items) {
            let parsed = parse_query(&registry, &item.search);
            let parsed_name = parsed.tokens.first().and_then(|token| match token {
                GambitToken::Named { name, .. } => Some(name.as_str()),
                _ => None,
            });
            // "has >10 replies" and the capture templates round-trip; the
            // placeholder "title: ?" is the one label that is not a query.
            if item.name != "title" {
                assert_eq!(parsed_name, Some(item.name.as_str()), "{}", item.label);
            }
        }
    }
}
