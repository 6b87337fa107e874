//! The gambit query language: registry, parser, filter compiler, menu and
//! highlight extraction.

mod filter;
mod highlight;
mod menu;
mod parser;
mod registry;

pub use filter::{
    compile_filter, Condition, ConversationFilter, FulltextTerm, MemberRef, Predicate, SortKey,
    DEAD_AFTER,
};
pub use highlight::{fulltext_string, highlight_terms};
pub use menu::{gambit_menu, GambitMenuSection};
pub use parser::{parse_query, GambitToken, ParsedQuery};
pub use registry::{names, GambitDefinition, GambitGroup, GambitRegistry, GambitRegistryError};
