//! Channel taxonomy: the nested-set forest and slug expression resolution.

mod scope;
pub(crate) mod tree;

pub use scope::{resolve_scope, ResolvedScope};
pub use tree::ChannelTree;
