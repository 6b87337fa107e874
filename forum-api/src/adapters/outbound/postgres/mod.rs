mod channels;
mod conversations;
mod marker;

pub use channels::PostgresChannelStore;
pub use conversations::PostgresConversationSearch;
pub use marker::PostgresConversationMarker;
