mod channel_store;
mod conversation_marker;
mod search_executor;

pub use channel_store::*;
pub use conversation_marker::*;
pub use search_executor::*;
