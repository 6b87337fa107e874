mod channel;
mod conversation;
mod discovery;
mod ids;
mod viewer;

pub use channel::*;
pub use conversation::*;
pub use discovery::*;
pub use ids::*;
pub use viewer::*;
