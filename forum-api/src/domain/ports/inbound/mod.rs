mod discovery;

pub use discovery::*;
