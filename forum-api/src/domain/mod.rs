pub mod channels;
mod differ;
mod error;
pub mod gambits;
pub mod models;
pub mod ports;
mod query;
pub mod services;

pub use differ::*;
pub use error::*;
pub use query::*;
