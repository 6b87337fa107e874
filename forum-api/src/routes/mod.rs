pub(crate) mod conversations;
pub(crate) mod error;
pub(crate) mod gambits;

pub(crate) use error::ApiError;
