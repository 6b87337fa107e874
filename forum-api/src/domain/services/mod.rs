mod discovery;

pub use discovery::{DiscoveryServiceImpl, DEFAULT_PAGE_SIZE};
