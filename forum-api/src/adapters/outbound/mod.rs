#[cfg(test)]
pub mod mock;
pub mod postgres;
