pub mod client;
pub mod normalize;
pub mod types;

#[cfg(test)]
pub mod mock;
