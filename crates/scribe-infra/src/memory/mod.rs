//! In-memory repository implementations.

mod store;

pub use store::InMemoryStore;

#[cfg(test)]
mod tests;
