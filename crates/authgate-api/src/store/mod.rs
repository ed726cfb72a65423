//! Storage implementations for the identity and session contracts

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use postgres::PostgresStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryStore;
