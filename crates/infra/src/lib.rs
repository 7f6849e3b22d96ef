//! Storage adapters for the identity, affiliation and purchasing boundaries.
//!
//! - [`memory::InMemoryStore`]: process-local, used for development and tests.
//! - [`postgres::PostgresStore`]: sqlx/Postgres, used when a database URL is configured.
//!
//! Both implement every store trait, so the API can hold one `Arc` per trait
//! pointing at the same backend.

pub mod memory;
pub mod postgres;


pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
