//! Dispatch state manager and storage adapters for the Lifeline backend.
//!
//! The crate is split along a port/adapter seam:
//!
//! - [`store`] declares the repository ports and ships two adapters, a
//!   Postgres implementation and an in-memory one used by the test suites.
//! - [`dispatch`] holds the `DispatchService`, the one place that owns the
//!   ticket/rescuer assignment workflow and its cross-entity invariant.
//! - [`auth`] wraps Argon2id password hashing and verification.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod store;

pub use auth::AuthCrypto;
pub use dispatch::DispatchService;
pub use error::{DispatchError, Result};
pub use store::memory::MemoryStore;
pub use store::postgres::PostgresStore;
pub use store::DispatchStore;

/// Embedded Postgres migrations, applied at startup or via `db migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
