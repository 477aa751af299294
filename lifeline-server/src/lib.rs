//! HTTP surface of the Lifeline dispatch backend.
//!
//! Built on Axum over PostgreSQL. The library target exists so the
//! integration tests can assemble the real router against the in-memory
//! store.

pub mod api_types;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
