//! wallet-store: Persistence boundary for the Attribute Exchange Platform
//!
//! This crate provides:
//! - The async `Collection`/`Database` traits the consumption layer
//!   persists through
//! - `DocumentQuery`, the equality-filter query shape those traits accept
//! - An in-memory backend for tests and default wiring
//! - `TypedCollection`, the serde-typed view controllers work with
//!
//! # Architecture
//!
//! The actual synchronized persistence engine lives outside this workspace;
//! everything here is the seam it plugs into. Documents are JSON values
//! carrying their own variant discriminators, keyed by string id, one
//! collection per entity type.
//!
//! Owned by: agent-store

pub mod collection;
pub mod error;
pub mod memory;
pub mod query;
pub mod typed;

pub use collection::{Collection, Database};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryCollection, MemoryDatabase};
pub use query::DocumentQuery;
pub use typed::TypedCollection;
