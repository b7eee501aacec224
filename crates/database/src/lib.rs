//! # Autorent Database Crate
//!
//! This crate is the persistence layer for reservations. It owns the
//! storage abstraction the booking resolver runs against and both of its
//! implementations.
//!
//! ## Architectural Principles
//!
//! - **One seam, two backends:** `ReservationStore` is the only interface
//!   the rest of the application sees. `PgStore` implements it on
//!   PostgreSQL for production; `MemoryStore` implements it in-process for
//!   tests and demos.
//! - **Atomic booking units:** conflict checking and inserting must happen
//!   as one isolated step per vehicle type. `begin_unit` hands out a
//!   `ReservationUnit` that guarantees this, whichever backend it came from.
//! - **Asynchronous & Pooled:** all operations are asynchronous, and the
//!   Postgres backend uses a connection pool (`PgPool`) for concurrent
//!   database access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `ReservationStore` / `ReservationUnit`: The storage seam.
//! - `PgStore` / `MemoryStore`: The two implementations of that seam.
//! - `StoreError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ReservationStore, ReservationUnit};
