//! Provider appointment booking for the U-Engine ecosystem.
//!
//! Keeps a set of appointments free of double-bookings and presents them
//! in one deterministic order. Storage is pluggable; an in-memory and a
//! SQLite store are included.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Appointment`, `AppointmentId`, `TimeSlot`, `Urgency`
//! - **`scheduler`**: Conflict detection, canonical ordering, and the `Scheduler`
//!   that books and cancels through a store
//! - **`store`**: The `AppointmentStore` trait with `MemoryStore` and `SqliteStore`
//! - **`validation`**: Boundary checks on typed input and audits of stored sets
//! - **`config`**: Layered TOML + environment configuration
//!
//! # Invariant
//!
//! For every provider, the half-open slots `[start, start + duration)` of
//! that provider's appointments are pairwise disjoint. Back-to-back
//! appointments (one ending exactly when the next begins) are allowed.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod validation;

pub use error::{SchedulerError, SchedulerResult};
