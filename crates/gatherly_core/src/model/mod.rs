//! Domain model for users, organizations and their events.
//!
//! # Responsibility
//! - Define the canonical records read and written by repositories.
//! - Own field-level validation that does not need storage access.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Cross-record links (membership, event participation) are relations
//!   owned by storage; list fields on read models are projections of them.

pub mod event;
pub mod organization;
pub mod user;
