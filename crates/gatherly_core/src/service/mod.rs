//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into mutation-level operations.
//! - Enforce identity, existence and authorization preconditions before
//!   any write.
//! - Map failures onto stable caller-facing error codes.

pub mod event_service;
pub mod organization_service;
pub mod user_service;

/// Requester id does not resolve to a user.
pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
/// Organization id is missing or does not resolve to an organization.
pub const ORGANIZATION_NOT_FOUND: &str = "ORGANIZATION_NOT_FOUND";
/// Event id does not resolve to an event.
pub const EVENT_NOT_FOUND: &str = "EVENT_NOT_FOUND";
/// Requester holds no sufficient role inside the organization.
pub const ORGANIZATION_NOT_AUTHORIZED: &str = "ORGANIZATION_NOT_AUTHORIZED";
/// Target user is not a member of the organization.
pub const MEMBER_NOT_FOUND: &str = "MEMBER_NOT_FOUND";
/// Email is already registered by another user.
pub const EMAIL_ALREADY_EXISTS: &str = "EMAIL_ALREADY_EXISTS";
/// Payload failed field validation.
pub const INVALID_INPUT: &str = "INVALID_INPUT";
/// Storage or consistency failure not attributable to the caller.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
