//! Orderdesk Core - Shared domain types.
//!
//! This crate provides the value types used by the orderdesk server and CLI:
//! - typed entity IDs (`UserId`, `ProductId`, `OrderId`)
//! - validated scalars (`Email`, `Price`)
//! - `FieldErrors`, the per-field validation report returned to clients
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! The optional `postgres` feature adds `sqlx` encoding so the types can be
//! bound and decoded directly in queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
