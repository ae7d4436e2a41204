//! Orderdesk server library.
//!
//! A JSON/HTTP backend managing users, products and orders over
//! `PostgreSQL`. The binary in `main.rs` wires configuration, logging and
//! Sentry around [`routes::app`]; everything else lives here so it can be
//! exercised by tests and the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
