//! Mekong Core - Shared domain types.
//!
//! This crate provides common types used across all Mekong components:
//! - `marketplace` - Order fulfillment workflow library
//! - `integration-tests` - End-to-end workflow scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no messaging. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, status enums plus the fulfillment state machine,
//!   and the selected-options snapshot record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
