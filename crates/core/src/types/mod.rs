//! Core types for the Mekong marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod options;
pub mod status;

pub use id::*;
pub use options::{OptionsBlobError, SelectedOption, decode_options, encode_options};
pub use status::*;
