//! # Lokal Common
//!
//! Shared types and utilities for the lokal localization engine.
//!
//! This crate provides the foundational types used across all other crates
//! in the lokal workspace: bundle identities, fully qualified key handling
//! and the supported-locale set.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod locales;
pub mod types;

#[cfg(feature = "testing")]
pub mod test_utils;

pub use locales::*;
pub use types::*;
