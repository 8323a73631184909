//! # Lokal
//!
//! Application wiring for the lazy-loading localization pipeline.
//!
//! This crate assembles the translation context, route table and navigation
//! guard from an assets directory and exposes them as one [`App`] value.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;

pub use app::*;
