//! Core types and trait seams for the rehome adoption system.
//!
//! This crate is deliberately free of HTTP and runtime dependencies.
//! All other crates depend on it; it carries nothing heavier than serde.

pub mod address;
pub mod attempt;
pub mod catalog;
pub mod error;
pub mod event;
pub mod ledger;
pub mod record;
pub mod view;

pub use error::{Error, Result};
