//! Storage abstraction and implementations for Taskdash.
//!
//! This crate provides a trait-based store for progress histories with a
//! JSON-file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{ProgressStore, StorageError, Result};
pub use json_storage::JsonProgressStore;
