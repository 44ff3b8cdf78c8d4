//! Core traits for the Define system
//!
//! This module defines the abstract interfaces that all providers must follow.
//!
//! - [`Source`]: Look up a word and produce a [`Definition`](crate::Definition)
//! - [`SourceFactory`]: Contribute configuration and build a [`Source`]

pub mod source;

pub use source::{Source, SourceFactory};
