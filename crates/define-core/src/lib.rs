// # define-core
//
// Core library for the Define dictionary front-end.
//
// ## Architecture Overview
//
// This library provides the provider-independent part of the system:
// - **Definition**: Entries → senses → definition strings, in provider order
// - **Source**: Trait every dictionary backend implements
// - **SourceFactory**: Per-provider configuration contributor and constructor
// - **ProviderRegistry**: Open → Finalized → Resolved lifecycle for providers
// - **resolve**: Merges defaults, configuration file and overrides
//
// ## Design Principles
//
// 1. **Uniform Contract**: Callers only ever see `Source::define`
// 2. **Plugin-Based**: Providers register themselves, the core never names them
// 3. **Fail Fast**: Configuration problems surface at startup, not per request
// 4. **Separate Concerns**: Parsing configuration and validating the preferred
//    key against the registry are two independent steps

pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{ConfigField, ConfigSurface, DefineConfig, Overrides, ProviderSettings, resolve};
pub use error::{Error, Result, UpstreamResponse};
pub use model::{Definition, Entry, Sense};
pub use registry::{Finalized, Open, ProviderRegistry, Providers};
pub use traits::{Source, SourceFactory};
