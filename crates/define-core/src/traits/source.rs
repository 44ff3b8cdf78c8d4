// # Source Trait
//
// Defines the uniform lookup contract every dictionary backend implements.
//
// ## Implementations
//
// - Oxford Dictionaries: `define-source-oxford` crate
// - Merriam-Webster: `define-source-webster` crate
//
// ## Usage
//
// ```rust,ignore
// use define_core::Source;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* Source implementation */;
//
//     let definition = source.define("serendipity").await?;
//     for text in definition.definitions() {
//         println!("{text}");
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ConfigSurface, ProviderSettings};
use crate::model::Definition;

/// Trait for dictionary backends
///
/// # Thread Safety
///
/// One instance is resolved at startup and shared by every request handler,
/// so implementations must tolerate concurrent `define` calls. Any internal
/// state (an HTTP client, for instance) must be safe for shared use.
///
/// # Input
///
/// The contract does not reject empty words. Each provider decides whether an
/// empty word yields an empty [`Definition`] or an
/// [`Error::InvalidInput`](crate::Error::InvalidInput). It must never panic.
///
/// # Errors
///
/// When the upstream reply cannot be interpreted, return
/// [`Error::InvalidResponse`](crate::Error::InvalidResponse) with the raw
/// status and body so callers can show it. Retries and timeouts are the
/// provider's own business; callers never retry.
#[async_trait]
pub trait Source: Send + Sync {
    /// Look up a word
    ///
    /// # Returns
    ///
    /// - `Ok(Definition)`: Possibly with zero entries when nothing was found
    /// - `Err(Error)`: If the lookup failed
    async fn define(&self, word: &str) -> Result<Definition, crate::Error>;

    /// Provider key this source was built from (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Configuration contributor and constructor for one provider
///
/// A factory moves through the registry lifecycle with it:
///
/// 1. [`configure`](SourceFactory::configure): declare the settings it needs
/// 2. [`finalize`](SourceFactory::finalize): validate and keep its settings
/// 3. [`create`](SourceFactory::create): build the [`Source`]
pub trait SourceFactory: Send + Sync {
    /// Unique provider key (e.g. "oxford")
    fn key(&self) -> &'static str;

    /// Contribute configuration fields to the shared surface
    fn configure(&self, surface: &mut ConfigSurface) -> Result<(), crate::Error>;

    /// Validate this provider's settings
    ///
    /// Missing or malformed required settings must fail here with
    /// [`Error::Config`](crate::Error::Config), never later at lookup time.
    fn finalize(&mut self, settings: &ProviderSettings) -> Result<(), crate::Error>;

    /// Build a source from the finalized settings
    fn create(&self) -> Result<Arc<dyn Source>, crate::Error>;
}
