//! Provider registry
//!
//! The registry is the catalog of compiled-in dictionary providers. It is an
//! explicit three-phase state machine:
//!
//! - **Open**: providers register and contribute configuration fields
//! - **Finalized**: every provider has validated its settings; no further
//!   registration is possible
//! - **Resolved**: the preferred provider has been turned into a live
//!   [`Source`]
//!
//! The phases are types, so the lifecycle is enforced at compile time:
//! finalizing consumes the open registry, and only a finalized registry can
//! provide a source.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use define_core::{ConfigSurface, DefineConfig, Overrides, ProviderRegistry, resolve};
//!
//! let mut registry = ProviderRegistry::new();
//! define_source_webster::register(&mut registry)?;
//!
//! let mut surface = ConfigSurface::new();
//! let providers = registry.configure(&mut surface)?;
//! let config = resolve(&Overrides::new(), providers, "/dev/null", DefineConfig::new("webster"))?;
//!
//! let registry = registry.finalize(&config)?;
//! let source = registry.provide_preferred(&config.preferred_source)?;
//! ```
//!
//! A registry that has not been finalized cannot provide a source:
//!
//! ```compile_fail
//! use define_core::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! let _ = registry.provide_preferred("oxford");
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register` function:
//!
//! ```rust,ignore
//! // In define-source-oxford crate
//! pub fn register(registry: &mut ProviderRegistry) -> Result<()> {
//!     registry.register(Box::new(OxfordFactory::default()))
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::{ConfigSurface, DefineConfig};
use crate::error::{Error, Result};
use crate::traits::{Source, SourceFactory};

/// Registry phase: providers may still register
#[derive(Debug, Default)]
pub struct Open;

/// Registry phase: configuration is locked
#[derive(Debug)]
pub struct Finalized;

/// Registered provider factories, keyed by provider key
#[derive(Default)]
pub struct Providers {
    factories: BTreeMap<String, Box<dyn SourceFactory>>,
}

impl Providers {
    /// Provider keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Check if a provider key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Contributor registered under `key`
    pub fn get(&self, key: &str) -> Option<&dyn SourceFactory> {
        self.factories.get(key).map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn known_keys(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// Provider registry
///
/// The registry is built once at startup and owned by whoever drives the
/// startup sequence. All phases run sequentially before any request is
/// served, so it needs no locking.
#[derive(Debug)]
pub struct ProviderRegistry<State = Open> {
    providers: Providers,
    _state: PhantomData<State>,
}

impl Default for ProviderRegistry<Open> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> ProviderRegistry<State> {
    /// Registered providers
    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// List all registered provider keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.providers.known_keys()
    }

    /// Check if a provider key is registered
    pub fn has_provider(&self, key: &str) -> bool {
        self.providers.contains(key)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderRegistry<Open> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: Providers::default(),
            _state: PhantomData,
        }
    }

    /// Register a provider factory
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Registered under `factory.key()`
    /// - `Err(Error::Config)`: If the key is empty or already registered
    pub fn register(&mut self, factory: Box<dyn SourceFactory>) -> Result<()> {
        let key = factory.key();
        if key.trim().is_empty() {
            return Err(Error::config("Provider key cannot be empty"));
        }
        if self.providers.contains(key) {
            return Err(Error::config(format!(
                "Provider {key:?} is already registered"
            )));
        }

        tracing::debug!(provider = key, "Registering provider");
        self.providers.factories.insert(key.to_string(), factory);
        Ok(())
    }

    /// Let every registered provider contribute its configuration fields
    ///
    /// Must run before user configuration is parsed.
    ///
    /// # Returns
    ///
    /// - `Ok(&Providers)`: One contributor per registered provider
    /// - `Err(Error::Config)`: If no provider is registered, or a provider
    ///   contributed a conflicting field
    pub fn configure(&self, surface: &mut ConfigSurface) -> Result<&Providers> {
        if self.providers.is_empty() {
            return Err(Error::config("At least one provider must be registered"));
        }

        for (key, factory) in &self.providers.factories {
            factory.configure(surface)?;
            tracing::debug!(
                provider = %key,
                fields = surface.fields_for(key).count(),
                "Provider configuration contributed"
            );
        }

        Ok(&self.providers)
    }

    /// Lock the registry and let every provider validate its settings
    ///
    /// Each provider receives its own settings section from `config`. A
    /// provider with missing or malformed required settings fails the whole
    /// registry; nothing is served with a half-configured provider set.
    pub fn finalize(mut self, config: &DefineConfig) -> Result<ProviderRegistry<Finalized>> {
        if self.providers.is_empty() {
            return Err(Error::config(
                "Cannot finalize a registry without providers",
            ));
        }

        for (key, factory) in self.providers.factories.iter_mut() {
            factory.finalize(&config.settings(key))?;
            tracing::debug!(provider = %key, "Provider finalized");
        }

        tracing::info!(providers = ?self.providers, "Provider registry finalized");
        Ok(ProviderRegistry {
            providers: self.providers,
            _state: PhantomData,
        })
    }
}

impl ProviderRegistry<Finalized> {
    /// Instantiate the preferred provider
    ///
    /// Calling this again with the same key yields an equivalent source.
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Source>)`: The source serving all lookups
    /// - `Err(Error::UnknownProvider)`: If `key` is not registered; the error
    ///   names `key` and the known keys
    /// - `Err(Error)`: If the provider fails to build its source
    pub fn provide_preferred(&self, key: &str) -> Result<Arc<dyn Source>> {
        let factory = self
            .providers
            .get(key)
            .ok_or_else(|| Error::unknown_provider(key, self.providers.known_keys()))?;

        let source = factory.create()?;
        tracing::info!(provider = key, "Preferred source resolved");
        Ok(source)
    }
}
