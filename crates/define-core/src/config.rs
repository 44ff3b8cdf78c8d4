//! Configuration types for the Define system
//!
//! Configuration is assembled in three layers, lowest priority first:
//!
//! 1. Built-in defaults supplied by the caller (including the default
//!    preferred provider)
//! 2. An optional JSON configuration file
//! 3. Command-line / environment overrides
//!
//! Providers declare the settings they need as [`ConfigField`]s on a shared
//! [`ConfigSurface`] before anything is parsed. Values end up in one
//! [`ProviderSettings`] section per provider key.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "preferred_source": "webster",
//!   "providers": {
//!     "webster": { "api-key": "..." },
//!     "oxford": { "app-id": "...", "app-key": "..." }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::registry::Providers;

/// One setting a provider contributes to the configuration surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigField {
    /// Owning provider key (set when added to a surface)
    pub provider: String,
    /// Setting name within the provider section (e.g. "api-key")
    pub name: String,
    /// Help text shown on the command line
    pub help: String,
    /// Environment variable that may supply the value
    pub env: Option<String>,
    /// Whether the provider refuses to start without it
    pub required: bool,
    /// Whether the value must be hidden from logs and help output
    pub secret: bool,
}

impl ConfigField {
    /// Create a new optional, non-secret field
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            provider: String::new(),
            name: name.into(),
            help: help.into(),
            env: None,
            required: false,
            secret: false,
        }
    }

    /// Set the environment variable
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as secret
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Command-line flag name, `<provider>-<name>`
    pub fn flag_name(&self) -> String {
        format!("{}-{}", self.provider, self.name)
    }
}

/// Shared configuration surface every provider contributes to
#[derive(Debug, Default)]
pub struct ConfigSurface {
    fields: Vec<ConfigField>,
}

impl ConfigSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field on behalf of `provider`
    ///
    /// Two fields resolving to the same flag name are a configuration error.
    pub fn add(&mut self, provider: &str, mut field: ConfigField) -> Result<()> {
        if field.name.trim().is_empty() {
            return Err(Error::config(format!(
                "Provider {provider:?} contributed a field with an empty name"
            )));
        }

        field.provider = provider.to_string();
        let flag = field.flag_name();
        if self.fields.iter().any(|f| f.flag_name() == flag) {
            return Err(Error::config(format!(
                "Duplicate configuration flag: --{flag}"
            )));
        }

        tracing::debug!(flag = %flag, required = field.required, "Configuration field added");
        self.fields.push(field);
        Ok(())
    }

    /// All contributed fields in contribution order
    pub fn fields(&self) -> &[ConfigField] {
        &self.fields
    }

    /// Fields contributed by one provider
    pub fn fields_for<'a>(&'a self, provider: &'a str) -> impl Iterator<Item = &'a ConfigField> {
        self.fields.iter().filter(move |f| f.provider == provider)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Settings of one provider, keyed by field name
///
/// The `Debug` output lists names only; values may be API keys.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSettings(BTreeMap<String, String>);

impl ProviderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Non-blank value of a setting, trimmed
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value of a required setting
    ///
    /// A missing or blank value is a configuration error naming the provider
    /// and the field.
    pub fn require(&self, provider: &str, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| {
            Error::config(format!(
                "Provider {provider:?} requires setting {name:?} (flag --{provider}-{name})"
            ))
        })
    }

    /// Overlay `other` on top of these settings
    pub fn merge(&mut self, other: ProviderSettings) {
        self.0.extend(other.0);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "<REDACTED>")))
            .finish()
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineConfig {
    /// Key of the provider that serves every lookup
    #[serde(default)]
    pub preferred_source: String,

    /// Settings per provider key
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl DefineConfig {
    /// Create a configuration preferring `preferred_source`
    pub fn new(preferred_source: impl Into<String>) -> Self {
        Self {
            preferred_source: preferred_source.into(),
            providers: BTreeMap::new(),
        }
    }

    /// Set one provider setting
    pub fn with_setting(
        mut self,
        provider: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.providers
            .entry(provider.into())
            .or_default()
            .set(name, value);
        self
    }

    /// Settings section of a provider (empty if none configured)
    pub fn settings(&self, provider: &str) -> ProviderSettings {
        self.providers.get(provider).cloned().unwrap_or_default()
    }

    /// Validate the configuration
    ///
    /// Only checks that a preferred key exists. Whether it names a registered
    /// provider is decided by the registry.
    pub fn validate(&self) -> Result<()> {
        if self.preferred_source.trim().is_empty() {
            return Err(Error::config("No preferred source configured"));
        }
        Ok(())
    }

    fn overlay(
        &mut self,
        preferred_source: Option<String>,
        providers: BTreeMap<String, ProviderSettings>,
    ) {
        if let Some(preferred) = preferred_source {
            self.preferred_source = preferred.trim().to_string();
        }
        for (key, settings) in providers {
            self.providers.entry(key).or_default().merge(settings);
        }
    }
}

/// Command-line / environment layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Preferred provider key, if given
    pub preferred_source: Option<String>,

    /// Provider settings given on the command line or environment
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred provider key
    pub fn with_preferred_source(mut self, key: impl Into<String>) -> Self {
        self.preferred_source = Some(key.into());
        self
    }

    /// Record a value for a contributed field
    pub fn set(&mut self, field: &ConfigField, value: impl Into<String>) {
        self.providers
            .entry(field.provider.clone())
            .or_default()
            .set(field.name.clone(), value);
    }
}

/// Configuration file layer
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    preferred_source: Option<String>,
    #[serde(default)]
    providers: BTreeMap<String, ProviderSettings>,
}

/// Merge defaults, the configuration file and overrides
///
/// # Parameters
///
/// - `overrides`: Command-line / environment values (highest priority)
/// - `providers`: Registered providers (used for diagnostics only)
/// - `config_path`: Configuration file; missing or empty files are skipped
/// - `defaults`: Built-in defaults (lowest priority)
///
/// # Returns
///
/// - `Ok(DefineConfig)`: The merged configuration
/// - `Err(Error::Config)`: If the file is unreadable or malformed, or no
///   preferred source remains after merging
pub fn resolve(
    overrides: &Overrides,
    providers: &Providers,
    config_path: impl AsRef<Path>,
    defaults: DefineConfig,
) -> Result<DefineConfig> {
    let config_path = config_path.as_ref();
    let mut config = defaults;

    if let Some(file) = load_file(config_path)? {
        for key in file.providers.keys().filter(|k| !providers.contains(k)) {
            tracing::warn!(
                provider = %key,
                path = %config_path.display(),
                "Configuration file has settings for an unregistered provider"
            );
        }
        config.overlay(file.preferred_source, file.providers);
    }

    config.overlay(overrides.preferred_source.clone(), overrides.providers.clone());
    config.validate()?;

    tracing::debug!(
        preferred_source = %config.preferred_source,
        sections = config.providers.len(),
        "Configuration resolved"
    );
    Ok(config)
}

fn load_file(path: &Path) -> Result<Option<FileConfig>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            )));
        }
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents).map(Some).map_err(|e| {
        Error::config(format!(
            "Malformed configuration file {}: {}",
            path.display(),
            e
        ))
    })
}
