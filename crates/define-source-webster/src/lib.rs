// # Merriam-Webster Provider
//
// This crate provides the `webster` dictionary provider for Define, backed by
// the Merriam-Webster Dictionary API (v3).
//
// ## Behavior
//
// - One HTTP request per lookup, no retries, no caching
// - Unknown words come back as a list of spelling suggestions: an empty
//   definition, not an error
// - A non-success status, or a body of any other shape, becomes
//   `Error::InvalidResponse` with the raw status and body
// - An empty word is rejected with `Error::InvalidInput`
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or `Debug` output. It travels in the
//   query string, so request URLs are never logged either.
//
// ## API Reference
//
// - GET `/{reference}/json/{word}?key={api_key}`
// - Response: either `[{ "meta": {...}, "shortdef": ["..."] }, ...]` or
//   `["suggestion", ...]`

use async_trait::async_trait;
use define_core::config::{ConfigField, ConfigSurface, ProviderSettings};
use define_core::model::{Definition, Entry, Sense};
use define_core::traits::{Source, SourceFactory};
use define_core::{Error, ProviderRegistry, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Provider key
pub const KEY: &str = "webster";

/// Merriam-Webster API base URL
const WEBSTER_API_BASE: &str = "https://www.dictionaryapi.com/api/v3/references";

/// Default dictionary reference
const DEFAULT_REFERENCE: &str = "collegiate";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated settings for the Webster provider
#[derive(Clone)]
pub struct WebsterSettings {
    /// API key
    /// ⚠️ NEVER log this value
    pub api_key: String,
    /// Dictionary reference (e.g. "collegiate", "learners")
    pub reference: String,
    /// API base URL
    pub base_url: Url,
}

impl WebsterSettings {
    /// Build settings from the provider's configuration section
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings.require(KEY, "api-key")?.to_string();
        let reference = settings.get("reference").unwrap_or(DEFAULT_REFERENCE);
        if !reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config(format!(
                "Invalid --{KEY}-reference {reference:?}: expected a reference name like \"collegiate\""
            )));
        }

        let base_url = settings.get("base-url").unwrap_or(WEBSTER_API_BASE);
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::config(format!("Invalid --{KEY}-base-url {base_url:?}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Invalid --{KEY}-base-url {base_url}: not a base URL"
            )));
        }

        Ok(Self {
            api_key,
            reference: reference.to_string(),
            base_url,
        })
    }
}

impl fmt::Debug for WebsterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebsterSettings")
            .field("api_key", &"<REDACTED>")
            .field("reference", &self.reference)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Merriam-Webster source
pub struct WebsterSource {
    settings: WebsterSettings,
    client: reqwest::Client,
}

impl fmt::Debug for WebsterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebsterSource")
            .field("settings", &self.settings)
            .finish()
    }
}

impl WebsterSource {
    /// Create a new Webster source
    pub fn new(settings: WebsterSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// Lookup URL for `word`, without the API key
    fn lookup_url(&self, word: &str) -> Url {
        let mut url = self.settings.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.settings.reference.as_str(), "json", word]);
        }
        url
    }
}

#[async_trait]
impl Source for WebsterSource {
    async fn define(&self, word: &str) -> Result<Definition> {
        let word = word.trim();
        if word.is_empty() {
            return Err(Error::invalid_input("word cannot be empty"));
        }

        tracing::debug!(word, reference = %self.settings.reference, "Looking up word in Merriam-Webster");

        let response = self
            .client
            .get(self.lookup_url(word))
            .query(&[("key", self.settings.api_key.as_str())])
            .send()
            .await
            // reqwest errors carry the URL, which carries the key
            .map_err(|e| Error::http(KEY, format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::provider(KEY, format!("Failed to read response: {}", e.without_url()))
        })?;

        if !status.is_success() {
            tracing::warn!(word, status = status.as_u16(), "Merriam-Webster returned an error status");
            return Err(Error::invalid_response(status.as_u16(), body));
        }

        parse_definition(&body).ok_or_else(|| {
            tracing::warn!(word, "Unexpected Merriam-Webster response shape");
            Error::invalid_response(status.as_u16(), body)
        })
    }

    fn name(&self) -> &'static str {
        KEY
    }
}

/// Lookup response: entries, or suggestions when the word is unknown
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LookupResponse {
    Entries(Vec<ApiEntry>),
    Suggestions(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    shortdef: Vec<String>,
}

/// Decode a lookup response body into a [`Definition`]
///
/// Every entry object becomes one [`Entry`] with one [`Sense`] per short
/// definition. A suggestion list (or an empty array) means the word is
/// unknown and yields an empty definition. Returns `None` for any other
/// shape.
pub fn parse_definition(body: &str) -> Option<Definition> {
    match serde_json::from_str::<LookupResponse>(body).ok()? {
        LookupResponse::Entries(entries) => Some(
            entries
                .into_iter()
                .map(|entry| {
                    entry
                        .shortdef
                        .into_iter()
                        .map(|text| Sense::new(vec![text]))
                        .collect::<Entry>()
                })
                .collect(),
        ),
        LookupResponse::Suggestions(suggestions) => {
            tracing::debug!(count = suggestions.len(), "Word not found, suggestions returned");
            Some(Definition::empty())
        }
    }
}

/// Factory for the Webster provider
#[derive(Debug, Default)]
pub struct WebsterFactory {
    settings: Option<WebsterSettings>,
}

impl SourceFactory for WebsterFactory {
    fn key(&self) -> &'static str {
        KEY
    }

    fn configure(&self, surface: &mut ConfigSurface) -> Result<()> {
        surface.add(
            KEY,
            ConfigField::new("api-key", "Merriam-Webster API key")
                .with_env("DEFINE_WEBSTER_API_KEY")
                .required()
                .secret(),
        )?;
        surface.add(
            KEY,
            ConfigField::new("reference", "Dictionary reference (default: collegiate)")
                .with_env("DEFINE_WEBSTER_REFERENCE"),
        )?;
        surface.add(
            KEY,
            ConfigField::new("base-url", "Merriam-Webster API base URL")
                .with_env("DEFINE_WEBSTER_BASE_URL"),
        )
    }

    fn finalize(&mut self, settings: &ProviderSettings) -> Result<()> {
        let settings = WebsterSettings::from_settings(settings)?;
        tracing::debug!(settings = ?settings, "Webster provider configured");
        self.settings = Some(settings);
        Ok(())
    }

    fn create(&self) -> Result<Arc<dyn Source>> {
        let settings = self
            .settings
            .clone()
            .ok_or_else(|| Error::config("Webster provider used before finalize"))?;
        Ok(Arc::new(WebsterSource::new(settings)?))
    }
}

/// Register the Webster provider with a registry
pub fn register(registry: &mut ProviderRegistry) -> Result<()> {
    registry.register(Box::new(WebsterFactory::default()))
}
