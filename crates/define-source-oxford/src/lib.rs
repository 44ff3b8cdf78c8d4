// # Oxford Dictionaries Provider
//
// This crate provides the `oxford` dictionary provider for Define, backed by
// the Oxford Dictionaries API v2.
//
// ## Behavior
//
// - One HTTP request per lookup, no retries, no caching
// - 404 means the word is unknown: an empty definition, not an error
// - Any other non-success status, or a body that does not decode, becomes
//   `Error::InvalidResponse` with the raw status and body
// - An empty word returns an empty definition without contacting the API
//
// ## Security Requirements
//
// - The application key NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - Entries: GET `/entries/{source_lang}/{word_id}` with `app_id` and
//   `app_key` headers
// - Response: `results[].lexicalEntries[].entries[].senses[]`, each sense
//   holding `definitions` and nested `subsenses`

use async_trait::async_trait;
use define_core::config::{ConfigField, ConfigSurface, ProviderSettings};
use define_core::model::{Definition, Entry, Sense};
use define_core::traits::{Source, SourceFactory};
use define_core::{Error, ProviderRegistry, Result};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Provider key
pub const KEY: &str = "oxford";

/// Oxford Dictionaries API base URL
const OXFORD_API_BASE: &str = "https://od-api.oxforddictionaries.com/api/v2";

/// Default source language
const DEFAULT_LANGUAGE: &str = "en-gb";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated settings for the Oxford provider
#[derive(Clone)]
pub struct OxfordSettings {
    /// Application ID
    pub app_id: String,
    /// Application key
    /// ⚠️ NEVER log this value
    pub app_key: String,
    /// Source language code (e.g. "en-gb", "en-us")
    pub language: String,
    /// API base URL
    pub base_url: Url,
}

impl OxfordSettings {
    /// Build settings from the provider's configuration section
    ///
    /// `app-id` and `app-key` are required; `language` and `base-url` fall
    /// back to the public API defaults.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let app_id = settings.require(KEY, "app-id")?.to_string();
        let app_key = settings.require(KEY, "app-key")?.to_string();
        let language = settings
            .get("language")
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_lowercase();
        let base_url = settings.get("base-url").unwrap_or(OXFORD_API_BASE);
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::config(format!("Invalid --{KEY}-base-url {base_url:?}: {e}"))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Invalid --{KEY}-base-url {base_url}: not a base URL"
            )));
        }

        Ok(Self {
            app_id,
            app_key,
            language,
            base_url,
        })
    }
}

impl fmt::Debug for OxfordSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OxfordSettings")
            .field("app_id", &self.app_id)
            .field("app_key", &"<REDACTED>")
            .field("language", &self.language)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Oxford Dictionaries source
///
/// Cheap to share: the inner `reqwest::Client` is safe for concurrent use.
pub struct OxfordSource {
    settings: OxfordSettings,
    client: reqwest::Client,
}

impl fmt::Debug for OxfordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OxfordSource")
            .field("settings", &self.settings)
            .finish()
    }
}

impl OxfordSource {
    /// Create a new Oxford source
    ///
    /// Fails with a configuration error if the HTTP client cannot be built.
    pub fn new(settings: OxfordSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// URL of the entries endpoint for `word`
    fn entries_url(&self, word: &str) -> Url {
        let word_id = word.to_lowercase();
        let mut url = self.settings.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["entries", self.settings.language.as_str(), word_id.as_str()]);
        }
        url
    }
}

#[async_trait]
impl Source for OxfordSource {
    async fn define(&self, word: &str) -> Result<Definition> {
        let word = word.trim();
        if word.is_empty() {
            tracing::debug!("Empty word, skipping Oxford lookup");
            return Ok(Definition::empty());
        }

        let url = self.entries_url(word);
        tracing::debug!(word, language = %self.settings.language, "Looking up word in Oxford");

        let response = self
            .client
            .get(url)
            .header("app_id", &self.settings.app_id)
            .header("app_key", &self.settings.app_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(KEY, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(KEY, format!("Failed to read response: {}", e)))?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(word, "Word not found in Oxford");
            return Ok(Definition::empty());
        }

        if !status.is_success() {
            tracing::warn!(word, status = status.as_u16(), "Oxford returned an error status");
            return Err(Error::invalid_response(status.as_u16(), body));
        }

        parse_definition(&body).map_err(|e| {
            tracing::warn!(word, error = %e, "Failed to decode Oxford response");
            Error::invalid_response(status.as_u16(), body)
        })
    }

    fn name(&self) -> &'static str {
        KEY
    }
}

/// Entries endpoint response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveEntry {
    #[serde(default)]
    results: Vec<HeadwordEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadwordEntry {
    #[serde(default)]
    lexical_entries: Vec<LexicalEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LexicalEntry {
    #[serde(default)]
    entries: Vec<ApiEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEntry {
    #[serde(default)]
    senses: Vec<ApiSense>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSense {
    #[serde(default)]
    definitions: Vec<String>,
    #[serde(default)]
    short_definitions: Vec<String>,
    #[serde(default)]
    subsenses: Vec<ApiSense>,
}

impl ApiSense {
    /// Push this sense, then its subsenses depth-first
    fn flatten_into(self, out: &mut Vec<Sense>) {
        let definitions = if self.definitions.is_empty() {
            self.short_definitions
        } else {
            self.definitions
        };
        out.push(Sense::new(definitions));
        for sub in self.subsenses {
            sub.flatten_into(out);
        }
    }
}

/// Decode an entries response body into a [`Definition`]
///
/// Each `entries[]` item of every lexical entry becomes one [`Entry`]. A
/// sense is followed by its subsenses, in API order.
pub fn parse_definition(body: &str) -> std::result::Result<Definition, serde_json::Error> {
    let response: RetrieveEntry = serde_json::from_str(body)?;

    Ok(response
        .results
        .into_iter()
        .flat_map(|result| result.lexical_entries)
        .flat_map(|lexical| lexical.entries)
        .map(|entry| {
            let mut senses = Vec::new();
            for sense in entry.senses {
                sense.flatten_into(&mut senses);
            }
            Entry::new(senses)
        })
        .collect())
}

/// Factory for the Oxford provider
#[derive(Debug, Default)]
pub struct OxfordFactory {
    settings: Option<OxfordSettings>,
}

impl SourceFactory for OxfordFactory {
    fn key(&self) -> &'static str {
        KEY
    }

    fn configure(&self, surface: &mut ConfigSurface) -> Result<()> {
        surface.add(
            KEY,
            ConfigField::new("app-id", "Oxford Dictionaries application ID")
                .with_env("DEFINE_OXFORD_APP_ID")
                .required(),
        )?;
        surface.add(
            KEY,
            ConfigField::new("app-key", "Oxford Dictionaries application key")
                .with_env("DEFINE_OXFORD_APP_KEY")
                .required()
                .secret(),
        )?;
        surface.add(
            KEY,
            ConfigField::new("language", "Source language code (default: en-gb)")
                .with_env("DEFINE_OXFORD_LANGUAGE"),
        )?;
        surface.add(
            KEY,
            ConfigField::new("base-url", "Oxford Dictionaries API base URL")
                .with_env("DEFINE_OXFORD_BASE_URL"),
        )
    }

    fn finalize(&mut self, settings: &ProviderSettings) -> Result<()> {
        let settings = OxfordSettings::from_settings(settings)?;
        tracing::debug!(settings = ?settings, "Oxford provider configured");
        self.settings = Some(settings);
        Ok(())
    }

    fn create(&self) -> Result<Arc<dyn Source>> {
        let settings = self
            .settings
            .clone()
            .ok_or_else(|| Error::config("Oxford provider used before finalize"))?;
        Ok(Arc::new(OxfordSource::new(settings)?))
    }
}

/// Register the Oxford provider with a registry
///
/// # Example
///
/// ```rust
/// use define_core::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// define_source_oxford::register(&mut registry).unwrap();
/// assert!(registry.has_provider("oxford"));
/// ```
pub fn register(registry: &mut ProviderRegistry) -> Result<()> {
    registry.register(Box::new(OxfordFactory::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use define_core::UpstreamResponse;

    const SAMPLE: &str = r#"{
        "id": "bank",
        "metadata": { "provider": "Oxford University Press" },
        "results": [{
            "id": "bank",
            "language": "en-gb",
            "lexicalEntries": [
                {
                    "lexicalCategory": { "id": "noun", "text": "Noun" },
                    "entries": [{
                        "senses": [
                            {
                                "definitions": ["the land alongside a river or lake"],
                                "subsenses": [
                                    { "definitions": ["a slope, mass, or mound"] },
                                    { "shortDefinitions": ["elevation in seabed"] }
                                ]
                            },
                            { "definitions": ["a set of similar things"] }
                        ]
                    }]
                },
                {
                    "lexicalCategory": { "id": "verb", "text": "Verb" },
                    "entries": [{
                        "senses": [{ "definitions": ["heap into a mass or mound"] }]
                    }]
                }
            ]
        }]
    }"#;

    fn settings() -> ProviderSettings {
        ProviderSettings::new()
            .with("app-id", "app")
            .with("app-key", "secret_key_12345")
    }

    #[test]
    fn test_parse_keeps_api_order() {
        let def = parse_definition(SAMPLE).unwrap();

        assert_eq!(def.entries().len(), 2);
        assert_eq!(def.entries()[0].senses().len(), 4);
        assert_eq!(
            def.definitions().collect::<Vec<_>>(),
            vec![
                "the land alongside a river or lake",
                "a slope, mass, or mound",
                "elevation in seabed",
                "a set of similar things",
                "heap into a mass or mound",
            ]
        );
    }

    #[test]
    fn test_parse_without_results() {
        assert!(parse_definition(r#"{"results": []}"#).unwrap().is_empty());
        assert!(parse_definition("{}").unwrap().is_empty());
        assert!(parse_definition("[1, 2]").is_err());
    }

    #[test]
    fn test_finalize_requires_credentials() {
        let mut factory = OxfordFactory::default();

        let err = factory
            .finalize(&ProviderSettings::new().with("app-id", "app"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("app-key"));

        assert!(factory.create().is_err(), "no source without valid settings");
    }

    #[test]
    fn test_finalize_rejects_bad_base_url() {
        let mut factory = OxfordFactory::default();
        let err = factory
            .finalize(&settings().with("base-url", "not a url"))
            .unwrap_err();
        assert!(err.to_string().contains("base-url"));
    }

    #[test]
    fn test_factory_creation() {
        let mut factory = OxfordFactory::default();
        factory.finalize(&settings()).unwrap();

        let source = factory.create().unwrap();
        assert_eq!(source.name(), "oxford");
    }

    #[test]
    fn test_configure_contributes_fields() {
        let mut surface = ConfigSurface::new();
        OxfordFactory::default().configure(&mut surface).unwrap();

        let flags: Vec<String> = surface.fields().iter().map(ConfigField::flag_name).collect();
        assert_eq!(
            flags,
            vec!["oxford-app-id", "oxford-app-key", "oxford-language", "oxford-base-url"]
        );
        assert!(surface.fields()[1].secret);
    }

    #[test]
    fn test_entries_url_encodes_word() {
        let settings = OxfordSettings::from_settings(
            &settings().with("base-url", "https://example.test/api/v2/"),
        )
        .unwrap();
        let source = OxfordSource::new(settings).unwrap();

        assert_eq!(
            source.entries_url("Ice Cream").as_str(),
            "https://example.test/api/v2/entries/en-gb/ice%20cream"
        );
    }

    #[test]
    fn test_app_key_not_exposed_in_debug() {
        let settings = OxfordSettings::from_settings(&settings()).unwrap();
        let source = OxfordSource::new(settings).unwrap();

        let debug_str = format!("{:?}", source);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("OxfordSource"));
    }

    #[tokio::test]
    async fn test_empty_word_is_empty_definition() {
        let settings = OxfordSettings::from_settings(
            &settings().with("base-url", "http://127.0.0.1:9"),
        )
        .unwrap();
        let source = OxfordSource::new(settings).unwrap();

        let def = source.define("   ").await.unwrap();
        assert!(def.is_empty());
    }

    /// Answer exactly one request with `status` and `body`
    ///
    /// Returns the base URL to point the source at and a handle yielding the
    /// raw request head.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{address}/api/v2"), handle)
    }

    fn source_at(base_url: &str) -> OxfordSource {
        let settings =
            OxfordSettings::from_settings(&settings().with("base-url", base_url)).unwrap();
        OxfordSource::new(settings).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_sends_credentials_and_decodes() {
        let (base_url, request) = serve_once("200 OK", SAMPLE).await;

        let def = source_at(&base_url).define("Bank").await.unwrap();
        assert_eq!(def.definitions().count(), 5);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/v2/entries/en-gb/bank http/1.1"));
        assert!(request.contains("app_id: app"));
        assert!(request.contains("app_key: secret_key_12345"));
    }

    #[tokio::test]
    async fn test_not_found_is_empty_definition() {
        let (base_url, _request) =
            serve_once("404 Not Found", r#"{"error": "No entry found"}"#).await;

        let def = source_at(&base_url).define("qwxz").await.unwrap();
        assert!(def.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_invalid_response() {
        let (base_url, _request) = serve_once("500 Internal Server Error", "boom").await;

        let err = source_at(&base_url).define("bank").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert_eq!(
            err.upstream_response(),
            Some(&UpstreamResponse::new(500, "boom"))
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let (base_url, _request) = serve_once("200 OK", "not json").await;

        let err = source_at(&base_url).define("bank").await.unwrap_err();
        assert_eq!(
            err.upstream_response(),
            Some(&UpstreamResponse::new(200, "not json"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v2", listener.local_addr().unwrap());
        drop(listener);

        let err = source_at(&base_url).define("bank").await.unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
        assert!(err.upstream_response().is_none());
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = ProviderRegistry::new();
        register(&mut registry).unwrap();
        assert!(register(&mut registry).is_err());
    }
}
