//! Minimal embedding example for define-core
//!
//! This example uses define-core as a library: it registers a custom in-memory
//! provider next to the Webster provider, walks the registry through its
//! lifecycle, and performs a few lookups without any web server.

use async_trait::async_trait;
use define_core::config::{ConfigField, ConfigSurface, ProviderSettings};
use define_core::traits::{Source, SourceFactory};
use define_core::{Definition, DefineConfig, Entry, Error, ProviderRegistry, Result, Sense};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Custom source answering from a fixed glossary
struct GlossarySource {
    glossary: BTreeMap<String, Vec<String>>,
}

#[async_trait]
impl Source for GlossarySource {
    async fn define(&self, word: &str) -> Result<Definition> {
        let Some(senses) = self.glossary.get(&word.to_lowercase()) else {
            return Ok(Definition::empty());
        };

        Ok(Definition::new(vec![
            senses
                .iter()
                .map(|text| Sense::new(vec![text.clone()]))
                .collect::<Entry>(),
        ]))
    }

    fn name(&self) -> &'static str {
        "glossary"
    }
}

/// Factory for [`GlossarySource`]
///
/// The glossary is configured as `word=definition;word=definition`.
#[derive(Default)]
struct GlossaryFactory {
    glossary: BTreeMap<String, Vec<String>>,
}

impl SourceFactory for GlossaryFactory {
    fn key(&self) -> &'static str {
        "glossary"
    }

    fn configure(&self, surface: &mut ConfigSurface) -> Result<()> {
        surface.add(
            "glossary",
            ConfigField::new("entries", "Glossary as word=definition pairs separated by ';'")
                .required(),
        )
    }

    fn finalize(&mut self, settings: &ProviderSettings) -> Result<()> {
        for pair in settings.require("glossary", "entries")?.split(';') {
            let (word, text) = pair.split_once('=').ok_or_else(|| {
                Error::config(format!("Glossary entry {pair:?} is not word=definition"))
            })?;
            self.glossary
                .entry(word.trim().to_lowercase())
                .or_default()
                .push(text.trim().to_string());
        }
        Ok(())
    }

    fn create(&self) -> Result<Arc<dyn Source>> {
        Ok(Arc::new(GlossarySource {
            glossary: self.glossary.clone(),
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Embedded define-core Example ===\n");

    // Open: register providers and collect their configuration fields
    println!("1. Registering providers...");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(GlossaryFactory::default()))?;
    define_source_webster::register(&mut registry)?;

    let mut surface = ConfigSurface::new();
    let providers = registry.configure(&mut surface)?;
    println!("   Providers: {:?}", providers.keys().collect::<Vec<_>>());
    for field in surface.fields() {
        println!(
            "   --{:<24} {}{}",
            field.flag_name(),
            field.help,
            if field.required { " (required)" } else { "" }
        );
    }

    // Finalized: hand each provider its settings
    println!("\n2. Finalizing registry...");
    let config = DefineConfig::new("glossary")
        .with_setting(
            "glossary",
            "entries",
            "crate=a compilation unit in Rust; crate=a wooden box for transport; borrow=to take temporarily",
        )
        .with_setting("webster", "api-key", "not-used-in-this-example");
    let registry = registry.finalize(&config)?;

    // Resolved: one source answers every lookup
    println!("\n3. Resolving preferred provider {:?}...", config.preferred_source);
    let source = registry.provide_preferred(&config.preferred_source)?;

    for word in ["crate", "Borrow", "lifetime"] {
        let definition = source.define(word).await?;
        println!("\n[{}] {}", source.name(), word);
        if definition.is_empty() {
            println!("   (no definitions)");
        }
        for (i, text) in definition.definitions().enumerate() {
            println!("   {}. {}", i + 1, text);
        }
    }

    match registry.provide_preferred("oxford") {
        Ok(_) => println!("\nUnexpected: oxford is not registered"),
        Err(e) => println!("\n4. Unknown provider is rejected: {}", e),
    }

    println!("\n=== Embedding Successful ===");
    Ok(())
}
