//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal providers that exercise the registry and
//! lookup contracts without any network access.

#![allow(dead_code)]

use define_core::config::{ConfigField, ConfigSurface, ProviderSettings};
use define_core::error::{Error, Result};
use define_core::model::{Definition, Entry, Sense};
use define_core::traits::{Source, SourceFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a [`MockSource`] answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Always return this definition
    Definition(Definition),
    /// Always fail with an invalid upstream response
    InvalidResponse { status: u16, body: String },
    /// Reject empty words, echo the word as a single definition otherwise
    EchoRejectingEmpty,
}

/// A Source that answers from a fixed reply and counts calls
pub struct MockSource {
    name: &'static str,
    reply: MockReply,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(name: &'static str, reply: MockReply) -> Self {
        Self {
            name,
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times define() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Source for MockSource {
    async fn define(&self, word: &str) -> Result<Definition> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            MockReply::Definition(def) => Ok(def.clone()),
            MockReply::InvalidResponse { status, body } => {
                Err(Error::invalid_response(*status, body.clone()))
            }
            MockReply::EchoRejectingEmpty => {
                if word.is_empty() {
                    return Err(Error::invalid_input("word cannot be empty"));
                }
                Ok(Definition::new(vec![Entry::new(vec![Sense::new(vec![
                    word.to_string(),
                ])])]))
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A SourceFactory with one required "token" field
///
/// Records the settings it was finalized with so tests can inspect them.
pub struct MockFactory {
    key: &'static str,
    reply: MockReply,
    finalized: Arc<Mutex<Option<ProviderSettings>>>,
}

impl MockFactory {
    pub fn new(key: &'static str) -> Self {
        Self::with_reply(key, MockReply::Definition(Definition::empty()))
    }

    pub fn with_reply(key: &'static str, reply: MockReply) -> Self {
        Self {
            key,
            reply,
            finalized: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle to the settings recorded by finalize()
    pub fn finalized_settings(&self) -> Arc<Mutex<Option<ProviderSettings>>> {
        Arc::clone(&self.finalized)
    }
}

impl SourceFactory for MockFactory {
    fn key(&self) -> &'static str {
        self.key
    }

    fn configure(&self, surface: &mut ConfigSurface) -> Result<()> {
        surface.add(
            self.key,
            ConfigField::new("token", "Access token")
                .with_env(format!("DEFINE_{}_TOKEN", self.key.to_uppercase()))
                .required()
                .secret(),
        )
    }

    fn finalize(&mut self, settings: &ProviderSettings) -> Result<()> {
        settings.require(self.key, "token")?;
        *self.finalized.lock().unwrap() = Some(settings.clone());
        Ok(())
    }

    fn create(&self) -> Result<Arc<dyn Source>> {
        if self.finalized.lock().unwrap().is_none() {
            return Err(Error::config(format!("{} used before finalize", self.key)));
        }
        Ok(Arc::new(MockSource::new(self.key, self.reply.clone())))
    }
}

/// Definition with `n` entries of `m` senses of `k` strings, labelled `e.s.d`
pub fn grid_definition(n: usize, m: usize, k: usize) -> Definition {
    (0..n)
        .map(|e| {
            (0..m)
                .map(|s| (0..k).map(|d| format!("{e}.{s}.{d}")).collect::<Sense>())
                .collect::<Entry>()
        })
        .collect()
}
