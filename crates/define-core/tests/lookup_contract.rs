//! Contract Test: Lookup Results
//!
//! This test verifies what callers of `Source::define` can rely on.
//!
//! Constraints verified:
//! - Flattening entries → senses → definitions yields every string in order
//! - An invalid upstream response exposes the raw status and body
//! - An empty word never panics; it yields a definition or a typed error
//! - A shared source can be used from concurrent tasks
//!
//! If this test fails, the web adapter cannot render results reliably.

mod common;

use common::*;
use define_core::{Definition, Error, Source};
use std::sync::Arc;

#[tokio::test]
async fn flattening_yields_n_times_m_times_k_in_order() {
    for (n, m, k) in [(0, 0, 0), (1, 1, 1), (2, 3, 4), (3, 1, 2), (1, 4, 0)] {
        let source = MockSource::new("grid", MockReply::Definition(grid_definition(n, m, k)));
        let def = source.define("word").await.unwrap();

        let flat: Vec<String> = def
            .entries()
            .iter()
            .flat_map(|entry| entry.senses())
            .flat_map(|sense| sense.definitions())
            .cloned()
            .collect();

        assert_eq!(flat.len(), n * m * k, "grid {n}x{m}x{k}");

        let expected: Vec<String> = (0..n)
            .flat_map(|e| (0..m).flat_map(move |s| (0..k).map(move |d| format!("{e}.{s}.{d}"))))
            .collect();
        assert_eq!(flat, expected);

        // The convenience iterator agrees with manual flattening
        assert_eq!(def.definitions().collect::<Vec<_>>(), expected);
    }
}

#[tokio::test]
async fn invalid_response_exposes_raw_payload() {
    let source = MockSource::new(
        "broken",
        MockReply::InvalidResponse {
            status: 503,
            body: "{\"error\":\"maintenance\"}".to_string(),
        },
    );

    let err = source.define("word").await.unwrap_err();

    let response = err.upstream_response().expect("payload is attached");
    assert_eq!(response.status, 503);
    assert_eq!(response.body, "{\"error\":\"maintenance\"}");
    assert!(matches!(err, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn empty_word_yields_definition_or_typed_error() {
    let lenient = MockSource::new("lenient", MockReply::Definition(Definition::empty()));
    let strict = MockSource::new("strict", MockReply::EchoRejectingEmpty);

    let def = lenient.define("").await.unwrap();
    assert!(def.is_empty());

    let err = strict.define("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!err.is_startup());
}

#[tokio::test]
async fn shared_source_serves_concurrent_lookups() {
    let mock = Arc::new(MockSource::new("echo", MockReply::EchoRejectingEmpty));
    let source: Arc<dyn Source> = mock.clone();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let source = Arc::clone(&source);
            tokio::spawn(async move { source.define(&format!("word{i}")).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let def = handle.await.unwrap().unwrap();
        assert_eq!(def.definitions().collect::<Vec<_>>(), vec![format!("word{i}")]);
    }
    assert_eq!(mock.call_count(), 16);
}
