//! HTML front-end
//!
//! `/define?q=<word>` renders the form plus the lookup result; every other
//! path renders the empty form. Lookup failures and malformed queries are
//! rendered in the page, so every route answers 200.

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use define_core::{Error, Source};
use std::fmt::Write as _;
use std::sync::Arc;

/// Shared state for the handlers
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn Source>,
}

/// Build the router serving `source`
pub fn router(source: Arc<dyn Source>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/define", get(define_handler))
        .fallback(index_handler)
        .with_state(AppState { source })
}

async fn index_handler() -> Response {
    page_response(&Page::default())
}

async fn define_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let word = match query {
        Ok(Query(pairs)) => first_word(pairs),
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable query string");
            String::new()
        }
    };

    let page = lookup(state.source.as_ref(), &word).await;
    page_response(&page)
}

/// First `q` value; repeated parameters are ignored
fn first_word(pairs: Vec<(String, String)>) -> String {
    pairs
        .into_iter()
        .find_map(|(name, value)| (name == "q").then_some(value))
        .unwrap_or_default()
}

fn page_response(page: &Page) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(render_page(page)),
    )
        .into_response()
}

/// What one rendered page shows below the form
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Page {
    /// Looked-up word, or the error message when the lookup failed
    pub heading: String,
    pub definitions: Vec<String>,
}

/// Look `word` up and turn the outcome into a [`Page`]
///
/// An empty word renders the bare form without calling the source.
pub async fn lookup(source: &dyn Source, word: &str) -> Page {
    if word.is_empty() {
        return Page::default();
    }

    match source.define(word).await {
        Ok(definition) => {
            tracing::info!(
                word,
                provider = source.name(),
                senses = definition.definitions().count(),
                "Lookup served"
            );
            Page {
                heading: word.to_string(),
                definitions: definition.definitions().map(str::to_string).collect(),
            }
        }
        Err(e) => {
            tracing::warn!(word, provider = source.name(), error = %e, "Lookup failed");
            error_page(&e)
        }
    }
}

fn error_page(error: &Error) -> Page {
    Page {
        heading: error.to_string(),
        definitions: error
            .upstream_response()
            .map(|response| vec![format!("{} {}", response.status, response.body)])
            .unwrap_or_default(),
    }
}

/// Render the full HTML document for `page`
pub fn render_page(page: &Page) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Define</title>\n\
         </head>\n\
         <body>\n\
         <h1>Define!</h1>\n\
         <form action=\"/define\" method=\"get\">\n\
         <label for=\"q\">Define</label>\n\
         <input type=\"text\" id=\"q\" name=\"q\" onchange=\"this.form.submit()\" autofocus>\n\
         </form>\n",
    );

    if !page.heading.is_empty() {
        let _ = writeln!(html, "<hr>\n<h2>{}</h2>", escape_html(&page.heading));
        html.push_str("<ol>\n");
        for definition in &page.definitions {
            let _ = writeln!(html, "<li><p><em>{}</em></p></li>", escape_html(definition));
        }
        html.push_str("</ol>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
