//! Read-only web view over an archive
//!
//! Routes:
//! - `GET /` lists every id and filename from the manifest.
//! - `GET /code?id=<id>` shows the text of one file.
//!
//! Nothing is cached. Each request takes a shared archive lock, re-reads the
//! manifest and decodes every file it references.

use crate::archive::ArchiveReader;
use crate::error::{DtxError, Result};
use crate::lock::ArchiveLock;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Body returned for ids missing from the manifest
pub const NOT_FOUND_MESSAGE: &str = "Code snippet not found.";

/// A manifest entry together with its decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: u32,
    pub name: String,
    pub code: String,
}

/// Read the manifest and the text of every file it references
pub fn read_code_snippets(archive: &Path) -> Result<Vec<Snippet>> {
    let _lock = ArchiveLock::shared(archive)?;
    let mut reader = ArchiveReader::open(archive)?;
    let manifest = reader.read_manifest()?;

    let mut snippets = Vec::with_capacity(manifest.len());
    for entry in manifest.iter() {
        let code = reader.read_text(&entry.name)?;
        snippets.push(Snippet {
            id: entry.id,
            name: entry.name.clone(),
            code,
        });
    }

    Ok(snippets)
}

#[derive(Clone)]
struct ViewerState {
    archive: Arc<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CodeQuery {
    id: Option<String>,
}

/// Failure while serving a request
#[derive(Debug)]
enum ViewerError {
    Archive(DtxError),
    Task(String),
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        let message = match self {
            ViewerError::Archive(e) => e.to_string(),
            ViewerError::Task(e) => format!("Internal error: {}", e),
        };
        tracing::error!("{}", message);
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// Build the viewer routes for the archive at `archive`
pub fn router(archive: impl Into<PathBuf>) -> Router {
    let state = ViewerState {
        archive: Arc::new(archive.into()),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/code", get(code_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the viewer on `addr` until Ctrl-C
pub async fn serve(archive: PathBuf, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        archive = %archive.display(),
        addr = %listener.local_addr()?,
        "Web viewer listening"
    );

    axum::serve(listener, router(archive))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web viewer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn load_snippets(state: &ViewerState) -> std::result::Result<Vec<Snippet>, ViewerError> {
    let archive = Arc::clone(&state.archive);
    tokio::task::spawn_blocking(move || read_code_snippets(&archive))
        .await
        .map_err(|e| ViewerError::Task(e.to_string()))?
        .map_err(ViewerError::Archive)
}

async fn index_handler(
    State(state): State<ViewerState>,
) -> std::result::Result<Html<String>, ViewerError> {
    let snippets = load_snippets(&state).await?;
    tracing::debug!("Listing {} snippets", snippets.len());
    Ok(Html(render_index(&snippets)))
}

async fn code_handler(
    State(state): State<ViewerState>,
    Query(query): Query<CodeQuery>,
) -> std::result::Result<Response, ViewerError> {
    let snippets = load_snippets(&state).await?;

    // Ids are matched as written in the manifest, so "01" or "+1" is not "1"
    let snippet = query
        .id
        .as_deref()
        .and_then(|id| snippets.into_iter().find(|s| s.id.to_string() == id));

    match snippet {
        Some(snippet) => Ok(Html(render_code(&snippet)).into_response()),
        None => {
            tracing::debug!(id = ?query.id, "Unknown snippet id");
            Ok((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE).into_response())
        }
    }
}

fn render_index(snippets: &[Snippet]) -> String {
    let mut items = String::new();
    for snippet in snippets {
        let _ = writeln!(
            items,
            "    <li><a href=\"/code?id={id}\">{id}: {name}</a></li>",
            id = snippet.id,
            name = escape_html(&snippet.name)
        );
    }

    page(
        "Code Snippets",
        &format!("  <h1>Code Snippets</h1>\n  <ul>\n{}  </ul>\n", items),
    )
}

fn render_code(snippet: &Snippet) -> String {
    let name = escape_html(&snippet.name);
    page(
        &name,
        &format!(
            "  <h1>{}</h1>\n  <pre><code>{}</code></pre>\n  <p><a href=\"/\">Back to list</a></p>\n",
            name,
            escape_html(&snippet.code)
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        title, body
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
