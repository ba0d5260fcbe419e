//! HTTP route handlers for the opensearch-twitter service.
//!
//! This module contains the HTTP route handler functions that process
//! incoming OpenSearch requests and return appropriate responses.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::opensearch::{
    render_atom, render_html, ResponseFormat, TwitterCollection, DESCRIPTION_MIME_TYPE,
};

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub collection: TwitterCollection,
}

pub type SharedState = Arc<AppState>;

type ErrorResponse = (StatusCode, Json<Value>);

/// Builds the router with every route of the service.
///
/// Middleware (tracing, CORS) is added by the binary so tests can exercise
/// the bare routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/:identifier/search", get(handle_search))
        .route("/:identifier/description", get(handle_description))
        .with_state(state)
}

fn error_response(status: StatusCode, message: &str, error: impl std::fmt::Display) -> ErrorResponse {
    (
        status,
        Json(json!({"status": "error", "message": message, "error": error.to_string()})),
    )
}

fn find_collection<'a>(
    state: &'a AppState,
    identifier: &str,
) -> Result<&'a TwitterCollection, ErrorResponse> {
    if state.collection.identifier == identifier {
        Ok(&state.collection)
    } else {
        warn!("Request for unknown collection '{}'", identifier);
        Err(error_response(
            StatusCode::NOT_FOUND,
            "Unknown collection",
            format!("no collection named '{}'", identifier),
        ))
    }
}

/// Handles GET requests to the root `/` endpoint.
///
/// Points clients at the description document of the served collection.
pub async fn handle_root(State(state): State<SharedState>) -> String {
    format!(
        "opensearch-twitter: {}/{}/description",
        state.collection.base_url, state.collection.identifier
    )
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "opensearch-twitter"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "opensearch-twitter"}))
}

/// Handles GET requests to `/{identifier}/search`.
///
/// Runs the OpenSearch query and renders the result as Atom, JSON or HTML,
/// chosen by the `format` parameter or the `Accept` header.
///
/// # Returns
///
/// - `200 OK` with the feed; an empty feed when nothing matched
/// - `404 Not Found` for an unknown collection identifier
/// - `502 Bad Gateway` when the Twitter API could not be queried
pub async fn handle_search(
    State(state): State<SharedState>,
    Path(identifier): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let collection = find_collection(&state, &identifier)?;
    let format = ResponseFormat::negotiate(
        params.get("format").map(String::as_str),
        headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok()),
    );
    info!(
        "Search on collection '{}' as {}",
        identifier,
        format.mime_type()
    );

    let feed = collection.query(&params).await.map_err(|e| {
        if e.is_unauthorized() {
            error!("Twitter rejected the application credentials");
        }
        error!("Failed to fetch tweets for '{}': {}", identifier, e);
        error_response(StatusCode::BAD_GATEWAY, "Failed to fetch tweets", e)
    })?;

    let response = match format {
        ResponseFormat::Atom => (
            [(header::CONTENT_TYPE, "application/atom+xml; charset=utf-8")],
            render_atom(&feed, &collection.feed_meta(&params)),
        )
            .into_response(),
        ResponseFormat::Json => Json(feed).into_response(),
        ResponseFormat::Html => Html(render_html(&feed, &collection.feed_meta(&params))).into_response(),
    };
    Ok(response)
}

/// Handles GET requests to `/{identifier}/description`.
///
/// Returns the OpenSearch description document of the collection.
pub async fn handle_description(
    State(state): State<SharedState>,
    Path(identifier): Path<String>,
) -> Result<Response, ErrorResponse> {
    let collection = find_collection(&state, &identifier)?;
    let description = collection.description().map_err(|e| {
        error!("Failed to build description for '{}': {}", identifier, e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to build description",
            e,
        )
    })?;

    Ok((
        [(header::CONTENT_TYPE, DESCRIPTION_MIME_TYPE)],
        description.to_xml(),
    )
        .into_response())
}
