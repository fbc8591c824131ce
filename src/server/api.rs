//! Request handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppState;
use crate::chat::{ChatError, ChatMessage};
use crate::content::{
    reading_list, Bookmark, BookmarkType, ContentMeta, Entry, Post, Project, ProjectMeta,
    ReadingItem, Recommendation, RecommendationStatus, Review,
};
use crate::feed::rss::{CACHE_CONTROL, CONTENT_TYPE};
use crate::feed::StructuredData;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: &str, details: Option<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            details,
        }),
    )
}

fn internal_error(message: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", message, err);
    error(
        StatusCode::INTERNAL_SERVER_ERROR,
        message,
        Some(err.to_string()),
    )
}

fn not_found<M: ContentMeta>(slug: &str) -> ApiError {
    error(
        StatusCode::NOT_FOUND,
        &format!("{} not found", M::KIND),
        Some(format!("no {} with slug `{}`", M::KIND, slug)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

pub async fn list<M: ContentMeta>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Entry<M>>> {
    let repo = state.folio.repository::<M>();
    let drafts = state.folio.drafts;

    let mut entries = match query.q.as_deref() {
        Some(q) => repo.search(q, drafts),
        None => repo.list_all(drafts),
    }
    .map_err(|e| internal_error("Failed to load content", e))?;

    if let Some(category) = &query.category {
        entries.retain(|e| e.category() == Some(category.as_str()));
    }
    if let Some(tag) = &query.tag {
        entries.retain(|e| e.has_tag(tag));
    }

    Ok(Json(entries))
}

pub async fn categories<M: ContentMeta>(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<String>> {
    state
        .folio
        .repository::<M>()
        .list_categories(state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load categories", e))
}

/// A record plus its rendered body and, for posts and reviews, JSON-LD
#[derive(Debug, Serialize)]
pub struct Detail<M> {
    #[serde(flatten)]
    pub entry: Entry<M>,
    pub html: String,
    #[serde(rename = "structuredData", skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,
}

pub async fn detail<M: StructuredData>(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Detail<M>> {
    let entry = state
        .folio
        .repository::<M>()
        .get_by_slug(&slug, state.folio.drafts)
        .map_err(|e| internal_error("Failed to load content", e))?
        .ok_or_else(|| not_found::<M>(&slug))?;

    let html = state.renderer.render(&entry.content);
    let structured_data = M::structured_data(&entry, &state.folio.config);
    Ok(Json(Detail {
        entry,
        html,
        structured_data,
    }))
}

pub async fn project_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<ReadingItem>> {
    let drafts = state.folio.drafts;
    let project = state
        .folio
        .projects()
        .get_by_slug(&slug, drafts)
        .map_err(|e| internal_error("Failed to load project", e))?
        .ok_or_else(|| not_found::<ProjectMeta>(&slug))?;

    reading_list(&project, &state.folio.posts(), drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load project posts", e))
}

pub async fn related_recommendations(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<Recommendation>> {
    state
        .folio
        .recommendations()
        .related(&slug, state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load recommendations", e))
}

pub async fn featured_recommendations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Recommendation>> {
    state
        .folio
        .recommendations()
        .featured(state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load recommendations", e))
}

pub async fn featured_reviews(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Review>> {
    state
        .folio
        .reviews()
        .featured(state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load reviews", e))
}

pub async fn featured_bookmarks(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Bookmark>> {
    state
        .folio
        .bookmarks()
        .featured(state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load bookmarks", e))
}

fn unknown_filter(what: &str, value: &str, expected: &str) -> ApiError {
    error(
        StatusCode::NOT_FOUND,
        &format!("Unknown {}", what),
        Some(format!("`{}` is not one of {}", value, expected)),
    )
}

pub async fn posts_by_project(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<Post>> {
    state
        .folio
        .posts()
        .by_project(&slug, state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load posts", e))
}

pub async fn projects_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> ApiResult<Vec<Project>> {
    let projects = state.folio.projects();
    let drafts = state.folio.drafts;
    match status.as_str() {
        "ongoing" => projects.ongoing(drafts),
        "completed" => projects.completed(drafts),
        other => return Err(unknown_filter("project status", other, "ongoing, completed")),
    }
    .map(Json)
    .map_err(|e| internal_error("Failed to load projects", e))
}

pub async fn reviews_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> ApiResult<Vec<Review>> {
    let reviews = state.folio.reviews();
    let drafts = state.folio.drafts;
    match status.as_str() {
        "recommended" => reviews.recommended(drafts),
        "current" => reviews.currently_used(drafts),
        "previous" => reviews.previously_used(drafts),
        "heard" => reviews.heard_about(drafts),
        other => {
            return Err(unknown_filter(
                "review status",
                other,
                "recommended, current, previous, heard",
            ))
        }
    }
    .map(Json)
    .map_err(|e| internal_error("Failed to load reviews", e))
}

pub async fn recommendations_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> ApiResult<Vec<Recommendation>> {
    let status = RecommendationStatus::from(status);
    if let RecommendationStatus::Unrecognized(raw) = &status {
        return Err(unknown_filter("recommendation status", raw, "current, previous, heard"));
    }
    state
        .folio
        .recommendations()
        .by_status(&status, state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load recommendations", e))
}

pub async fn bookmarks_by_type(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<Bookmark>> {
    state
        .folio
        .bookmarks()
        .by_type(&BookmarkType::from(kind), state.folio.drafts)
        .map(Json)
        .map_err(|e| internal_error("Failed to load bookmarks", e))
}

fn xml(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        body,
    )
        .into_response()
}

pub async fn rss(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    state
        .folio
        .rss(Utc::now())
        .map(xml)
        .map_err(|e| internal_error("Failed to generate RSS feed", e))
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    state
        .folio
        .sitemap(Utc::now())
        .map(xml)
        .map_err(|e| internal_error("Failed to generate sitemap", e))
}

pub async fn robots(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.folio.robots(),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatMessage> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Rejected chat request: {}", e);
        error(
            StatusCode::BAD_REQUEST,
            "Invalid request format",
            Some(e.body_text()),
        )
    })?;

    if request.messages.is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Invalid messages format",
            Some("Messages must be a non-empty array".to_string()),
        ));
    }

    tracing::debug!("Chat request with {} messages", request.messages.len());

    state
        .chat
        .reply(&request.messages)
        .await
        .map(Json)
        .map_err(chat_error)
}

fn chat_error(err: ChatError) -> ApiError {
    match err {
        ChatError::NotConfigured => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Chat assistant is not configured",
            Some("Please check your environment variables".to_string()),
        ),
        other => {
            tracing::error!("Chat request failed: {}", other);
            error(
                StatusCode::BAD_GATEWAY,
                "Failed to call the inference API",
                Some(other.to_string()),
            )
        }
    }
}

/// One canned exchange against the provider
pub async fn chat_test(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if !state.chat.is_configured() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Chat environment variables are not properly configured",
                "environmentCheck": state.env_check,
            })),
        );
    }

    let messages = [
        ChatMessage::system("You are a helpful assistant."),
        ChatMessage::user("Hello, this is a test message."),
    ];

    match state.chat.run(&messages).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "success": true, "result": result })),
        ),
        Err(e) => {
            tracing::error!("Chat test call failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}
