//! HTTP handlers for `/bookmarks`.

use axum::{
    Json,
    extract::{OriginalUri, Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use super::{BookmarksService, SerializedBookmark, serialize_bookmark};
use crate::error::ApiError;
use crate::handler::AppState;
use crate::model::{Bookmark, BookmarkPatch, NewBookmark, StoredRating};

/// Checked in this order; the first one missing is the one reported.
pub const REQUIRED_FIELDS: [&str; 4] = ["title", "url", "rating", "description"];

pub const EMPTY_PATCH_MESSAGE: &str =
    "Request body must contain either 'title', 'url', 'rating', or 'description'";

type JsonBody = Result<Json<Value>, JsonRejection>;

// ============================================================================
// Payload validation
// ============================================================================

fn body_fields(body: JsonBody) -> Result<Map<String, Value>, ApiError> {
    match body {
        Ok(Json(Value::Object(fields))) => Ok(fields),
        Ok(Json(_)) => Ok(Map::new()),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected request body");
            Err(ApiError::Validation(rejection.body_text()))
        }
    }
}

fn present<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    fields.get(field).filter(|value| !value.is_null())
}

fn text_field(fields: &Map<String, Value>, field: &str) -> Result<Option<String>, ApiError> {
    match present(fields, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::invalid_field(field)),
    }
}

fn rating_field(fields: &Map<String, Value>) -> Result<Option<StoredRating>, ApiError> {
    match present(fields, "rating") {
        None => Ok(None),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Some(StoredRating::Integer(i))),
            (None, Some(f)) => Ok(Some(StoredRating::Real(f))),
            (None, None) => Err(ApiError::invalid_field("rating")),
        },
        Some(Value::String(s)) => Ok(Some(StoredRating::Text(s.clone()))),
        Some(_) => Err(ApiError::invalid_field("rating")),
    }
}

/// JavaScript-style truthiness. The "at least one field" check on PATCH
/// treats `0`, `""`, `false` and `null` as not supplied.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Presence only: rating is not range-checked here.
pub fn validate_new_bookmark(fields: &Map<String, Value>) -> Result<NewBookmark, ApiError> {
    for field in REQUIRED_FIELDS {
        if present(fields, field).is_none() {
            return Err(ApiError::missing_field(field));
        }
    }

    let required_text = |field: &str| {
        text_field(fields, field)?.ok_or_else(|| ApiError::missing_field(field))
    };

    Ok(NewBookmark {
        title: required_text("title")?,
        url: required_text("url")?,
        rating: rating_field(fields)?.ok_or_else(|| ApiError::missing_field("rating"))?,
        description: required_text("description")?,
    })
}

pub fn validate_patch(fields: &Map<String, Value>) -> Result<BookmarkPatch, ApiError> {
    let supplied = REQUIRED_FIELDS
        .iter()
        .any(|field| fields.get(*field).is_some_and(is_truthy));
    if !supplied {
        return Err(ApiError::Validation(EMPTY_PATCH_MESSAGE.to_string()));
    }

    Ok(BookmarkPatch {
        title: text_field(fields, "title")?,
        url: text_field(fields, "url")?,
        rating: rating_field(fields)?,
        description: text_field(fields, "description")?,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolves `/:id` to a stored bookmark. An id that is not an integer cannot
/// match any row and is answered the same way as an unknown one.
async fn find_bookmark(service: &BookmarksService<'_>, raw_id: &str) -> Result<Bookmark, ApiError> {
    let found = match raw_id.parse::<i64>() {
        Ok(id) => service.get_by_id(id).await?,
        Err(_) => None,
    };

    found.ok_or_else(|| {
        tracing::error!(id = %raw_id, "bookmark not found");
        ApiError::NotFound
    })
}

pub async fn list_bookmarks(State(state): State<AppState>) -> Result<Json<Vec<SerializedBookmark>>, ApiError> {
    let service = BookmarksService::new(state.db.connection());
    let bookmarks = service.list_all().await?;

    tracing::info!(count = bookmarks.len(), "listed bookmarks");
    Ok(Json(bookmarks.iter().map(serialize_bookmark).collect()))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let fields = body_fields(body)?;
    let input = validate_new_bookmark(&fields).inspect_err(|e| {
        tracing::warn!(error = %e, "invalid bookmark");
    })?;

    let service = BookmarksService::new(state.db.connection());
    let bookmark = service.insert(input).await?;
    tracing::info!(id = bookmark.id, "bookmark created");

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), bookmark.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(serialize_bookmark(&bookmark)),
    )
        .into_response())
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SerializedBookmark>, ApiError> {
    let service = BookmarksService::new(state.db.connection());
    let bookmark = find_bookmark(&service, &id).await?;

    Ok(Json(serialize_bookmark(&bookmark)))
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    let service = BookmarksService::new(state.db.connection());
    let bookmark = find_bookmark(&service, &id).await?;

    let fields = body_fields(body)?;
    let patch = validate_patch(&fields).inspect_err(|e| {
        tracing::warn!(id = bookmark.id, error = %e, "invalid bookmark update");
    })?;

    // the row can vanish between the lookup and the write
    if service.update(bookmark.id, patch).await? == 0 {
        tracing::error!(id = bookmark.id, "bookmark not found");
        return Err(ApiError::NotFound);
    }

    tracing::info!(id = bookmark.id, "bookmark updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let service = BookmarksService::new(state.db.connection());
    let bookmark = find_bookmark(&service, &id).await?;

    if service.delete(bookmark.id).await? == 0 {
        tracing::error!(id = bookmark.id, "bookmark not found");
        return Err(ApiError::NotFound);
    }

    tracing::info!(id = bookmark.id, "bookmark deleted");
    Ok(StatusCode::NO_CONTENT)
}
