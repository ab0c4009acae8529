use axum::{extract::State, http::StatusCode, Json};
use service::books::{Book, BookInput};

use crate::errors::ApiError;
use crate::extract::{BookIdParam, JsonBody};
use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses((status = 200, description = "All books in ascending id order", body = [crate::openapi::BookDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books.list().await?))
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = crate::openapi::BookInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::BookDoc),
        (status = 400, description = "Malformed body or invalid fields", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state.books.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::BookDoc),
        (status = 400, description = "Non-numeric id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such book", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    BookIdParam(id): BookIdParam,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.get(id).await?))
}

/// Merge update: `title`/`author` replaced, `isbn`/`year` only when supplied.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    request_body = crate::openapi::BookInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::BookDoc),
        (status = 400, description = "Malformed body, bad id or invalid fields", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such book", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    BookIdParam(id): BookIdParam,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Non-numeric id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such book", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    BookIdParam(id): BookIdParam,
) -> Result<StatusCode, ApiError> {
    state.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
