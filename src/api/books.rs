//! Book (catalog) endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{CreateBookRequest, UpdateBookRequest},
        Book,
    },
    AppState,
};

use super::{ApiJson, ApiPath, AuthenticatedUser, MessageResponse};

/// Create book response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookResponse {
    pub success: bool,
    pub message: String,
    /// Generated book id
    pub inserted_id: String,
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("session_cookie" = [])),
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = CreateBookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<CreateBookResponse>)> {
    let book = request.into_new_book()?;
    let id = state.services.catalog.create_book(book).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            success: true,
            message: "Book added successfully".to_string(),
            inserted_id: id.to_hex(),
        }),
    ))
}

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get one book. Also served at `/book-details/{id}`.
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("session_cookie" = [])),
    params(
        ("id" = String, Path, description = "Book ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Malformed id", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(&id).await?;
    Ok(Json(book))
}

/// Update a book's descriptive fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("session_cookie" = [])),
    params(
        ("id" = String, Path, description = "Book ID (24 hex characters)")
    ),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Malformed id or input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found or no changes made", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateBookRequest>,
) -> AppResult<Json<MessageResponse>> {
    let patch = request.into_patch()?;
    state.services.catalog.update_book(&id, patch).await?;

    Ok(Json(MessageResponse::ok("Book updated successfully")))
}

/// Books in one category (exact label match)
#[utoipa::path(
    get,
    path = "/books/category/{category}",
    tag = "books",
    params(
        ("category" = String, Path, description = "Category label")
    ),
    responses(
        (status = 200, description = "Books in the category", body = Vec<Book>)
    )
)]
pub async fn books_by_category(
    State(state): State<AppState>,
    ApiPath(category): ApiPath<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.books_by_category(&category).await?;
    Ok(Json(books))
}

/// The four most recently added books
#[utoipa::path(
    get,
    path = "/latest-books",
    tag = "books",
    responses(
        (status = 200, description = "Latest books, newest first", body = Vec<Book>)
    )
)]
pub async fn latest_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.latest_books().await?;
    Ok(Json(books))
}
