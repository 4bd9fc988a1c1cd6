//! Borrow and return endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        loan::{BorrowRequest, ReturnRequest},
        Book, Loan,
    },
    AppState,
};

use super::{ApiJson, ApiPath, AuthenticatedUser, MessageResponse};

/// Borrow response with the book's new stock
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowResponse {
    pub success: bool,
    pub message: String,
    pub updated_book: Book,
}

/// Borrow one copy of a book
#[utoipa::path(
    post,
    path = "/borrow-book",
    tag = "loans",
    security(("session_cookie" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Missing fields, already borrowed or no copies left", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Stock update failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(request): ApiJson<BorrowRequest>,
) -> AppResult<Json<BorrowResponse>> {
    let borrower = request.into_borrower()?;
    let updated_book = state.services.loans.borrow(borrower).await?;

    Ok(Json(BorrowResponse {
        success: true,
        message: "Book borrowed successfully".to_string(),
        updated_book,
    }))
}

/// Active loans of the signed-in borrower
#[utoipa::path(
    get,
    path = "/borrowed-books/{email}",
    tag = "loans",
    security(("session_cookie" = [])),
    params(
        ("email" = String, Path, description = "Borrower email, must match the session")
    ),
    responses(
        (status = 200, description = "Active loans", body = Vec<Loan>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Email does not match the session", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrowed_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<Loan>>> {
    claims.require_email(&email)?;

    let loans = state.services.loans.get_borrower_loans(&email).await?;
    Ok(Json(loans))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/borrowed-books/return/{id}",
    tag = "loans",
    security(("session_cookie" = [])),
    params(
        ("id" = String, Path, description = "Loan ID (24 hex characters)")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = MessageResponse),
        (status = 400, description = "Malformed id or missing email", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "No such loan for this borrower", body = crate::error::ErrorResponse),
        (status = 500, description = "Ledger or stock update failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<ReturnRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .loans
        .return_loan(&id, request.user_email.as_deref())
        .await?;

    Ok(Json(MessageResponse::ok("Book returned successfully")))
}
