//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, categories, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelf API",
        version = "1.0.0",
        description = "Book lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::root,
        health::health_check,
        // Session
        auth::issue_session,
        auth::clear_session,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::books_by_category,
        books::latest_books,
        // Categories
        categories::list_categories,
        // Loans
        loans::borrow_book,
        loans::borrowed_books,
        loans::return_book,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSnapshot,
            crate::models::book::CreateBookRequest,
            crate::models::book::UpdateBookRequest,
            books::CreateBookResponse,
            // Categories
            crate::models::category::Category,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::BorrowRequest,
            crate::models::loan::ReturnRequest,
            loans::BorrowResponse,
            // Common
            crate::api::SuccessResponse,
            crate::api::MessageResponse,
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Session cookie issuing"),
        (name = "books", description = "Catalog management"),
        (name = "categories", description = "Category browsing"),
        (name = "loans", description = "Borrowing and returning")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
