//! API handlers for Shelf REST endpoints

pub mod auth;
pub mod books;
pub mod categories;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::CONTENT_TYPE, request::Parts, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{config::ServerConfig, error::AppError, models::SessionClaims, AppState};

/// Extractor for the caller's session, read from the session cookie.
///
/// Runs before the handler body: a missing, forged or expired token rejects
/// the request with 401 and the handler never executes.
pub struct AuthenticatedUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.services.auth;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(auth.cookie_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("Missing session cookie".to_string()))?;

        let claims = auth.verify_token(&token)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API error format
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Plain success acknowledgement
#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Success acknowledgement with a message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    let routes = Router::new()
        // Liveness
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Session
        .route("/jwt", post(auth::issue_session))
        .route("/logout", get(auth::clear_session))
        // Catalog
        .route("/books", post(books::create_book).get(books::list_books))
        .route("/books/:id", get(books::get_book).put(books::update_book))
        .route("/book-details/:id", get(books::get_book))
        .route("/books/category/:category", get(books::books_by_category))
        .route("/latest-books", get(books::latest_books))
        .route("/category", get(categories::list_categories))
        // Loans
        .route("/borrow-book", post(loans::borrow_book))
        .route("/borrowed-books/:email", get(loans::borrowed_books))
        .route("/borrowed-books/return/:id", put(loans::return_book))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the configured front-ends; credentials are allowed so the session cookie travels
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
