//! Catalog management service (books and categories)

use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::{parse_object_id, Book, BookPatch, Category, NewBook},
    repository::Repository,
};

/// Number of books shown on the landing page
pub const LATEST_BOOKS_LIMIT: i64 = 4;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog, returning its id
    pub async fn create_book(&self, book: NewBook) -> AppResult<ObjectId> {
        let id = self.repository.books.insert(book).await?;
        tracing::info!("Book created: {}", id);
        Ok(id)
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_all().await
    }

    /// Get one book by its hex id
    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        let id = parse_object_id(id, "book")?;
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Update descriptive fields; quantity is only changed by borrow/return
    pub async fn update_book(&self, id: &str, patch: BookPatch) -> AppResult<()> {
        let id = parse_object_id(id, "book")?;

        let modified = if patch.is_empty() {
            0
        } else {
            self.repository.books.update_details(id, &patch).await?
        };

        if modified == 0 {
            return Err(AppError::NotFound(
                "Book not found or no changes made".to_string(),
            ));
        }

        tracing::info!("Book updated: {}", id);
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.find_all().await
    }

    pub async fn books_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        self.repository.books.find_by_category(category).await
    }

    pub async fn latest_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_latest(LATEST_BOOKS_LIMIT).await
    }
}
