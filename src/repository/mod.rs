//! Repository layer for document store operations

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::{
    error::AppResult,
    models::{Book, BookPatch, Category, Loan, NewBook, NewLoan},
};

/// Catalog collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book and return its generated id
    async fn insert(&self, book: NewBook) -> AppResult<ObjectId>;

    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>>;

    /// Books whose category label matches exactly
    async fn find_by_category(&self, category: &str) -> AppResult<Vec<Book>>;

    /// Most recently created books first
    async fn find_latest(&self, limit: i64) -> AppResult<Vec<Book>>;

    /// Apply a patch, returning how many books were modified (0 or 1)
    async fn update_details(&self, id: ObjectId, patch: &BookPatch) -> AppResult<u64>;

    /// Decrement quantity by one only if it is above zero, returning the book as stored
    /// after the write. `None` when no book matched (missing or out of stock).
    async fn take_copy(&self, id: ObjectId) -> AppResult<Option<Book>>;

    /// Increment quantity by one. Returns false when the book does not exist.
    async fn restore_copy(&self, id: ObjectId) -> AppResult<bool>;
}

/// Category collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Category>>;
}

/// Borrow ledger collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Active loan for a (book, borrower email) pair
    async fn find_active(&self, book_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>>;

    /// Loan by id, only if it belongs to the given borrower
    async fn find_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>>;

    async fn find_by_borrower(&self, user_email: &str) -> AppResult<Vec<Loan>>;

    /// Insert a loan. Fails with `AppError::AlreadyBorrowed` if the
    /// (book, borrower email) pair already has an active loan.
    async fn insert(&self, loan: NewLoan) -> AppResult<ObjectId>;

    /// Delete a loan owned by the given borrower, returning the number removed
    async fn delete_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<u64>;
}

/// Main repository struct holding one handle per collection
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    pub fn new(
        books: Arc<dyn BookStore>,
        categories: Arc<dyn CategoryStore>,
        loans: Arc<dyn LoanStore>,
    ) -> Self {
        Self {
            books,
            categories,
            loans,
        }
    }

    /// Repository backed by a connected MongoDB database
    pub fn mongo(store: &mongo::MongoStore) -> Self {
        Self::new(
            Arc::new(store.books()),
            Arc::new(store.categories()),
            Arc::new(store.loans()),
        )
    }

    /// Repository backed by a single in-process store
    pub fn in_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self::new(store.clone(), store.clone(), store)
    }
}
