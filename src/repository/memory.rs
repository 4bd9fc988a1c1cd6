//! In-process stores with the same single-document guarantees as the MongoDB ones.
//! Used by the test suites and for running the API without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::{BookStore, CategoryStore, LoanStore};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookPatch, Category, Loan, NewBook, NewLoan},
};

#[derive(Default)]
struct Collections {
    books: Vec<Book>,
    categories: Vec<Category>,
    loans: Vec<Loan>,
}

/// All three collections behind one lock
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    /// Insert a category (categories have no write API)
    pub fn seed_category(&self, label: &str) -> AppResult<ObjectId> {
        let id = ObjectId::new();
        self.lock()?.categories.push(Category {
            id,
            category: label.to_string(),
            image: None,
            description: None,
        });
        Ok(id)
    }

    /// Remove a book directly, bypassing the API
    pub fn remove_book(&self, id: ObjectId) -> AppResult<bool> {
        let mut collections = self.lock()?;
        let before = collections.books.len();
        collections.books.retain(|book| book.id != id);
        Ok(collections.books.len() != before)
    }

    pub fn loan_count(&self) -> AppResult<usize> {
        Ok(self.lock()?.loans.len())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: NewBook) -> AppResult<ObjectId> {
        let id = ObjectId::new();
        self.lock()?
            .books
            .push(Book::from_parts(id, book.details, book.quantity));
        Ok(id)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock()?.books.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>> {
        Ok(self.lock()?.books.iter().find(|book| book.id == id).cloned())
    }

    async fn find_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        Ok(self
            .lock()?
            .books
            .iter()
            .filter(|book| book.category == category)
            .cloned()
            .collect())
    }

    async fn find_latest(&self, limit: i64) -> AppResult<Vec<Book>> {
        let mut books = self.lock()?.books.clone();
        books.sort_by(|a, b| b.id.cmp(&a.id));
        books.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(books)
    }

    async fn update_details(&self, id: ObjectId, patch: &BookPatch) -> AppResult<u64> {
        let mut collections = self.lock()?;
        let modified = collections
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .map(|book| patch.apply(book))
            .unwrap_or(false);
        Ok(u64::from(modified))
    }

    async fn take_copy(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let mut collections = self.lock()?;
        Ok(collections
            .books
            .iter_mut()
            .find(|book| book.id == id && book.quantity > 0)
            .map(|book| {
                book.quantity -= 1;
                book.clone()
            }))
    }

    async fn restore_copy(&self, id: ObjectId) -> AppResult<bool> {
        let mut collections = self.lock()?;
        match collections.books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                book.quantity += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn find_active(&self, book_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .find(|loan| loan.book_id == book_id && loan.user_email == user_email)
            .cloned())
    }

    async fn find_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .find(|loan| loan.id == loan_id && loan.user_email == user_email)
            .cloned())
    }

    async fn find_by_borrower(&self, user_email: &str) -> AppResult<Vec<Loan>> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .filter(|loan| loan.user_email == user_email)
            .cloned()
            .collect())
    }

    async fn insert(&self, loan: NewLoan) -> AppResult<ObjectId> {
        let mut collections = self.lock()?;
        let duplicate = collections
            .loans
            .iter()
            .any(|existing| existing.book_id == loan.book_id && existing.user_email == loan.user_email);
        if duplicate {
            return Err(AppError::AlreadyBorrowed);
        }

        let id = ObjectId::new();
        collections.loans.push(loan.with_id(id));
        Ok(id)
    }

    async fn delete_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<u64> {
        let mut collections = self.lock()?;
        let before = collections.loans.len();
        collections
            .loans
            .retain(|loan| !(loan.id == loan_id && loan.user_email == user_email));
        Ok((before - collections.loans.len()) as u64)
    }
}
