//! Borrow/return coordination between the catalog and the borrow ledger

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::{parse_object_id, Book, Borrower, Loan, NewLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Active loans of one borrower
    pub async fn get_borrower_loans(&self, user_email: &str) -> AppResult<Vec<Loan>> {
        self.repository.loans.find_by_borrower(user_email).await
    }

    /// Borrow one copy of a book, returning the book with its new quantity.
    ///
    /// The stock decrement is a conditional write (only when quantity > 0) and the
    /// ledger rejects a second loan for the same (book, email), so concurrent
    /// borrows cannot oversell or double-record.
    pub async fn borrow(&self, borrower: Borrower) -> AppResult<Book> {
        let books = &self.repository.books;
        let loans = &self.repository.loans;

        let book = books
            .find_by_id(borrower.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        if loans
            .find_active(book.id, &borrower.user_email)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyBorrowed);
        }

        if book.quantity <= 0 {
            return Err(AppError::OutOfStock);
        }

        let Some(updated) = books.take_copy(book.id).await? else {
            // Stock changed between the read and the write
            return Err(match books.find_by_id(book.id).await? {
                None => AppError::NotFound("Book not found".to_string()),
                Some(current) if current.quantity <= 0 => AppError::OutOfStock,
                Some(_) => AppError::ConflictOnUpdate("Failed to update book quantity".to_string()),
            });
        };

        let loan = NewLoan::for_book(&updated, &borrower, Utc::now());
        if let Err(e) = loans.insert(loan).await {
            self.give_back_copy(book.id).await;
            return Err(e);
        }

        tracing::info!(
            "Book {} borrowed by {} until {}",
            book.id,
            borrower.user_email,
            borrower.return_date
        );

        Ok(updated)
    }

    /// Return a loan on behalf of its borrower
    pub async fn return_loan(&self, loan_id: &str, user_email: Option<&str>) -> AppResult<()> {
        let user_email = user_email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("userEmail is required".to_string()))?;
        let loan_id = parse_object_id(loan_id, "loan")?;

        let loan = self
            .repository
            .loans
            .find_owned(loan_id, user_email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Book not found in borrowed list for this user".to_string())
            })?;

        let deleted = self
            .repository
            .loans
            .delete_owned(loan_id, user_email)
            .await?;
        if deleted == 0 {
            return Err(AppError::ConflictOnUpdate(
                "Failed to remove book from borrowed list".to_string(),
            ));
        }

        match self.repository.books.restore_copy(loan.book_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(
                    "Loan {} removed but book {} could not be restocked: book is gone",
                    loan.id,
                    loan.book_id
                );
                return Err(AppError::ConflictOnUpdate(
                    "Failed to update book quantity".to_string(),
                ));
            }
            Err(e) => {
                tracing::error!(
                    "Loan {} removed but book {} could not be restocked: {}",
                    loan.id,
                    loan.book_id,
                    e
                );
                return Err(e);
            }
        }

        tracing::info!("Book {} returned by {}", loan.book_id, user_email);
        Ok(())
    }

    /// Undo a decrement whose loan could not be recorded
    async fn give_back_copy(&self, book_id: ObjectId) {
        match self.repository.books.restore_copy(book_id).await {
            Ok(true) => {}
            Ok(false) => tracing::error!("Could not restock book {}: book is gone", book_id),
            Err(e) => tracing::error!("Could not restock book {}: {}", book_id, e),
        }
    }
}
