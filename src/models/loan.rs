//! Loan (borrow) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::book::{Book, BookSnapshot};
use crate::error::{AppError, AppResult};

/// Active loan: one borrower holding one copy of one book
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub book_id: ObjectId,
    pub user_name: String,
    pub user_email: String,
    /// Date the book is due back
    pub return_date: DateTime<Utc>,
    pub borrow_date: DateTime<Utc>,
    pub book_details: BookSnapshot,
}

/// Loan ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub book_id: ObjectId,
    pub user_name: String,
    pub user_email: String,
    pub return_date: DateTime<Utc>,
    pub borrow_date: DateTime<Utc>,
    pub book_details: BookSnapshot,
}

impl NewLoan {
    pub fn for_book(book: &Book, borrower: &Borrower, borrow_date: DateTime<Utc>) -> Self {
        Self {
            book_id: book.id,
            user_name: borrower.user_name.clone(),
            user_email: borrower.user_email.clone(),
            return_date: borrower.return_date,
            borrow_date,
            book_details: book.snapshot(),
        }
    }

    pub fn with_id(self, id: ObjectId) -> Loan {
        Loan {
            id,
            book_id: self.book_id,
            user_name: self.user_name,
            user_email: self.user_email,
            return_date: self.return_date,
            borrow_date: self.borrow_date,
            book_details: self.book_details,
        }
    }
}

/// Validated borrow request
#[derive(Debug, Clone, PartialEq)]
pub struct Borrower {
    pub book_id: ObjectId,
    pub user_name: String,
    pub user_email: String,
    pub return_date: DateTime<Utc>,
}

/// Borrow request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[validate(
        required(message = "bookId is required"),
        length(min = 1, message = "bookId is required")
    )]
    pub book_id: Option<String>,
    #[validate(
        required(message = "userName is required"),
        length(min = 1, message = "userName is required")
    )]
    pub user_name: Option<String>,
    #[validate(
        required(message = "userEmail is required"),
        length(min = 1, message = "userEmail is required")
    )]
    pub user_email: Option<String>,
    /// Due date, RFC 3339 timestamp or `YYYY-MM-DD`
    #[validate(
        required(message = "returnDate is required"),
        length(min = 1, message = "returnDate is required")
    )]
    pub return_date: Option<String>,
}

impl BorrowRequest {
    pub fn into_borrower(self) -> AppResult<Borrower> {
        self.validate()?;

        let book_id = super::parse_object_id(&self.book_id.unwrap_or_default(), "book")?;
        let return_date = parse_due_date(&self.return_date.unwrap_or_default())?;

        Ok(Borrower {
            book_id,
            user_name: self.user_name.unwrap_or_default(),
            user_email: self.user_email.unwrap_or_default(),
            return_date,
        })
    }
}

/// Return request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub user_email: Option<String>,
}

/// Parse a due date given either as a full timestamp or as a calendar date (midnight UTC)
pub fn parse_due_date(value: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::InvalidRequest(format!("Invalid returnDate: {}", value)))
}
