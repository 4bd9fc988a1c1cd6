//! Data models for Shelf

pub mod book;
pub mod category;
pub mod loan;
pub mod session;

use mongodb::bson::oid::ObjectId;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use book::{Book, BookDetails, BookPatch, BookSnapshot, NewBook};
pub use category::Category;
pub use loan::{Borrower, Loan, NewLoan};
pub use session::SessionClaims;

/// Parse a 24-hex record id, naming the entity in the error message
pub fn parse_object_id(value: &str, entity: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID", entity)))
}
