//! Book (catalog entry) model and related types

use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String, example = "6760f1c2a8d4e5b3c9a1f042")]
    pub id: ObjectId,
    pub name: String,
    pub author_name: String,
    pub category: String,
    pub rating: f64,
    pub image: String,
    /// Copies currently available for borrowing
    pub quantity: i64,
}

impl Book {
    pub fn from_parts(id: ObjectId, details: BookDetails, quantity: i64) -> Self {
        Self {
            id,
            name: details.name,
            author_name: details.author_name,
            category: details.category,
            rating: details.rating,
            image: details.image,
            quantity,
        }
    }

    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            name: self.name.clone(),
            author_name: self.author_name.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
        }
    }
}

/// Descriptive fields of a book (everything but identity and stock)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookDetails {
    pub name: String,
    pub author_name: String,
    pub category: String,
    pub rating: f64,
    pub image: String,
}

/// Copy of a book's descriptive fields taken when it is borrowed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
}

/// Book ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub details: BookDetails,
    pub quantity: i64,
}

/// Partial update of a book's descriptive fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author_name: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub image: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author_name.is_none()
            && self.category.is_none()
            && self.rating.is_none()
            && self.image.is_none()
    }

    /// Apply to a book, returning whether anything changed
    pub fn apply(&self, book: &mut Book) -> bool {
        let mut changed = false;
        if let Some(name) = &self.name {
            changed |= replace(&mut book.name, name.clone());
        }
        if let Some(author_name) = &self.author_name {
            changed |= replace(&mut book.author_name, author_name.clone());
        }
        if let Some(category) = &self.category {
            changed |= replace(&mut book.category, category.clone());
        }
        if let Some(rating) = self.rating {
            changed |= replace(&mut book.rating, rating);
        }
        if let Some(image) = &self.image {
            changed |= replace(&mut book.image, image.clone());
        }
        changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Number as clients (and older documents) send it: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Coerce into a non-negative copy count
    pub fn into_count(self) -> AppResult<i64> {
        let count = match self {
            RawNumber::Integer(n) => n,
            RawNumber::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
            RawNumber::Float(f) => {
                return Err(AppError::InvalidRequest(format!(
                    "Quantity must be a whole number, got {}",
                    f
                )))
            }
            RawNumber::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                AppError::InvalidRequest(format!("Quantity must be a number, got \"{}\"", s))
            })?,
        };

        if count < 0 {
            return Err(AppError::InvalidRequest(
                "Quantity cannot be negative".to_string(),
            ));
        }
        Ok(count)
    }

    /// Coerce into a rating value
    pub fn into_rating(self) -> AppResult<f64> {
        match self {
            RawNumber::Integer(n) => Ok(n as f64),
            RawNumber::Float(f) if f.is_finite() => Ok(f),
            RawNumber::Float(f) => Err(AppError::InvalidRequest(format!(
                "Rating must be a finite number, got {}",
                f
            ))),
            RawNumber::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                AppError::InvalidRequest(format!("Rating must be a number, got \"{}\"", s))
            }),
        }
    }
}

/// Lenient reader for stored quantities; unreadable values count as no stock
pub fn deserialize_stored_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|q| q.into_count().ok()).unwrap_or(0))
}

/// Lenient reader for stored ratings
pub fn deserialize_stored_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.into_rating().ok()).unwrap_or(0.0))
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name cannot be empty")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "authorName is required"),
        length(min = 1, message = "authorName cannot be empty")
    )]
    pub author_name: Option<String>,
    #[validate(
        required(message = "category is required"),
        length(min = 1, message = "category cannot be empty")
    )]
    pub category: Option<String>,
    #[schema(value_type = f64)]
    pub rating: Option<RawNumber>,
    pub image: Option<String>,
    #[schema(value_type = i64)]
    pub quantity: Option<RawNumber>,
}

impl CreateBookRequest {
    pub fn into_new_book(self) -> AppResult<NewBook> {
        self.validate()?;

        let quantity = match self.quantity {
            Some(raw) => raw.into_count()?,
            None => 0,
        };
        let rating = match self.rating {
            Some(raw) => raw.into_rating()?,
            None => 0.0,
        };

        Ok(NewBook {
            details: BookDetails {
                name: self.name.unwrap_or_default(),
                author_name: self.author_name.unwrap_or_default(),
                category: self.category.unwrap_or_default(),
                rating,
                image: self.image.unwrap_or_default(),
            },
            quantity,
        })
    }
}

/// Update book request; absent fields are left untouched
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub name: Option<String>,
    pub author_name: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub rating: Option<RawNumber>,
    pub image: Option<String>,
}

impl UpdateBookRequest {
    pub fn into_patch(self) -> AppResult<BookPatch> {
        let rating = self.rating.map(RawNumber::into_rating).transpose()?;
        Ok(BookPatch {
            name: self.name,
            author_name: self.author_name,
            category: self.category,
            rating,
            image: self.image,
        })
    }
}
