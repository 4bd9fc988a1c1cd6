//! MongoDB-backed stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, Credential, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{BookStore, CategoryStore, LoanStore};
use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::{
        book::{deserialize_stored_quantity, deserialize_stored_rating},
        Book, BookDetails, BookPatch, BookSnapshot, Category, Loan, NewBook, NewLoan,
    },
};

const DUPLICATE_KEY: i32 = 11000;

/// Connected database handle. Opened once at startup, closed at shutdown.
pub struct MongoStore {
    client: Client,
    database: Database,
    config: DatabaseConfig,
}

impl MongoStore {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.url).await?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }
        options.app_name = Some("shelf-server".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);

        Ok(Self {
            client,
            database,
            config: config.clone(),
        })
    }

    /// Round-trip to the server so a bad URI fails at startup rather than on first request
    pub async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// One active loan per (book, borrower email)
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "bookId": 1, "userEmail": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("book_borrower_unique".to_string())
                    .build(),
            )
            .build();

        self.loans().collection.create_index(index).await?;
        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    pub fn books(&self) -> MongoBookStore {
        MongoBookStore {
            collection: self.database.collection(&self.config.collections.books),
        }
    }

    pub fn categories(&self) -> MongoCategoryStore {
        MongoCategoryStore {
            collection: self.database.collection(&self.config.collections.categories),
        }
    }

    pub fn loans(&self) -> MongoLoanStore {
        MongoLoanStore {
            collection: self.database.collection(&self.config.collections.loans),
        }
    }
}

async fn collect<T, R>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<FindOptions>,
) -> AppResult<Vec<R>>
where
    T: DeserializeOwned + Send + Sync + Into<R>,
{
    let mut cursor = collection.find(filter).with_options(options).await?;

    let mut records = Vec::new();
    while cursor.advance().await? {
        let document: T = cursor.deserialize_current()?;
        records.push(document.into());
    }
    Ok(records)
}

fn to_bson_date(date: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(date.timestamp_millis())
}

fn from_bson_date(date: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "deserialize_stored_rating")]
    rating: f64,
    #[serde(default)]
    image: String,
    #[serde(default, deserialize_with = "deserialize_stored_quantity")]
    quantity: i64,
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Book::from_parts(
            doc.id,
            BookDetails {
                name: doc.name,
                author_name: doc.author_name,
                category: doc.category,
                rating: doc.rating,
                image: doc.image,
            },
            doc.quantity,
        )
    }
}

fn patch_document(patch: &BookPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(author_name) = &patch.author_name {
        set.insert("authorName", author_name.as_str());
    }
    if let Some(category) = &patch.category {
        set.insert("category", category.as_str());
    }
    if let Some(rating) = patch.rating {
        set.insert("rating", rating);
    }
    if let Some(image) = &patch.image {
        set.insert("image", image.as_str());
    }
    set
}

/// Stored quantity as a number. Legacy documents hold it as a string;
/// anything unconvertible counts as no stock.
fn stored_quantity() -> Bson {
    Bson::Document(doc! {
        "$convert": {
            "input": "$quantity",
            "to": "long",
            "onError": 0_i64,
            "onNull": 0_i64,
        }
    })
}

fn in_stock_filter(id: ObjectId) -> Document {
    doc! { "_id": id, "$expr": { "$gt": [stored_quantity(), 0_i64] } }
}

/// Pipeline update shifting the quantity by `delta`; the result is always stored as a number
fn shift_quantity(delta: i64) -> Vec<Document> {
    vec![doc! { "$set": { "quantity": { "$add": [stored_quantity(), delta] } } }]
}

#[derive(Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn insert(&self, book: NewBook) -> AppResult<ObjectId> {
        let id = ObjectId::new();
        let details = book.details;
        let document = BookDocument {
            id,
            name: details.name,
            author_name: details.author_name,
            category: details.category,
            rating: details.rating,
            image: details.image,
            quantity: book.quantity,
        };

        self.collection.insert_one(document).await?;
        Ok(id)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        collect(&self.collection, doc! {}, None).await
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let document = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(document.map(Book::from))
    }

    async fn find_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        collect(&self.collection, doc! { "category": category }, None).await
    }

    async fn find_latest(&self, limit: i64) -> AppResult<Vec<Book>> {
        // ObjectIds start with their creation timestamp
        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .limit(limit)
            .build();
        collect(&self.collection, doc! {}, Some(options)).await
    }

    async fn update_details(&self, id: ObjectId, patch: &BookPatch) -> AppResult<u64> {
        let set = patch_document(patch);
        if set.is_empty() {
            return Ok(0);
        }

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.modified_count)
    }

    async fn take_copy(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let document = self
            .collection
            .find_one_and_update(in_stock_filter(id), shift_quantity(-1))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(Book::from))
    }

    async fn restore_copy(&self, id: ObjectId) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, shift_quantity(1))
            .await?;
        Ok(result.matched_count == 1)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, alias = "categoryName", alias = "name")]
    category: String,
    image: Option<String>,
    description: Option<String>,
}

impl From<CategoryDocument> for Category {
    fn from(doc: CategoryDocument) -> Self {
        Category {
            id: doc.id,
            category: doc.category,
            image: doc.image,
            description: doc.description,
        }
    }
}

#[derive(Clone)]
pub struct MongoCategoryStore {
    collection: Collection<CategoryDocument>,
}

#[async_trait]
impl CategoryStore for MongoCategoryStore {
    async fn find_all(&self) -> AppResult<Vec<Category>> {
        collect(&self.collection, doc! {}, None).await
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    book_id: ObjectId,
    #[serde(default)]
    user_name: String,
    user_email: String,
    return_date: bson::DateTime,
    borrow_date: bson::DateTime,
    book_details: BookSnapshot,
}

impl From<LoanDocument> for Loan {
    fn from(doc: LoanDocument) -> Self {
        Loan {
            id: doc.id,
            book_id: doc.book_id,
            user_name: doc.user_name,
            user_email: doc.user_email,
            return_date: from_bson_date(doc.return_date),
            borrow_date: from_bson_date(doc.borrow_date),
            book_details: doc.book_details,
        }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[derive(Clone)]
pub struct MongoLoanStore {
    collection: Collection<LoanDocument>,
}

#[async_trait]
impl LoanStore for MongoLoanStore {
    async fn find_active(&self, book_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>> {
        let document = self
            .collection
            .find_one(doc! { "bookId": book_id, "userEmail": user_email })
            .await?;
        Ok(document.map(Loan::from))
    }

    async fn find_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<Option<Loan>> {
        let document = self
            .collection
            .find_one(doc! { "_id": loan_id, "userEmail": user_email })
            .await?;
        Ok(document.map(Loan::from))
    }

    async fn find_by_borrower(&self, user_email: &str) -> AppResult<Vec<Loan>> {
        collect(&self.collection, doc! { "userEmail": user_email }, None).await
    }

    async fn insert(&self, loan: NewLoan) -> AppResult<ObjectId> {
        let id = ObjectId::new();
        let document = LoanDocument {
            id,
            book_id: loan.book_id,
            user_name: loan.user_name,
            user_email: loan.user_email,
            return_date: to_bson_date(loan.return_date),
            borrow_date: to_bson_date(loan.borrow_date),
            book_details: loan.book_details,
        };

        match self.collection.insert_one(document).await {
            Ok(_) => Ok(id),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyBorrowed),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_owned(&self, loan_id: ObjectId, user_email: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_one(doc! { "_id": loan_id, "userEmail": user_email })
            .await?;
        Ok(result.deleted_count)
    }
}
