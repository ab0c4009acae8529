use async_trait::async_trait;
use models::book;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::books::domain::{Book, BookId, BookInput, BookRules};
use crate::books::repository::BookRepository;
use crate::errors::ServiceError;

/// SeaORM-backed repository over the `books` table.
///
/// Ids come from the table's autoincrement key. Mutations pass through a
/// write gate so read-validate-write sequences do not interleave.
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
    rules: BookRules,
    write_gate: Mutex<()>,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection, rules: BookRules) -> Self {
        Self { db, rules, write_gate: Mutex::new(()) }
    }
}

/// Ids that cannot exist in the table map to `None` (and so to `NotFound`).
fn row_key(id: BookId) -> Option<i32> {
    i32::try_from(id).ok().filter(|k| *k > 0)
}

fn to_book(m: book::Model) -> Book {
    Book { id: BookId::from(m.id), title: m.title, author: m.author, isbn: m.isbn, year: m.year }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        Ok(book::list(&self.db).await?.into_iter().map(to_book).collect())
    }

    async fn get(&self, id: BookId) -> Result<Book, ServiceError> {
        let key = row_key(id).ok_or_else(ServiceError::book_not_found)?;
        book::find(&self.db, key)
            .await?
            .map(to_book)
            .ok_or_else(ServiceError::book_not_found)
    }

    async fn create(&self, input: BookInput) -> Result<Book, ServiceError> {
        let valid = input.validate(&self.rules)?;
        let _gate = self.write_gate.lock().await;
        let row = book::NewBook { title: valid.title, author: valid.author, isbn: valid.isbn, year: valid.year };
        Ok(to_book(book::insert(&self.db, row).await?))
    }

    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, ServiceError> {
        let key = row_key(id).ok_or_else(ServiceError::book_not_found)?;
        let _gate = self.write_gate.lock().await;
        let current = book::find(&self.db, key).await?.ok_or_else(ServiceError::book_not_found)?;
        let valid = input.validate(&self.rules)?;
        let mut updated = to_book(current);
        valid.merge_into(&mut updated);
        let saved = book::save(
            &self.db,
            book::Model { id: key, title: updated.title, author: updated.author, isbn: updated.isbn, year: updated.year },
        )
        .await?;
        Ok(to_book(saved))
    }

    async fn delete(&self, id: BookId) -> Result<Book, ServiceError> {
        let key = row_key(id).ok_or_else(ServiceError::book_not_found)?;
        let _gate = self.write_gate.lock().await;
        let current = book::find(&self.db, key).await?.ok_or_else(ServiceError::book_not_found)?;
        if !book::delete(&self.db, key).await? {
            return Err(ServiceError::book_not_found());
        }
        Ok(to_book(current))
    }
}
