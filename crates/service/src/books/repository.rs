use async_trait::async_trait;

use crate::books::domain::{Book, BookId, BookInput};
use crate::errors::ServiceError;

/// Authoritative collection of books.
///
/// Implementations serialise all five operations so that ids are never
/// handed out twice and racing update/delete calls on one id resolve to
/// exactly one success and one `NotFound`.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books in insertion order.
    async fn list(&self) -> Result<Vec<Book>, ServiceError>;
    async fn get(&self, id: BookId) -> Result<Book, ServiceError>;
    async fn create(&self, input: BookInput) -> Result<Book, ServiceError>;
    /// `NotFound` is checked before the input is validated.
    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, ServiceError>;
    /// Returns the removed record.
    async fn delete(&self, id: BookId) -> Result<Book, ServiceError>;
}
