use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::books::domain::{Book, BookId, BookInput, BookRules};
use crate::books::memory::InMemoryBookStore;
use crate::books::repository::BookRepository;
use crate::errors::ServiceError;

/// Application service in front of whichever [`BookRepository`] was configured.
/// Adds structured events; all policy lives in the repository.
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self { Self { repo } }

    /// Volatile store, handy for tests and the default configuration.
    pub fn in_memory(rules: BookRules) -> Self {
        Self::new(Arc::new(InMemoryBookStore::new(rules)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        let books = self.repo.list().await.map_err(|e| failed("list", e))?;
        debug!(count = books.len(), "list books");
        Ok(books)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: BookId) -> Result<Book, ServiceError> {
        self.repo.get(id).await.map_err(|e| failed("get", e))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: BookInput) -> Result<Book, ServiceError> {
        let book = self.repo.create(input).await.map_err(|e| failed("create", e))?;
        info!(event = "book_created", id = book.id, title = %book.title, "created book");
        Ok(book)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: BookId, input: BookInput) -> Result<Book, ServiceError> {
        let book = self.repo.update(id, input).await.map_err(|e| failed("update", e))?;
        info!(event = "book_updated", id = book.id, "updated book");
        Ok(book)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: BookId) -> Result<Book, ServiceError> {
        let book = self.repo.delete(id).await.map_err(|e| failed("delete", e))?;
        info!(event = "book_deleted", id = book.id, "deleted book");
        Ok(book)
    }
}

fn failed(op: &'static str, e: ServiceError) -> ServiceError {
    if e.is_internal() {
        error!(op, err = %e, "book operation failed");
    } else {
        debug!(op, err = %e, "book operation rejected");
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dune_scenario() {
        let svc = BookService::in_memory(BookRules::default());
        let input = |t: &str| BookInput { title: t.into(), author: "Herbert".into(), ..Default::default() };

        let created = svc.create(input("Dune")).await.unwrap();
        assert_eq!(created, Book { id: 1, title: "Dune".into(), author: "Herbert".into(), isbn: None, year: None });
        assert_eq!(svc.get(1).await.unwrap(), created);

        let updated = svc.update(1, input("Dune Messiah")).await.unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.id, 1);

        svc.delete(1).await.unwrap();
        match svc.get(1).await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Book not found"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn clones_share_one_collection() {
        let svc = BookService::in_memory(BookRules::default());
        let other = svc.clone();
        svc.create(BookInput { title: "A".into(), author: "X".into(), ..Default::default() }).await.unwrap();
        assert_eq!(other.list().await.unwrap().len(), 1);
    }
}
