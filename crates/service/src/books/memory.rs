use std::{collections::BTreeMap, path::PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::books::domain::{Book, BookId, BookInput, BookRules};
use crate::books::repository::BookRepository;
use crate::errors::ServiceError;
use crate::storage::json_snapshot::JsonSnapshotFile;

/// Records plus the id counter; always guarded together.
#[derive(Debug)]
struct Shelf {
    next_id: BookId,
    // ids only grow, so key order is insertion order
    books: BTreeMap<BookId, Book>,
}

impl Default for Shelf {
    fn default() -> Self { Self { next_id: 1, books: BTreeMap::new() } }
}

/// On-disk form: `{"next_id": n, "books": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: BookId,
    books: Vec<Book>,
}

impl Default for Snapshot {
    fn default() -> Self { Self { next_id: 1, books: Vec::new() } }
}

impl TryFrom<Snapshot> for Shelf {
    type Error = ServiceError;

    /// Rejects snapshots that would break id rules: non-positive or duplicate
    /// ids, or a largest id the counter cannot move past.
    fn try_from(snap: Snapshot) -> Result<Self, Self::Error> {
        let mut books = BTreeMap::new();
        for book in snap.books {
            if book.id <= 0 {
                return Err(ServiceError::Storage(format!("snapshot holds non-positive book id {}", book.id)));
            }
            let id = book.id;
            if books.insert(id, book).is_some() {
                return Err(ServiceError::Storage(format!("snapshot holds duplicate book id {id}")));
            }
        }
        // never hand out an id that is already on disk, whatever the counter says
        let floor = match books.keys().next_back() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| ServiceError::Storage(format!("snapshot book id {max} leaves no room for new ids")))?,
            None => 1,
        };
        Ok(Self { next_id: snap.next_id.max(floor), books })
    }
}

impl From<&Shelf> for Snapshot {
    fn from(shelf: &Shelf) -> Self {
        Self { next_id: shelf.next_id, books: shelf.books.values().cloned().collect() }
    }
}

/// In-process book collection behind one exclusive lock.
///
/// With a snapshot file attached, the lock is held across the file write and
/// a failed write rolls the in-memory change back, so memory and disk never
/// disagree. The id counter is not rolled back.
pub struct InMemoryBookStore {
    shelf: Mutex<Shelf>,
    rules: BookRules,
    snapshot: Option<JsonSnapshotFile<Snapshot>>,
}

impl InMemoryBookStore {
    pub fn new(rules: BookRules) -> Self {
        Self { shelf: Mutex::new(Shelf::default()), rules, snapshot: None }
    }

    /// Load (or create) the snapshot at `path` and persist every mutation to it.
    pub async fn with_snapshot<P: Into<PathBuf>>(path: P, rules: BookRules) -> Result<Self, ServiceError> {
        let (file, snap) = JsonSnapshotFile::<Snapshot>::open(path).await?;
        let shelf = Shelf::try_from(snap)?;
        info!(path = %file.path().display(), books = shelf.books.len(), next_id = shelf.next_id, "book snapshot loaded");
        Ok(Self { shelf: Mutex::new(shelf), rules, snapshot: Some(file) })
    }

    async fn persist(&self, shelf: &Shelf) -> Result<(), ServiceError> {
        match &self.snapshot {
            Some(file) => file.save(&Snapshot::from(shelf)).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        let shelf = self.shelf.lock().await;
        Ok(shelf.books.values().cloned().collect())
    }

    async fn get(&self, id: BookId) -> Result<Book, ServiceError> {
        let shelf = self.shelf.lock().await;
        shelf.books.get(&id).cloned().ok_or_else(ServiceError::book_not_found)
    }

    async fn create(&self, input: BookInput) -> Result<Book, ServiceError> {
        let valid = input.validate(&self.rules)?;
        let mut shelf = self.shelf.lock().await;
        let id = shelf.next_id;
        shelf.next_id = id
            .checked_add(1)
            .ok_or_else(|| ServiceError::Storage("book id space exhausted".into()))?;
        let book = valid.into_book(id);
        shelf.books.insert(id, book.clone());
        if let Err(e) = self.persist(&shelf).await {
            shelf.books.remove(&id);
            return Err(e);
        }
        Ok(book)
    }

    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, ServiceError> {
        let mut shelf = self.shelf.lock().await;
        let current = shelf.books.get(&id).cloned().ok_or_else(ServiceError::book_not_found)?;
        let valid = input.validate(&self.rules)?;
        let mut updated = current.clone();
        valid.merge_into(&mut updated);
        shelf.books.insert(id, updated.clone());
        if let Err(e) = self.persist(&shelf).await {
            shelf.books.insert(id, current);
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete(&self, id: BookId) -> Result<Book, ServiceError> {
        let mut shelf = self.shelf.lock().await;
        let removed = shelf.books.remove(&id).ok_or_else(ServiceError::book_not_found)?;
        if let Err(e) = self.persist(&shelf).await {
            shelf.books.insert(id, removed);
            return Err(e);
        }
        Ok(removed)
    }
}
