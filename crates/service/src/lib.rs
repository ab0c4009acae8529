//! Service layer owning the book collection.
//! - `books`: domain types, the `BookRepository` seam, in-memory and SeaORM backends.
//! - `storage`: file persistence helpers used by the in-memory backend.
//! - Reuses validation and entity definitions from the `models` crate.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod books;
