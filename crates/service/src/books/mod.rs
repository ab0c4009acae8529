//! Book collection: domain types, the repository seam and its backends.

pub mod domain;
pub mod repository;
pub mod memory;
pub mod seaorm;
pub mod service;

pub use domain::{Book, BookId, BookInput, BookRules};
pub use memory::InMemoryBookStore;
pub use repository::BookRepository;
pub use seaorm::SeaOrmBookRepository;
pub use service::BookService;
