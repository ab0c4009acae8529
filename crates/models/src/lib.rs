//! Persistence model for the `books` table plus the field validators shared
//! by every store backend.

pub mod errors;
pub mod db;
pub mod book;

#[cfg(test)]
mod tests;
