use models::book::{validate_isbn, validate_required, validate_year};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ServiceError;

/// Store-assigned identifier; positive, never reused.
pub type BookId = i64;

/// A stored book as returned to callers (always a copy).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// 创建/更新输入：不包含 id，由存储层分配；请求中携带的 id 会被忽略
///
/// `title`/`author` default to empty so a missing field is reported by
/// validation rather than rejected as a malformed body.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// `null` reads as an empty string, same as a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Inclusive bounds applied to `year`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookRules {
    pub min_year: i32,
    pub max_year: i32,
}

impl BookRules {
    pub fn new(min_year: i32, max_year: i32) -> Self { Self { min_year, max_year } }
}

impl Default for BookRules {
    fn default() -> Self { Self { min_year: 1000, max_year: 2100 } }
}

/// Input that passed validation, with text fields trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
}

impl BookInput {
    /// Check every field and report all offending ones at once, joined by `; `.
    /// A blank `isbn` counts as absent.
    pub fn validate(&self, rules: &BookRules) -> Result<ValidBook, ServiceError> {
        let mut problems: Vec<String> = Vec::new();
        let mut note = |msg: &str| problems.push(msg.to_string());

        let title = validate_required("title", &self.title).map_err(|e| note(e.message())).ok();
        let author = validate_required("author", &self.author).map_err(|e| note(e.message())).ok();
        let isbn = match self.isbn.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => validate_isbn(raw).map_err(|e| note(e.message())).ok(),
        };
        let year = match self.year {
            None => None,
            Some(y) => validate_year(y, rules.min_year, rules.max_year).map_err(|e| note(e.message())).ok(),
        };

        match (title, author) {
            (Some(title), Some(author)) if problems.is_empty() => Ok(ValidBook { title, author, isbn, year }),
            _ => Err(ServiceError::Validation(problems.join("; "))),
        }
    }
}

impl ValidBook {
    pub fn into_book(self, id: BookId) -> Book {
        Book { id, title: self.title, author: self.author, isbn: self.isbn, year: self.year }
    }

    /// Merge update: title/author always replaced, optional fields only when supplied.
    /// The id is never touched.
    pub fn merge_into(self, book: &mut Book) {
        book.title = self.title;
        book.author = self.author;
        if let Some(isbn) = self.isbn {
            book.isbn = Some(isbn);
        }
        if let Some(year) = self.year {
            book.year = Some(year);
        }
    }
}
