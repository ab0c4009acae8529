use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set, Unchanged, NotSet};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a row that has no id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
}

/// Required text field: must contain something other than whitespace.
/// Returns the trimmed value.
pub fn validate_required(field: &str, value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// ISBN-10 or ISBN-13; hyphens and spaces are ignored, ISBN-10 may end in `X`.
pub fn validate_isbn(value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    let compact: Vec<char> = trimmed.chars().filter(|c| *c != '-' && *c != ' ').collect();
    let ok = match compact.len() {
        13 => compact.iter().all(|c| c.is_ascii_digit()),
        10 => {
            compact[..9].iter().all(|c| c.is_ascii_digit())
                && (compact[9].is_ascii_digit() || compact[9] == 'X' || compact[9] == 'x')
        }
        _ => false,
    };
    if !ok {
        return Err(ModelError::Validation("isbn must contain 10 or 13 digits".into()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_year(year: i32, min: i32, max: i32) -> Result<i32, ModelError> {
    if year < min || year > max {
        return Err(ModelError::Validation(format!("year must be between {min} and {max}")));
    }
    Ok(year)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn insert(db: &DatabaseConnection, row: NewBook) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: NotSet,
        title: Set(row.title),
        author: Set(row.author),
        isbn: Set(row.isbn),
        year: Set(row.year),
    };
    Ok(am.insert(db).await?)
}

/// Write every mutable column of `model`; the id is only used to locate the row.
pub async fn save(db: &DatabaseConnection, model: Model) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Unchanged(model.id),
        title: Set(model.title),
        author: Set(model.author),
        isbn: Set(model.isbn),
        year: Set(model.year),
    };
    Ok(am.update(db).await?)
}

/// Returns whether a row was actually removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
