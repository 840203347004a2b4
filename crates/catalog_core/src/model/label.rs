//! Genre and language labels.
//!
//! Both are plain named records; they render as their name.

use crate::model::validation::{require_text, CatalogValidationError, LABEL_NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type GenreId = i64;
pub type LanguageId = i64;

/// Literary category, for example "Science Fiction" or "Poetry".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_genre_name(&self.name)
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Spoken or written language a book is published in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

impl Language {
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_language_name(&self.name)
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn validate_genre_name(name: &str) -> Result<(), CatalogValidationError> {
    require_text("genre.name", name, LABEL_NAME_MAX_CHARS)
}

pub fn validate_language_name(name: &str) -> Result<(), CatalogValidationError> {
    require_text("language.name", name, LABEL_NAME_MAX_CHARS)
}
