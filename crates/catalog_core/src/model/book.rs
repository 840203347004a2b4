//! Book domain model.
//!
//! # Invariants
//! - `title` is non-blank and at most 200 characters.
//! - `summary` is at most 1000 characters, `isbn` at most 13.
//! - `genres` holds each genre once, in association order.

use crate::model::author::AuthorId;
use crate::model::label::{Genre, GenreId, LanguageId};
use crate::model::validation::{
    limit_text, require_text, CatalogValidationError, BOOK_ISBN_MAX_CHARS,
    BOOK_SUMMARY_MAX_CHARS, BOOK_TITLE_MAX_CHARS,
};
use crate::urls::{UrlError, UrlResolver, BOOK_DETAIL_ROUTE};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type BookId = i64;

/// Maximum number of genre names shown by `display_genre`.
pub const DISPLAY_GENRE_LIMIT: usize = 3;

/// Unsaved book fields used by create/update calls.
///
/// `genres` lists genre ids in the order they should be associated;
/// duplicates are collapsed on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorId>,
    pub language: Option<LanguageId>,
    pub genres: Vec<GenreId>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_fields(&self.title, &self.summary, &self.isbn)
    }
}

/// Persisted book with its genres resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorId>,
    pub language: Option<LanguageId>,
    pub genres: Vec<Genre>,
}

impl Book {
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_fields(&self.title, &self.summary, &self.isbn)
    }

    /// Location of this book's detail view.
    pub fn absolute_url(&self, resolver: &dyn UrlResolver) -> Result<String, UrlError> {
        resolver.reverse(BOOK_DETAIL_ROUTE, &[self.id.to_string().as_str()])
    }

    /// Short genre summary for listings, e.g. `"Fantasy, Adventure, Drama"`.
    pub fn display_genre(&self) -> String {
        display_genre(self.genres.iter().map(|genre| genre.name.as_str()))
    }

    /// Converts back to a draft, keeping genre association order.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            author: self.author,
            language: self.language,
            genres: self.genres.iter().map(|genre| genre.id).collect(),
        }
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Joins the first three names with `", "`; empty input gives `""`.
pub fn display_genre<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .take(DISPLAY_GENRE_LIMIT)
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_fields(title: &str, summary: &str, isbn: &str) -> Result<(), CatalogValidationError> {
    require_text("book.title", title, BOOK_TITLE_MAX_CHARS)?;
    limit_text("book.summary", summary, BOOK_SUMMARY_MAX_CHARS)?;
    limit_text("book.isbn", isbn, BOOK_ISBN_MAX_CHARS)
}
