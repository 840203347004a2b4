//! Author domain model.
//!
//! # Invariants
//! - `first_name`/`last_name` are non-blank and at most 100 characters.
//! - `date_of_death` may precede `date_of_birth`; dates are stored as given.
//! - Listings of authors are ordered by `last_name` ascending.

use crate::model::validation::{require_text, CatalogValidationError, AUTHOR_NAME_MAX_CHARS};
use crate::urls::{UrlError, UrlResolver, AUTHOR_DETAIL_ROUTE};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type AuthorId = i64;

/// Unsaved author fields used by create/update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Rendered as "Died" in forms.
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorDraft {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }

    pub fn died(mut self, date: NaiveDate) -> Self {
        self.date_of_death = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_names(&self.first_name, &self.last_name)
    }
}

/// Persisted author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn from_draft(id: AuthorId, draft: AuthorDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            date_of_birth: draft.date_of_birth,
            date_of_death: draft.date_of_death,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        validate_names(&self.first_name, &self.last_name)
    }

    /// Location of this author's detail view.
    pub fn absolute_url(&self, resolver: &dyn UrlResolver) -> Result<String, UrlError> {
        resolver.reverse(AUTHOR_DETAIL_ROUTE, &[self.id.to_string().as_str()])
    }
}

/// Renders `"{id}, {last_name}, {first_name}"`.
impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.id, self.last_name, self.first_name)
    }
}

fn validate_names(first_name: &str, last_name: &str) -> Result<(), CatalogValidationError> {
    require_text("author.first_name", first_name, AUTHOR_NAME_MAX_CHARS)?;
    require_text("author.last_name", last_name, AUTHOR_NAME_MAX_CHARS)
}
