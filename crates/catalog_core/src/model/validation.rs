//! Field constraints shared by catalog records.

use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LABEL_NAME_MAX_CHARS: usize = 200;
pub const AUTHOR_NAME_MAX_CHARS: usize = 100;
pub const BOOK_TITLE_MAX_CHARS: usize = 200;
pub const BOOK_SUMMARY_MAX_CHARS: usize = 1000;
pub const BOOK_ISBN_MAX_CHARS: usize = 13;
pub const INSTANCE_IMPRINT_MAX_CHARS: usize = 200;

/// Stored dates are `YYYY-MM-DD` text; only four-digit years sort correctly.
pub const STORED_DATE_MIN_YEAR: i32 = 0;
pub const STORED_DATE_MAX_YEAR: i32 = 9999;

/// Validation errors raised before a record is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    /// Required text field is empty or whitespace only.
    BlankField { field: &'static str },
    /// Text field exceeds its maximum character count.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Copy identity must be a real UUID.
    NilInstanceId,
    /// Loan status code is not one of the declared codes.
    UnknownStatusCode(String),
    /// Date year falls outside the storable `0..=9999` range.
    DateOutOfRange { field: &'static str, year: i32 },
}

impl Display for CatalogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { field } => write!(f, "{field} must not be blank"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} has {actual_chars} characters; at most {max_chars} allowed"
            ),
            Self::NilInstanceId => write!(f, "book instance id must not be nil"),
            Self::UnknownStatusCode(code) => {
                write!(f, "unknown loan status code `{code}`; expected m|o|a|r")
            }
            Self::DateOutOfRange { field, year } => write!(
                f,
                "{field} year {year} is outside {STORED_DATE_MIN_YEAR}..={STORED_DATE_MAX_YEAR}"
            ),
        }
    }
}

impl Error for CatalogValidationError {}

/// Checks a required text field: non-blank and within `max_chars`.
pub fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), CatalogValidationError> {
    if value.trim().is_empty() {
        return Err(CatalogValidationError::BlankField { field });
    }
    limit_text(field, value, max_chars)
}

/// Checks an optional-content text field against `max_chars` only.
pub fn limit_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), CatalogValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(CatalogValidationError::FieldTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

/// Checks that a date keeps its order once stored as ISO text.
pub fn storable_date(field: &'static str, date: NaiveDate) -> Result<(), CatalogValidationError> {
    let year = date.year();
    if !(STORED_DATE_MIN_YEAR..=STORED_DATE_MAX_YEAR).contains(&year) {
        return Err(CatalogValidationError::DateOutOfRange { field, year });
    }
    Ok(())
}
