//! Loanable book copy model.
//!
//! # Responsibility
//! - Define the copy record tracked for availability and due dates.
//! - Derive the overdue flag from the due date at evaluation time.
//!
//! # Invariants
//! - `id` is a random UUID assigned at construction and never reassigned.
//! - `status` is one of the four loan states; new copies start in
//!   `Maintenance`.
//! - Listings of copies are ordered by `due_back` ascending.
//! - `due_back` years stay within `0..=9999` so stored dates sort as text.

use crate::model::book::BookId;
use crate::model::validation::{
    require_text, storable_date, CatalogValidationError, INSTANCE_IMPRINT_MAX_CHARS,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type BookInstanceId = Uuid;

/// Opaque identity of a borrower, owned by the access-control collaborator.
pub type BorrowerId = i64;

/// Availability of one copy. Set by librarians; nothing here transitions it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// One-letter code persisted in `book_instances.status`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Maintenance => "m",
            Self::OnLoan => "o",
            Self::Available => "a",
            Self::Reserved => "r",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::OnLoan => "On loan",
            Self::Available => "Available",
            Self::Reserved => "Reserved",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, CatalogValidationError> {
        match code {
            "m" => Ok(Self::Maintenance),
            "o" => Ok(Self::OnLoan),
            "a" => Ok(Self::Available),
            "r" => Ok(Self::Reserved),
            other => Err(CatalogValidationError::UnknownStatusCode(other.to_string())),
        }
    }
}

impl FromStr for LoanStatus {
    type Err = CatalogValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_code(value)
    }
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Book reference carried by a copy, with the title needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub id: BookId,
    pub title: String,
}

/// One loanable copy of a book.
///
/// Deserialization goes through the same checks as `with_id` + `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookInstanceRecord")]
pub struct BookInstance {
    id: BookInstanceId,
    pub book: Option<BookRef>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower: Option<BorrowerId>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// Creates a new copy with a freshly generated id.
    pub fn new(book: Option<BookRef>, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book,
            imprint: imprint.into(),
            due_back: None,
            borrower: None,
            status: LoanStatus::default(),
        }
    }

    /// Rebuilds a copy around an existing id, e.g. when loading from storage.
    pub fn with_id(
        id: BookInstanceId,
        book: Option<BookRef>,
        imprint: impl Into<String>,
    ) -> Result<Self, CatalogValidationError> {
        if id.is_nil() {
            return Err(CatalogValidationError::NilInstanceId);
        }
        let mut instance = Self::new(book, imprint);
        instance.id = id;
        Ok(instance)
    }

    pub fn id(&self) -> BookInstanceId {
        self.id
    }

    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        if self.id.is_nil() {
            return Err(CatalogValidationError::NilInstanceId);
        }
        require_text("book_instance.imprint", &self.imprint, INSTANCE_IMPRINT_MAX_CHARS)?;
        if let Some(due_back) = self.due_back {
            storable_date("book_instance.due_back", due_back)?;
        }
        Ok(())
    }

    /// Whether the due date has passed, evaluated against the local date.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }

    /// Whether `due_back` is set and strictly before `today`.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.is_some_and(|due| due < today)
    }
}

/// Unchecked wire shape of a copy.
#[derive(Deserialize)]
struct BookInstanceRecord {
    id: BookInstanceId,
    book: Option<BookRef>,
    imprint: String,
    due_back: Option<NaiveDate>,
    borrower: Option<BorrowerId>,
    #[serde(default)]
    status: LoanStatus,
}

impl TryFrom<BookInstanceRecord> for BookInstance {
    type Error = CatalogValidationError;

    fn try_from(record: BookInstanceRecord) -> Result<Self, Self::Error> {
        let mut instance = Self::with_id(record.id, record.book, record.imprint)?;
        instance.due_back = record.due_back;
        instance.borrower = record.borrower;
        instance.status = record.status;
        instance.validate()?;
        Ok(instance)
    }
}

/// Renders `"{id} ({book title})"`, or just the id when no book is linked.
impl Display for BookInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.book {
            Some(book) => write!(f, "{} ({})", self.id, book.title),
            None => write!(f, "{}", self.id),
        }
    }
}
