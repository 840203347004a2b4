//! Loan desk use-case service.
//!
//! # Responsibility
//! - List copies on loan, per borrower and library-wide.
//! - Lend, renew and return copies.
//!
//! # Invariants
//! - Renewal dates fall between today and four weeks from today, inclusive.
//! - Returning a copy makes it available and clears borrower and due date.
//! - Callers check `can_mark_returned` before `mark_returned`; this service
//!   does not enforce permissions.

use crate::model::book_instance::{BookInstance, BookInstanceId, BorrowerId, LoanStatus};
use crate::repo::instance_repo::{InstanceListQuery, InstanceRepository};
use crate::repo::RepoError;
use chrono::{Days, NaiveDate};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum renewal window, counted from today.
pub const MAX_RENEWAL_DAYS: u64 = 28;

/// Errors from loan use-cases.
#[derive(Debug)]
pub enum LoanServiceError {
    /// Target copy does not exist.
    InstanceNotFound(BookInstanceId),
    /// Requested due date is before today.
    RenewalInPast {
        requested: NaiveDate,
        today: NaiveDate,
    },
    /// Requested due date is beyond the renewal window.
    RenewalTooFar {
        requested: NaiveDate,
        latest: NaiveDate,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LoanServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstanceNotFound(id) => write!(f, "book instance not found: {id}"),
            Self::RenewalInPast { requested, today } => {
                write!(f, "invalid date: renewal {requested} is before {today}")
            }
            Self::RenewalTooFar { requested, latest } => write!(
                f,
                "invalid date: renewal {requested} is more than 4 weeks ahead (latest {latest})"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoanServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LoanServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type LoanResult<T> = Result<T, LoanServiceError>;

/// Loan desk facade over a copy repository.
pub struct LoanService<R: InstanceRepository> {
    repo: R,
}

impl<R: InstanceRepository> LoanService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Copies on loan to one borrower, soonest due first.
    pub fn loaned_books_by_user(&self, borrower: BorrowerId) -> LoanResult<Vec<BookInstance>> {
        Ok(self.repo.list_instances(&InstanceListQuery {
            status: Some(LoanStatus::OnLoan),
            borrower: Some(borrower),
            ..InstanceListQuery::default()
        })?)
    }

    /// Every copy currently on loan, soonest due first.
    pub fn all_borrowed(&self) -> LoanResult<Vec<BookInstance>> {
        Ok(self.repo.list_instances(&InstanceListQuery {
            status: Some(LoanStatus::OnLoan),
            ..InstanceListQuery::default()
        })?)
    }

    /// Copies whose due date is before `today`.
    pub fn overdue(&self, today: NaiveDate) -> LoanResult<Vec<BookInstance>> {
        Ok(self.repo.list_instances(&InstanceListQuery {
            due_before: Some(today),
            ..InstanceListQuery::default()
        })?)
    }

    /// Puts a copy on loan to `borrower` until `due_back`.
    pub fn lend(
        &self,
        id: BookInstanceId,
        borrower: BorrowerId,
        due_back: NaiveDate,
    ) -> LoanResult<BookInstance> {
        let mut copy = self.load(id)?;
        copy.status = LoanStatus::OnLoan;
        copy.borrower = Some(borrower);
        copy.due_back = Some(due_back);
        self.repo.update_instance(&copy)?;
        info!(
            "event=loan_lend module=service status=ok instance={} due_back={}",
            id, due_back
        );
        Ok(copy)
    }

    /// Moves the due date of a copy, within the renewal window.
    pub fn renew(
        &self,
        id: BookInstanceId,
        new_due: NaiveDate,
        today: NaiveDate,
    ) -> LoanResult<BookInstance> {
        validate_renewal_date(new_due, today)?;

        let mut copy = self.load(id)?;
        copy.due_back = Some(new_due);
        self.repo.update_instance(&copy)?;
        info!(
            "event=loan_renew module=service status=ok instance={} due_back={}",
            id, new_due
        );
        Ok(copy)
    }

    /// Marks a copy returned: available, no borrower, no due date.
    pub fn mark_returned(&self, id: BookInstanceId) -> LoanResult<BookInstance> {
        let mut copy = self.load(id)?;
        copy.status = LoanStatus::Available;
        copy.borrower = None;
        copy.due_back = None;
        self.repo.update_instance(&copy)?;
        info!("event=loan_return module=service status=ok instance={id}");
        Ok(copy)
    }

    fn load(&self, id: BookInstanceId) -> LoanResult<BookInstance> {
        self.repo
            .get_instance(id)?
            .ok_or(LoanServiceError::InstanceNotFound(id))
    }
}

/// Checks a renewal date against the `[today, today + 4 weeks]` window.
pub fn validate_renewal_date(requested: NaiveDate, today: NaiveDate) -> LoanResult<()> {
    if requested < today {
        return Err(LoanServiceError::RenewalInPast { requested, today });
    }
    let latest = today
        .checked_add_days(Days::new(MAX_RENEWAL_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if requested > latest {
        return Err(LoanServiceError::RenewalTooFar { requested, latest });
    }
    Ok(())
}
