//! Catalog browsing service.
//!
//! # Responsibility
//! - Provide the library summary counts shown on a catalog home page.
//! - Assemble book and author detail projections.
//!
//! # Invariants
//! - Service layer remains storage-agnostic.

use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookId};
use crate::model::book_instance::{BookInstance, LoanStatus};
use crate::repo::author_repo::AuthorRepository;
use crate::repo::book_repo::{BookListQuery, BookRepository};
use crate::repo::instance_repo::{InstanceListQuery, InstanceRepository};
use crate::repo::RepoResult;

/// Record counts for the catalog home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub num_books: u64,
    pub num_instances: u64,
    pub num_instances_available: u64,
    pub num_authors: u64,
}

/// Book with its copies, ordered by due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub book: Book,
    pub copies: Vec<BookInstance>,
}

/// Author with the books that still reference them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Read-side facade over the book, copy and author repositories.
pub struct CatalogService<B, I, A>
where
    B: BookRepository,
    I: InstanceRepository,
    A: AuthorRepository,
{
    books: B,
    instances: I,
    authors: A,
}

impl<B, I, A> CatalogService<B, I, A>
where
    B: BookRepository,
    I: InstanceRepository,
    A: AuthorRepository,
{
    pub fn new(books: B, instances: I, authors: A) -> Self {
        Self {
            books,
            instances,
            authors,
        }
    }

    pub fn summary(&self) -> RepoResult<CatalogSummary> {
        Ok(CatalogSummary {
            num_books: self.books.count_books()?,
            num_instances: self.instances.count_instances(None)?,
            num_instances_available: self
                .instances
                .count_instances(Some(LoanStatus::Available))?,
            num_authors: self.authors.count_authors()?,
        })
    }

    pub fn book_detail(&self, id: BookId) -> RepoResult<Option<BookDetail>> {
        let Some(book) = self.books.get_book(id)? else {
            return Ok(None);
        };
        let copies = self.instances.list_instances(&InstanceListQuery {
            book: Some(id),
            ..InstanceListQuery::default()
        })?;
        Ok(Some(BookDetail { book, copies }))
    }

    pub fn author_detail(&self, id: AuthorId) -> RepoResult<Option<AuthorDetail>> {
        let Some(author) = self.authors.get_author(id)? else {
            return Ok(None);
        };
        let books = self.books.list_books(&BookListQuery {
            author: Some(id),
            ..BookListQuery::default()
        })?;
        Ok(Some(AuthorDetail { author, books }))
    }
}
