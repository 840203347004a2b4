//! Data layer for a library catalog: genres, languages, authors, books and
//! loanable book copies, persisted in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod urls;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::author::{Author, AuthorDraft, AuthorId};
pub use model::book::{display_genre, Book, BookDraft, BookId};
pub use model::book_instance::{BookInstance, BookInstanceId, BookRef, BorrowerId, LoanStatus};
pub use model::label::{Genre, GenreId, Language, LanguageId};
pub use model::permission::{parse_permission, CatalogPermission, PermissionError};
pub use model::validation::CatalogValidationError;
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::identity_repo::{IdentityRepository, SqliteIdentityRepository};
pub use repo::instance_repo::{InstanceListQuery, InstanceRepository, SqliteInstanceRepository};
pub use repo::label_repo::{GenreRepository, LanguageRepository, SqliteLabelRepository};
pub use repo::{ListPage, RepoError, RepoResult};
pub use service::catalog_service::{AuthorDetail, BookDetail, CatalogService, CatalogSummary};
pub use service::loan_service::{LoanService, LoanServiceError};
pub use urls::{RouteTable, UrlError, UrlResolver};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
