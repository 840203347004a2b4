//! Book copy repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Copy ids are never rewritten; updates address rows by id only.
//! - Listing order is `due_back ASC, id ASC`; copies without a due date
//!   sort first (SQLite null ordering).
//! - Reads join the book title so copies render without a second lookup.
//! - `due_back` is ISO `YYYY-MM-DD` text; writes keep years four-digit so
//!   text comparison matches date order.

use crate::model::book::BookId;
use crate::model::book_instance::{BookInstance, BookInstanceId, BookRef, BorrowerId, LoanStatus};
use crate::model::validation::{STORED_DATE_MAX_YEAR, STORED_DATE_MIN_YEAR};
use crate::repo::{ensure_connection_ready, row_exists, ListPage, RepoError, RepoResult};
use rusqlite::types::Value;
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const INSTANCE_SELECT_SQL: &str = "SELECT
    bi.id,
    bi.book_id,
    b.title AS book_title,
    bi.imprint,
    bi.due_back,
    bi.borrower_id,
    bi.status
FROM book_instances bi
LEFT JOIN books b ON b.id = bi.book_id";

/// Query options for listing copies.
#[derive(Debug, Clone, Default)]
pub struct InstanceListQuery {
    pub book: Option<BookId>,
    pub status: Option<LoanStatus>,
    pub borrower: Option<BorrowerId>,
    /// Only copies with a due date strictly before this day.
    pub due_before: Option<NaiveDate>,
    pub page: ListPage,
}

/// Repository interface for book copies.
pub trait InstanceRepository {
    fn create_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId>;
    fn get_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>>;
    fn update_instance(&self, instance: &BookInstance) -> RepoResult<()>;
    fn delete_instance(&self, id: BookInstanceId) -> RepoResult<()>;
    fn list_instances(&self, query: &InstanceListQuery) -> RepoResult<Vec<BookInstance>>;
    /// Counts copies, optionally restricted to one status.
    fn count_instances(&self, status: Option<LoanStatus>) -> RepoResult<u64>;
}

/// SQLite-backed copy repository.
pub struct SqliteInstanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInstanceRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                (
                    "book_instances",
                    &[
                        "id",
                        "book_id",
                        "imprint",
                        "due_back",
                        "borrower_id",
                        "status",
                    ][..],
                ),
                ("books", &["id", "title"][..]),
                ("users", &["id"][..]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl InstanceRepository for SqliteInstanceRepository<'_> {
    fn create_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId> {
        instance.validate()?;
        ensure_references_exist(self.conn, instance)?;

        self.conn.execute(
            "INSERT INTO book_instances (
                id,
                book_id,
                imprint,
                due_back,
                borrower_id,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                instance.id().to_string(),
                instance.book.as_ref().map(|book| book.id),
                instance.imprint.as_str(),
                instance.due_back,
                instance.borrower,
                instance.status.code(),
            ],
        )?;

        Ok(instance.id())
    }

    fn get_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INSTANCE_SELECT_SQL} WHERE bi.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_instance_row(row)?));
        }
        Ok(None)
    }

    fn update_instance(&self, instance: &BookInstance) -> RepoResult<()> {
        instance.validate()?;
        ensure_references_exist(self.conn, instance)?;

        let changed = self.conn.execute(
            "UPDATE book_instances
             SET
                book_id = ?1,
                imprint = ?2,
                due_back = ?3,
                borrower_id = ?4,
                status = ?5
             WHERE id = ?6;",
            params![
                instance.book.as_ref().map(|book| book.id),
                instance.imprint.as_str(),
                instance.due_back,
                instance.borrower,
                instance.status.code(),
                instance.id().to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("book instance", instance.id()));
        }
        Ok(())
    }

    fn delete_instance(&self, id: BookInstanceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM book_instances WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("book instance", id));
        }
        Ok(())
    }

    fn list_instances(&self, query: &InstanceListQuery) -> RepoResult<Vec<BookInstance>> {
        let mut sql = format!("{INSTANCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(book) = query.book {
            sql.push_str(" AND bi.book_id = ?");
            bind_values.push(Value::Integer(book));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND bi.status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }
        if let Some(borrower) = query.borrower {
            sql.push_str(" AND bi.borrower_id = ?");
            bind_values.push(Value::Integer(borrower));
        }
        if let Some(before) = query.due_before {
            push_due_before(&mut sql, &mut bind_values, before);
        }

        sql.push_str(" ORDER BY bi.due_back ASC, bi.id ASC");
        query.page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut instances = Vec::new();
        while let Some(row) = rows.next()? {
            instances.push(parse_instance_row(row)?);
        }
        Ok(instances)
    }

    fn count_instances(&self, status: Option<LoanStatus>) -> RepoResult<u64> {
        let count = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM book_instances WHERE status = ?1;",
                [status.code()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM book_instances;", [], |row| row.get(0))?,
        };
        Ok(count)
    }
}

fn push_due_before(sql: &mut String, bind_values: &mut Vec<Value>, before: NaiveDate) {
    sql.push_str(" AND bi.due_back IS NOT NULL");
    let year = before.year();
    if year < STORED_DATE_MIN_YEAR {
        sql.push_str(" AND 0");
    } else if year <= STORED_DATE_MAX_YEAR {
        sql.push_str(" AND bi.due_back < ?");
        bind_values.push(Value::Text(before.format("%Y-%m-%d").to_string()));
    }
}

fn parse_instance_row(row: &Row<'_>) -> RepoResult<BookInstance> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{id_text}` in book_instances.id"
        ))
    })?;

    let book = match row.get::<_, Option<BookId>>("book_id")? {
        Some(book_id) => Some(BookRef {
            id: book_id,
            title: row.get("book_title")?,
        }),
        None => None,
    };

    let status_text: String = row.get("status")?;
    let status = LoanStatus::from_code(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in book_instances.status"
        ))
    })?;

    let mut instance = BookInstance::with_id(id, book, row.get::<_, String>("imprint")?)?;
    instance.due_back = row.get("due_back")?;
    instance.borrower = row.get("borrower_id")?;
    instance.status = status;
    instance.validate()?;
    Ok(instance)
}

fn ensure_references_exist(conn: &Connection, instance: &BookInstance) -> RepoResult<()> {
    if let Some(book) = &instance.book {
        if !row_exists(conn, "books", book.id)? {
            return Err(RepoError::missing_reference("book", book.id));
        }
    }
    if let Some(borrower) = instance.borrower {
        if !row_exists(conn, "users", borrower)? {
            return Err(RepoError::missing_reference("user", borrower));
        }
    }
    Ok(())
}
