//! Author repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `last_name ASC, id ASC`.
//! - Deleting an author keeps their books and clears `books.author_id`.

use crate::model::author::{Author, AuthorDraft, AuthorId};
use crate::repo::{ensure_connection_ready, ListPage, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    date_of_birth,
    date_of_death
FROM authors";

/// Repository interface for author records.
pub trait AuthorRepository {
    fn create_author(&self, draft: &AuthorDraft) -> RepoResult<Author>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
    fn list_authors(&self, page: &ListPage) -> RepoResult<Vec<Author>>;
    fn count_authors(&self) -> RepoResult<u64>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "authors",
                &[
                    "id",
                    "first_name",
                    "last_name",
                    "date_of_birth",
                    "date_of_death",
                ][..],
            )],
        )?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, draft: &AuthorDraft) -> RepoResult<Author> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO authors (
                first_name,
                last_name,
                date_of_birth,
                date_of_death
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.date_of_birth,
                draft.date_of_death,
            ],
        )?;

        Ok(Author::from_draft(
            self.conn.last_insert_rowid(),
            draft.clone(),
        ))
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        author.validate()?;

        let changed = self.conn.execute(
            "UPDATE authors
             SET
                first_name = ?1,
                last_name = ?2,
                date_of_birth = ?3,
                date_of_death = ?4
             WHERE id = ?5;",
            params![
                author.first_name.as_str(),
                author.last_name.as_str(),
                author.date_of_birth,
                author.date_of_death,
                author.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("author", author.id));
        }
        Ok(())
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("author", id));
        }
        Ok(())
    }

    fn list_authors(&self, page: &ListPage) -> RepoResult<Vec<Author>> {
        let mut sql = format!("{AUTHOR_SELECT_SQL} ORDER BY last_name ASC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn count_authors(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let author = Author {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        date_of_birth: row.get("date_of_birth")?,
        date_of_death: row.get("date_of_death")?,
    };
    author.validate()?;
    Ok(author)
}
