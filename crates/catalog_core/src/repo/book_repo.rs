//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist books together with their genre set.
//! - Resolve genres in association order for display.
//!
//! # Invariants
//! - Create/update write the book row and its genre links in one transaction.
//! - Update replaces the whole genre set.
//! - Listing order is `title ASC, id ASC`.
//! - Deleting a book keeps its copies and clears `book_instances.book_id`.

use crate::model::author::AuthorId;
use crate::model::book::{display_genre, Book, BookDraft, BookId, DISPLAY_GENRE_LIMIT};
use crate::model::label::{Genre, GenreId};
use crate::repo::{ensure_connection_ready, row_exists, ListPage, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author_id,
    summary,
    isbn,
    language_id
FROM books";

/// Query options for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    pub author: Option<AuthorId>,
    pub page: ListPage,
}

/// Repository interface for book records.
pub trait BookRepository {
    fn create_book(&self, draft: &BookDraft) -> RepoResult<Book>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn update_book(&self, id: BookId, draft: &BookDraft) -> RepoResult<Book>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    fn count_books(&self) -> RepoResult<u64>;
    /// Genre summary computed in SQL without loading the whole book.
    fn display_genre(&self, id: BookId) -> RepoResult<String>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                (
                    "books",
                    &["id", "title", "author_id", "summary", "isbn", "language_id"][..],
                ),
                ("book_genres", &["id", "book_id", "genre_id"][..]),
                ("genres", &["id", "name"][..]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, draft: &BookDraft) -> RepoResult<Book> {
        draft.validate()?;
        ensure_references_exist(self.conn, draft)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO books (
                title,
                author_id,
                summary,
                isbn,
                language_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.title.as_str(),
                draft.author,
                draft.summary.as_str(),
                draft.isbn.as_str(),
                draft.language,
            ],
        )?;
        let id = tx.last_insert_rowid();
        link_genres(&tx, id, &draft.genres)?;
        tx.commit()?;

        load_required_book(self.conn, id)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn update_book(&self, id: BookId, draft: &BookDraft) -> RepoResult<Book> {
        draft.validate()?;
        ensure_references_exist(self.conn, draft)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE books
             SET
                title = ?1,
                author_id = ?2,
                summary = ?3,
                isbn = ?4,
                language_id = ?5
             WHERE id = ?6;",
            params![
                draft.title.as_str(),
                draft.author,
                draft.summary.as_str(),
                draft.isbn.as_str(),
                draft.language,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("book", id));
        }

        tx.execute("DELETE FROM book_genres WHERE book_id = ?1;", [id])?;
        link_genres(&tx, id, &draft.genres)?;
        tx.commit()?;

        load_required_book(self.conn, id)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("book", id));
        }
        Ok(())
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(author) = query.author {
            sql.push_str(" AND author_id = ?");
            bind_values.push(Value::Integer(author));
        }

        sql.push_str(" ORDER BY title ASC, id ASC");
        query.page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(self.conn, row)?);
        }
        Ok(books)
    }

    fn count_books(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn display_genre(&self, id: BookId) -> RepoResult<String> {
        if !row_exists(self.conn, "books", id)? {
            return Err(RepoError::not_found("book", id));
        }

        let mut stmt = self.conn.prepare(
            "SELECT g.name
             FROM book_genres bg
             INNER JOIN genres g ON g.id = bg.genre_id
             WHERE bg.book_id = ?1
             ORDER BY bg.id ASC
             LIMIT ?2;",
        )?;
        let limit = i64::try_from(DISPLAY_GENRE_LIMIT).unwrap_or(i64::MAX);
        let mut rows = stmt.query(params![id, limit])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get::<_, String>(0)?);
        }
        Ok(display_genre(names.iter().map(String::as_str)))
    }
}

fn load_required_book(conn: &Connection, id: BookId) -> RepoResult<Book> {
    let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_book_row(conn, row);
    }
    Err(RepoError::not_found("book", id))
}

fn parse_book_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    let book = Book {
        id,
        title: row.get("title")?,
        summary: row.get("summary")?,
        isbn: row.get("isbn")?,
        author: row.get("author_id")?,
        language: row.get("language_id")?,
        genres: load_genres_for_book(conn, id)?,
    };
    book.validate()?;
    Ok(book)
}

fn load_genres_for_book(conn: &Connection, book_id: BookId) -> RepoResult<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM book_genres bg
         INNER JOIN genres g ON g.id = bg.genre_id
         WHERE bg.book_id = ?1
         ORDER BY bg.id ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(genres)
}

fn link_genres(tx: &Transaction<'_>, book_id: BookId, genres: &[GenreId]) -> RepoResult<()> {
    for genre_id in genres {
        tx.execute(
            "INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?1, ?2);",
            params![book_id, genre_id],
        )?;
    }
    Ok(())
}

fn ensure_references_exist(conn: &Connection, draft: &BookDraft) -> RepoResult<()> {
    if let Some(author) = draft.author {
        if !row_exists(conn, "authors", author)? {
            return Err(RepoError::missing_reference("author", author));
        }
    }
    if let Some(language) = draft.language {
        if !row_exists(conn, "languages", language)? {
            return Err(RepoError::missing_reference("language", language));
        }
    }
    for genre in &draft.genres {
        if !row_exists(conn, "genres", *genre)? {
            return Err(RepoError::missing_reference("genre", genre));
        }
    }
    Ok(())
}
