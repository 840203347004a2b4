//! Genre and language repositories.
//!
//! # Invariants
//! - Listings are ordered `name ASC, id ASC`.
//! - Deleting a genre drops its book links; deleting a language clears
//!   `books.language_id`.

use crate::model::label::{
    validate_genre_name, validate_language_name, Genre, GenreId, Language, LanguageId,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for genre labels.
pub trait GenreRepository {
    fn create_genre(&self, name: &str) -> RepoResult<Genre>;
    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>>;
    fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    fn rename_genre(&self, id: GenreId, name: &str) -> RepoResult<()>;
    fn delete_genre(&self, id: GenreId) -> RepoResult<()>;
}

/// Repository interface for language labels.
pub trait LanguageRepository {
    fn create_language(&self, name: &str) -> RepoResult<Language>;
    fn get_language(&self, id: LanguageId) -> RepoResult<Option<Language>>;
    fn list_languages(&self) -> RepoResult<Vec<Language>>;
    fn rename_language(&self, id: LanguageId, name: &str) -> RepoResult<()>;
    fn delete_language(&self, id: LanguageId) -> RepoResult<()>;
}

/// SQLite-backed genre and language repository.
pub struct SqliteLabelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLabelRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("genres", &["id", "name"][..]),
                ("languages", &["id", "name"][..]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl GenreRepository for SqliteLabelRepository<'_> {
    fn create_genre(&self, name: &str) -> RepoResult<Genre> {
        validate_genre_name(name)?;
        let id = insert_label(self.conn, "genres", name)?;
        Ok(Genre {
            id,
            name: name.to_string(),
        })
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        load_label(self.conn, "genres", id)?
            .map(|(id, name)| -> RepoResult<Genre> {
                let genre = Genre { id, name };
                genre.validate()?;
                Ok(genre)
            })
            .transpose()
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        list_labels(self.conn, "genres")?
            .into_iter()
            .map(|(id, name)| -> RepoResult<Genre> {
                let genre = Genre { id, name };
                genre.validate()?;
                Ok(genre)
            })
            .collect()
    }

    fn rename_genre(&self, id: GenreId, name: &str) -> RepoResult<()> {
        validate_genre_name(name)?;
        rename_label(self.conn, "genres", "genre", id, name)
    }

    fn delete_genre(&self, id: GenreId) -> RepoResult<()> {
        delete_label(self.conn, "genres", "genre", id)
    }
}

impl LanguageRepository for SqliteLabelRepository<'_> {
    fn create_language(&self, name: &str) -> RepoResult<Language> {
        validate_language_name(name)?;
        let id = insert_label(self.conn, "languages", name)?;
        Ok(Language {
            id,
            name: name.to_string(),
        })
    }

    fn get_language(&self, id: LanguageId) -> RepoResult<Option<Language>> {
        load_label(self.conn, "languages", id)?
            .map(|(id, name)| -> RepoResult<Language> {
                let language = Language { id, name };
                language.validate()?;
                Ok(language)
            })
            .transpose()
    }

    fn list_languages(&self) -> RepoResult<Vec<Language>> {
        list_labels(self.conn, "languages")?
            .into_iter()
            .map(|(id, name)| -> RepoResult<Language> {
                let language = Language { id, name };
                language.validate()?;
                Ok(language)
            })
            .collect()
    }

    fn rename_language(&self, id: LanguageId, name: &str) -> RepoResult<()> {
        validate_language_name(name)?;
        rename_label(self.conn, "languages", "language", id, name)
    }

    fn delete_language(&self, id: LanguageId) -> RepoResult<()> {
        delete_label(self.conn, "languages", "language", id)
    }
}

fn insert_label(conn: &Connection, table: &'static str, name: &str) -> RepoResult<i64> {
    conn.execute(&format!("INSERT INTO {table} (name) VALUES (?1);"), [name])?;
    Ok(conn.last_insert_rowid())
}

fn load_label(
    conn: &Connection,
    table: &'static str,
    id: i64,
) -> RepoResult<Option<(i64, String)>> {
    let label = conn
        .query_row(
            &format!("SELECT id, name FROM {table} WHERE id = ?1;"),
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(label)
}

fn list_labels(conn: &Connection, table: &'static str) -> RepoResult<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name FROM {table} ORDER BY name ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut labels = Vec::new();
    while let Some(row) = rows.next()? {
        labels.push((row.get(0)?, row.get(1)?));
    }
    Ok(labels)
}

fn rename_label(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
    name: &str,
) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("UPDATE {table} SET name = ?2 WHERE id = ?1;"),
        params![id, name],
    )?;
    if changed == 0 {
        return Err(RepoError::not_found(entity, id));
    }
    Ok(())
}

fn delete_label(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> RepoResult<()> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
    if changed == 0 {
        return Err(RepoError::not_found(entity, id));
    }
    Ok(())
}
