//! Borrower identity and permission declaration storage.
//!
//! # Responsibility
//! - Mirror the opaque user identities the access-control collaborator owns,
//!   so copies can reference them.
//! - Expose the permission rows declared by catalog migrations.
//!
//! # Invariants
//! - Removing an identity clears `book_instances.borrower_id`; copies survive.
//! - Identity ids are supplied by the collaborator, never generated here.

use crate::model::book_instance::BorrowerId;
use crate::model::permission::{parse_permission, CatalogPermission};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for external borrower identities.
pub trait IdentityRepository {
    /// Registers an identity, or renames it when the id already exists.
    fn register_borrower(&self, id: BorrowerId, username: &str) -> RepoResult<()>;
    fn remove_borrower(&self, id: BorrowerId) -> RepoResult<()>;
    fn borrower_username(&self, id: BorrowerId) -> RepoResult<Option<String>>;
    fn declared_permissions(&self) -> RepoResult<Vec<CatalogPermission>>;
}

/// SQLite-backed identity repository.
pub struct SqliteIdentityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("users", &["id", "username"][..]),
                ("permissions", &["codename", "name", "model"][..]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl IdentityRepository for SqliteIdentityRepository<'_> {
    fn register_borrower(&self, id: BorrowerId, username: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2)
             ON CONFLICT (id) DO UPDATE SET username = excluded.username;",
            params![id, username],
        )?;
        Ok(())
    }

    fn remove_borrower(&self, id: BorrowerId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }

    fn borrower_username(&self, id: BorrowerId) -> RepoResult<Option<String>> {
        let username = self
            .conn
            .query_row("SELECT username FROM users WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(username)
    }

    fn declared_permissions(&self) -> RepoResult<Vec<CatalogPermission>> {
        let mut stmt = self
            .conn
            .prepare("SELECT codename FROM permissions ORDER BY codename ASC;")?;
        let mut rows = stmt.query([])?;
        let mut permissions = Vec::new();
        while let Some(row) = rows.next()? {
            let codename: String = row.get(0)?;
            let permission = parse_permission(&codename).map_err(|err| {
                RepoError::InvalidData(format!("{err} in permissions.codename"))
            })?;
            permissions.push(permission);
        }
        Ok(permissions)
    }
}
