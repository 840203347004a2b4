//! Smoke probe for `catalog_core` linkage.
//!
//! Opens a throwaway in-memory catalog and prints its schema and counts.

use catalog_core::db::migrations::latest_version;
use catalog_core::db::open_db_in_memory;
use catalog_core::{
    CatalogService, SqliteAuthorRepository, SqliteBookRepository, SqliteInstanceRepository,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let service = CatalogService::new(
        SqliteBookRepository::try_new(&conn)?,
        SqliteInstanceRepository::try_new(&conn)?,
        SqliteAuthorRepository::try_new(&conn)?,
    );
    let summary = service.summary()?;

    println!("catalog_core version={}", catalog_core::core_version());
    println!("catalog_core schema_version={}", latest_version());
    println!(
        "catalog_core books={} instances={} available={} authors={}",
        summary.num_books,
        summary.num_instances,
        summary.num_instances_available,
        summary.num_authors
    );
    Ok(())
}
