//! Catalog domain model.
//!
//! # Responsibility
//! - Define the record shapes for genres, languages, authors, books and
//!   loanable book copies.
//! - Provide the derived display values (`display_genre`, `is_overdue`).
//!
//! # Invariants
//! - Integer ids are assigned by storage; copy ids are random UUIDs assigned
//!   once at construction.
//! - References between records are optional and cleared on delete.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod label;
pub mod permission;
pub mod validation;
