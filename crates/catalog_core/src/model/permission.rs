//! Permission declarations published for the access-control collaborator.
//!
//! The catalog only declares these; checking them belongs to the caller.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declared catalog permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogPermission {
    CanMarkReturned,
}

impl CatalogPermission {
    pub const ALL: [CatalogPermission; 1] = [CatalogPermission::CanMarkReturned];

    /// Stable codename registered with the access-control collaborator.
    pub fn codename(self) -> &'static str {
        match self {
            Self::CanMarkReturned => PERMISSION_CAN_MARK_RETURNED,
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::CanMarkReturned => "Set book as returned",
        }
    }

    /// Record type the permission is declared on.
    pub fn model(self) -> &'static str {
        match self {
            Self::CanMarkReturned => "book_instance",
        }
    }
}

impl Display for CatalogPermission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codename())
    }
}

pub const PERMISSION_CAN_MARK_RETURNED: &str = "can_mark_returned";

/// Parses one permission from its codename.
pub fn parse_permission(value: &str) -> Result<CatalogPermission, PermissionError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(PermissionError::EmptyCodename);
    }

    match normalized {
        PERMISSION_CAN_MARK_RETURNED => Ok(CatalogPermission::CanMarkReturned),
        other => Err(PermissionError::UnknownCodename(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    EmptyCodename,
    UnknownCodename(String),
}

impl Display for PermissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCodename => write!(f, "permission codename must not be empty"),
            Self::UnknownCodename(value) => write!(f, "unknown permission codename: {value}"),
        }
    }
}

impl Error for PermissionError {}
