//! Named-route reversal used to build detail-view locations.
//!
//! # Responsibility
//! - Define the `UrlResolver` seam consumed by `Author`/`Book` URL helpers.
//! - Provide `RouteTable`, a pattern-based resolver with catalog defaults.
//!
//! # Invariants
//! - Patterns are absolute paths; placeholders are written `<name>`.
//! - Arguments fill placeholders positionally and must be one path segment.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const AUTHOR_DETAIL_ROUTE: &str = "author-detail";
pub const BOOK_DETAIL_ROUTE: &str = "book-detail";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-z_][a-z0-9_]*)>").expect("valid placeholder regex"));

/// Maps a named route plus arguments to a path string.
pub trait UrlResolver {
    fn reverse(&self, route: &str, args: &[&str]) -> Result<String, UrlError>;
}

/// Route reversal errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    UnknownRoute(String),
    ArgumentCount {
        route: String,
        expected: usize,
        actual: usize,
    },
    InvalidArgument {
        route: String,
        value: String,
    },
    InvalidPattern(String),
}

impl Display for UrlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoute(route) => write!(f, "no route named `{route}`"),
            Self::ArgumentCount {
                route,
                expected,
                actual,
            } => write!(
                f,
                "route `{route}` takes {expected} argument(s), got {actual}"
            ),
            Self::InvalidArgument { route, value } => {
                write!(f, "argument `{value}` is not a valid path segment for route `{route}`")
            }
            Self::InvalidPattern(pattern) => {
                write!(f, "route pattern must be an absolute path: `{pattern}`")
            }
        }
    }
}

impl Error for UrlError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoutePattern {
    template: String,
    params: Vec<String>,
}

/// In-process route registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<String, RoutePattern>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the catalog detail routes mounted under `/catalog`.
    pub fn catalog_defaults() -> Self {
        let mut table = Self::new();
        table.routes.insert(
            AUTHOR_DETAIL_ROUTE.to_string(),
            parse_pattern("/catalog/author/<id>"),
        );
        table.routes.insert(
            BOOK_DETAIL_ROUTE.to_string(),
            parse_pattern("/catalog/book/<id>"),
        );
        table
    }

    /// Registers or replaces one named route.
    pub fn register(&mut self, name: impl Into<String>, pattern: &str) -> Result<(), UrlError> {
        if !pattern.starts_with('/') {
            return Err(UrlError::InvalidPattern(pattern.to_string()));
        }
        self.routes.insert(name.into(), parse_pattern(pattern));
        Ok(())
    }

    /// Returns whether a route with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }
}

impl UrlResolver for RouteTable {
    fn reverse(&self, route: &str, args: &[&str]) -> Result<String, UrlError> {
        let pattern = self
            .routes
            .get(route)
            .ok_or_else(|| UrlError::UnknownRoute(route.to_string()))?;

        if pattern.params.len() != args.len() {
            return Err(UrlError::ArgumentCount {
                route: route.to_string(),
                expected: pattern.params.len(),
                actual: args.len(),
            });
        }

        if let Some(bad) = args
            .iter()
            .find(|value| value.is_empty() || value.contains(['/', '?', '#']))
        {
            return Err(UrlError::InvalidArgument {
                route: route.to_string(),
                value: (*bad).to_string(),
            });
        }

        let mut remaining = args.iter();
        let path = PLACEHOLDER_RE.replace_all(&pattern.template, |_: &regex::Captures<'_>| {
            remaining.next().copied().unwrap_or_default().to_string()
        });
        Ok(path.into_owned())
    }
}

fn parse_pattern(template: &str) -> RoutePattern {
    let params = PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect();
    RoutePattern {
        template: template.to_string(),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteTable, UrlError, UrlResolver, AUTHOR_DETAIL_ROUTE, BOOK_DETAIL_ROUTE};

    #[test]
    fn defaults_reverse_detail_routes() {
        let table = RouteTable::catalog_defaults();
        assert_eq!(
            table.reverse(AUTHOR_DETAIL_ROUTE, &["7"]).unwrap(),
            "/catalog/author/7"
        );
        assert_eq!(
            table.reverse(BOOK_DETAIL_ROUTE, &["12"]).unwrap(),
            "/catalog/book/12"
        );
    }

    #[test]
    fn unknown_route_is_rejected() {
        let table = RouteTable::new();
        assert_eq!(
            table.reverse("book-detail", &["1"]).unwrap_err(),
            UrlError::UnknownRoute("book-detail".to_string())
        );
    }

    #[test]
    fn argument_count_must_match_placeholders() {
        let table = RouteTable::catalog_defaults();
        let err = table.reverse(BOOK_DETAIL_ROUTE, &[]).unwrap_err();
        assert_eq!(
            err,
            UrlError::ArgumentCount {
                route: BOOK_DETAIL_ROUTE.to_string(),
                expected: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn multi_segment_argument_is_rejected() {
        let table = RouteTable::catalog_defaults();
        let err = table.reverse(BOOK_DETAIL_ROUTE, &["1/edit"]).unwrap_err();
        assert!(matches!(err, UrlError::InvalidArgument { .. }));
    }

    #[test]
    fn register_supports_multiple_placeholders_in_order() {
        let mut table = RouteTable::new();
        table
            .register("book-copy", "/library/<book>/copies/<copy>/")
            .unwrap();
        assert!(table.contains("book-copy"));
        assert_eq!(
            table.reverse("book-copy", &["4", "abc"]).unwrap(),
            "/library/4/copies/abc/"
        );
    }

    #[test]
    fn register_rejects_relative_pattern() {
        let mut table = RouteTable::new();
        let err = table.register("bad", "catalog/<id>").unwrap_err();
        assert_eq!(err, UrlError::InvalidPattern("catalog/<id>".to_string()));
    }
}
