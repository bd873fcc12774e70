//! voltdesk core types: record identity, field access, snapshots, mutations.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod columns;
pub mod entities;

pub mod prelude {
    pub use super::{Entity, FieldValue, Mutation, Record, Snapshot, Uid};
}

/// Stable record identifier. Rendered and parsed as a UUID string in JSON
/// and URLs; nil means "not assigned yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid([u8; 16]);

impl Uid {
    pub fn new() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    pub const fn nil() -> Self {
        Self([0u8; 16])
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 16]
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_bytes(self.0).hyphenated())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid uid: {0}")]
pub struct ParseUidError(String);

impl FromStr for Uid {
    type Err = ParseUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let u = uuid::Uuid::parse_str(s).map_err(|_| ParseUidError(s.to_string()))?;
        Ok(Self(*u.as_bytes()))
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single named field of a record, borrowed for the duration of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Num(f64),
    Date(NaiveDate),
}

impl FieldValue<'_> {
    /// Equality against a literal from a filter: case-insensitive for
    /// strings, parsed f64 for numbers, ISO-8601 for dates.
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Self::Str(s) => s.eq_ignore_ascii_case(literal),
            Self::Num(n) => literal.parse::<f64>().map(|x| x == *n).unwrap_or(false),
            Self::Date(d) => literal.parse::<NaiveDate>().map(|x| x == *d).unwrap_or(false),
        }
    }

    /// Substring matching for free-text search. Only string fields
    /// participate; `needle_lower` must already be lowercased.
    pub fn contains_text(&self, needle_lower: &str) -> bool {
        match self {
            Self::Str(s) => s.to_ascii_lowercase().contains(needle_lower),
            _ => false,
        }
    }

    /// Render for table output.
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => (*s).to_string(),
            Self::Num(n) => n.to_string(),
            Self::Date(d) => d.to_string(),
        }
    }
}

/// Anything that can appear in a list screen: a stable uid plus named
/// fields of primitive type.
pub trait Record {
    fn uid(&self) -> Uid;
    /// Look up a field by name; `None` for unknown names and unset
    /// optional fields.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A concrete record kind served by the API and CLI.
pub trait Entity: Record + Clone + Send + Sync + 'static {
    /// URL segment and CLI name, e.g. `"vendors"`.
    const KIND: &'static str;

    /// Fields searched when the caller does not name any.
    fn search_fields() -> &'static [&'static str];

    fn set_uid(&mut self, uid: Uid);
}

/// The full ordered record set at a moment. Never mutated in place;
/// the store publishes a fresh snapshot per applied batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub epoch: u64,
    pub items: Vec<T>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { epoch: 0, items: Vec::new() }
    }
}

/// A single change to a collection.
#[derive(Debug, Clone)]
pub enum Mutation<T> {
    Upsert(T),
    Delete(Uid),
}

impl<T: Record> Mutation<T> {
    pub fn uid(&self) -> Uid {
        match self {
            Self::Upsert(rec) => rec.uid(),
            Self::Delete(uid) => *uid,
        }
    }
}
