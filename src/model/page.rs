use crate::model::Item;
use serde::Deserialize;
use std::fmt;

/// Identifier of a resolved remote account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque continuation token handed back by the remote source
///
/// The collector never looks inside a cursor; it only passes it back to ask
/// for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One batch of items plus the token for the next batch
///
/// A missing `next_cursor` is the terminal marker: no more pages follow.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn new(items: Vec<Item>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// A page with no items and no continuation
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page ends the sequence
    pub fn is_terminal(&self) -> bool {
        self.next_cursor.is_none()
    }
}
