//! Database models
//!
//! Row types for the legacy `quoter` table, the v2 repository tables,
//! story pointers and attachment blobs. JSON field names are part of the
//! public API.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Separator used for list-valued text columns (authors, attachments)
pub const LIST_SEPARATOR: char = ';';

/// Split a `;`-joined column into its non-blank entries
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Join entries back into a `;`-joined column value
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

/// Legacy (v1) quote row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub adder: String,
    pub author: String,
    pub quote: String,
    pub edited_by: Option<String>,
    pub edited_at: Option<i64>,
}

impl Quote {
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            adder: row.try_get("adder")?,
            author: row.try_get("author")?,
            quote: row.try_get("quote")?,
            edited_by: row.try_get("edited_by")?,
            edited_at: row.try_get("edited_at")?,
        })
    }
}

/// How a v2 quote's content is meant to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Text,
    Dialog,
}

impl DisplayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayType::Text => "text",
            DisplayType::Dialog => "dialog",
        }
    }

    /// Multi-line content reads as a dialog
    pub fn infer(content: &str) -> Self {
        if content.trim_end().lines().count() > 1 {
            DisplayType::Dialog
        } else {
            DisplayType::Text
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(DisplayType::Text),
            "dialog" => Ok(DisplayType::Dialog),
            other => Err(Error::InvalidInput(format!(
                "dtype must be 'text' or 'dialog', got '{}'",
                other
            ))),
        }
    }
}

/// v2 quote row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteV2 {
    pub id: i64,
    pub adder: String,
    pub authors: Vec<String>,
    pub dtype: DisplayType,
    pub content: String,
    /// Creation time, Unix epoch milliseconds
    pub date: i64,
    pub edited_by: Option<String>,
    pub edited_at: Option<i64>,
    pub previous_content: Option<String>,
    pub attachments: Vec<String>,
    pub is_old: bool,
}

impl QuoteV2 {
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let authors: String = row.try_get("authors")?;
        let attachments: String = row.try_get("attachments")?;
        let dtype: String = row.try_get("dtype")?;

        Ok(Self {
            id: row.try_get("id")?,
            adder: row.try_get("adder")?,
            authors: split_list(&authors),
            // Rows are only written through validated inserts
            dtype: dtype.parse().unwrap_or_default(),
            content: row.try_get("content")?,
            date: row.try_get("date")?,
            edited_by: row.try_get("edited_by")?,
            edited_at: row.try_get("edited_at")?,
            previous_content: row.try_get("previous_content")?,
            attachments: split_list(&attachments),
            is_old: row.try_get("is_old")?,
        })
    }

    /// View a legacy quote through the v2 shape
    pub fn from_legacy(quote: Quote) -> Self {
        Self {
            id: quote.id,
            adder: quote.adder,
            authors: vec![quote.author],
            dtype: DisplayType::infer(&quote.quote),
            content: quote.quote,
            date: 0,
            edited_by: quote.edited_by,
            edited_at: quote.edited_at,
            previous_content: None,
            attachments: Vec::new(),
            is_old: true,
        }
    }
}

/// Per-user story pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPointer {
    pub username: String,
    #[serde(rename = "storyId")]
    pub story_id: i64,
}

/// Stored attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentBlob {
    pub id: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
