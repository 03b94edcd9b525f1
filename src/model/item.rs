use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

/// Column names of a persisted item record, in order
pub const RECORD_HEADER: [&str; 16] = [
    "sequence",
    "item_id",
    "account_id",
    "account_handle",
    "text",
    "created_at",
    "repost_count",
    "favorite_count",
    "view_count",
    "in_reply_to",
    "media",
    "reply_count",
    "bookmark_count",
    "location",
    "hashtags",
    "urls",
];

/// Separator used when a list-valued field is flattened into one column
pub const LIST_SEPARATOR: &str = " ";

/// The account an item belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,
}

/// One collected item
///
/// Only `id` is guaranteed to be present. Everything else mirrors whatever
/// the remote source chose to include and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub account: Account,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub repost_count: Option<u64>,

    #[serde(default)]
    pub favorite_count: Option<u64>,

    #[serde(default)]
    pub view_count: Option<u64>,

    #[serde(default)]
    pub in_reply_to: Option<String>,

    /// Media references, in the order the source listed them
    #[serde(default)]
    pub media: Vec<String>,

    #[serde(default)]
    pub reply_count: Option<u64>,

    #[serde(default)]
    pub bookmark_count: Option<u64>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub hashtags: Vec<String>,

    #[serde(default)]
    pub urls: Vec<String>,
}

impl Item {
    /// Creates an item carrying only its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Flattens the item into a record matching [`RECORD_HEADER`]
    ///
    /// Absent values become empty strings and lists are joined with
    /// [`LIST_SEPARATOR`].
    pub fn to_record(&self, sequence: u64) -> Vec<String> {
        vec![
            sequence.to_string(),
            self.id.clone(),
            text_field(&self.account.id),
            text_field(&self.account.handle),
            text_field(&self.text),
            self.created_at
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            count_field(self.repost_count),
            count_field(self.favorite_count),
            count_field(self.view_count),
            text_field(&self.in_reply_to),
            self.media.join(LIST_SEPARATOR),
            count_field(self.reply_count),
            count_field(self.bookmark_count),
            text_field(&self.location),
            self.hashtags.join(LIST_SEPARATOR),
            self.urls.join(LIST_SEPARATOR),
        ]
    }
}

fn text_field(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn count_field(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
