//! Data model shared by the remote source, the collector, and the sinks
//!
//! # Components
//!
//! - `Item`: one collected record and its flattened row form
//! - `Page`: a batch of items plus an optional continuation `Cursor`
//! - `AccountId`: the resolved identifier of the target account

mod item;
mod page;

pub use item::{Account, Item, LIST_SEPARATOR, RECORD_HEADER};
pub use page::{AccountId, Cursor, Page};
