//! Data model for harvested catalog items
//!
//! - `CategoryRef`: a listing page discovered from the home page
//! - `ItemSummary`: an item as listed on a category page
//! - `ItemDetail`: tags and image references from the item's detail page
//! - `ItemRecord`: the persisted union of the above plus stored image paths

mod records;
mod slug;

pub use records::{CategoryRef, DiscardReason, ItemDetail, ItemRecord, ItemSummary};
pub use slug::{image_file_name, item_slug};
