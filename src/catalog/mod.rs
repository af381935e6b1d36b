//! Service catalog wiring.
//!
//! This module wraps the JSON document served by the catalog endpoint so the
//! widget can hold a lenient, fully defaulted item list. `order` derives the
//! filtered and sorted sequence that ends up as cards.

pub mod identity;
pub mod model;
pub mod order;

pub use identity::{ALL_CATEGORIES_TAG, CategoryFilter};
pub use model::{CatalogDocument, CatalogItem, MISSING_ORDER};
pub use order::{compare_items, compare_titles, filter_items, sort_items, view};
