//! Shared library for the catalog widget.
//!
//! The crate fetches a JSON catalog of services, orders and filters it, and
//! renders escaped HTML cards into a mount point supplied by the host page.
//! Public items here form the contract the `catalog-widget` binary and the
//! integration suite depend on: mount resolution, the single catalog load,
//! the sort/filter view and the widget state machine.
//!
//! Every failure the page could observe (missing mount, mount timeout, failed
//! load) is returned as a value. The library itself only emits `tracing`
//! events and never panics or prints.

pub mod catalog;
pub mod config;
pub mod links;
pub mod loader;
pub mod mount;
pub mod render;
pub mod widget;

pub use catalog::{
    ALL_CATEGORIES_TAG, CatalogDocument, CatalogItem, CategoryFilter, MISSING_ORDER,
    filter_items, sort_items, view,
};
pub use config::{WidgetConfig, WidgetVariant};
pub use links::{LinkPolicy, opens_new_tab};
pub use loader::{
    FileFetcher, Fetcher, HttpResponse, LoadError, LoadOutcome, MinreqFetcher, cache_busted_url,
    load_catalog, now_millis,
};
pub use mount::{
    Clock, FilePage, HostPage, Mount, MountError, MountIds, PageSource, Pill, StaticPage,
    SystemClock, WaitPolicy, default_host_markup, resolve_mount, wait_for_mount,
};
pub use render::{
    EMPTY_HTML, LOADING_HTML, RenderOptions, RenderedView, UNAVAILABLE_HTML, escape_html,
    footer_text, render_card, render_view,
};
pub use widget::{CatalogWidget, WidgetSnapshot, WidgetState};

