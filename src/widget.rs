//! The catalog widget state machine.
//!
//! A `CatalogWidget` owns its resolved mount, the loaded item list and the
//! active category. It starts out showing the loading placeholder, moves to
//! `Ready` (rendered under the "all" filter) or `Unavailable` after the one
//! load attempt, and from `Ready` re-renders on every pill click without
//! touching the network again.

use crate::catalog::{CatalogItem, CategoryFilter};
use crate::config::WidgetConfig;
use crate::loader::{Fetcher, LoadError, LoadOutcome, load_catalog};
use crate::mount::{Clock, Mount, MountError, PageSource, Pill, resolve_mount, wait_for_mount};
use crate::render::{LOADING_HTML, RenderOptions, UNAVAILABLE_HTML, render_view};
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    Loading,
    Ready,
    Unavailable,
}

#[derive(Clone, Debug, Serialize)]
/// Everything the page currently shows for this widget.
pub struct WidgetSnapshot {
    pub state: WidgetState,
    pub active: CategoryFilter,
    pub grid_html: String,
    pub footer_text: String,
    pub pills: Vec<Pill>,
}

pub struct CatalogWidget {
    data_url: String,
    options: RenderOptions,
    mount: Mount,
    items: Vec<CatalogItem>,
    active: CategoryFilter,
    state: WidgetState,
}

impl CatalogWidget {
    /// Attach to an already resolved mount and show the loading placeholder.
    pub fn attach(mut mount: Mount, config: &WidgetConfig) -> Self {
        mount.grid_html = LOADING_HTML.to_string();
        mount.footer_text.clear();
        Self {
            data_url: config.data_url.clone(),
            options: config.render_options(),
            mount,
            items: Vec::new(),
            active: CategoryFilter::All,
            state: WidgetState::Loading,
        }
    }

    /// Resolve the mount from `source`, waiting if the config asks for it.
    pub fn mount(
        source: &mut dyn PageSource,
        config: &WidgetConfig,
        clock: &mut dyn Clock,
    ) -> Result<Self, MountError> {
        let mount = match &config.wait {
            Some(policy) => wait_for_mount(source, &config.ids, policy, clock)?,
            None => resolve_mount(source, &config.ids)?,
        };
        debug!(pills = mount.pills.len(), "widget mounted");
        Ok(Self::attach(mount, config))
    }

    /// Run the single load attempt.
    ///
    /// On success the widget renders under the "all" filter. On failure the
    /// grid shows the unavailable placeholder and pills stay inert. Later
    /// calls never refetch: a ready widget reports its item count again and
    /// an unavailable one reports `LoadError::AlreadyFailed`.
    pub fn load(&mut self, fetcher: &dyn Fetcher, millis: i64) -> Result<usize, LoadError> {
        match self.state {
            WidgetState::Ready => return Ok(self.items.len()),
            WidgetState::Unavailable => return Err(LoadError::AlreadyFailed),
            WidgetState::Loading => {}
        }
        match load_catalog(fetcher, &self.data_url, millis) {
            LoadOutcome::Loaded(document) => {
                self.items = document.items;
                self.state = WidgetState::Ready;
                self.apply_filter(CategoryFilter::All);
                Ok(self.items.len())
            }
            LoadOutcome::Failed(err) => {
                self.state = WidgetState::Unavailable;
                self.mount.grid_html = UNAVAILABLE_HTML.to_string();
                self.mount.footer_text.clear();
                Err(err)
            }
        }
    }

    /// Switch to the category carried by a pill tag.
    ///
    /// Returns `false` without changing anything unless the widget is ready.
    pub fn select(&mut self, tag: &str) -> bool {
        if self.state != WidgetState::Ready {
            return false;
        }
        self.apply_filter(CategoryFilter::from_tag(tag));
        true
    }

    /// Click the pill at `index` in document order.
    pub fn click_pill(&mut self, index: usize) -> bool {
        let Some(tag) = self.mount.pills.get(index).map(|pill| pill.category.clone()) else {
            return false;
        };
        self.select(&tag)
    }

    fn apply_filter(&mut self, filter: CategoryFilter) {
        self.mount.set_active_pill(filter.as_tag());
        let rendered = render_view(&self.items, &filter, &self.options);
        debug!(filter = %filter, count = rendered.count, "rendered catalog");
        self.mount.grid_html = rendered.grid_html;
        self.mount.footer_text = rendered.footer_text;
        self.active = filter;
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn active(&self) -> &CategoryFilter {
        &self.active
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn grid_html(&self) -> &str {
        &self.mount.grid_html
    }

    pub fn footer_text(&self) -> &str {
        &self.mount.footer_text
    }

    pub fn pills(&self) -> &[Pill] {
        &self.mount.pills
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            state: self.state,
            active: self.active.clone(),
            grid_html: self.mount.grid_html.clone(),
            footer_text: self.mount.footer_text.clone(),
            pills: self.mount.pills.clone(),
        }
    }
}
