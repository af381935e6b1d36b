//! Mount point discovery inside the host page.
//!
//! The widget never creates its own container: the page must provide a
//! container element with a grid and a footer inside it, plus any number of
//! filter pills. `HostPage` parses the page with `scraper` and captures that
//! structure as an owned `Mount` the widget mutates afterwards.
//!
//! Page builders sometimes inject the markup after the script starts, so
//! `wait_for_mount` re-reads a `PageSource` until the container shows up or
//! the wait bound expires.

use crate::catalog::ALL_CATEGORIES_TAG;
use crate::render::escape_html;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

static ID_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[id]").expect("static selector"));
static CLASS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").expect("static selector"));

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(150);

const ACTIVE_CLASS: &str = "is-active";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Element identifiers that make up the page contract.
pub struct MountIds {
    pub container: String,
    pub grid: String,
    pub footer: String,
    pub pill_class: String,
    /// Attribute holding each pill's category tag.
    pub pill_attr: String,
}

impl Default for MountIds {
    fn default() -> Self {
        Self {
            container: "hbe-services".to_string(),
            grid: "hbeServicesGrid".to_string(),
            footer: "hbeServicesFoot".to_string(),
            pill_class: "hbe-services__pill".to_string(),
            pill_attr: "data-cat".to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MountError {
    #[error("container #{0} not found")]
    ContainerMissing(String),
    #[error("grid #{0} not found inside container")]
    GridMissing(String),
    #[error("footer #{0} not found inside container")]
    FooterMissing(String),
    #[error("container did not appear within {waited_ms}ms")]
    Timeout { waited_ms: u128 },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// A filter button and its visual/ARIA state.
pub struct Pill {
    pub category: String,
    pub label: String,
    pub is_active: bool,
    pub aria_selected: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Mutable state of the resolved mount: what the page currently shows.
pub struct Mount {
    pub grid_html: String,
    pub footer_text: String,
    pub pills: Vec<Pill>,
}

impl Mount {
    /// Reflect `category` as the active pill, clearing every other one.
    pub fn set_active_pill(&mut self, category: &str) {
        for pill in &mut self.pills {
            let on = pill.category == category;
            pill.is_active = on;
            pill.aria_selected = on;
        }
    }
}

/// Parsed host page markup.
pub struct HostPage {
    document: Html,
}

impl HostPage {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    /// Locate the container and its required children.
    pub fn resolve(&self, ids: &MountIds) -> Result<Mount, MountError> {
        let container = self
            .document
            .select(&ID_SELECTOR)
            .find(|el| el.value().id() == Some(ids.container.as_str()))
            .ok_or_else(|| MountError::ContainerMissing(ids.container.clone()))?;

        let grid = find_by_id(container, &ids.grid)
            .ok_or_else(|| MountError::GridMissing(ids.grid.clone()))?;
        let footer = find_by_id(container, &ids.footer)
            .ok_or_else(|| MountError::FooterMissing(ids.footer.clone()))?;

        let pills = container
            .select(&CLASS_SELECTOR)
            .filter(|el| el.value().classes().any(|class| class == ids.pill_class))
            .map(|el| Pill {
                category: el.value().attr(&ids.pill_attr).unwrap_or_default().to_string(),
                label: el.text().collect::<String>().trim().to_string(),
                is_active: el.value().classes().any(|class| class == ACTIVE_CLASS),
                aria_selected: el.value().attr("aria-selected") == Some("true"),
            })
            .collect();

        Ok(Mount {
            grid_html: grid.inner_html(),
            footer_text: footer.text().collect(),
            pills,
        })
    }
}

fn find_by_id<'a>(scope: ElementRef<'a>, id: &str) -> Option<ElementRef<'a>> {
    scope
        .select(&ID_SELECTOR)
        .find(|el| el.value().id() == Some(id))
}

/// Something that can report the page markup as it is right now.
pub trait PageSource {
    /// `None` when the page is not readable yet.
    fn current_markup(&mut self) -> Option<String>;
}

/// Markup known up front; never changes between polls.
pub struct StaticPage(pub String);

impl PageSource for StaticPage {
    fn current_markup(&mut self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Markup re-read from disk on every poll.
pub struct FilePage {
    pub path: PathBuf,
}

impl PageSource for FilePage {
    fn current_markup(&mut self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }
}

/// Time source for the mount wait loop.
pub trait Clock {
    fn elapsed(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock; `sleep` blocks the calling thread.
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
/// Bound and poll interval for `wait_for_mount`.
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

/// Resolve the mount once, without waiting.
pub fn resolve_mount(source: &mut dyn PageSource, ids: &MountIds) -> Result<Mount, MountError> {
    let markup = source
        .current_markup()
        .ok_or_else(|| MountError::ContainerMissing(ids.container.clone()))?;
    HostPage::parse(&markup).resolve(ids)
}

/// Poll until the container appears, then resolve it.
///
/// Only a missing container is retried. Once the container exists, a missing
/// grid or footer is final and returned immediately.
pub fn wait_for_mount(
    source: &mut dyn PageSource,
    ids: &MountIds,
    policy: &WaitPolicy,
    clock: &mut dyn Clock,
) -> Result<Mount, MountError> {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match resolve_mount(source, ids) {
            Err(MountError::ContainerMissing(_)) => {}
            resolved => {
                debug!(attempts, ok = resolved.is_ok(), "mount resolved");
                return resolved;
            }
        }

        let waited = clock.elapsed();
        if waited >= policy.timeout {
            debug!(attempts, waited_ms = waited.as_millis() as u64, "mount wait timed out");
            return Err(MountError::Timeout {
                waited_ms: waited.as_millis(),
            });
        }
        clock.sleep(policy.interval);
    }
}

/// Canonical host markup with an "All" pill followed by one per category.
pub fn default_host_markup(ids: &MountIds, categories: &[String]) -> String {
    let mut pills = vec![pill_markup(ids, ALL_CATEGORIES_TAG, "All", true)];
    pills.extend(
        categories
            .iter()
            .map(|category| pill_markup(ids, category, category, false)),
    );

    format!(
        concat!(
            "<!doctype html><html><body>",
            r#"<section id="{container}" class="hbe-services">"#,
            r#"<div class="hbe-services__pills" role="tablist">{pills}</div>"#,
            r#"<div id="{grid}" class="hbe-services__grid"></div>"#,
            r#"<div id="{footer}" class="hbe-services__foot"></div>"#,
            "</section></body></html>"
        ),
        container = escape_html(&ids.container),
        pills = pills.concat(),
        grid = escape_html(&ids.grid),
        footer = escape_html(&ids.footer),
    )
}

fn pill_markup(ids: &MountIds, category: &str, label: &str, active: bool) -> String {
    let class = if active {
        format!("{} {ACTIVE_CLASS}", ids.pill_class)
    } else {
        ids.pill_class.clone()
    };
    format!(
        r#"<button type="button" class="{}" {}="{}" role="tab" aria-selected="{active}">{}</button>"#,
        escape_html(&class),
        escape_html(&ids.pill_attr),
        escape_html(category),
        escape_html(label),
    )
}
