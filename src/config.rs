//! Widget configuration.
//!
//! Defaults describe the rich card layout against the canonical endpoint.
//! `from_env` layers the `CATALOG_WIDGET_*` overrides on top, and the data
//! URL can also be baked in at build time through
//! `CATALOG_WIDGET_DATA_URL_HINT`.

use crate::links::LinkPolicy;
use crate::mount::{MountIds, WaitPolicy};
use crate::render::RenderOptions;
use anyhow::{Result, bail};
use serde::Serialize;
use std::env;
use url::Url;

pub const DEFAULT_DATA_URL: &str = "https://isa-phe.github.io/services/services.json";
pub const DATA_URL_ENV: &str = "CATALOG_WIDGET_DATA_URL";
pub const VARIANT_ENV: &str = "CATALOG_WIDGET_VARIANT";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Card layout family.
pub enum WidgetVariant {
    /// "Open" links, explicit new-tab only, no media, no mount wait.
    Basic,
    /// Thumbnails, facts block, cross-host new tabs, mount wait.
    #[default]
    Rich,
}

impl WidgetVariant {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "rich" => Ok(Self::Rich),
            other => bail!("unknown widget variant '{other}' (expected basic|rich)"),
        }
    }

    pub fn default_cta(self) -> &'static str {
        match self {
            WidgetVariant::Basic => "Open",
            WidgetVariant::Rich => "Details and Booking",
        }
    }

    pub fn link_policy(self) -> LinkPolicy {
        match self {
            WidgetVariant::Basic => LinkPolicy::ExplicitOnly,
            WidgetVariant::Rich => LinkPolicy::CrossHost,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WidgetConfig {
    pub data_url: String,
    pub variant: WidgetVariant,
    pub ids: MountIds,
    /// `None` resolves the mount once without waiting.
    pub wait: Option<WaitPolicy>,
    /// URL of the hosting page; drives the cross-host link policy. Without
    /// one, links are judged against the data URL's host.
    pub page_url: Option<Url>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::for_variant(WidgetVariant::Rich)
    }
}

impl WidgetConfig {
    pub fn for_variant(variant: WidgetVariant) -> Self {
        let wait = match variant {
            WidgetVariant::Basic => None,
            WidgetVariant::Rich => Some(WaitPolicy::default()),
        };
        Self {
            data_url: default_data_url().to_string(),
            variant,
            ids: MountIds::default(),
            wait,
            page_url: None,
        }
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let variant = match env::var(VARIANT_ENV) {
            Ok(raw) if !raw.trim().is_empty() => WidgetVariant::parse(&raw)?,
            _ => WidgetVariant::default(),
        };
        let mut config = Self::for_variant(variant);
        if let Ok(url) = env::var(DATA_URL_ENV) {
            if !url.trim().is_empty() {
                config.data_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            default_cta: self.variant.default_cta().to_string(),
            link_policy: self.variant.link_policy(),
            show_media: self.variant == WidgetVariant::Rich,
            page_url: self.link_base(),
        }
    }

    fn link_base(&self) -> Option<Url> {
        self.page_url
            .clone()
            .or_else(|| Url::parse(&self.data_url).ok())
    }
}

fn default_data_url() -> &'static str {
    option_env!("CATALOG_WIDGET_DATA_URL_HINT").unwrap_or(DEFAULT_DATA_URL)
}
