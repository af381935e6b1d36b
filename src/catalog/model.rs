//! Lenient representation of the remote service catalog.
//!
//! The endpoint serves hand-edited JSON, so nothing here rejects a record.
//! Each field is pulled out of the raw `Value` with truthiness rules: a missing
//! or falsy value becomes an empty string or `false`, and only a real JSON
//! number counts as a manual `order`.

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::{Number, Value};

/// Sort key used for items without a numeric `order`.
pub const MISSING_ORDER: f64 = 999_999.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
/// One service entry as rendered into a card.
pub struct CatalogItem {
    pub title: String,
    pub text: String,
    pub category: String,
    /// Set when `category` was rendered from a number or `true`: the card
    /// still shows it, but no pill tag ever equals it.
    pub opaque_category: bool,
    pub date: String,
    pub url: String,
    pub cta: String,
    pub new_tab: bool,
    pub featured: bool,
    pub order: Option<f64>,
    pub image: String,
    pub duration: String,
    pub level: String,
    pub audience: String,
    pub starting_price: String,
}

impl CatalogItem {
    /// Extract an item from an arbitrary JSON value.
    ///
    /// Non-object values produce an item with every field defaulted, which
    /// still renders as an (empty) card.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| text_field(value.get(key));
        Self {
            title: field("title"),
            text: field("text"),
            category: field("category"),
            opaque_category: value
                .get("category")
                .is_some_and(|category| !category.is_string() && truthy(Some(category))),
            date: field("date"),
            url: field("url"),
            cta: field("cta"),
            new_tab: truthy(value.get("newTab")),
            featured: truthy(value.get("featured")),
            order: value.get("order").and_then(Value::as_f64),
            image: field("image"),
            duration: field("duration"),
            level: field("level"),
            audience: field("audience"),
            starting_price: field("startingPrice"),
        }
    }

    /// Category as a pill tag, or `None` when it did not come from a string.
    pub fn category_tag(&self) -> Option<&str> {
        (!self.opaque_category).then_some(self.category.as_str())
    }

    /// Manual tie-break rank, with missing orders sorted after every real one.
    pub fn order_rank(&self) -> f64 {
        self.order.unwrap_or(MISSING_ORDER)
    }

    /// Whether any of the rich-variant fact fields are present.
    pub fn has_facts(&self) -> bool {
        [
            &self.duration,
            &self.level,
            &self.starting_price,
            &self.audience,
        ]
        .iter()
        .any(|value| !value.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Parsed response body of the catalog endpoint.
pub struct CatalogDocument {
    pub items: Vec<CatalogItem>,
}

impl CatalogDocument {
    /// Parse a response body.
    ///
    /// Malformed JSON and a literal `null` document are errors. Any other
    /// shape without an `items` array is an empty catalog.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            bail!("catalog document is null");
        }
        let items = match value.get("items") {
            Some(Value::Array(entries)) => entries.iter().map(CatalogItem::from_value).collect(),
            _ => Vec::new(),
        };
        Ok(Self { items })
    }

    /// Distinct categories in first-seen order, skipping empty ones.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for item in &self.items {
            let Some(category) = item.category_tag() else {
                continue;
            };
            if !category.is_empty() && !seen.iter().any(|known| known == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number_text(number),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

/// Whole floats print without a fractional part (`1e3` reads "1000").
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() => value.to_string(),
        _ => number.to_string(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
