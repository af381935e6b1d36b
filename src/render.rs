//! HTML fragment rendering for catalog cards.
//!
//! Every string that comes from the feed goes through `escape_html` before it
//! is placed in markup, attribute values included. Stylesheets key off the
//! `hbe-services__*` class names emitted here.

use crate::catalog::{CatalogItem, CategoryFilter, view};
use crate::links::{LinkPolicy, NEW_TAB_ATTRS, opens_new_tab};
use serde::Serialize;
use url::Url;

pub const LOADING_HTML: &str = r#"<div class="hbe-services__loading">Loading…</div>"#;
pub const UNAVAILABLE_HTML: &str = r#"<div class="hbe-services__loading">Data unavailable. Open the JSON endpoint to verify it exists.</div>"#;
pub const EMPTY_HTML: &str =
    r#"<div class="hbe-services__loading">No items found in this category.</div>"#;

const FACT_SEPARATOR: &str = " · ";
const IMAGE_ONERROR: &str = "this.style.display='none'";

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// "Showing N item(s)." status line for the footer.
pub fn footer_text(count: usize) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("Showing {count} item{suffix}.")
}

#[derive(Clone, Debug)]
/// Knobs that differ between the basic and rich card layouts.
pub struct RenderOptions {
    pub default_cta: String,
    pub link_policy: LinkPolicy,
    /// Render thumbnails and the facts block.
    pub show_media: bool,
    /// URL of the hosting page, used to resolve link hostnames.
    pub page_url: Option<Url>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Grid markup and footer text produced for one filter state.
pub struct RenderedView {
    pub grid_html: String,
    pub footer_text: String,
    pub count: usize,
}

/// Render the grid for `filter` over the full item list.
pub fn render_view(
    items: &[CatalogItem],
    filter: &CategoryFilter,
    options: &RenderOptions,
) -> RenderedView {
    let visible = view(items, filter);
    if visible.is_empty() {
        return RenderedView {
            grid_html: EMPTY_HTML.to_string(),
            footer_text: String::new(),
            count: 0,
        };
    }

    let grid_html = visible
        .iter()
        .map(|item| render_card(item, options))
        .collect::<String>();
    RenderedView {
        grid_html,
        footer_text: footer_text(visible.len()),
        count: visible.len(),
    }
}

/// Markup for a single card.
pub fn render_card(item: &CatalogItem, options: &RenderOptions) -> String {
    let href = if item.url.is_empty() { "#" } else { item.url.as_str() };
    let cta = if item.cta.is_empty() {
        options.default_cta.as_str()
    } else {
        item.cta.as_str()
    };
    let target = if opens_new_tab(
        options.link_policy,
        item.new_tab,
        href,
        options.page_url.as_ref(),
    ) {
        NEW_TAB_ATTRS
    } else {
        ""
    };

    let mut card = String::from(r#"<div class="hbe-services__card">"#);
    card.push_str(r#"<div class="hbe-services__meta">"#);
    card.push_str(&format!(
        r#"<div class="hbe-services__cat">{}</div>"#,
        escape_html(&item.category)
    ));
    if !item.date.is_empty() {
        card.push_str(&format!(
            r#"<div class="hbe-services__date">{}</div>"#,
            escape_html(&item.date)
        ));
    }
    card.push_str("</div>");

    if options.show_media && !item.image.is_empty() {
        card.push_str(&format!(
            r#"<img class="hbe-services__img" src="{}" alt="{}" loading="lazy" onerror="{IMAGE_ONERROR}">"#,
            escape_html(&item.image),
            escape_html(&item.title)
        ));
    }

    card.push_str(&format!(
        r#"<div class="hbe-services__card-title">{}</div>"#,
        escape_html(&item.title)
    ));
    card.push_str(&format!(
        r#"<div class="hbe-services__text">{}</div>"#,
        escape_html(&item.text)
    ));

    if options.show_media {
        if let Some(facts) = render_facts(item) {
            card.push_str(&facts);
        }
    }

    card.push_str(&format!(
        r#"<a class="hbe-services__cta" href="{}"{target}>{}</a>"#,
        escape_html(href),
        escape_html(cta)
    ));
    card.push_str("</div>");
    card
}

/// Facts block: duration/level/price on one line, audience on the next.
///
/// Returns `None` when the item carries none of the fact fields.
pub fn render_facts(item: &CatalogItem) -> Option<String> {
    if !item.has_facts() {
        return None;
    }

    let mut block = String::from(r#"<div class="hbe-services__facts">"#);
    let primary: Vec<String> = [&item.duration, &item.level, &item.starting_price]
        .into_iter()
        .filter(|value| !value.is_empty())
        .map(|value| format!(r#"<span class="hbe-services__fact">{}</span>"#, escape_html(value)))
        .collect();
    if !primary.is_empty() {
        block.push_str(&format!(
            r#"<div class="hbe-services__facts-line">{}</div>"#,
            primary.join(FACT_SEPARATOR)
        ));
    }
    if !item.audience.is_empty() {
        block.push_str(&format!(
            r#"<div class="hbe-services__facts-line"><span class="hbe-services__fact">{}</span></div>"#,
            escape_html(&item.audience)
        ));
    }
    block.push_str("</div>");
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich() -> RenderOptions {
        RenderOptions {
            default_cta: "Details and Booking".to_string(),
            link_policy: LinkPolicy::CrossHost,
            show_media: true,
            page_url: Url::parse("https://spa.example.org/services").ok(),
        }
    }

    fn basic() -> RenderOptions {
        RenderOptions {
            default_cta: "Open".to_string(),
            link_policy: LinkPolicy::ExplicitOnly,
            show_media: false,
            page_url: None,
        }
    }

    fn item(title: &str) -> CatalogItem {
        CatalogItem {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn hostile_fields_never_reach_markup_raw() {
        let payload = r#"<script>alert("x")</script>'&"#;
        let hostile = CatalogItem {
            title: payload.into(),
            text: payload.into(),
            category: payload.into(),
            date: payload.into(),
            url: payload.into(),
            cta: payload.into(),
            image: payload.into(),
            duration: payload.into(),
            audience: payload.into(),
            ..Default::default()
        };
        let html = render_card(&hostile, &rich());
        assert!(!html.contains("<script>"));
        assert!(!html.contains(r#""x""#));
        assert!(!html.contains("'&"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;&#39;&amp;"));
    }

    #[test]
    fn footer_pluralizes() {
        assert_eq!(footer_text(0), "Showing 0 items.");
        assert_eq!(footer_text(1), "Showing 1 item.");
        assert_eq!(footer_text(2), "Showing 2 items.");
    }

    #[test]
    fn empty_view_renders_placeholder_and_clears_footer() {
        let items = vec![CatalogItem {
            category: "Spa".into(),
            ..item("Sauna")
        }];
        let rendered = render_view(&items, &CategoryFilter::from_tag("Yoga"), &rich());
        assert_eq!(rendered.grid_html, EMPTY_HTML);
        assert_eq!(rendered.footer_text, "");
        assert_eq!(rendered.count, 0);

        let none = render_view(&[], &CategoryFilter::All, &basic());
        assert_eq!(none.grid_html, EMPTY_HTML);
        assert_eq!(none.footer_text, "");
    }

    #[test]
    fn cards_follow_sorted_order() {
        let items = vec![item("Beta"), item("Alpha")];
        let rendered = render_view(&items, &CategoryFilter::All, &basic());
        let alpha = rendered.grid_html.find("Alpha").unwrap();
        let beta = rendered.grid_html.find("Beta").unwrap();
        assert!(alpha < beta);
        assert_eq!(rendered.footer_text, "Showing 2 items.");
        assert_eq!(rendered.grid_html.matches(r#"class="hbe-services__card""#).count(), 2);
    }

    #[test]
    fn basic_card_layout() {
        let card = render_card(
            &CatalogItem {
                category: "Spa".into(),
                date: "2024-03-01".into(),
                text: "Relax".into(),
                image: "https://cdn.example.org/a.jpg".into(),
                duration: "60 min".into(),
                ..item("Sauna")
            },
            &basic(),
        );
        assert_eq!(
            card,
            concat!(
                r#"<div class="hbe-services__card">"#,
                r#"<div class="hbe-services__meta">"#,
                r#"<div class="hbe-services__cat">Spa</div>"#,
                r#"<div class="hbe-services__date">2024-03-01</div>"#,
                "</div>",
                r#"<div class="hbe-services__card-title">Sauna</div>"#,
                r#"<div class="hbe-services__text">Relax</div>"#,
                r##"<a class="hbe-services__cta" href="#">Open</a>"##,
                "</div>"
            )
        );
    }

    #[test]
    fn date_is_omitted_when_absent() {
        let card = render_card(&item("Sauna"), &basic());
        assert!(!card.contains("hbe-services__date"));
    }

    #[test]
    fn rich_card_renders_image_and_default_cta() {
        let card = render_card(
            &CatalogItem {
                image: "/img/sauna.jpg".into(),
                url: "/book/sauna".into(),
                ..item("Sauna")
            },
            &rich(),
        );
        assert!(card.contains(
            r#"<img class="hbe-services__img" src="/img/sauna.jpg" alt="Sauna" loading="lazy" onerror="this.style.display='none'">"#
        ));
        assert!(card.contains(
            r#"<a class="hbe-services__cta" href="/book/sauna">Details and Booking</a>"#
        ));
    }

    #[test]
    fn facts_lines_omit_missing_entries() {
        let facts = render_facts(&CatalogItem {
            duration: "90 min".into(),
            starting_price: "from 80 EUR".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            facts,
            concat!(
                r#"<div class="hbe-services__facts">"#,
                r#"<div class="hbe-services__facts-line">"#,
                r#"<span class="hbe-services__fact">90 min</span> · "#,
                r#"<span class="hbe-services__fact">from 80 EUR</span>"#,
                "</div></div>"
            )
        );

        let audience_only = render_facts(&CatalogItem {
            audience: "Couples".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(audience_only.matches("hbe-services__facts-line").count(), 1);
        assert!(audience_only.contains("Couples"));

        assert!(render_facts(&item("bare")).is_none());
    }

    #[test]
    fn cross_host_link_opens_new_tab_in_rich_layout() {
        let card = render_card(
            &CatalogItem {
                url: "https://partner.example.net/book".into(),
                new_tab: false,
                ..item("Partner")
            },
            &rich(),
        );
        assert!(card.contains(r#"target="_blank" rel="noopener noreferrer""#));

        let basic_card = render_card(
            &CatalogItem {
                url: "https://partner.example.net/book".into(),
                ..item("Partner")
            },
            &basic(),
        );
        assert!(!basic_card.contains("target="));
    }

    #[test]
    fn explicit_new_tab_in_basic_layout() {
        let card = render_card(
            &CatalogItem {
                url: "/local".into(),
                new_tab: true,
                cta: "Book".into(),
                ..item("Local")
            },
            &basic(),
        );
        assert!(card.ends_with(
            r#"<a class="hbe-services__cta" href="/local" target="_blank" rel="noopener noreferrer">Book</a></div>"#
        ));
    }
}
