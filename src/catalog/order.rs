//! Filtered, ordered view over the loaded catalog.
//!
//! Ordering precedence, highest first: featured items, newest `date`
//! (lexical, empty sorts last), lowest manual `order`, then `title` in
//! dictionary order. The sort is stable, so fully tied items keep their
//! position from the feed.

use crate::catalog::identity::CategoryFilter;
use crate::catalog::model::CatalogItem;
use std::cmp::Ordering;

/// Items matching `filter`, in feed order.
///
/// Categories that did not come from a JSON string only show up under "all".
pub fn filter_items<'a>(items: &'a [CatalogItem], filter: &CategoryFilter) -> Vec<&'a CatalogItem> {
    items
        .iter()
        .filter(|item| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(_) => item
                .category_tag()
                .is_some_and(|category| filter.matches(category)),
        })
        .collect()
}

/// Stable sort in display order.
pub fn sort_items(items: &mut [&CatalogItem]) {
    items.sort_by(|a, b| compare_items(a, b));
}

/// Filter then sort: the exact sequence of cards the widget renders.
pub fn view<'a>(items: &'a [CatalogItem], filter: &CategoryFilter) -> Vec<&'a CatalogItem> {
    let mut selected = filter_items(items, filter);
    sort_items(&mut selected);
    selected
}

pub fn compare_items(a: &CatalogItem, b: &CatalogItem) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| b.date.cmp(&a.date))
        .then_with(|| {
            a.order_rank()
                .partial_cmp(&b.order_rank())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| compare_titles(&a.title, &b.title))
}

/// Dictionary order for display titles.
///
/// Levels, each consulted only when the previous one ties: base letters with
/// case and Latin diacritics folded away (punctuation, then digits, then
/// letters), then unaccented before accented, then lowercase before
/// uppercase. Byte order settles whatever is left, so only identical titles
/// compare equal.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let primary = |text: &str| {
        text.chars()
            .map(|c| (char_class(c), base_letter(c)))
            .collect::<Vec<_>>()
    };
    primary(a)
        .cmp(&primary(b))
        .then_with(|| a.chars().map(is_accented).cmp(b.chars().map(is_accented)))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn char_class(c: char) -> u8 {
    if c.is_numeric() {
        1
    } else if c.is_alphabetic() {
        2
    } else {
        0
    }
}

fn is_accented(c: char) -> bool {
    base_letter(c) != lowercase(c)
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Lowercase base letter for the Latin-1 and Latin Extended-A letters.
fn base_letter(c: char) -> char {
    match c {
        'À'..='Å' | 'à'..='å' | 'Ā'..='ą' => 'a',
        'Ç' | 'ç' | 'Ć'..='č' => 'c',
        'Ď'..='đ' => 'd',
        'È'..='Ë' | 'è'..='ë' | 'Ē'..='ě' => 'e',
        'Ĝ'..='ģ' => 'g',
        'Ĥ'..='ħ' => 'h',
        'Ì'..='Ï' | 'ì'..='ï' | 'Ĩ'..='ı' => 'i',
        'Ĵ' | 'ĵ' => 'j',
        'Ķ' | 'ķ' => 'k',
        'Ĺ'..='ł' => 'l',
        'Ñ' | 'ñ' | 'Ń'..='ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' | 'Ō'..='ő' => 'o',
        'Ŕ'..='ř' => 'r',
        'Ś'..='š' => 's',
        'Ţ'..='ŧ' => 't',
        'Ù'..='Ü' | 'ù'..='ü' | 'Ũ'..='ų' => 'u',
        'Ŵ' | 'ŵ' => 'w',
        'Ý' | 'ý' | 'ÿ' | 'Ŷ'..='Ÿ' => 'y',
        'Ź'..='ž' => 'z',
        other => lowercase(other),
    }
}
