//! HTML extraction for portal detail and search pages.
//!
//! Parsing is synchronous and returns owned values so no parsed document is
//! held across an `.await`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::record::Resource;

/// `title` attribute of the anchor linking a detail page to its JSON view.
pub const JSON_VIEW_TITLE: &str = "json view of content";

fn compile_static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector '{css}': {e:?}"))
}

static JSON_VIEW_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"a[title="json view of content"][href]"#));
static TOPIC_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    compile_static_selector(
        ".field-name-field-topic a[href], .field-topic a[href], .topics-list a[href]",
    )
});
static SEARCH_RESULT: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("article.node-search-result"));
static RESULT_TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("h2.node-title a"));
static RESULT_PUBLISHER: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(".group-membership"));
static RESULT_TOPIC: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a.name"));
static RESULT_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(".node-description"));
static RESULT_RESOURCE_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("li a"));
static NEXT_PAGE_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("ul.pagination li.pager-next a[href]"));

/// What the resolver needs from a dataset detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Href of the JSON view anchor, as written in the page.
    pub json_view_href: Option<String>,
    /// Topic identifiers linked from the topic container, in page order.
    pub topic_categories: Vec<String>,
}

/// Extracts the JSON view link and topic identifiers from a detail page.
#[must_use]
pub fn inspect_detail_page(html: &str) -> DetailPage {
    let document = Html::parse_document(html);

    let json_view_href = document
        .select(&JSON_VIEW_LINK)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string);

    let mut topic_categories: Vec<String> = Vec::new();
    for anchor in document.select(&TOPIC_LINKS) {
        let Some(slug) = anchor.value().attr("href").and_then(trailing_segment) else {
            continue;
        };
        if !topic_categories.contains(&slug) {
            topic_categories.push(slug);
        }
    }

    DetailPage {
        json_view_href,
        topic_categories,
    }
}

/// Last non-empty path segment of `href`, percent-decoded.
#[must_use]
pub fn trailing_segment(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next()?.trim();
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    Some(decoded)
}

/// One dataset entry in a search results page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchItem {
    pub title: String,
    /// Detail-page href.
    pub url: String,
    pub publisher: String,
    /// Topic label shown on the card, if any.
    pub topic: Option<String>,
    pub description: String,
    /// Resource links shown on the card.
    pub resources: Vec<Resource>,
}

/// Parses every result card on a search page.
///
/// Cards without a title link are skipped.
#[must_use]
pub fn parse_search_results(html: &str) -> Vec<SearchItem> {
    let document = Html::parse_document(html);
    document
        .select(&SEARCH_RESULT)
        .filter_map(|card| parse_search_card(&card))
        .collect()
}

fn parse_search_card(card: &ElementRef<'_>) -> Option<SearchItem> {
    let title_link = card.select(&RESULT_TITLE_LINK).next()?;
    let url = title_link.value().attr("href")?.trim().to_string();

    let resources = card
        .select(&RESULT_RESOURCE_LINK)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            let format = anchor.value().attr("data-format").unwrap_or_default();
            Some(Resource::new(element_text(&anchor), format.trim(), href))
        })
        .collect();

    Some(SearchItem {
        title: element_text(&title_link),
        url,
        publisher: first_text(card, &RESULT_PUBLISHER).unwrap_or_default(),
        topic: first_text(card, &RESULT_TOPIC),
        description: first_text(card, &RESULT_DESCRIPTION).unwrap_or_default(),
        resources,
    })
}

/// Href of the "next page" link in the pager, if any.
#[must_use]
pub fn next_page_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&NEXT_PAGE_LINK)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
}

/// Element text with whitespace runs collapsed to single spaces.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
