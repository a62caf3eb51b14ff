//! Sitemap parsing for listing-based platforms
//!
//! Platforms publish their experience listing in one of two competing
//! document shapes: an XML urlset, or an HTML page carrying a single table
//! of links. Both shapes reduce to the same intermediate form, a list of
//! [`SitemapEntry`] values in discovery order. Malformed or unexpected
//! documents yield an empty list, never an error; a zero-result parse is a
//! soft signal the caller interprets.

use scraper::{Html, Selector};

/// The HTML table that carries the listing
const TABLE_SELECTOR: &str = "table#sitemap";

/// Path segment that introduces an experience reference
const EXPERIENCES_SEGMENT: &str = "experiences";

/// Trailing path literal immediately after the UUID
const TRAILING_SEGMENT: &str = "page";

/// One experience reference discovered in a sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Raw title as discovered (still encoded for XML-derived entries);
    /// callers apply title normalization
    pub title: String,

    /// The experience UUID extracted from the URL path
    pub uuid: String,

    /// The raw URL the entry points at
    pub url: String,

    /// 1-based discovery order within the document
    pub row_index: usize,
}

/// Parses a sitemap document of either shape
///
/// The shape is auto-detected: documents carrying an XML declaration or a
/// `<urlset>` element parse as XML urlsets, everything else as an HTML
/// table.
pub fn parse_sitemap(document: &str) -> Vec<SitemapEntry> {
    if document.contains("<?xml") || document.contains("<urlset") {
        parse_xml_urlset(document)
    } else {
        parse_html_table(document)
    }
}

/// Parses the XML urlset shape: `url/loc` elements in document order
///
/// The UUID extraction rule is applied to each location string; locations
/// that do not reference an experience are skipped but still advance the
/// row index.
pub fn parse_xml_urlset(document: &str) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();

    let (Ok(url_selector), Ok(loc_selector)) =
        (Selector::parse("url"), Selector::parse("loc"))
    else {
        return entries;
    };

    let doc = Html::parse_document(document);

    for (position, url_element) in doc.select(&url_selector).enumerate() {
        let Some(loc) = url_element.select(&loc_selector).next() else {
            continue;
        };

        let location = loc.text().collect::<String>().trim().to_string();

        if let Some((title, uuid)) = extract_experience_ref(&location) {
            entries.push(SitemapEntry {
                title,
                uuid,
                url: location,
                row_index: position + 1,
            });
        }
    }

    entries
}

/// Parses the HTML table shape: a single known table, body rows in order
///
/// Each row's first cell holds an anchor; the href carries the experience
/// reference and the visible text the display title. Absence of the
/// expected table yields an empty list.
pub fn parse_html_table(document: &str) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();

    let (Ok(table_selector), Ok(row_selector), Ok(anchor_selector)) = (
        Selector::parse(TABLE_SELECTOR),
        Selector::parse("tbody tr"),
        Selector::parse("td:first-child a"),
    ) else {
        return entries;
    };

    let doc = Html::parse_document(document);

    let Some(table) = doc.select(&table_selector).next() else {
        return entries;
    };

    for (position, row) in table.select(&row_selector).enumerate() {
        let Some(anchor) = row.select(&anchor_selector).next() else {
            continue;
        };

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        if let Some((_, uuid)) = extract_experience_ref(href) {
            let title = anchor.text().collect::<String>().trim().to_string();
            entries.push(SitemapEntry {
                title,
                uuid,
                url: href.to_string(),
                row_index: position + 1,
            });
        }
    }

    entries
}

/// Extracts `(title_segment, uuid)` from an experience URL
///
/// The expected path shape is `…/experiences/<title>/<uuid>/page…`; the
/// UUID sits immediately before the trailing literal. Extraction happens on
/// the raw, still-encoded URL.
pub fn extract_experience_ref(url: &str) -> Option<(String, String)> {
    let segments: Vec<&str> = url.split('/').collect();

    for window in segments.windows(4) {
        if window[0] == EXPERIENCES_SEGMENT
            && window[3] == TRAILING_SEGMENT
            && !window[1].is_empty()
            && looks_like_uuid(window[2])
        {
            return Some((window[1].to_string(), window[2].to_string()));
        }
    }

    None
}

/// Structural UUID check: 36 chars, hyphens at 8/13/18/23, lowercase hex
/// elsewhere
fn looks_like_uuid(candidate: &str) -> bool {
    if candidate.len() != 36 {
        return false;
    }

    candidate.char_indices().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => c == '-',
        _ => c.is_ascii_hexdigit() && !c.is_ascii_uppercase(),
    })
}
