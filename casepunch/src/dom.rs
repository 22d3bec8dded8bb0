//! Small lookups over a parsed page, modelled on the handful of queries the
//! remote pages need: find by id, find by tag, and text extraction.

use scraper::{ElementRef, Html};

/// First element anywhere in the document whose `id` attribute equals `id`.
pub(crate) fn element_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
}

/// Descendants of `el` (excluding `el` itself) with the given tag name, in document order.
pub(crate) fn descendants_named<'a>(
    el: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name().eq_ignore_ascii_case(tag))
}

/// Text of every text node under `el`, each trimmed, empty pieces dropped,
/// concatenated without a separator.
pub(crate) fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Full text content of `el`, trimmed once at the ends.
pub(crate) fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
