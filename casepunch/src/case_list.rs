//! Parsing of the `/case_list` page.
//!
//! The page carries a table with id `caselist1`; the case identifier of each
//! row sits in the second cell.

use crate::dom::{descendants_named, stripped_text};
use crate::errors::PunchError;
use crate::types::CaseList;
use scraper::{Html, Selector};
use tracing::debug;

pub const CASE_TABLE_ID: &str = "caselist1";

// Zero-based cell holding the case identifier
const CASE_KEY_COLUMN: usize = 1;

/// Extract the case identifiers from a case list page.
///
/// Rows come from the table's first `tbody`, or from every `tr` of the table
/// when it has none. Rows with fewer than two cells or an empty identifier
/// cell are skipped. An empty result is an error.
pub fn parse_case_list(html: &str) -> Result<CaseList, PunchError> {
    let selector_text = format!("table#{CASE_TABLE_ID}");
    let selector = Selector::parse(&selector_text)
        .map_err(|e| PunchError::MissingElement(format!("{selector_text}: {e}")))?;

    let document = Html::parse_document(html);
    let table = document
        .select(&selector)
        .next()
        .ok_or_else(|| PunchError::MissingElement(selector_text.clone()))?;

    let row_root = descendants_named(table, "tbody").next().unwrap_or(table);

    let mut keys = Vec::new();
    for row in descendants_named(row_root, "tr") {
        let cells: Vec<_> = descendants_named(row, "td").collect();
        if cells.len() <= CASE_KEY_COLUMN {
            continue;
        }
        let key = stripped_text(cells[CASE_KEY_COLUMN]);
        if !key.is_empty() {
            keys.push(key);
        }
    }

    debug!("Parsed {} case keys from {}", keys.len(), CASE_TABLE_ID);

    if keys.is_empty() {
        return Err(PunchError::NoCases);
    }
    Ok(CaseList::new(keys))
}
