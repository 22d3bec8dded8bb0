//! Field extraction from a case edit form.

use crate::dom::{element_by_id, trimmed_text};
use crate::errors::PunchError;
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Element ids read from the case edit form, in submission order.
pub const FIELD_IDS: [&str; 12] = [
    "f_key",
    "f_case_name",
    "f_person_id",
    "f_person2_id",
    "f_event_date",
    "f_alert_date",
    "f_log",
    "f_note",
    "f_to_do",
    "f_dir",
    "f_risk",
    "f_doc",
];

/// A fetched case edit page. The HTML is parsed on demand and the parsed
/// tree never outlives the call that needs it.
#[derive(Debug, Clone)]
pub struct CaseForm {
    html: String,
}

impl CaseForm {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Raw `value` attribute of an element, used for quick previews without a
    /// full extraction.
    pub fn attribute_value(&self, id: &str) -> Option<String> {
        let document = Html::parse_document(&self.html);
        element_by_id(&document, id)
            .and_then(|el| el.value().attr("value"))
            .map(str::to_string)
    }
}

/// The record posted back to `/sql_for_case`. Serializes with the remote
/// field names as keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub f_key: i64,
    pub f_case_name: String,
    pub f_person_id: String,
    pub f_person2_id: String,
    pub f_event_date: String,
    pub f_alert_date: String,
    pub f_log: String,
    pub f_note: String,
    pub f_to_do: String,
    pub f_dir: String,
    pub f_risk: String,
    pub f_doc: String,
    pub f_update_date: String,
    pub f_last_editor: String,
}

/// Compose the new log text.
///
/// A blank message leaves the log untouched apart from trimming; otherwise
/// the message goes first, separated from the previous log by a blank line.
pub fn compose_log(punch_message: &str, original_log: &str) -> String {
    let message = punch_message.trim();
    if message.is_empty() {
        return original_log.trim().to_string();
    }
    format!("{message}\n\n{}", original_log.trim())
        .trim()
        .to_string()
}

/// Read the fixed form fields out of `form` and stamp the update metadata.
///
/// Missing or unrecognised elements read as empty strings. Only `f_key` is
/// mandatory and must parse as an integer.
pub fn extract_fields(
    form: &CaseForm,
    today: &str,
    user_id: &str,
    punch_message: &str,
) -> Result<FieldRecord, PunchError> {
    let document = Html::parse_document(form.html());
    let field = |id: &str| field_value(&document, id);

    let raw_key = field("f_key");
    let f_key = raw_key
        .parse::<i64>()
        .map_err(|e| PunchError::InvalidKey {
            value: raw_key.clone(),
            reason: e.to_string(),
        })?;

    let record = FieldRecord {
        f_key,
        f_case_name: field("f_case_name"),
        f_person_id: field("f_person_id"),
        f_person2_id: field("f_person2_id"),
        f_event_date: field("f_event_date"),
        f_alert_date: field("f_alert_date"),
        f_log: compose_log(punch_message, &field("f_log")),
        f_note: field("f_note"),
        f_to_do: field("f_to_do"),
        f_dir: field("f_dir"),
        f_risk: field("f_risk"),
        f_doc: field("f_doc"),
        f_update_date: today.to_string(),
        f_last_editor: user_id.to_string(),
    };

    debug!(
        f_key = record.f_key,
        case_name = %record.f_case_name,
        "Extracted case form fields"
    );
    Ok(record)
}

fn field_value(document: &Html, id: &str) -> String {
    match element_by_id(document, id) {
        None => String::new(),
        Some(el) => match el.value().name() {
            "input" => el.value().attr("value").unwrap_or_default().trim().to_string(),
            "textarea" => trimmed_text(el),
            _ => String::new(),
        },
    }
}
