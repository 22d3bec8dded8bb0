//! Punch automation for a remote case-management site
//!
//! The site has no API: it renders HTML pages behind a few form-encoded POST
//! functions. This crate reads the case list table, scrapes each case's edit
//! form into a [`FieldRecord`], prefixes a message to its work log and posts
//! the record back.
//!
//! The four core operations ([`PunchClient::fetch_case_list`],
//! [`CaseBackend::fetch_case_form`], [`extract_fields`] and
//! [`CaseBackend::submit_punch`]) are stateless. Pacing, caching, progress and
//! history belong to the driver side ([`PunchRunner`], [`Session`]).

pub mod cache;
pub mod case_list;
pub mod client;
pub mod config;
mod dom;
pub mod errors;
pub mod fields;
pub mod health;
pub mod history;
pub mod outcome;
pub mod runner;
pub mod session;
pub mod types;

pub use cache::TtlCache;
pub use case_list::parse_case_list;
pub use client::{CaseBackend, PunchClient};
pub use config::ClientConfig;
pub use errors::{ErrorKind, PunchError};
pub use fields::{compose_log, extract_fields, CaseForm, FieldRecord, FIELD_IDS};
pub use health::{HealthCheckResult, HealthStatus};
pub use history::{ExecutionHistory, ExecutionHistoryEntry, HistoryExport};
pub use outcome::{PunchOutcome, PunchStatus, RunSummary, RunVerdict};
pub use runner::{NoopObserver, PunchRunner, RunObserver, RunRequest};
pub use session::{CasePreview, Session};
pub use types::{CaseList, Credentials};
