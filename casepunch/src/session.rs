//! Driver-side state for one interactive session: who is logged in, the case
//! list last fetched for them, short-lived caches and the run history.

use crate::cache::TtlCache;
use crate::client::{CaseBackend, PunchClient};
use crate::errors::PunchError;
use crate::fields::CaseForm;
use crate::history::ExecutionHistory;
use crate::outcome::RunSummary;
use crate::runner::{PunchRunner, RunObserver, RunRequest};
use crate::types::{CaseList, Credentials};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const CASE_LIST_TTL: Duration = Duration::from_secs(300);
const CASE_FORM_TTL: Duration = Duration::from_secs(60);

const UNKNOWN: &str = "unknown";

/// What the connection test shows about the first case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasePreview {
    pub case_key: String,
    pub case_name: String,
    pub f_key: String,
    pub total_cases: usize,
}

type FormCacheKey = (String, String, String);

pub struct Session {
    client: PunchClient,
    credentials: Credentials,
    case_list: Option<CaseList>,
    case_list_cache: TtlCache<Credentials, CaseList>,
    form_cache: TtlCache<FormCacheKey, CaseForm>,
    history: ExecutionHistory,
    record_history: bool,
}

impl Session {
    pub fn new(client: PunchClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            case_list: None,
            case_list_cache: TtlCache::new(CASE_LIST_TTL),
            form_cache: TtlCache::new(CASE_FORM_TTL),
            history: ExecutionHistory::new(),
            record_history: true,
        }
    }

    /// Whether finished runs are appended to the history. On by default.
    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn set_record_history(&mut self, record: bool) {
        self.record_history = record;
    }

    pub fn records_history(&self) -> bool {
        self.record_history
    }

    pub fn client(&self) -> &PunchClient {
        &self.client
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn case_list(&self) -> Option<&CaseList> {
        self.case_list.as_ref()
    }

    /// Fetch the case list for the session's credentials, reusing a result
    /// fetched within the last few minutes.
    pub async fn load_case_list(&mut self) -> Result<CaseList, PunchError> {
        let list = match self.case_list_cache.get(&self.credentials) {
            Some(list) => {
                debug!("Case list served from cache");
                list
            }
            None => {
                let list = self.client.fetch_case_list(&self.credentials).await?;
                self.case_list_cache
                    .insert(self.credentials.clone(), list.clone());
                list
            }
        };
        info!("Loaded {} cases", list.len());
        self.case_list = Some(list.clone());
        Ok(list)
    }

    /// Forget the loaded list so the next operation fetches it again.
    pub fn clear_case_list(&mut self) {
        self.case_list = None;
        self.case_list_cache.invalidate(&self.credentials);
    }

    async fn ensure_case_list(&mut self) -> Result<CaseList, PunchError> {
        match &self.case_list {
            Some(list) => Ok(list.clone()),
            None => self.load_case_list().await,
        }
    }

    /// Fetch the first case's form and report its name and key.
    pub async fn preview_first_case(&mut self) -> Result<CasePreview, PunchError> {
        let list = self.ensure_case_list().await?;
        let case_key = list.first().ok_or(PunchError::NoCases)?.to_string();

        let cache_key = (
            case_key.clone(),
            list.joined(),
            self.credentials.user_id.clone(),
        );
        let form = match self.form_cache.get(&cache_key) {
            Some(form) => form,
            None => {
                let form = self
                    .client
                    .fetch_case_form(&case_key, &list, &self.credentials.user_id)
                    .await?;
                self.form_cache.insert(cache_key, form.clone());
                form
            }
        };

        Ok(CasePreview {
            case_name: form
                .attribute_value("f_case_name")
                .unwrap_or_else(|| UNKNOWN.to_string()),
            f_key: form
                .attribute_value("f_key")
                .unwrap_or_else(|| UNKNOWN.to_string()),
            total_cases: list.len(),
            case_key,
        })
    }

    /// Punch every loaded case and, unless recording is off, append the run to
    /// the history.
    ///
    /// Forms are always fetched fresh here; a cached form would carry a
    /// stale log into the submission.
    pub async fn punch_all(
        &mut self,
        punch_message: &str,
        cancel: CancellationToken,
        observer: &mut dyn RunObserver,
    ) -> Result<RunSummary, PunchError> {
        let list = self.ensure_case_list().await?;
        let config = self.client.config();
        let today = config.today();

        let runner = PunchRunner::new(self.client.clone(), config.request_delay)
            .with_cancellation(cancel);
        let request = RunRequest {
            case_list: &list,
            user_id: &self.credentials.user_id,
            punch_message,
            today: &today,
        };
        let summary = runner.run(&request, observer).await;

        self.form_cache.clear();
        if self.record_history {
            self.history.record(&summary);
        } else {
            debug!("History recording is off, run not saved");
        }
        Ok(summary)
    }

    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
