//! HTTP side of the punch workflow: the three remote functions the site
//! exposes, each a form-encoded POST.

use crate::case_list::parse_case_list;
use crate::config::ClientConfig;
use crate::errors::PunchError;
use crate::fields::{CaseForm, FieldRecord};
use crate::types::{CaseList, Credentials};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

pub const CASE_LIST_ENDPOINT: &str = "case_list";
pub const CASE_EDIT_ENDPOINT: &str = "case_edit";
pub const SUBMIT_ENDPOINT: &str = "sql_for_case";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The per-case half of the workflow, split out so a run can be driven
/// against something other than the live site.
#[async_trait]
pub trait CaseBackend: Send + Sync {
    /// Fetch the editable form of one case.
    async fn fetch_case_form(
        &self,
        case_key: &str,
        case_list: &CaseList,
        user_id: &str,
    ) -> Result<CaseForm, PunchError>;

    /// Post a record back. Returns the raw, uninterpreted response body.
    async fn submit_punch(&self, record: &FieldRecord) -> Result<String, PunchError>;
}

/// Stateless client for the remote case-management functions.
#[derive(Debug, Clone)]
pub struct PunchClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl PunchClient {
    pub fn new(config: ClientConfig) -> Result<Self, PunchError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PunchError::Config(format!("Failed to build http client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Log in and read the case identifiers listed for this user.
    #[instrument(level = "debug", skip(self, credentials), fields(user_id = %credentials.user_id))]
    pub async fn fetch_case_list(&self, credentials: &Credentials) -> Result<CaseList, PunchError> {
        let form = [
            ("user_id", credentials.user_id.as_str()),
            ("f_password", credentials.password.as_str()),
            ("f_password2", ""),
            ("from_case_edit", ""),
        ];
        let body = self.post_form(CASE_LIST_ENDPOINT, &form).await?;
        parse_case_list(&body)
    }

    async fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<String, PunchError> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .form(form)
            .send()
            .await
            .map_err(|source| PunchError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PunchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| PunchError::Request {
            endpoint: endpoint.to_string(),
            source,
        })?;
        debug!("{} answered {} with {} bytes", endpoint, status, body.len());
        Ok(body)
    }
}

#[async_trait]
impl CaseBackend for PunchClient {
    #[instrument(level = "debug", skip(self, case_list))]
    async fn fetch_case_form(
        &self,
        case_key: &str,
        case_list: &CaseList,
        user_id: &str,
    ) -> Result<CaseForm, PunchError> {
        let joined = case_list.joined();
        let form = [
            ("form_key", case_key),
            ("table_case_id_list", joined.as_str()),
            ("user_id", user_id),
        ];
        let body = self.post_form(CASE_EDIT_ENDPOINT, &form).await?;
        Ok(CaseForm::new(body))
    }

    #[instrument(level = "debug", skip(self, record), fields(f_key = record.f_key))]
    async fn submit_punch(&self, record: &FieldRecord) -> Result<String, PunchError> {
        let fields = serde_json::to_string(record)?;
        self.post_form(SUBMIT_ENDPOINT, &[("fields", fields.as_str())])
            .await
    }
}
