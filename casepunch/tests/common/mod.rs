//! In-process stand-in for the remote case-management functions.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Form, Router};
use casepunch::{ClientConfig, PunchClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;

pub const USER_ID: &str = "1889";
pub const PASSWORD: &str = "secret";

/// Test helper to setup logging for debugging
pub fn setup_logging() {
    let _ = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub content_type: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
pub struct MockSite {
    case_rows: Arc<Vec<String>>,
    forms: Arc<HashMap<String, String>>,
    submit_status: StatusCode,
    submit_body: Arc<String>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self {
            case_rows: Arc::new(Vec::new()),
            forms: Arc::new(HashMap::new()),
            submit_status: StatusCode::OK,
            submit_body: Arc::new("OK".to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_cases(mut self, cases: &[&str]) -> Self {
        self.case_rows = Arc::new(cases.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Serve an edit form with the given key and case name for `case`.
    pub fn with_form(mut self, case: &str, f_key: &str, case_name: &str, log: &str) -> Self {
        let mut forms = (*self.forms).clone();
        forms.insert(case.to_string(), form_page(f_key, case_name, log));
        self.forms = Arc::new(forms);
        self
    }

    pub fn with_submit_status(mut self, status: StatusCode) -> Self {
        self.submit_status = status;
        self
    }

    pub fn with_submit_body(mut self, body: &str) -> Self {
        self.submit_body = Arc::new(body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn requests_to(&self, endpoint: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.endpoint == endpoint)
            .collect()
    }

    fn record(&self, endpoint: &'static str, headers: &HeaderMap, fields: Vec<(String, String)>) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().expect("request log").push(RecordedRequest {
            endpoint,
            content_type,
            fields,
        });
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(|| async { "site root" }))
            .route("/functions/case_list", post(case_list))
            .route("/functions/case_edit", post(case_edit))
            .route("/functions/sql_for_case", post(sql_for_case))
            .with_state(self.clone())
    }

    /// Start the site and return a client pointed at it.
    pub async fn start(&self) -> PunchClient {
        let base = spawn_router(self.router()).await;
        client_for(&base, Duration::from_secs(5))
    }
}

pub fn client_for(base: &str, timeout: Duration) -> PunchClient {
    let config = ClientConfig::default()
        .with_base_url(format!("{base}/functions"))
        .with_timeout(timeout)
        .with_request_delay(Duration::from_millis(10));
    PunchClient::new(config).expect("client")
}

/// Serve `router` on an ephemeral local port; returns `http://127.0.0.1:<port>`.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

pub fn form_page(f_key: &str, case_name: &str, log: &str) -> String {
    format!(
        r#"<html><body><form id="case_form">
  <input type="hidden" id="f_key" value="{f_key}">
  <input type="text" id="f_case_name" value="{case_name}">
  <input type="text" id="f_person_id" value="P-1">
  <input type="text" id="f_person2_id" value="">
  <input type="date" id="f_event_date" value="2024-04-30">
  <input type="date" id="f_alert_date" value="2024-05-10">
  <textarea id="f_log">{log}</textarea>
  <textarea id="f_note">keep</textarea>
  <textarea id="f_to_do"></textarea>
  <input type="text" id="f_dir" value="north">
  <select id="f_risk"><option selected>low</option></select>
  <input type="text" id="f_doc" value="doc-9">
</form></body></html>"#
    )
}

async fn case_list(
    State(site): State<MockSite>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Html<String> {
    site.record("case_list", &headers, fields.clone());

    let field = |name: &str| {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    if field("user_id") != Some(USER_ID) || field("f_password") != Some(PASSWORD) {
        return Html("<html><body><p>Login failed</p></body></html>".to_string());
    }

    let rows: String = site
        .case_rows
        .iter()
        .enumerate()
        .map(|(i, case)| format!("<tr><td>{}</td><td>{case}</td><td>x</td></tr>", i + 1))
        .collect();
    Html(format!(
        r#"<html><body><table id="caselist1"><thead><tr><th>#</th><th>Case</th><th>Name</th></tr></thead><tbody>{rows}</tbody></table></body></html>"#
    ))
}

async fn case_edit(
    State(site): State<MockSite>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    site.record("case_edit", &headers, fields.clone());
    let key = fields
        .iter()
        .find(|(name, _)| name == "form_key")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    match site.forms.get(&key) {
        Some(page) => (StatusCode::OK, Html(page.clone())),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<p>no such case</p>".to_string()),
        ),
    }
}

async fn sql_for_case(
    State(site): State<MockSite>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    site.record("sql_for_case", &headers, fields);
    (site.submit_status, site.submit_body.to_string())
}
