//! Sequential driver over a case list: fetch form, extract, submit, pause.

use crate::client::CaseBackend;
use crate::fields::extract_fields;
use crate::outcome::{PunchOutcome, RunSummary};
use crate::types::CaseList;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Inputs shared by every case of one run
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub case_list: &'a CaseList,
    pub user_id: &'a str,
    pub punch_message: &'a str,
    /// Update date stamped on each record, already in the remote calendar
    pub today: &'a str,
}

/// Progress hooks. Every method has an empty default.
pub trait RunObserver: Send {
    fn case_started(&mut self, _index: usize, _total: usize, _case: &str) {}
    fn form_found(&mut self, _case: &str, _case_name: &str, _f_key: i64) {}
    fn case_finished(&mut self, _outcome: &PunchOutcome) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

pub struct PunchRunner<B> {
    backend: B,
    delay: Duration,
    cancel: CancellationToken,
}

impl<B: CaseBackend> PunchRunner<B> {
    pub fn new(backend: B, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the run before the next case once `token` is cancelled.
    /// A request already in flight is not interrupted.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Punch every case in list order. A failed case never stops the run.
    pub async fn run(
        &self,
        request: &RunRequest<'_>,
        observer: &mut dyn RunObserver,
    ) -> RunSummary {
        let total = request.case_list.len();
        let mut summary = RunSummary::new(total);
        info!("Punching {} cases for user {}", total, request.user_id);

        for (index, case) in request.case_list.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Run aborted before case {} ({}/{})", case, index + 1, total);
                summary.aborted = true;
                break;
            }

            observer.case_started(index, total, case);
            let (outcome, submitted) = self.punch_case(request, case, observer).await;
            observer.case_finished(&outcome);
            summary.push(outcome);

            let is_last = index + 1 == total;
            if submitted && !is_last && !self.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        info!(
            "Run finished: {}/{} cases punched",
            summary.success_count, summary.total_count
        );
        summary
    }

    /// Process one case. The flag reports whether a submission was attempted.
    async fn punch_case(
        &self,
        request: &RunRequest<'_>,
        case: &str,
        observer: &mut dyn RunObserver,
    ) -> (PunchOutcome, bool) {
        let form = match self
            .backend
            .fetch_case_form(case, request.case_list, request.user_id)
            .await
        {
            Ok(form) => form,
            Err(e) => {
                warn!("Case {}: form fetch failed: {}", case, e);
                return (PunchOutcome::form_unavailable(case, &e), false);
            }
        };

        let record = match extract_fields(
            &form,
            request.today,
            request.user_id,
            request.punch_message,
        ) {
            Ok(record) => record,
            Err(e) => {
                warn!("Case {}: {}", case, e);
                return (PunchOutcome::extraction_failed(case, &e), false);
            }
        };
        observer.form_found(case, &record.f_case_name, record.f_key);

        match self.backend.submit_punch(&record).await {
            Ok(response) => {
                info!("Case {} punched (f_key {})", case, record.f_key);
                (
                    PunchOutcome::success(case, &record.f_case_name, record.f_key, &response),
                    true,
                )
            }
            Err(e) => {
                warn!("Case {}: submit failed: {}", case, e);
                (
                    PunchOutcome::submit_failed(case, &record.f_case_name, &e),
                    true,
                )
            }
        }
    }
}
