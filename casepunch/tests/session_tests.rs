mod common;

use anyhow::{Context, Result};
use casepunch::{Credentials, NoopObserver, PunchStatus, RunVerdict, Session};
use common::{setup_logging, MockSite, PASSWORD, USER_ID};
use tokio_util::sync::CancellationToken;

fn session_for(client: casepunch::PunchClient) -> Session {
    Session::new(client, Credentials::new(USER_ID, PASSWORD))
}

#[tokio::test]
async fn test_case_list_is_cached_per_credentials() -> Result<()> {
    setup_logging();
    let site = MockSite::new().with_cases(&["00020", "00021"]);
    let mut session = session_for(site.start().await);

    let first = session.load_case_list().await?;
    let second = session.load_case_list().await?;
    assert_eq!(first, second);
    assert_eq!(site.requests_to("case_list").len(), 1);

    session.clear_case_list();
    assert!(session.case_list().is_none());
    session.load_case_list().await?;
    assert_eq!(site.requests_to("case_list").len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_preview_reports_first_case() -> Result<()> {
    setup_logging();
    let site = MockSite::new()
        .with_cases(&["00020", "00021"])
        .with_form("00020", "5", "Acme", "");
    let mut session = session_for(site.start().await);

    let preview = session.preview_first_case().await?;
    assert_eq!(preview.case_key, "00020");
    assert_eq!(preview.case_name, "Acme");
    assert_eq!(preview.f_key, "5");
    assert_eq!(preview.total_cases, 2);

    // Second preview is served from the form cache
    session.preview_first_case().await?;
    assert_eq!(site.requests_to("case_edit").len(), 1);
    assert_eq!(site.requests_to("case_list").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_punch_all_end_to_end() -> Result<()> {
    setup_logging();
    let site = MockSite::new()
        .with_cases(&["00020", "00021"])
        .with_form("00020", "5", "Acme", "previous");
    let mut session = session_for(site.start().await);
    session.load_case_list().await?;

    let summary = session
        .punch_all("auto punch", CancellationToken::new(), &mut NoopObserver)
        .await?;

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.total_count, 2);
    assert_eq!(summary.verdict(), RunVerdict::Partial);
    assert_eq!(summary.results[0].status, PunchStatus::Success);
    assert_eq!(summary.results[0].f_key, Some(5));
    assert_eq!(
        summary.results[0].details.as_deref(),
        Some("f_key: 5, work log updated, response: OK")
    );
    assert_eq!(summary.results[1].status, PunchStatus::Failure);

    let edits = site.requests_to("case_edit");
    assert_eq!(edits.len(), 2);
    assert!(edits
        .iter()
        .all(|r| r.field("table_case_id_list") == Some("00020,00021")));

    let submits = site.requests_to("sql_for_case");
    assert_eq!(submits.len(), 1);
    let posted: serde_json::Value =
        serde_json::from_str(submits[0].field("fields").context("fields value")?)?;
    assert_eq!(posted["f_log"], "auto punch\n\nprevious");
    assert_eq!(posted["f_last_editor"], USER_ID);

    let history = session.history();
    assert_eq!(history.len(), 1);
    let latest = history.latest().context("latest run")?;
    assert_eq!(latest.success_count, 1);
    assert_eq!(latest.total_count, 2);
    assert_eq!(latest.results, summary.results);

    session.clear_history();
    assert!(session.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_empty_submit_response_counts_as_success() -> Result<()> {
    setup_logging();
    let site = MockSite::new()
        .with_cases(&["00020"])
        .with_form("00020", "5", "Acme", "")
        .with_submit_body("");
    let mut session = session_for(site.start().await);

    let summary = session
        .punch_all("", CancellationToken::new(), &mut NoopObserver)
        .await?;

    assert_eq!(summary.verdict(), RunVerdict::AllSucceeded);
    assert_eq!(summary.results[0].status, PunchStatus::Success);
    assert_eq!(
        summary.results[0].details.as_deref(),
        Some("f_key: 5, work log updated")
    );
    assert_eq!(site.requests_to("sql_for_case").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_runs_are_not_saved_when_recording_is_off() -> Result<()> {
    setup_logging();
    let site = MockSite::new()
        .with_cases(&["00020"])
        .with_form("00020", "5", "Acme", "");
    let mut session = session_for(site.start().await).with_record_history(false);
    assert!(!session.records_history());

    let summary = session
        .punch_all("m", CancellationToken::new(), &mut NoopObserver)
        .await?;
    assert_eq!(summary.success_count, 1);
    assert!(session.history().is_empty());

    session.set_record_history(true);
    session
        .punch_all("m", CancellationToken::new(), &mut NoopObserver)
        .await?;
    assert_eq!(session.history().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_punch_all_fails_without_cases() {
    setup_logging();
    let site = MockSite::new();
    let mut session = session_for(site.start().await);

    let err = session
        .punch_all("", CancellationToken::new(), &mut NoopObserver)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), casepunch::ErrorKind::Parse);
    assert!(session.history().is_empty());
    assert!(site.requests_to("sql_for_case").is_empty());
}
