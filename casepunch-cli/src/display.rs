//! Terminal rendering of case lists, previews, runs and history.

use casepunch::{
    CaseList, CasePreview, ExecutionHistory, HealthCheckResult, PunchOutcome, RunObserver,
    RunSummary, RunVerdict,
};
use colored::Colorize;

/// Prints one line per run event as cases are processed.
pub struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn case_started(&mut self, index: usize, total: usize, case: &str) {
        println!("⚙️  Processing case {case} ({}/{total})...", index + 1);
    }

    fn form_found(&mut self, _case: &str, case_name: &str, f_key: i64) {
        println!("   📋 Found case: {case_name} (ID: {f_key})");
    }

    fn case_finished(&mut self, outcome: &PunchOutcome) {
        if outcome.is_success() {
            println!("   {}", format!("✅ Case {} punched", outcome.case).green());
        } else {
            println!(
                "   {}",
                format!("❌ Case {} failed: {}", outcome.case, outcome.message).red()
            );
        }
    }
}

pub fn print_case_list(list: &CaseList) {
    println!(
        "{}",
        format!("✅ Found {} cases in the case table", list.len()).green()
    );
    println!("📋 Case list: {list}");
    for (i, case) in list.iter().enumerate() {
        println!("   {}. Case number: {}", i + 1, case.bold());
    }
}

pub fn print_preview(preview: &CasePreview) {
    println!("{}", "✅ Connection test succeeded".green());
    println!("   📋 Case name:   {}", preview.case_name);
    println!("   🔑 Case key:    {}", preview.f_key);
    println!("   📊 Total cases: {}", preview.total_cases);
}

pub fn print_health(health: &HealthCheckResult) {
    if health.is_healthy() {
        println!(
            "{}",
            format!(
                "✅ {} is reachable ({}ms)",
                health.url, health.check_duration_ms
            )
            .green()
        );
    } else {
        let reason = match (health.status_code, &health.error_message) {
            (Some(code), _) => format!("status code {code}"),
            (None, Some(message)) => message.clone(),
            (None, None) => "unknown error".to_string(),
        };
        println!(
            "{}",
            format!("❌ {} is not reachable: {reason}", health.url).red()
        );
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    let counts = format!("{}/{}", summary.success_count, summary.total_count);
    match summary.verdict() {
        RunVerdict::AllSucceeded => {
            println!("{}", format!("🎉 All done! Punched {counts} cases").green().bold())
        }
        RunVerdict::Partial => {
            println!("{}", format!("⚠️  Partially done: punched {counts} cases").yellow())
        }
        RunVerdict::AllFailed => {
            println!("{}", "❌ Every case failed, nothing was punched".red().bold())
        }
    }
    if summary.aborted {
        println!("{}", "⏹️  Run aborted before every case was attempted".yellow());
    }

    println!("\n📋 Detailed results");
    for (i, outcome) in summary.results.iter().enumerate() {
        let status = format!("{:?}", outcome.status).to_lowercase();
        println!("{}. Case {} - {}", i + 1, outcome.case.bold(), status);
        println!("     {}", outcome.message);
        if let Some(details) = &outcome.details {
            println!("     {}", details.dimmed());
        }
    }

    if summary.success_count < summary.total_count {
        println!(
            "\n💡 Some cases failed. Check the reasons above and run again to retry them."
        );
    }
}

pub fn print_history(history: &ExecutionHistory) {
    let Some(latest) = history.latest() else {
        println!("📝 No runs yet. The history fills in after the first punch.");
        return;
    };

    println!("📈 Runs this session: {}", history.len());
    println!(
        "   Latest: {} - {}/{} succeeded ({:.0}%)",
        latest.timestamp,
        latest.success_count,
        latest.total_count,
        latest.success_rate()
    );

    for (i, entry) in history.entries().iter().enumerate().rev() {
        println!("\n### Run {}", i + 1);
        println!("Time: {}", entry.timestamp);
        println!(
            "Result: {}/{} succeeded",
            entry.success_count, entry.total_count
        );
        for outcome in &entry.results {
            if outcome.is_success() {
                println!("  {}", format!("{}: {}", outcome.case, outcome.message).green());
            } else {
                println!(
                    "  {}",
                    format!(
                        "{}: {} - {}",
                        outcome.case,
                        outcome.message,
                        outcome.details.as_deref().unwrap_or_default()
                    )
                    .red()
                );
            }
        }
    }
}
