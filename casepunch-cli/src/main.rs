//! casepunch CLI
//!
//! Records a punch on every case assigned to a user of the remote
//! case-management site.
//!
//! Usage:
//!   casepunch --user-id 1889 cases              # List the cases of this user
//!   casepunch --user-id 1889 test               # Fetch the first case form
//!   casepunch check                             # Probe the site root
//!   casepunch --user-id 1889 punch -m "done"    # Punch every case
//!   casepunch --user-id 1889 shell              # Interactive session
//!
//! The password is read from `--password` or `CASEPUNCH_PASSWORD` (a `.env`
//! file in the working directory is loaded first).

use anyhow::{bail, Context, Result};
use casepunch::{ClientConfig, Credentials, PunchClient, Session};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod display;
mod interrupt;
mod logging;
mod shell;

#[derive(Parser)]
#[command(name = "casepunch")]
#[command(about = "🤖 Automatic case punching for the case-management site")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,

    /// Base address of the remote functions
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Pause between two cases in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Offset of the site's calendar from UTC in minutes (local timezone when unset)
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct AuthArgs {
    /// Employee number used to log in
    #[arg(long, short = 'u', env = "CASEPUNCH_USER_ID", global = true)]
    user_id: Option<String>,

    /// Login password
    #[arg(
        long,
        short = 'p',
        env = "CASEPUNCH_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    password: Option<String>,
}

impl AuthArgs {
    fn credentials(&self) -> Result<Credentials> {
        let credentials = Credentials::new(
            self.user_id.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        if !credentials.is_complete() {
            bail!("⚠️  Both --user-id and --password (or CASEPUNCH_USER_ID / CASEPUNCH_PASSWORD) are required");
        }
        Ok(credentials)
    }
}

#[derive(Parser, Debug)]
struct PunchArgs {
    /// Message prepended to each case's work log. Empty leaves the log as is.
    #[arg(long, short, default_value = "")]
    message: String,

    /// Write the run history as JSON to this file afterwards
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Do not keep this run in the session history
    #[arg(long, conflicts_with = "export")]
    no_history: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and list the case numbers of this user
    Cases,
    /// Fetch the first case's form and show its name and key
    Test,
    /// Check that the site answers at all
    Check,
    /// Punch every case of this user
    Punch(PunchArgs),
    /// Interactive session keeping the case list and history in memory
    Shell,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("❌ {e:#}");
    }

    if let Err(e) = run(cli).await {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = PunchClient::new(build_config(&cli)?).context("Failed to create client")?;

    match cli.command {
        Commands::Check => {
            let health = client.check_connectivity().await;
            display::print_health(&health);
            if !health.is_healthy() {
                std::process::exit(2);
            }
        }
        Commands::Cases => {
            let mut session = Session::new(client, cli.auth.credentials()?);
            let list = session.load_case_list().await.map_err(explain_list_error)?;
            display::print_case_list(&list);
        }
        Commands::Test => {
            let mut session = Session::new(client, cli.auth.credentials()?);
            session.load_case_list().await.map_err(explain_list_error)?;
            let preview = session
                .preview_first_case()
                .await
                .context("❌ Connection failed, check the credentials and case numbers")?;
            display::print_preview(&preview);
        }
        Commands::Punch(args) => {
            let mut session = Session::new(client, cli.auth.credentials()?)
                .with_record_history(!args.no_history);
            punch(&mut session, &args).await?;
        }
        Commands::Shell => {
            let session = Session::new(client, cli.auth.credentials()?);
            shell::run_shell(session).await?;
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid CASEPUNCH_* environment")?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(ms) = cli.delay_ms {
        config = config.with_request_delay(Duration::from_millis(ms));
    }
    if cli.utc_offset_minutes.is_some() {
        config = config.with_utc_offset_minutes(cli.utc_offset_minutes);
    }
    config.validate()?;
    Ok(config)
}

/// The case list fetch cannot tell bad credentials from an unreachable site,
/// so list the usual suspects.
pub(crate) fn explain_list_error(e: casepunch::PunchError) -> anyhow::Error {
    anyhow::Error::new(e).context(
        "Could not fetch the case list. Possible causes: wrong employee number or password, \
         network problems, or the page no longer has a `caselist1` table. \
         Run `casepunch check` to test basic connectivity.",
    )
}

async fn punch(session: &mut Session, args: &PunchArgs) -> Result<()> {
    let list = session.load_case_list().await.map_err(explain_list_error)?;
    if !args.json {
        println!("📋 Processing {} cases", list.len());
    }

    let interrupts = interrupt::Interrupts::install();
    let token = interrupts.begin_run().await;
    let result = if args.json {
        session
            .punch_all(&args.message, token, &mut casepunch::NoopObserver)
            .await
    } else {
        session
            .punch_all(&args.message, token, &mut display::ConsoleObserver)
            .await
    };
    interrupts.end_run().await;
    let summary = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        display::print_summary(&summary);
    }

    if let Some(path) = &args.export {
        session
            .history()
            .export(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("💾 Run history saved to {}", path.display());
    }

    if summary.success_count < summary.total_count {
        std::process::exit(3);
    }
    Ok(())
}
