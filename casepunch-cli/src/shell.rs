use crate::display;
use crate::explain_list_error;
use crate::interrupt::Interrupts;
use anyhow::Result;
use casepunch::history::export_file_name;
use casepunch::{ExecutionHistory, Session};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Fetch,
    Clear,
    Test,
    Punch(String),
    History,
    ClearHistory,
    AutoSave(Option<bool>),
    Export(Option<PathBuf>),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(input: &str) -> Option<ShellCommand> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "fetch" => ShellCommand::Fetch,
        "clear" => ShellCommand::Clear,
        "test" => ShellCommand::Test,
        "punch" => ShellCommand::Punch(rest.to_string()),
        "history" => ShellCommand::History,
        "clear-history" => ShellCommand::ClearHistory,
        "autosave" => match rest.to_lowercase().as_str() {
            "" => ShellCommand::AutoSave(None),
            "on" => ShellCommand::AutoSave(Some(true)),
            "off" => ShellCommand::AutoSave(Some(false)),
            _ => ShellCommand::Unknown(input.to_string()),
        },
        "export" if rest.is_empty() => ShellCommand::Export(None),
        "export" => ShellCommand::Export(Some(PathBuf::from(rest))),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Unknown(other.to_string()),
    };
    Some(command)
}

fn print_help() {
    println!("\n📚 Commands:");
    println!("   fetch            - fetch the case list for the logged-in user");
    println!("   clear            - forget the fetched case list");
    println!("   test             - fetch the first case and show its name and key");
    println!("   punch [message]  - punch every case, prefixing the message to the log");
    println!("   history          - show the runs made in this session");
    println!("   clear-history    - forget the run history");
    println!("   autosave on|off  - keep finished runs in the history (default on)");
    println!("   export [path]    - save the run history as JSON");
    println!("   quit             - leave the shell\n");
}

/// Write the history to `path`, or to a timestamped file in the working
/// directory. Failures come back as a message so the shell keeps running.
fn export_history(history: &ExecutionHistory, path: Option<PathBuf>) -> Result<String, String> {
    if history.is_empty() {
        return Ok("📝 Nothing to export yet".to_string());
    }
    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Local::now())));
    match history.export(&path) {
        Ok(()) => Ok(format!("💾 History written to {}", path.display())),
        Err(e) => Err(format!("❌ Failed to write {}: {e}", path.display())),
    }
}

/// Read commands from stdin until `quit` or end of input. The case list,
/// caches and run history live as long as the shell does.
pub async fn run_shell(mut session: Session) -> Result<()> {
    println!("🤖 casepunch shell for user {}", session.credentials().user_id);
    print_help();

    let interrupts = Interrupts::install();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = match session.case_list() {
            Some(list) => format!("punch [{} cases]> ", list.len()),
            None => "punch> ".to_string(),
        };
        print!("{prompt}");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let Some(command) = parse_command(&input) else {
            continue;
        };
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::Quit => {
                println!("👋 Goodbye!");
                break;
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Fetch => {
                println!("🔍 Fetching your case list...");
                match session.load_case_list().await {
                    Ok(list) => display::print_case_list(&list),
                    Err(e) => println!("{}", format!("❌ {:#}", explain_list_error(e)).red()),
                }
            }
            ShellCommand::Clear => {
                session.clear_case_list();
                println!("🗑️  Case list cleared. Use `fetch` to load it again.");
            }
            ShellCommand::Test => {
                if session.case_list().is_none() {
                    println!("⚠️  Use `fetch` to load your case list first");
                    continue;
                }
                match session.preview_first_case().await {
                    Ok(preview) => display::print_preview(&preview),
                    Err(e) => println!("{}", format!("❌ Connection test failed: {e}").red()),
                }
            }
            ShellCommand::Punch(message) => {
                if session.case_list().is_none() {
                    println!("⚠️  Use `fetch` to load your case list first");
                    continue;
                }
                let token = interrupts.begin_run().await;
                let result = session
                    .punch_all(&message, token, &mut display::ConsoleObserver)
                    .await;
                interrupts.end_run().await;
                match result {
                    Ok(summary) => {
                        display::print_summary(&summary);
                        if session.records_history() {
                            println!("💾 Run saved to the session history");
                        }
                    }
                    Err(e) => println!("{}", format!("❌ Run failed: {e}").red()),
                }
            }
            ShellCommand::History => display::print_history(session.history()),
            ShellCommand::ClearHistory => {
                session.clear_history();
                println!("✅ History cleared");
            }
            ShellCommand::AutoSave(Some(on)) => {
                session.set_record_history(on);
                println!("✅ Autosave {}", if on { "on" } else { "off" });
            }
            ShellCommand::AutoSave(None) => {
                let state = if session.records_history() { "on" } else { "off" };
                println!("💾 Autosave is {state}");
            }
            ShellCommand::Export(path) => match export_history(session.history(), path) {
                Ok(message) => println!("{message}"),
                Err(message) => println!("{}", message.red()),
            },
            ShellCommand::Unknown(word) => {
                println!("❓ Unknown command `{word}`. Type `help` for the list.");
            }
        }
    }

    Ok(())
}
