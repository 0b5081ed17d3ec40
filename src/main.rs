#[macro_use]
mod errors;
mod dispatcher;
mod storage;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dispatcher::{ExecuteResult, MetaCommandResult, PrepareResult};
use storage::Table;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "picosql", version = VERSION, about = "Tiny disk-backed B+-tree database with a REPL front end.")]
struct Cli {
    /// Path to the database file; created if it does not exist.
    path: PathBuf,
}

fn init_logging() {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("picosql.log")
        .expect("failed to open log file");

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> ExitCode {
    // Checked by hand, ahead of `Cli::parse`, so the literal error text
    // below is never at the mercy of clap's own usage formatting.
    if std::env::args_os().nth(1).is_none() {
        eprintln!("Must supply a database filename.");
        return ExitCode::from(1);
    }
    let cli = Cli::parse();

    init_logging();

    let mut table = match Table::open(&cli.path) {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "failed to open database file");
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("db > ");
        if io::stdout().flush().is_err() {
            break;
        }

        line.clear();
        let bytes_read = match stdin.read_line(&mut line) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "failed to read from stdin");
                break;
            }
        };
        if bytes_read == 0 {
            // EOF: treat the same as `.exit`.
            break;
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);

        if trimmed.starts_with('.') {
            match dispatcher::do_meta_command(trimmed, &mut table) {
                Ok(MetaCommandResult::Exit) => break,
                Ok(MetaCommandResult::Success) => continue,
                Ok(MetaCommandResult::Unrecognized) => {
                    println!("Unrecognized command '{trimmed}'");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "fatal error handling meta command");
                    eprintln!("Error: {e}");
                    return ExitCode::from(1);
                }
            }
        }

        match dispatcher::prepare_statement(trimmed) {
            PrepareResult::Success(stmt) => {
                let result = dispatcher::execute_statement(stmt, &mut table);
                match result {
                    ExecuteResult::Success => println!("Executed."),
                    ExecuteResult::DuplicateKey => println!("Error: Duplicate key."),
                    ExecuteResult::TableFull => println!("Error: Table full."),
                    ExecuteResult::Failure => println!("Error: failed to execute statement."),
                }
            }
            PrepareResult::SyntaxError => {
                println!("Syntax error. Could not parse statement {trimmed}");
            }
            PrepareResult::NegativeId => println!("ID must be positive."),
            PrepareResult::StringTooLong => println!("String is too long."),
            PrepareResult::UnrecognizedStatement => {
                println!("Unrecognized keyword at start of '{trimmed}'.");
            }
        }
    }

    match table.close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!(error = %e, "failed to flush database file on exit");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
