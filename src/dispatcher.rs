//! Translates a line of REPL input into a call on the storage engine.
//!
//! This module owns the two small, non-`Error` result enums the engine's
//! design keeps separate from `errors::Error` (see that module): parsing
//! and execution report a status by value, matched exhaustively by the
//! caller, rather than propagated as a failure.
use crate::errors::Error;
use crate::storage::cursor::Cursor;
use crate::storage::row::{self, Row};
use crate::storage::{debug, InsertError, Table};

pub enum MetaCommandResult {
    Success,
    Exit,
    Unrecognized,
}

pub enum Statement {
    Insert(Row),
    Select,
}

pub enum PrepareResult {
    Success(Statement),
    SyntaxError,
    NegativeId,
    StringTooLong,
    UnrecognizedStatement,
}

pub enum ExecuteResult {
    Success,
    DuplicateKey,
    TableFull,
    Failure,
}

/// Handles a `.`-prefixed line. `.btree`/`.constants` read straight from
/// the table and print their own output; the caller only needs to act on
/// `Exit` and `Unrecognized`.
pub fn do_meta_command(line: &str, table: &mut Table) -> Result<MetaCommandResult, Error> {
    match line {
        ".exit" => Ok(MetaCommandResult::Exit),
        ".constants" => {
            println!("Constants:");
            for l in debug::print_constants() {
                println!("{l}");
            }
            Ok(MetaCommandResult::Success)
        }
        ".btree" => {
            println!("Tree:");
            for l in debug::print_tree(table, table.root_page_num(), 0)? {
                println!("{l}");
            }
            Ok(MetaCommandResult::Success)
        }
        _ => Ok(MetaCommandResult::Unrecognized),
    }
}

/// Parses a non-meta line into a `Statement`, applying the validation the
/// engine itself never performs: id range and string-length limits.
pub fn prepare_statement(line: &str) -> PrepareResult {
    match line.split_whitespace().next() {
        Some("select") => PrepareResult::Success(Statement::Select),
        Some("insert") => prepare_insert(line),
        _ => PrepareResult::UnrecognizedStatement,
    }
}

fn prepare_insert(line: &str) -> PrepareResult {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return PrepareResult::SyntaxError;
    }

    let id_str = parts[1];
    let id: i64 = match id_str.parse() {
        Ok(v) => v,
        Err(_) => {
            return if id_str.starts_with('-') {
                PrepareResult::NegativeId
            } else {
                PrepareResult::SyntaxError
            };
        }
    };
    if id < 0 {
        return PrepareResult::NegativeId;
    }
    // ids are serialized as u32 but the reference engine keeps the
    // original int32 ceiling, not the full unsigned range.
    if id > i32::MAX as i64 {
        return PrepareResult::SyntaxError;
    }

    let username = parts[2];
    let email = parts[3];
    if username.len() > row::COLUMN_USERNAME_SIZE {
        return PrepareResult::StringTooLong;
    }
    if email.len() > row::COLUMN_EMAIL_SIZE {
        return PrepareResult::StringTooLong;
    }

    PrepareResult::Success(Statement::Insert(Row::new(id as u32, username, email)))
}

/// Runs a prepared statement against the table, printing select rows as
/// it scans them.
pub fn execute_statement(stmt: Statement, table: &mut Table) -> ExecuteResult {
    match stmt {
        Statement::Insert(row) => match table.insert(&row) {
            Ok(()) => ExecuteResult::Success,
            Err(InsertError::Duplicate) => ExecuteResult::DuplicateKey,
            Err(InsertError::Full) => ExecuteResult::TableFull,
            Err(InsertError::Engine(_)) => ExecuteResult::Failure,
        },
        Statement::Select => execute_select(table),
    }
}

fn execute_select(table: &mut Table) -> ExecuteResult {
    let mut cursor = match Cursor::scan_start(table) {
        Ok(c) => c,
        Err(_) => return ExecuteResult::Failure,
    };
    while !cursor.end_of_table {
        let bytes = match cursor.value(table) {
            Ok(b) => b,
            Err(_) => return ExecuteResult::Failure,
        };
        let row = row::deserialize(bytes);
        println!("{row}");
        if cursor.advance(table).is_err() {
            return ExecuteResult::Failure;
        }
    }
    ExecuteResult::Success
}
