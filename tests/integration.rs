//! Black-box scenarios from the top-level design notes, run against the
//! compiled binary exactly as a real user would drive it: piped stdin,
//! captured stdout. Each test gets its own database file under a
//! `tempfile::TempDir` so runs never collide or leave state on disk.
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str;

fn spawn(db_path: &Path, input: &[String]) -> Vec<String> {
    let mut process = Command::new(env!("CARGO_BIN_EXE_picosql"))
        .arg(db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to start picosql");

    let stdin = process.stdin.as_mut().expect("failed to pipe stdin");
    for line in input {
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .unwrap_or_else(|_| panic!("failed to write command `{line}`"));
    }

    let output = process
        .wait_with_output()
        .expect("failed to collect process output");

    // The `db > ` prompt has no trailing newline, so it runs into whatever
    // is printed right after it; strip every occurrence before splitting
    // into lines so assertions below see only the statements' own output.
    str::from_utf8(&output.stdout)
        .expect("stdout was not valid utf-8")
        .replace("db > ", "\n")
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

#[test]
fn single_insert_and_select() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let output = spawn(
        &db,
        &[
            "insert 1 user1 person1@example.com".to_owned(),
            "select".to_owned(),
            ".exit".to_owned(),
        ],
    );

    assert!(output.iter().any(|l| l == "Executed."));
    assert!(output
        .iter()
        .any(|l| l == "(1, user1, person1@example.com)"));
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    spawn(
        &db,
        &[
            "insert 1 user1 person1@example.com".to_owned(),
            ".exit".to_owned(),
        ],
    );

    let output = spawn(&db, &["select".to_owned(), ".exit".to_owned()]);

    assert!(output
        .iter()
        .any(|l| l == "(1, user1, person1@example.com)"));
}

#[test]
fn rejects_duplicate_key() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let output = spawn(
        &db,
        &[
            "insert 1 user1 person1@example.com".to_owned(),
            "insert 1 user2 person2@example.com".to_owned(),
            "select".to_owned(),
            ".exit".to_owned(),
        ],
    );

    assert!(output.iter().any(|l| l == "Error: Duplicate key."));
    let selected: Vec<_> = output
        .iter()
        .filter(|l| l.starts_with('('))
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0], "(1, user1, person1@example.com)");
}

#[test]
fn validates_insert_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let long_username = "a".repeat(33);
    let output = spawn(
        &db,
        &[
            "insert -1 a a@a".to_owned(),
            format!("insert 1 {long_username} a@a"),
            "insert 1 a a".to_owned(),
            "insert 1 a".to_owned(),
            ".exit".to_owned(),
        ],
    );

    assert!(output.iter().any(|l| l == "ID must be positive."));
    assert!(output.iter().any(|l| l == "String is too long."));
    assert!(output.iter().any(|l| l == "Executed."));
    assert!(output
        .iter()
        .any(|l| l.starts_with("Syntax error. Could not parse statement")));
}

#[test]
fn leaf_split_promotes_a_new_root() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let mut input: Vec<String> = (1..=14)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    input.push(".btree".to_owned());
    input.push("select".to_owned());
    input.push(".exit".to_owned());

    let output = spawn(&db, &input);

    let tree_start = output.iter().position(|l| l == "Tree:").unwrap();
    let tree: Vec<&str> = output[tree_start + 1..tree_start + 19]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        tree,
        vec![
            "- internal (size 1)",
            "  - leaf (size 7)",
            "    - 1",
            "    - 2",
            "    - 3",
            "    - 4",
            "    - 5",
            "    - 6",
            "    - 7",
            "  - key 7",
            "  - leaf (size 7)",
            "    - 8",
            "    - 9",
            "    - 10",
            "    - 11",
            "    - 12",
            "    - 13",
            "    - 14",
        ]
    );

    let selected: Vec<&String> = output.iter().filter(|l| l.starts_with('(')).collect();
    assert_eq!(selected.len(), 14);
    for (i, line) in selected.iter().enumerate() {
        let id = i as u32 + 1;
        assert_eq!(**line, format!("({id}, user{id}, person{id}@example.com)"));
    }
}

#[test]
fn scan_is_ordered_regardless_of_insert_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let output = spawn(
        &db,
        &[
            "insert 3 user3 person3@example.com".to_owned(),
            "insert 1 user1 person1@example.com".to_owned(),
            "insert 2 user2 person2@example.com".to_owned(),
            "select".to_owned(),
            ".exit".to_owned(),
        ],
    );

    let selected: Vec<&String> = output.iter().filter(|l| l.starts_with('(')).collect();
    assert_eq!(
        selected,
        vec![
            "(1, user1, person1@example.com)",
            "(2, user2, person2@example.com)",
            "(3, user3, person3@example.com)",
        ]
    );
}

#[test]
fn constants_command_prints_exact_layout_figures() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");

    let output = spawn(&db, &[".constants".to_owned(), ".exit".to_owned()]);

    for expected in [
        "ROW_SIZE: 293",
        "COMMON_NODE_HEADER_SIZE: 6",
        "LEAF_NODE_HEADER_SIZE: 14",
        "LEAF_NODE_CELL_SIZE: 297",
        "LEAF_NODE_SPACE_FOR_CELLS: 4082",
        "LEAF_NODE_MAX_CELLS: 13",
    ] {
        assert!(
            output.iter().any(|l| l == expected),
            "missing line: {expected}"
        );
    }
}

#[test]
fn missing_filename_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_picosql"))
        .output()
        .expect("failed to start picosql");
    assert!(!output.status.success());
    assert!(str::from_utf8(&output.stderr)
        .unwrap()
        .contains("Must supply a database filename."));
}
