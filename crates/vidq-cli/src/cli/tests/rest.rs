//! Tests for status, history, abort, retry, remove and completions.

use super::parse;
use crate::cli::CliCommand;
use clap_complete::Shell;

#[test]
fn cli_parse_status() {
    match parse(&["vidq", "status"]) {
        CliCommand::Status { all } => assert!(!all),
        _ => panic!("expected Status"),
    }
    match parse(&["vidq", "status", "--all"]) {
        CliCommand::Status { all } => assert!(all),
        _ => panic!("expected Status with --all"),
    }
}

#[test]
fn cli_parse_history() {
    match parse(&["vidq", "history"]) {
        CliCommand::History { clear } => assert!(!clear),
        _ => panic!("expected History"),
    }
    match parse(&["vidq", "history", "--clear"]) {
        CliCommand::History { clear } => assert!(clear),
        _ => panic!("expected History with --clear"),
    }
}

#[test]
fn cli_parse_abort() {
    match parse(&["vidq", "abort", "42"]) {
        CliCommand::Abort { id } => assert_eq!(id, 42),
        _ => panic!("expected Abort"),
    }
}

#[test]
fn cli_parse_retry() {
    match parse(&["vidq", "retry", "7"]) {
        CliCommand::Retry { id } => assert_eq!(id, 7),
        _ => panic!("expected Retry"),
    }
}

#[test]
fn cli_parse_remove() {
    match parse(&["vidq", "remove", "99"]) {
        CliCommand::Remove { id, delete_file } => {
            assert_eq!(id, 99);
            assert!(!delete_file);
        }
        _ => panic!("expected Remove"),
    }
    match parse(&["vidq", "remove", "5", "--delete-file"]) {
        CliCommand::Remove { id, delete_file } => {
            assert_eq!(id, 5);
            assert!(delete_file);
        }
        _ => panic!("expected Remove with --delete-file"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["vidq", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_non_numeric_id() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["vidq", "abort", "abc"]).is_err());
}
