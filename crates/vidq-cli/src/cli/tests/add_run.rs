//! Tests for add and run subcommands.

use super::parse;
use crate::cli::{CliCommand, SourceArg};

#[test]
fn cli_parse_add() {
    match parse(&["vidq", "add", "https://example.com/watch?v=1"]) {
        CliCommand::Add {
            locator,
            source,
            referer,
            quality,
            audio_only,
            name,
        } => {
            assert_eq!(locator, "https://example.com/watch?v=1");
            assert_eq!(source, SourceArg::Primary);
            assert!(referer.is_none());
            assert!(quality.is_none());
            assert!(!audio_only);
            assert!(name.is_none());
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_alt_with_referer() {
    match parse(&[
        "vidq",
        "add",
        "https://alt.example/e/1",
        "--source",
        "alt",
        "--referer",
        "https://alt.example/",
    ]) {
        CliCommand::Add {
            source, referer, ..
        } => {
            assert_eq!(source, SourceArg::Alt);
            assert_eq!(referer.as_deref(), Some("https://alt.example/"));
        }
        _ => panic!("expected Add with --referer"),
    }
}

#[test]
fn cli_parse_add_local_quality_name() {
    match parse(&[
        "vidq",
        "add",
        "/media/in.mkv",
        "--source",
        "local",
        "-q",
        "Same as source",
        "--name",
        "out",
    ]) {
        CliCommand::Add {
            locator,
            source,
            quality,
            name,
            ..
        } => {
            assert_eq!(locator, "/media/in.mkv");
            assert_eq!(source, SourceArg::Local);
            assert_eq!(quality.as_deref(), Some("Same as source"));
            assert_eq!(name.as_deref(), Some("out"));
        }
        _ => panic!("expected Add with local source"),
    }
}

#[test]
fn cli_parse_add_audio_only() {
    match parse(&["vidq", "add", "https://example.com/v", "--audio-only"]) {
        CliCommand::Add { audio_only, .. } => assert!(audio_only),
        _ => panic!("expected Add with --audio-only"),
    }
}

#[test]
fn cli_parse_add_rejects_unknown_source() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["vidq", "add", "x", "--source", "ftp"]).is_err());
}

#[test]
fn cli_parse_run() {
    match parse(&["vidq", "run"]) {
        CliCommand::Run { jobs, watch } => {
            assert!(jobs.is_none());
            assert!(!watch);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_jobs_watch() {
    match parse(&["vidq", "run", "--jobs", "4", "--watch"]) {
        CliCommand::Run { jobs, watch } => {
            assert_eq!(jobs, Some(4));
            assert!(watch);
        }
        _ => panic!("expected Run with --jobs and --watch"),
    }
}
