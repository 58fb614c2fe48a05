//! Tests for get, get-bulk, season (read form), status.

use super::{parse, parse_err};
use crate::cli::CliCommand;

#[test]
fn cli_parse_get() {
    match parse(&["playmark", "get", "/show/season:1/videos/ep1"]) {
        CliCommand::Get { key } => assert_eq!(key, "/show/season:1/videos/ep1"),
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_bulk() {
    match parse(&["playmark", "get-bulk", "/a", "/b", "/c"]) {
        CliCommand::GetBulk { keys } => assert_eq!(keys, vec!["/a", "/b", "/c"]),
        _ => panic!("expected GetBulk"),
    }
}

#[test]
fn cli_parse_get_bulk_requires_a_key() {
    assert_eq!(
        parse_err(&["playmark", "get-bulk"]),
        clap::error::ErrorKind::MissingRequiredArgument
    );
}

#[test]
fn cli_parse_season_read() {
    match parse(&["playmark", "season", "/dimension-20"]) {
        CliCommand::Season { show, season } => {
            assert_eq!(show, "/dimension-20");
            assert!(season.is_none());
        }
        _ => panic!("expected Season"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["playmark", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}
