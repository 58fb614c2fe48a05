//! Tests for save, save-bulk, remove, season (write form), mark, track.

use super::{parse, parse_err};
use crate::cli::CliCommand;

#[test]
fn cli_parse_save() {
    match parse(&["playmark", "save", "/show/ep1", "93.5"]) {
        CliCommand::Save { key, seconds } => {
            assert_eq!(key, "/show/ep1");
            assert!((seconds - 93.5).abs() < 1e-9);
        }
        _ => panic!("expected Save"),
    }
}

#[test]
fn cli_parse_save_rejects_non_number() {
    assert_eq!(
        parse_err(&["playmark", "save", "/show/ep1", "soon"]),
        clap::error::ErrorKind::ValueValidation
    );
}

#[test]
fn cli_parse_save_bulk() {
    match parse(&["playmark", "save-bulk", "/tmp/positions.json"]) {
        CliCommand::SaveBulk { path } => {
            assert_eq!(path, std::path::Path::new("/tmp/positions.json"))
        }
        _ => panic!("expected SaveBulk"),
    }
}

#[test]
fn cli_parse_remove_single_and_many() {
    match parse(&["playmark", "remove", "/a"]) {
        CliCommand::Remove { keys } => assert_eq!(keys, vec!["/a"]),
        _ => panic!("expected Remove"),
    }
    match parse(&["playmark", "remove", "/a", "/b"]) {
        CliCommand::Remove { keys } => assert_eq!(keys, vec!["/a", "/b"]),
        _ => panic!("expected Remove"),
    }
}

#[test]
fn cli_parse_season_write() {
    match parse(&["playmark", "season", "/game-changer", "6"]) {
        CliCommand::Season { show, season } => {
            assert_eq!(show, "/game-changer");
            assert_eq!(season.as_deref(), Some("6"));
        }
        _ => panic!("expected Season"),
    }
}

#[test]
fn cli_parse_mark_watched() {
    match parse(&["playmark", "mark", "/ep1", "/ep2", "--at", "1500"]) {
        CliCommand::Mark { keys, new, at } => {
            assert_eq!(keys, vec!["/ep1", "/ep2"]);
            assert!(!new);
            assert_eq!(at, Some(1500.0));
        }
        _ => panic!("expected Mark"),
    }
}

#[test]
fn cli_parse_mark_new() {
    match parse(&["playmark", "mark", "/ep1", "--new"]) {
        CliCommand::Mark { keys, new, at } => {
            assert_eq!(keys, vec!["/ep1"]);
            assert!(new);
            assert!(at.is_none());
        }
        _ => panic!("expected Mark"),
    }
}

#[test]
fn cli_parse_mark_needs_at_or_new() {
    assert_eq!(
        parse_err(&["playmark", "mark", "/ep1"]),
        clap::error::ErrorKind::MissingRequiredArgument
    );
    assert_eq!(
        parse_err(&["playmark", "mark", "/ep1", "--new", "--at", "10"]),
        clap::error::ErrorKind::ArgumentConflict
    );
}

#[test]
fn cli_parse_track() {
    match parse(&["playmark", "track", "/show/ep3"]) {
        CliCommand::Track { key } => assert_eq!(key, "/show/ep3"),
        _ => panic!("expected Track"),
    }
}
