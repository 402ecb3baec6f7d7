mod common;

use std::path::Path;

use swftriage::absolute_path;
use swftriage::commands::{analyze_command, collect_tags, list_heuristics_command, AnalyzeArgs};
use tempfile::tempdir;

#[test]
fn absolute_path_keeps_absolute_and_joins_relative() {
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(absolute_path("movie.swf").unwrap(), cwd.join("movie.swf"));
    let abs = cwd.join("x.swf");
    assert_eq!(absolute_path(abs.to_str().unwrap()).unwrap(), abs);
}

#[test]
fn collect_tags_names_analyzed_kinds() {
    let temp = tempdir().unwrap();
    let swf = common::write_swf(
        temp.path(),
        "kinds.swf",
        &[common::symbol_class(&[(0, "Main")]), (1, Vec::new()), common::do_abc("m", b"\x10\x00")],
    );
    let listing = collect_tags(&swf).unwrap();
    let kinds: Vec<Option<&str>> = listing.tags.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![Some("SymbolClass"), None, Some("DoABC"), None]);
    assert_eq!(listing.header.version, 10);
}

#[test]
fn collect_tags_reports_missing_file() {
    let err = collect_tags(Path::new("/definitely/not/here.swf")).unwrap_err();
    assert!(err.to_string().contains("Failed to read input file"));
}

#[test]
fn analyze_command_fails_on_missing_config() {
    let temp = tempdir().unwrap();
    let swf = common::write_swf(temp.path(), "a.swf", &[]);
    let args = AnalyzeArgs {
        file: swf.display().to_string(),
        config: Some(temp.path().join("nope.json").display().to_string()),
        ..AnalyzeArgs::default()
    };
    let err = analyze_command(&args).unwrap_err();
    assert!(err.to_string().contains("Failed to read config"));
}

#[test]
fn list_heuristics_succeeds_in_both_modes() {
    list_heuristics_command(false).unwrap();
    list_heuristics_command(true).unwrap();
}
