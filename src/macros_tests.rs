use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::*;
use crate::config::PathsConfig;

fn table(pairs: &[(&str, &str)]) -> MacroTable {
    pairs.iter().copied().collect()
}

#[test]
fn expands_both_layers() {
    let process = table(&[("OUT_DIR", "/abs/out")]);
    let context = table(&[("FILE", "t1")]);
    let expanded = process.expand("$OUT_DIR/$FILE.out", &context).unwrap();
    assert_eq!(expanded, "/abs/out/t1.out");
}

#[test]
fn longest_identifier_wins() {
    let process = table(&[("OUT_DIR", "/abs/out")]);
    let context = table(&[("OUT", "/abs/out/t1.out")]);
    assert_eq!(process.expand("$OUT_DIR", &context).unwrap(), "/abs/out");
    assert_eq!(process.expand("$OUT", &context).unwrap(), "/abs/out/t1.out");
}

#[test]
fn braced_form_delimits_name() {
    let context = table(&[("N", "3")]);
    let expanded = MacroTable::new().expand("run${N}x", &context).unwrap();
    assert_eq!(expanded, "run3x");
}

#[test]
fn unknown_tokens_are_left_alone() {
    let expanded = MacroTable::new()
        .expand("$HOME and $1 and $", &MacroTable::new())
        .unwrap();
    assert_eq!(expanded, "$HOME and $1 and $");
}

#[test]
fn process_wide_layer_wins_conflicts() {
    let process = table(&[("FILE", "from-config")]);
    let context = table(&[("FILE", "from-context")]);
    assert_eq!(process.expand("$FILE", &context).unwrap(), "from-config");
}

#[test]
fn nested_macros_expand_to_fixed_point() {
    let process = table(&[("DATA", "$IN_DIR/data"), ("IN_DIR", "/abs/in")]);
    let context = table(&[("FILE", "t2")]);
    let expanded = process.expand("$DATA/$FILE", &context).unwrap();
    assert_eq!(expanded, "/abs/in/data/t2");
}

#[test]
fn expansion_is_idempotent_at_fixed_point() {
    let process = table(&[("A", "$B-x"), ("B", "b")]);
    let context = table(&[("N", "0")]);
    let once = process.expand("$A/$N/$UNKNOWN", &context).unwrap();
    let twice = process.expand(&once, &context).unwrap();
    assert_eq!(once, "b-x/0/$UNKNOWN");
    assert_eq!(once, twice);
}

#[test]
fn cyclic_definitions_fail_instead_of_hanging() {
    let process = table(&[("A", "$B"), ("B", "$A")]);
    let err = process.expand("$A", &MacroTable::new()).unwrap_err();
    assert!(matches!(
        err,
        CheckerError::MacroExpansion {
            passes: MAX_EXPANSION_PASSES,
            ..
        }
    ));
}

#[test]
fn self_growing_definition_fails() {
    let process = table(&[("A", "x$A")]);
    assert!(process.expand("$A", &MacroTable::new()).is_err());
}

#[test]
fn expand_all_keeps_argument_order() {
    let context = table(&[("IN", "/i/t.in"), ("OUT", "/o/t.out")]);
    let args = vec!["$IN".to_string(), "--flag".to_string(), "$OUT".to_string()];
    let expanded = MacroTable::new().expand_all(&args, &context).unwrap();
    assert_eq!(expanded, vec!["/i/t.in", "--flag", "/o/t.out"]);
}

#[test]
fn test_context_macros() {
    let paths = ResolvedPaths::resolve_in(&PathsConfig::default(), Path::new("/w"));
    let context = MacroTable::test_context(2, "t3", &paths);
    assert_eq!(context.get("FILE"), Some("t3"));
    assert_eq!(context.get("IN"), Some("/w/tests/in/t3.in"));
    assert_eq!(context.get("OUT"), Some("/w/tests/out/t3.out"));
    assert_eq!(context.get("N"), Some("2"));
}

#[test]
fn process_wide_skips_missing_directories() {
    let dir = TempDir::new().unwrap();
    let paths = ResolvedPaths::resolve_in(&PathsConfig::default(), dir.path());
    let table = MacroTable::process_wide(&paths, &IndexMap::new());

    assert_eq!(table.get("OUT_DIR"), Some(paths.output.display().to_string().as_str()));
    assert!(table.get("IN_DIR").is_none());
    assert!(table.get("SRC_DIR").is_none());
}

#[test]
fn process_wide_includes_existing_directories_and_user_macros() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("tests/in")).unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    let paths = ResolvedPaths::resolve_in(&PathsConfig::default(), dir.path());

    let mut user = IndexMap::new();
    user.insert("MODE".to_string(), "fast".to_string());
    let table = MacroTable::process_wide(&paths, &user);

    let in_dir = PathBuf::from(table.get("IN_DIR").unwrap());
    assert!(in_dir.is_absolute());
    assert!(in_dir.ends_with("tests/in"));
    assert!(table.get("SRC_DIR").is_some());
    assert_eq!(table.get("MODE"), Some("fast"));
}

#[test]
fn user_macros_replace_builtins_and_shadow_test_context() {
    let dir = TempDir::new().unwrap();
    let paths = ResolvedPaths::resolve_in(&PathsConfig::default(), dir.path());
    let mut user = IndexMap::new();
    user.insert("OUT_DIR".to_string(), "/custom/out".to_string());
    user.insert("IN".to_string(), "stdin.txt".to_string());
    let table = MacroTable::process_wide(&paths, &user);
    let context = MacroTable::test_context(0, "t1", &paths);

    assert_eq!(table.expand("$OUT_DIR $IN $FILE", &context).unwrap(), "/custom/out stdin.txt t1");
}
