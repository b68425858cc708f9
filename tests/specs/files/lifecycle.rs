//! File operation specs
//!
//! Folder trees are staged, copied and removed through `FileOps`
//! configured from a TOML file.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::io::Write;
use std::time::Duration;

const CONFIG: &str = r#"
copy_chunk_size = 4096

[folder_delete]
max_attempts = 5
delay = "250ms"

[file_delete]
max_attempts = 2
"#;

#[test]
fn config_file_drives_policies() {
    let ws = Workspace::new();
    let path = ws.file("stowage.toml", CONFIG);

    let config = StoreConfig::load(&path).unwrap();
    assert_eq!(config.copy_chunk_size, 4096);
    assert_eq!(config.folder_delete.max_attempts, 5);
    assert_eq!(config.folder_delete.delay, Duration::from_millis(250));
    assert_eq!(config.file_delete.max_attempts, 2);
    assert_eq!(config.file_delete.delay, Duration::from_secs(3));

    let files = FileOps::from_config(&config).with_sleeper(ws.sleeper.clone());
    let tables = TabularStore::from_config(files.clone(), &config);
    let target = ws.file("t.csv", "a\n1\n");
    let source = ws.file("s.csv", "a\n2\n");
    assert!(tables.append_table(&target, &source));
    assert!(files.delete_file(&source));
    assert!(!source.exists());
    assert!(ws.sleeper.slept().is_empty());
}

#[test]
fn staged_tree_is_copied_then_removed() {
    let ws = Workspace::new();
    let files = ws.files();
    ws.file("stage/summary.json", "{}");
    ws.file("stage/pages/1.csv", "a\n1\n");
    ws.file("stage/pages/2.csv", "a\n2\n");

    assert!(files.copy_folder(&ws.path("stage"), &ws.path("out/run-1")));
    assert_eq!(ws.read("out/run-1/pages/2.csv"), "a\n2\n");
    assert_eq!(ws.read("out/run-1/summary.json"), "{}");

    assert!(files.delete_folder(&ws.path("stage")));
    assert!(!ws.path("stage").exists());
    // deleting again is still a success
    assert!(files.delete_folder(&ws.path("stage")));
    assert!(files.delete_file(&ws.path("stage/summary.json")));
}

#[test]
fn text_files_round_trip_with_and_without_bom() {
    let ws = Workspace::new();
    let files = ws.files();
    let with_bom = ws.path("notes/bom.txt");
    let plain = ws.path("notes/plain.txt");

    assert!(files.save_text("héllo\n", &with_bom, Bom::Include));
    assert!(files.save_text("héllo\n", &plain, Bom::Omit));

    assert!(std::fs::read(&with_bom).unwrap().starts_with(&[0xEF, 0xBB, 0xBF]));
    assert_eq!(files.read_text(&with_bom), "héllo\n");
    assert_eq!(files.read_text(&plain), "héllo\n");
    assert_eq!(files.read_text(&ws.path("notes/none.txt")), "");
}

#[test]
fn text_writer_creates_parent_folders() {
    let ws = Workspace::new();
    let files = ws.files();

    let mut writer = files.create_text_writer(&ws.path("logs/run/out.txt")).unwrap();
    writeln!(writer, "line one").unwrap();
    writer.flush().unwrap();
    drop(writer);

    assert_eq!(ws.read("logs/run/out.txt"), "line one\n");
}
