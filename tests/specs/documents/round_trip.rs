//! Document store specs
//!
//! Snapshots are saved as pretty JSON and read back through the null-safe
//! accessors, which never fail on missing or null fields.

use crate::prelude::*;
use similar_asserts::assert_eq;
use stowage_core::document::{
    bool_value, datetime_value, double_value, is_field_null, long_value, node_value, string_value,
    sum_long_values,
};
use stowage_core::{file_system_safe, shortened_entity_name};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    account: String,
    region: Option<String>,
    taken_at: String,
    databases: Vec<Database>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Database {
    name: String,
    bytes: u64,
}

fn snapshot() -> Snapshot {
    Snapshot {
        account: "acme/prod".to_string(),
        region: None,
        taken_at: "2026-03-01T08:30:00Z".to_string(),
        databases: vec![
            Database {
                name: "SALES".to_string(),
                bytes: 1024,
            },
            Database {
                name: "RAW".to_string(),
                bytes: 4096,
            },
        ],
    }
}

#[test]
fn saved_snapshot_reads_back_through_accessors() {
    let ws = Workspace::new();
    let documents = ws.documents();
    let path = ws.path("snapshots/acme/snapshot.json");

    assert!(documents.save_object(&snapshot(), &path));
    assert!(ws.read("snapshots/acme/snapshot.json").contains("\"region\": null"));

    let doc = documents.load_document(&path).unwrap();
    let root = Some(&doc);
    assert_eq!(string_value(root, "account"), "acme/prod");
    assert!(is_field_null(root, "region"));
    assert_eq!(string_value(root, "region"), "");
    assert_eq!(long_value(root, "missing"), 0);
    assert!(!bool_value(root, "missing"));
    assert_eq!(double_value(None, "anything"), 0.0);
    assert_eq!(
        datetime_value(root, "taken_at").to_rfc3339(),
        "2026-03-01T08:30:00+00:00"
    );

    let databases = node_value(root, "databases").and_then(|d| d.as_array()).unwrap();
    let total = sum_long_values(databases.iter().filter_map(|db| db.get("bytes")));
    assert_eq!(total, 5120);
}

#[test]
fn typed_list_and_array_loads_agree() {
    let ws = Workspace::new();
    let documents = ws.documents();
    let path = ws.path("databases.json");
    let rows = vec![json!({"name": "A", "bytes": 1}), json!({"name": "B", "bytes": 2})];

    assert!(documents.save_array(&rows, &path));

    let array = documents.load_document_array(&path).unwrap();
    assert_eq!(array.as_array().map(Vec::len), Some(2));
    let typed: Vec<Database> = documents.load_typed_list(&path).unwrap();
    assert_eq!(typed[1].name, "B");

    // an array file is not an object document
    assert!(documents.load_document(&path).is_none());
}

#[test]
fn entity_names_become_safe_paths() {
    let ws = Workspace::new();
    let documents = ws.documents();
    let snapshot = snapshot();
    let folder = shortened_entity_name(&snapshot.account, 8);
    let path = ws.root().join(&folder).join(format!(
        "{}.json",
        file_system_safe("SALES: daily|weekly")
    ));

    assert_eq!(folder, "acme-pro");
    assert!(documents.save_object(&snapshot, &path));
    assert!(ws.path("acme-pro/SALES- daily-weekly.json").is_file());
    assert_eq!(documents.load_typed_list::<Snapshot>(&path), None);
}

#[test]
fn missing_and_malformed_files_load_as_none() {
    let ws = Workspace::new();
    let documents = ws.documents();
    let broken = ws.file("broken.json", "{\"account\": ");

    assert!(documents.load_document(&ws.path("absent.json")).is_none());
    assert!(documents.load_document(&broken).is_none());
    assert!(documents.load_typed_list::<Database>(&broken).is_none());
}
