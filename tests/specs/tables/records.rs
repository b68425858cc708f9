//! Typed record specs

use crate::prelude::*;
use similar_asserts::assert_eq;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Warehouse {
    name: String,
    size: String,
    credits: f64,
    clusters: Option<u32>,
}

fn warehouse_map() -> RecordMap<Warehouse> {
    RecordMap::new()
        .column("name", "Warehouse")
        .column("size", "Size")
        .column("clusters", "Clusters")
        .column("credits", "Credits Used")
}

#[test]
fn columns_follow_the_map_not_the_struct() {
    let ws = Workspace::new();
    let tables = ws.tables();
    let path = ws.path("warehouses.csv");
    let warehouses = vec![
        Warehouse {
            name: "LOAD_WH".to_string(),
            size: "X-Small".to_string(),
            credits: 12.5,
            clusters: Some(2),
        },
        Warehouse {
            name: "BI_WH".to_string(),
            size: "Large".to_string(),
            credits: 0.0,
            clusters: None,
        },
    ];

    assert!(tables.write_records(Some(warehouses.as_slice()), &warehouse_map(), &path, WriteMode::CREATE));
    assert_eq!(
        ws.read("warehouses.csv"),
        "Warehouse,Size,Clusters,Credits Used\n\
         LOAD_WH,X-Small,2,12.5\n\
         BI_WH,Large,,0.0\n"
    );
    assert_eq!(
        tables.read_records(&path, &warehouse_map(), ""),
        Some(warehouses)
    );
}

#[test]
fn report_with_page_markers_reads_cleanly() {
    let ws = Workspace::new();
    let path = ws.file(
        "export.csv",
        "Warehouse,Size,Clusters,Credits Used\n\
         LOAD_WH,Small,1,3\n\
         --- page 2 ---\n\
         BI_WH,Large,,7.25\n\
         not,a,number,here\n",
    );

    let records = ws
        .tables()
        .read_records(&path, &warehouse_map(), "---")
        .unwrap();
    let names: Vec<_> = records.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["LOAD_WH", "BI_WH"]);
    assert_eq!(records[1].credits, 7.25);
}

#[test]
fn in_memory_table_matches_file_bytes() {
    let ws = Workspace::new();
    let tables = ws.tables();
    let path = ws.path("w.csv");
    let warehouses = vec![Warehouse {
        name: "ETL".to_string(),
        size: "Medium".to_string(),
        credits: 1.0,
        clusters: Some(1),
    }];

    let buffer = tables
        .write_records_to_buffer(Some(warehouses.as_slice()), &warehouse_map())
        .unwrap();
    assert!(tables.write_records(Some(warehouses.as_slice()), &warehouse_map(), &path, WriteMode::CREATE));
    assert_eq!(buffer, std::fs::read(&path).unwrap());
}
