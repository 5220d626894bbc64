// Copyright (c) 2025 - Cowboy AI, Inc.
//! CSV export tests

mod fixtures;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use fixtures::*;
use inventory_synth::export::{CsvDirectorySink, ExportSink};
use inventory_synth::ReportCategory;

#[tokio::test]
async fn test_one_csv_per_category() {
    let output = run_scenario(two_vm_scenario()).await;
    let dir = TempDir::new().unwrap();

    let mut sink = CsvDirectorySink::new(dir.path().join("out")).unwrap();
    sink.write_all(&output.reports).unwrap();

    assert_eq!(sink.written().len(), ReportCategory::ALL.len());
    for category in ReportCategory::ALL {
        let path = dir.path().join("out").join(format!("{}.csv", category.as_str()));
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[tokio::test]
async fn test_csv_round_trips_headers_and_rows() {
    let output = run_scenario(two_vm_scenario()).await;
    let report = output.report(ReportCategory::VInfo).unwrap();
    let dir = TempDir::new().unwrap();

    let mut sink = CsvDirectorySink::new(dir.path()).unwrap();
    sink.write_report(report).unwrap();

    let mut reader = csv::Reader::from_path(dir.path().join("vInfo.csv")).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, report.headers);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    assert_eq!(rows, report.rows);
}
