//! Copyright © 2025-2026 The Rowflow Authors. All Rights Reserved.
//!
//! This file is part of Rowflow.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::io::{Cursor, Read};

use serde_json::{json, Value};
use zip::ZipArchive;

use rowflow::{
    RfArraySource, RfChunk, RfDataSource, RfError, RfExportConfig, RfExportOptions, RfExporter,
    RfFixedMemoryProbe, RfMemoryTransport, RfNullListener, RfRow, RfSheetSpec,
};

fn row(value: Value) -> RfRow {
    value.as_object().cloned().expect("object row")
}

fn exporter() -> RfExporter {
    let mut config = RfExportConfig::default();
    config.filename.timestamp = false;
    RfExporter::new(config)
        .with_listener(Box::new(RfNullListener))
        .with_memory_probe(Box::new(RfFixedMemoryProbe(None)))
}

fn people_sheet(name: &str) -> RfSheetSpec {
    let rows = vec![
        row(json!({"name": "Ann", "rank": 1})),
        row(json!({"name": "Bo", "rank": 2})),
    ];
    let headers = vec!["name".to_string(), "rank".to_string()];
    RfSheetSpec::new(name, Box::new(RfArraySource::new(rows, headers).unwrap()))
}

fn export_workbook(sheets: Vec<RfSheetSpec>) -> Vec<u8> {
    let mut transport = RfMemoryTransport::new();
    exporter()
        .export_sheets(sheets, "report", &RfExportOptions::default(), &mut transport)
        .unwrap();
    transport.into_bytes()
}

fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut part = archive.by_name(name).expect(name);
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn package_contains_every_manifest_part() {
    let bytes = export_workbook(vec![people_sheet("People")]);
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let names: Vec<&str> = archive.file_names().collect();
    for expected in [
        "[Content_Types].xml",
        "_rels/.rels",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/worksheets/sheet1.xml",
    ] {
        assert!(names.contains(&expected), "missing part {expected}");
    }
}

#[test]
fn sheet_order_and_ids_stay_consistent_across_parts() {
    let bytes = export_workbook(vec![people_sheet("First"), people_sheet("Second")]);
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let workbook = read_part(&mut archive, "xl/workbook.xml");
    let first = workbook.find("name=\"First\" sheetId=\"1\" r:id=\"rId1\"").unwrap();
    let second = workbook.find("name=\"Second\" sheetId=\"2\" r:id=\"rId2\"").unwrap();
    assert!(first < second);

    let rels = read_part(&mut archive, "xl/_rels/workbook.xml.rels");
    assert!(rels.contains("Id=\"rId1\""));
    assert!(rels.contains("Target=\"worksheets/sheet1.xml\""));
    assert!(rels.contains("Id=\"rId2\""));
    assert!(rels.contains("Target=\"worksheets/sheet2.xml\""));

    let types = read_part(&mut archive, "[Content_Types].xml");
    assert!(types.contains("PartName=\"/xl/worksheets/sheet1.xml\""));
    assert!(types.contains("PartName=\"/xl/worksheets/sheet2.xml\""));
    assert!(types.contains("PartName=\"/xl/workbook.xml\""));
}

#[test]
fn worksheet_holds_header_then_ordered_data_rows() {
    let bytes = export_workbook(vec![people_sheet("People")]);
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let sheet = read_part(&mut archive, "xl/worksheets/sheet1.xml");
    assert!(sheet.starts_with("<?xml version=\"1.0\""));
    assert!(sheet.contains("<row r=\"1\"><c r=\"A1\" t=\"inlineStr\"><is><t>name</t></is></c>"));
    assert!(sheet.contains("<row r=\"2\"><c r=\"A2\" t=\"inlineStr\"><is><t>Ann</t></is></c>"));
    assert!(sheet.contains("<row r=\"3\"><c r=\"A3\" t=\"inlineStr\"><is><t>Bo</t></is></c>"));
    assert!(sheet.ends_with("</sheetData></worksheet>"));
}

#[test]
fn sheet_names_are_escaped_in_the_workbook_part() {
    let bytes = export_workbook(vec![people_sheet("P & L")]);
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let workbook = read_part(&mut archive, "xl/workbook.xml");
    assert!(workbook.contains("name=\"P &amp; L\""));
}

#[test]
fn single_source_packaged_export_gets_a_default_sheet() {
    let rows = vec![row(json!({"a": 1}))];
    let options = RfExportOptions {
        format: Some("xlsx".to_string()),
        ..RfExportOptions::default()
    };
    let mut transport = RfMemoryTransport::new();
    exporter()
        .export_rows(rows, vec!["a".to_string()], "one", &options, &mut transport)
        .unwrap();

    assert_eq!(
        transport.head().unwrap().content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let mut archive = ZipArchive::new(Cursor::new(transport.into_bytes())).unwrap();
    let workbook = read_part(&mut archive, "xl/workbook.xml");
    assert!(workbook.contains("name=\"Sheet1\""));
}

#[test]
fn overlong_sheet_name_is_rejected_before_output() {
    let name = "x".repeat(32);
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        vec![people_sheet(&name)],
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidSheet(_))));
    assert!(transport.head().is_none());
    assert!(transport.bytes().is_empty());
}

#[test]
fn forbidden_character_in_sheet_name_is_rejected() {
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        vec![people_sheet("a:b")],
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidSheet(_))));
}

#[test]
fn duplicate_sheet_names_are_rejected_case_insensitively() {
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        vec![people_sheet("Data"), people_sheet("DATA")],
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidSheet(_))));
}

#[test]
fn sheet_count_limit_is_enforced() {
    let sheets: Vec<RfSheetSpec> = (0..21).map(|i| people_sheet(&format!("s{i}"))).collect();
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        sheets,
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidSheet(_))));
}

#[test]
fn empty_workbook_is_rejected() {
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        Vec::new(),
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidSheet(_))));
}

struct BrokenSource {
    headers: Vec<String>,
}

impl RfDataSource for BrokenSource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_chunk(&mut self, _size: usize) -> rowflow::Result<Option<RfChunk>> {
        Err(RfError::source("cursor expired"))
    }
}

#[test]
fn source_failure_during_assembly_leaves_the_head_unsent() {
    let broken = RfSheetSpec::new(
        "Data",
        Box::new(BrokenSource {
            headers: vec!["n".to_string()],
        }),
    );
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        vec![people_sheet("People"), broken],
        "report",
        &RfExportOptions::default(),
        &mut transport,
    );

    assert!(matches!(result, Err(RfError::Source(_))));
    assert!(transport.head().is_none());
    assert!(transport.bytes().is_empty());
}

#[test]
fn zero_chunk_size_option_is_rejected_before_output() {
    let options = RfExportOptions {
        chunk_size: Some(0),
        ..RfExportOptions::default()
    };
    let mut transport = RfMemoryTransport::new();
    let result = exporter().export_sheets(
        vec![people_sheet("People")],
        "report",
        &options,
        &mut transport,
    );
    assert!(matches!(result, Err(RfError::InvalidChunkSize(0))));
    assert!(transport.head().is_none());
}
