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

use serde_json::json;

use rowflow::{RfCsvConfig, RfCsvRowEncoder, RfSheetRowEncoder};

#[test]
fn csv_specials_round_trip_through_a_standard_reader() {
    let mut encoder = RfCsvRowEncoder::new(&RfCsvConfig::default());
    let values = vec![
        json!("plain"),
        json!("com,ma"),
        json!("qu\"ote"),
        json!("new\nline"),
    ];
    let bytes = encoder.encode_row(&values).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    let record = reader.records().next().unwrap().unwrap();
    let fields: Vec<&str> = record.iter().collect();
    assert_eq!(fields, vec!["plain", "com,ma", "qu\"ote", "new\nline"]);
}

#[test]
fn custom_delimiter_is_honored() {
    let config = RfCsvConfig {
        delimiter: b';',
        ..RfCsvConfig::default()
    };
    let mut encoder = RfCsvRowEncoder::new(&config);
    let bytes = encoder.encode_row(&[json!("a"), json!("b")]).unwrap();
    assert_eq!(bytes, b"a;b\n");
}

#[test]
fn crlf_terminator_is_honored() {
    let config = RfCsvConfig {
        crlf: true,
        ..RfCsvConfig::default()
    };
    let mut encoder = RfCsvRowEncoder::new(&config);
    let bytes = encoder.encode_row(&[json!("a")]).unwrap();
    assert_eq!(bytes, b"a\r\n");
}

#[test]
fn header_record_is_plain_fields() {
    let mut encoder = RfCsvRowEncoder::new(&RfCsvConfig::default());
    let bytes = encoder
        .encode_header(&["Name".to_string(), "Email".to_string()])
        .unwrap();
    assert_eq!(bytes, b"Name,Email\n");
}

#[test]
fn nulls_and_scalars_coerce_to_text() {
    let mut encoder = RfCsvRowEncoder::new(&RfCsvConfig::default());
    let bytes = encoder
        .encode_row(&[json!(null), json!(42), json!(true)])
        .unwrap();
    assert_eq!(bytes, b",42,true\n");
}

#[test]
fn encoder_is_reusable_across_rows() {
    let mut encoder = RfCsvRowEncoder::new(&RfCsvConfig::default());
    let first = encoder.encode_row(&[json!("com,ma"), json!(1)]).unwrap().to_vec();
    let second = encoder.encode_row(&[json!("plain")]).unwrap().to_vec();
    let header = encoder.encode_header(&["h".to_string()]).unwrap().to_vec();

    // Later rows must not inherit bytes from earlier, longer ones.
    assert_eq!(first, b"\"com,ma\",1\n");
    assert_eq!(second, b"plain\n");
    assert_eq!(header, b"h\n");
}

#[test]
fn sheet_row_emits_inline_string_cells() {
    let encoder = RfSheetRowEncoder;
    let xml = encoder.encode_row(2, &[json!("a"), json!(5)]);
    assert_eq!(
        xml,
        "<row r=\"2\">\
         <c r=\"A2\" t=\"inlineStr\"><is><t>a</t></is></c>\
         <c r=\"B2\" t=\"inlineStr\"><is><t>5</t></is></c>\
         </row>"
    );
}

#[test]
fn sheet_cells_escape_xml_specials() {
    let encoder = RfSheetRowEncoder;
    let xml = encoder.encode_row(3, &[json!("<a & \"b\">")]);
    assert!(xml.contains("<is><t>&lt;a &amp; &quot;b&quot;&gt;</t></is>"));
}

#[test]
fn header_row_sits_at_index_one() {
    let encoder = RfSheetRowEncoder;
    let xml = encoder.encode_header(&["Name".to_string()]);
    assert!(xml.starts_with("<row r=\"1\">"));
    assert!(xml.contains("<c r=\"A1\""));
}
