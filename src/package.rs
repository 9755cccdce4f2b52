//! Copyright © 2025-2026 The Rowflow Authors. All Rights Reserved.
//!
//! This file is part of Rowflow.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Rowflow Workbook Package Builder
//!
//! Assembles a minimal-but-conformant OOXML spreadsheet package: a ZIP
//! archive holding `[Content_Types].xml`, `_rels/.rels`, `xl/workbook.xml`,
//! `xl/_rels/workbook.xml.rels`, and one `xl/worksheets/sheetN.xml` per
//! sheet (N 1-based and consistent across all four manifest parts).
//!
//! Every sheet is spooled to an unnamed temporary file before entering the
//! archive, and the finished archive itself lives in an unnamed temporary
//! file until it has been streamed to the transport. Unnamed handles are
//! deleted by the OS when dropped, so no partial or corrupt package can
//! survive any exit path, success or failure.
//!
//! Packaged exports are therefore never incremental end-to-end: they trade
//! a full local materialization step for binary correctness of the ZIP
//! container.

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::chunking::RfChunkSizer;
use crate::config::RfExportConfig;
use crate::encode::{xml_escape, RfSheetRowEncoder};
use crate::errors::{Result, RfError};
use crate::exporter::RfExportJob;
use crate::sheet::RfSheetSpec;
use crate::source::shape_chunk;
use crate::transport::{RfResponseHead, RfTransport};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const OFFICE_DOC_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const WORKBOOK_PART_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_PART_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const RELS_PART_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Buffer size for temp-file-to-archive and archive-to-transport copies.
const COPY_BUF_LEN: usize = 64 * 1024;

fn pkg(err: io::Error) -> RfError {
    RfError::package(err.to_string())
}

/// Builds spreadsheet packages and streams them to the output transport.
pub struct RfWorkbookBuilder<'a> {
    config: &'a RfExportConfig,
}

impl<'a> RfWorkbookBuilder<'a> {
    pub fn new(config: &'a RfExportConfig) -> Self {
        Self { config }
    }

    /// Drains every sheet's source into the package, then streams the
    /// finished archive to the transport in fixed-size buffered reads (the
    /// archive bytes are copied, not re-encoded).
    ///
    /// The response head is committed only once a complete archive exists,
    /// so assembly failures still surface before any output.
    pub fn build_and_stream(
        &self,
        sheets: &mut [RfSheetSpec],
        head: &RfResponseHead,
        transport: &mut dyn RfTransport,
        job: &mut RfExportJob<'_>,
    ) -> Result<()> {
        let mut archive = self.build(sheets, job)?;
        transport.begin(head)?;

        let mut buf = [0u8; COPY_BUF_LEN];
        loop {
            let n = archive.read(&mut buf).map_err(pkg)?;
            if n == 0 {
                break;
            }
            transport.write_all(&buf[..n])?;
            job.add_bytes(n);
            transport.flush()?;
        }
        Ok(())
        // `archive` drops here, deleting the staged package file.
    }

    /// Assembles the archive into an unnamed temp file, rewound and ready
    /// to read. Any failure drops every temp handle created so far.
    fn build(&self, sheets: &mut [RfSheetSpec], job: &mut RfExportJob<'_>) -> Result<File> {
        let backing = tempfile::tempfile().map_err(pkg)?;
        let mut zip = ZipWriter::new(backing);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (index, sheet) in sheets.iter_mut().enumerate() {
            self.spool_sheet(index + 1, sheet, &mut zip, options, job)?;
        }

        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        write_part(&mut zip, options, "[Content_Types].xml", &content_types(names.len()))?;
        write_part(&mut zip, options, "_rels/.rels", &root_relationships())?;
        write_part(&mut zip, options, "xl/workbook.xml", &workbook(&names))?;
        write_part(
            &mut zip,
            options,
            "xl/_rels/workbook.xml.rels",
            &workbook_relationships(names.len()),
        )?;

        let mut finished = zip.finish()?;
        finished.seek(SeekFrom::Start(0)).map_err(pkg)?;
        Ok(finished)
    }

    /// Drains one sheet's source into a temp XML spool file, then copies it
    /// into the archive at `xl/worksheets/sheetN.xml`.
    fn spool_sheet(
        &self,
        number: usize,
        sheet: &mut RfSheetSpec,
        zip: &mut ZipWriter<File>,
        options: FileOptions,
        job: &mut RfExportJob<'_>,
    ) -> Result<()> {
        let mut sizer = RfChunkSizer::resolve(
            self.config,
            true,
            &sheet.source.shape(),
            sheet.chunk_size,
        )?;

        let mut spool = tempfile::tempfile().map_err(pkg)?;
        {
            let mut writer = BufWriter::new(&mut spool);
            writer.write_all(XML_DECL.as_bytes()).map_err(pkg)?;
            writer
                .write_all(format!("<worksheet xmlns=\"{SPREADSHEET_NS}\"><sheetData>").as_bytes())
                .map_err(pkg)?;

            let headers: Vec<String> = sheet.source.headers().to_vec();
            let encoder = RfSheetRowEncoder;
            writer
                .write_all(encoder.encode_header(&headers).as_bytes())
                .map_err(pkg)?;

            // Data rows start at spreadsheet row index 2, strictly ordered.
            let mut row_index: u64 = 2;
            loop {
                let size = sizer.current();
                let chunk = match sheet.source.next_chunk(size)? {
                    Some(chunk) => chunk,
                    None => break,
                };
                let (shaped, degraded) = shape_chunk(&chunk, &headers, sheet.source.row_transform());
                job.note_degraded(degraded);
                for values in &shaped {
                    writer
                        .write_all(encoder.encode_row(row_index, values).as_bytes())
                        .map_err(pkg)?;
                    row_index += 1;
                }
                job.note_chunk(shaped.len());
                sizer.adjust(job.probe());
            }

            writer.write_all(b"</sheetData></worksheet>").map_err(pkg)?;
            writer.flush().map_err(pkg)?;
        }

        spool.seek(SeekFrom::Start(0)).map_err(pkg)?;
        zip.start_file(format!("xl/worksheets/sheet{number}.xml"), options)?;
        let mut buf = [0u8; COPY_BUF_LEN];
        loop {
            let n = spool.read(&mut buf).map_err(pkg)?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n]).map_err(pkg)?;
        }
        Ok(())
        // `spool` drops here, deleting the per-sheet temp file.
    }
}

fn write_part(
    zip: &mut ZipWriter<File>,
    options: FileOptions,
    name: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(content.as_bytes()).map_err(pkg)?;
    Ok(())
}

fn content_types(sheet_count: usize) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!("<Types xmlns=\"{CONTENT_TYPES_NS}\">"));
    out.push_str(&format!(
        "<Default Extension=\"rels\" ContentType=\"{RELS_PART_TYPE}\"/>"
    ));
    out.push_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>");
    out.push_str(&format!(
        "<Override PartName=\"/xl/workbook.xml\" ContentType=\"{WORKBOOK_PART_TYPE}\"/>"
    ));
    for number in 1..=sheet_count {
        out.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{number}.xml\" \
             ContentType=\"{WORKSHEET_PART_TYPE}\"/>"
        ));
    }
    out.push_str("</Types>");
    out
}

fn root_relationships() -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!("<Relationships xmlns=\"{RELATIONSHIPS_NS}\">"));
    out.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{OFFICE_DOC_REL}\" Target=\"xl/workbook.xml\"/>"
    ));
    out.push_str("</Relationships>");
    out
}

fn workbook(sheet_names: &[&str]) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!(
        "<workbook xmlns=\"{SPREADSHEET_NS}\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">"
    ));
    out.push_str("<sheets>");
    for (index, name) in sheet_names.iter().enumerate() {
        let number = index + 1;
        out.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{number}\" r:id=\"rId{number}\"/>",
            xml_escape(name)
        ));
    }
    out.push_str("</sheets></workbook>");
    out
}

fn workbook_relationships(sheet_count: usize) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!("<Relationships xmlns=\"{RELATIONSHIPS_NS}\">"));
    for number in 1..=sheet_count {
        out.push_str(&format!(
            "<Relationship Id=\"rId{number}\" Type=\"{WORKSHEET_REL}\" \
             Target=\"worksheets/sheet{number}.xml\"/>"
        ));
    }
    out.push_str("</Relationships>");
    out
}
