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

//! # Rowflow
//!
//! Streaming export engine for large, arbitrarily-sized tabular datasets.
//! Rowflow drains a chunked data source through format-specific row
//! encoders into a downloadable file — line-delimited CSV streamed end to
//! end, or a ZIP-based OOXML spreadsheet package assembled on local
//! storage — without ever materializing the whole dataset in memory.
//!
//! ## Module Overview
//!
//! - **record**: row payloads, projection, and scalar coercion
//! - **source**: the chunked data-source abstraction (array-backed,
//!   paged-query-backed, custom)
//! - **chunking**: adaptive chunk-size policy with memory feedback
//! - **encode**: per-row CSV and inline-string XML encoders
//! - **stream**: the chunk-by-chunk CSV streaming writer
//! - **package**: the OOXML/ZIP spreadsheet package builder
//! - **sheet**: multi-sheet workbook specifications
//! - **exporter**: the orchestrating façade with guardrails and events
//! - **transport**: the append-only output-transport seam
//! - **events**: the fire-and-forget lifecycle-event collaborator
//! - **filename**: download-filename sanitizing and timestamping
//! - **config**: the immutable configuration surface
//! - **errors**: the error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rowflow::{RfExporter, RfExportConfig, RfExportOptions, RfMemoryTransport};
//! use serde_json::json;
//!
//! # fn main() -> rowflow::Result<()> {
//! let rows = vec![
//!     json!({"Name": "Ann", "Email": "a@x.com"}).as_object().cloned().unwrap(),
//!     json!({"Name": "Bo", "Email": "b@x.com"}).as_object().cloned().unwrap(),
//! ];
//! let headers = vec!["Name".to_string(), "Email".to_string()];
//!
//! let exporter = RfExporter::new(RfExportConfig::default());
//! let mut transport = RfMemoryTransport::new();
//! let stats = exporter.export_rows(
//!     rows,
//!     headers,
//!     "contacts",
//!     &RfExportOptions::default(),
//!     &mut transport,
//! )?;
//! assert_eq!(stats.records, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, RfError>`. Validation failures surface
//! before any output byte; failures after streaming has begun terminate the
//! stream and are reported through the export listener.

pub mod chunking;
pub mod config;
pub mod encode;
pub mod errors;
pub mod events;
pub mod exporter;
pub mod filename;
pub mod package;
pub mod record;
pub mod sheet;
pub mod source;
pub mod stream;
pub mod transport;

pub use chunking::{RfChunkSizer, RfFixedMemoryProbe, RfMemoryProbe, RfProcMemoryProbe};
pub use config::{
    RfChunkConfig, RfCsvConfig, RfExportConfig, RfFilenameConfig, RfGuardrailConfig, RfSheetConfig,
};
pub use encode::{column_letter, xml_escape, RfCsvRowEncoder, RfSheetRowEncoder};
pub use errors::{Result, RfError};
pub use events::{RfExportListener, RfLogListener, RfNullListener};
pub use exporter::{RfExportFormat, RfExportJob, RfExportOptions, RfExportStats, RfExporter};
pub use filename::build_filename;
pub use package::RfWorkbookBuilder;
pub use record::{cell_text, project_row, RfChunk, RfRow, RfRowTransform};
pub use sheet::RfSheetSpec;
pub use source::{
    RfArraySource, RfDataSource, RfOrdering, RfPageFetcher, RfPagedSource, RfQueryShape,
};
pub use stream::RfCsvStreamWriter;
pub use transport::{RfMemoryTransport, RfResponseHead, RfTransport, RfWriterTransport};
