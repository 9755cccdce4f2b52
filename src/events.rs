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

//! # Rowflow Event Module
//!
//! The logging collaborator boundary. Four lifecycle events, all
//! fire-and-forget: the listener signatures are infallible so no logging
//! backend can ever block or fail an export.

use crate::errors::RfError;

/// Receiver for export lifecycle events.
pub trait RfExportListener {
    /// An export began; `expected` is the total row count when known.
    fn export_started(&self, filename: &str, expected: Option<u64>, format: &str);

    /// One chunk was encoded and handed to the transport.
    fn chunk_processed(&self, chunk_number: u64, records_in_chunk: usize, total_so_far: u64);

    /// The export finished; counts and emitted byte size are final.
    fn export_completed(&self, filename: &str, records: u64, bytes: u64);

    /// The export failed after processing `records_so_far` rows.
    fn export_failed(&self, filename: &str, error: &RfError, records_so_far: u64);
}

/// Default listener over the `log` facade.
pub struct RfLogListener;

impl RfExportListener for RfLogListener {
    fn export_started(&self, filename: &str, expected: Option<u64>, format: &str) {
        match expected {
            Some(count) => log::info!("export started: {filename} ({format}, {count} rows expected)"),
            None => log::info!("export started: {filename} ({format})"),
        }
    }

    fn chunk_processed(&self, chunk_number: u64, records_in_chunk: usize, total_so_far: u64) {
        log::debug!("chunk {chunk_number} processed: {records_in_chunk} records ({total_so_far} total)");
    }

    fn export_completed(&self, filename: &str, records: u64, bytes: u64) {
        log::info!("export completed: {filename} ({records} records, {bytes} bytes)");
    }

    fn export_failed(&self, filename: &str, error: &RfError, records_so_far: u64) {
        log::error!("export failed: {filename} after {records_so_far} records: {error}");
    }
}

/// Listener that drops every event.
pub struct RfNullListener;

impl RfExportListener for RfNullListener {
    fn export_started(&self, _filename: &str, _expected: Option<u64>, _format: &str) {}

    fn chunk_processed(&self, _chunk_number: u64, _records_in_chunk: usize, _total_so_far: u64) {}

    fn export_completed(&self, _filename: &str, _records: u64, _bytes: u64) {}

    fn export_failed(&self, _filename: &str, _error: &RfError, _records_so_far: u64) {}
}
