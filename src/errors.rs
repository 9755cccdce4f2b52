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

//! # Rowflow Error Module
//!
//! This module defines the error types used throughout Rowflow for
//! consistent error handling and reporting.
//!
//! ## Error Handling Philosophy
//!
//! - **Validation before bytes**: errors raised during construction and
//!   validation (`EmptyDataset`, `InvalidChunkSize`, `UnsupportedFormat`,
//!   `InvalidSheet`) surface before the transport receives any output, so
//!   callers can still convert them into a structured error response.
//! - **Committed streams cannot be retracted**: `Streaming` errors occur
//!   after the first output byte; the stream simply terminates and the
//!   failure is reported through the export listener with progress context.
//! - **Packaged assembly precedes output**: the spreadsheet archive is
//!   built locally before the response head is committed, so `Package`
//!   errors (and source errors during spooling) also surface before any
//!   output byte.
//! - **Per-record degradation is not an error**: a failing row-transform
//!   hook degrades one record to its column-projected form and is logged,
//!   never propagated.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;

/// Convenience result type used throughout Rowflow.
pub type Result<T> = std::result::Result<T, RfError>;

/// Canonical error enumeration for Rowflow.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum RfError {
    /// Raised when an export is requested over a collection with no rows.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// Raised when a chunk size of zero is requested or configured.
    #[error("invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    /// Raised when the requested export format is not `csv` or `xlsx`.
    #[error("unsupported export format: '{0}'")]
    UnsupportedFormat(String),

    /// Raised when a sheet specification fails validation.
    #[error("invalid sheet spec: {0}")]
    InvalidSheet(String),

    /// Archive or temp-file failure while assembling the spreadsheet package.
    #[error("package assembly failed: {0}")]
    Package(String),

    /// Transport or encoding failure after output has begun.
    #[error("streaming failed: {0}")]
    Streaming(String),

    /// Failure raised by a data-source collaborator (page fetcher, cursor).
    #[error("source error: {0}")]
    Source(String),

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),
}

impl From<io::Error> for RfError {
    fn from(err: io::Error) -> Self {
        RfError::Io(err.to_string())
    }
}

impl From<ZipError> for RfError {
    fn from(err: ZipError) -> Self {
        RfError::Package(err.to_string())
    }
}

impl From<csv::Error> for RfError {
    fn from(err: csv::Error) -> Self {
        RfError::Streaming(err.to_string())
    }
}

impl From<serde_json::Error> for RfError {
    fn from(err: serde_json::Error) -> Self {
        RfError::Source(err.to_string())
    }
}

impl RfError {
    /// Helper to construct empty-dataset errors.
    pub fn empty_dataset(message: impl Into<String>) -> Self {
        RfError::EmptyDataset(message.into())
    }

    /// Helper to construct sheet-validation errors.
    pub fn invalid_sheet(message: impl Into<String>) -> Self {
        RfError::InvalidSheet(message.into())
    }

    /// Helper to construct package-assembly errors.
    pub fn package(message: impl Into<String>) -> Self {
        RfError::Package(message.into())
    }

    /// Helper to construct streaming errors.
    pub fn streaming(message: impl Into<String>) -> Self {
        RfError::Streaming(message.into())
    }

    /// Helper to construct source errors.
    pub fn source(message: impl Into<String>) -> Self {
        RfError::Source(message.into())
    }
}
