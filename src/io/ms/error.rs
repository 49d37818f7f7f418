// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with interacting with CASA measurement sets.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MsDatasetError {
    #[error("Supplied file path {0} does not exist or is not readable!")]
    BadFile(PathBuf),

    #[error("The measurement set {0} was opened read-only and can't be written to")]
    ReadOnly(PathBuf),

    #[error("The FIELD table of the measurement set contains no rows!")]
    NoFields,

    #[error("The SPECTRAL_WINDOW table of the measurement set contains no rows!")]
    NoSpectralWindows,

    #[error("FIELD row {field} has a PHASE_DIR with {len} elements; expected at least 2")]
    BadPhaseDir { field: usize, len: usize },

    #[error("Row {row} has a UVW with {len} elements; expected 3")]
    BadUvw { row: usize, len: usize },

    #[error("Found a negative {column} ({value}) in row {row}")]
    NegativeId {
        column: &'static str,
        row: usize,
        value: i32,
    },

    #[error("Row {row} has DATA_DESC_ID {ddid}, but there are only {num_ddids} data descriptions")]
    BadDataDescId {
        row: usize,
        ddid: usize,
        num_ddids: usize,
    },

    #[error("Error when trying to interface with measurement set: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
