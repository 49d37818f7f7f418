// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with streaming visibilities.

use thiserror::Error;

use crate::io::{DatasetError, FieldSelectionError};

/// Which of a stream's datasets something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum DatasetRole {
    #[strum(serialize = "input")]
    Input,

    #[strum(serialize = "output")]
    Output,
}

#[derive(Error, Debug)]
pub enum VisStreamError {
    #[error("The {0} dataset has no DATA column")]
    NoDataColumn(DatasetRole),

    #[error("The {0} dataset has no MODEL_DATA column")]
    NoModelDataColumn(DatasetRole),

    #[error("The {0} dataset has no CORRECTED_DATA column")]
    NoCorrectedDataColumn(DatasetRole),

    #[error("Chunks must be able to hold at least one row")]
    ZeroCapacity,

    #[error("Invalid field selection '{expr}': {err}")]
    InvalidSelection {
        expr: String,
        err: FieldSelectionError,
    },

    #[error("The field selection '{0}' didn't match any rows")]
    SelectionEmpty(String),

    #[error("The output dataset has {output} rows, but the input dataset has {input}")]
    OutputRowMismatch { input: usize, output: usize },

    #[error("Couldn't write row {row}: {err}")]
    Write { row: usize, err: DatasetError },

    #[error("The stream was aborted after an earlier write failure")]
    Aborted,

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
