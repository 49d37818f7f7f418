// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with visibility datasets.

use thiserror::Error;

use super::{DataColumn, MsDatasetError};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Row {row} is out of range; the dataset has {num_rows} rows")]
    RowOutOfRange { row: usize, num_rows: usize },

    #[error("Pointing {pointing} is out of range; the dataset has {num_pointings} pointings")]
    BadPointing {
        pointing: usize,
        num_pointings: usize,
    },

    #[error("Spectral window {spw} is out of range; the dataset has {num_spws} spectral windows")]
    BadSpw { spw: usize, num_spws: usize },

    #[error("Row {row}: expected {what} with shape {expected:?}, but got {got:?}")]
    ShapeMismatch {
        row: usize,
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("The dataset has no {0} column")]
    MissingColumn(DataColumn),

    #[error(transparent)]
    Ms(#[from] MsDatasetError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldSelectionError {
    #[error("The field selection is empty")]
    Empty,

    #[error("Field selection term {0} is empty")]
    EmptyTerm(usize),

    #[error("Couldn't parse field range '{0}'; expected something like '2~5'")]
    BadRange(String),
}
