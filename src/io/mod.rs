// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Row-level access to visibility datasets.
//!
//! [`VisDataset`] is the raw accessor that the stream is built on; it knows
//! nothing about chunking. Two implementations exist: [`MemoryDataset`],
//! which is handy for testing and for small in-memory data, and
//! [`MsDataset`], which reads and writes CASA measurement sets.

mod error;
mod memory;
mod ms;
mod selection;

pub use error::{DatasetError, FieldSelectionError};
pub use memory::{Field, MemoryDataset};
pub use ms::{MsDataset, MsDatasetError};
pub use selection::FieldSelection;

use itertools::Itertools;
use marlu::{c32, RADec, UVW};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

lazy_static::lazy_static! {
    pub static ref DATA_COLUMNS_COMMA_SEPARATED: String = DataColumn::iter().join(", ");
}

/// The visibility columns that can be read from or written to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum DataColumn {
    /// The observed visibilities.
    #[default]
    #[strum(serialize = "data")]
    Data,

    #[strum(serialize = "model_data")]
    ModelData,

    #[strum(serialize = "corrected_data")]
    CorrectedData,
}

impl DataColumn {
    /// The name of the column in a measurement set.
    pub fn col_name(self) -> &'static str {
        match self {
            DataColumn::Data => "DATA",
            DataColumn::ModelData => "MODEL_DATA",
            DataColumn::CorrectedData => "CORRECTED_DATA",
        }
    }
}

/// A single row of visibilities, i.e. one baseline at one time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisRow {
    /// \[metres\]
    pub uvw: UVW,

    /// The field (pointing) index.
    pub field: usize,

    /// The spectral-window index.
    pub spw: usize,

    /// Shape: (num_chans, num_pols)
    pub vis: Array2<c32>,

    /// Shape: (num_chans, num_pols). `true` means flagged.
    pub flags: Array2<bool>,

    /// One per polarisation.
    pub weights: Vec<f32>,
}

impl VisRow {
    pub fn num_chans(&self) -> usize {
        self.vis.len_of(Axis(0))
    }

    pub fn num_pols(&self) -> usize {
        self.vis.len_of(Axis(1))
    }
}

/// Raw, row-level access to a visibility dataset.
///
/// Rows, pointings and spectral windows are all zero indexed. Reading takes
/// `&mut self` because some backends need to mutate internal handles to read.
pub trait VisDataset {
    fn num_rows(&self) -> usize;

    fn num_pointings(&self) -> usize;

    fn phase_centre(&self, pointing: usize) -> Result<RADec, DatasetError>;

    /// Change the phase centre metadata of a pointing. Visibilities are not
    /// touched.
    fn set_phase_centre(&mut self, pointing: usize, radec: RADec) -> Result<(), DatasetError>;

    fn num_spws(&self) -> usize;

    /// The channel frequencies of a spectral window \[Hz\]
    fn chan_freqs(&self, spw: usize) -> Result<Vec<f64>, DatasetError>;

    fn has_column(&self, column: DataColumn) -> bool;

    /// The field (pointing) index of a row.
    fn field_id(&mut self, row: usize) -> Result<usize, DatasetError>;

    /// The name of a pointing, if it has one.
    fn field_name(&self, pointing: usize) -> Option<&str>;

    fn read_row(&mut self, row: usize, column: DataColumn) -> Result<VisRow, DatasetError>;

    /// Write a row's visibilities (to `column`), flags, weights and field
    /// index. Either everything is written or nothing is.
    fn write_row(
        &mut self,
        row: usize,
        column: DataColumn,
        vis_row: &VisRow,
    ) -> Result<(), DatasetError>;

    /// The phase centres of all pointings.
    fn phase_centres(&self) -> Result<Vec<RADec>, DatasetError> {
        (0..self.num_pointings())
            .map(|p| self.phase_centre(p))
            .collect()
    }
}
