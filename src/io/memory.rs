// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A visibility dataset held entirely in memory.

use marlu::{c32, RADec, UVW};
use ndarray::Array2;

use super::{DataColumn, DatasetError, VisDataset, VisRow};

/// A pointing of a [`MemoryDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub phase_centre: RADec,
}

impl Field {
    pub fn new<S: Into<String>>(name: S, phase_centre: RADec) -> Field {
        Field {
            name: name.into(),
            phase_centre,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryRow {
    uvw: UVW,
    field: usize,
    spw: usize,
    data: Array2<c32>,
    model_data: Option<Array2<c32>>,
    corrected_data: Option<Array2<c32>>,
    flags: Array2<bool>,
    weights: Vec<f32>,
}

impl MemoryRow {
    fn column(&self, column: DataColumn) -> Option<&Array2<c32>> {
        match column {
            DataColumn::Data => Some(&self.data),
            DataColumn::ModelData => self.model_data.as_ref(),
            DataColumn::CorrectedData => self.corrected_data.as_ref(),
        }
    }

    fn column_mut(&mut self, column: DataColumn) -> Option<&mut Array2<c32>> {
        match column {
            DataColumn::Data => Some(&mut self.data),
            DataColumn::ModelData => self.model_data.as_mut(),
            DataColumn::CorrectedData => self.corrected_data.as_mut(),
        }
    }
}

/// A visibility dataset held entirely in memory. The `data` column always
/// exists; `model_data` and `corrected_data` exist only if declared with
/// [`MemoryDataset::with_column`] before rows are added.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    fields: Vec<Field>,

    /// Channel frequencies for each spectral window \[Hz\]
    spws: Vec<Vec<f64>>,

    has_model_data: bool,
    has_corrected_data: bool,

    rows: Vec<MemoryRow>,
}

impl MemoryDataset {
    pub fn new(fields: Vec<Field>, spws: Vec<Vec<f64>>) -> MemoryDataset {
        MemoryDataset {
            fields,
            spws,
            has_model_data: false,
            has_corrected_data: false,
            rows: vec![],
        }
    }

    /// Declare that the dataset has `column`. Rows that are already present
    /// get zeros in the new column.
    pub fn with_column(mut self, column: DataColumn) -> MemoryDataset {
        match column {
            DataColumn::Data => (),
            DataColumn::ModelData => self.has_model_data = true,
            DataColumn::CorrectedData => self.has_corrected_data = true,
        }
        for row in &mut self.rows {
            let zeros = Array2::zeros(row.data.dim());
            match column {
                DataColumn::Data => (),
                DataColumn::ModelData => {
                    row.model_data.get_or_insert(zeros);
                }
                DataColumn::CorrectedData => {
                    row.corrected_data.get_or_insert(zeros);
                }
            }
        }
        self
    }

    /// Append a row. The row's visibilities go into the `data` column; any
    /// other declared columns are zeroed. Returns the index of the new row.
    pub fn push_row(&mut self, vis_row: VisRow) -> Result<usize, DatasetError> {
        let row = self.rows.len();
        self.check_field(vis_row.field)?;
        if vis_row.spw >= self.spws.len() {
            return Err(DatasetError::BadSpw {
                spw: vis_row.spw,
                num_spws: self.spws.len(),
            });
        }
        let num_chans = self.spws[vis_row.spw].len();
        check_shapes(row, &vis_row, num_chans, vis_row.num_pols())?;

        let zeros = || Array2::zeros(vis_row.vis.dim());
        self.rows.push(MemoryRow {
            uvw: vis_row.uvw,
            field: vis_row.field,
            spw: vis_row.spw,
            model_data: self.has_model_data.then(zeros),
            corrected_data: self.has_corrected_data.then(zeros),
            data: vis_row.vis,
            flags: vis_row.flags,
            weights: vis_row.weights,
        });
        Ok(row)
    }

    /// Get a copy of a row, with visibilities from `column`.
    pub fn row(&self, row: usize, column: DataColumn) -> Result<VisRow, DatasetError> {
        let r = self.get(row)?;
        let vis = r
            .column(column)
            .ok_or(DatasetError::MissingColumn(column))?;
        Ok(VisRow {
            uvw: r.uvw,
            field: r.field,
            spw: r.spw,
            vis: vis.clone(),
            flags: r.flags.clone(),
            weights: r.weights.clone(),
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn get(&self, row: usize) -> Result<&MemoryRow, DatasetError> {
        self.rows.get(row).ok_or(DatasetError::RowOutOfRange {
            row,
            num_rows: self.rows.len(),
        })
    }

    fn check_field(&self, field: usize) -> Result<(), DatasetError> {
        if field >= self.fields.len() {
            return Err(DatasetError::BadPointing {
                pointing: field,
                num_pointings: self.fields.len(),
            });
        }
        Ok(())
    }
}

fn check_shapes(
    row: usize,
    vis_row: &VisRow,
    num_chans: usize,
    num_pols: usize,
) -> Result<(), DatasetError> {
    let expected = vec![num_chans, num_pols];
    if vis_row.vis.shape() != expected.as_slice() {
        return Err(DatasetError::ShapeMismatch {
            row,
            what: "visibilities",
            expected,
            got: vis_row.vis.shape().to_vec(),
        });
    }
    if vis_row.flags.shape() != expected.as_slice() {
        return Err(DatasetError::ShapeMismatch {
            row,
            what: "flags",
            expected,
            got: vis_row.flags.shape().to_vec(),
        });
    }
    if vis_row.weights.len() != num_pols {
        return Err(DatasetError::ShapeMismatch {
            row,
            what: "weights",
            expected: vec![num_pols],
            got: vec![vis_row.weights.len()],
        });
    }
    Ok(())
}

impl VisDataset for MemoryDataset {
    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_pointings(&self) -> usize {
        self.fields.len()
    }

    fn phase_centre(&self, pointing: usize) -> Result<RADec, DatasetError> {
        self.fields
            .get(pointing)
            .map(|f| f.phase_centre)
            .ok_or(DatasetError::BadPointing {
                pointing,
                num_pointings: self.fields.len(),
            })
    }

    fn set_phase_centre(&mut self, pointing: usize, radec: RADec) -> Result<(), DatasetError> {
        let num_pointings = self.fields.len();
        let field = self
            .fields
            .get_mut(pointing)
            .ok_or(DatasetError::BadPointing {
                pointing,
                num_pointings,
            })?;
        field.phase_centre = radec;
        Ok(())
    }

    fn num_spws(&self) -> usize {
        self.spws.len()
    }

    fn chan_freqs(&self, spw: usize) -> Result<Vec<f64>, DatasetError> {
        self.spws.get(spw).cloned().ok_or(DatasetError::BadSpw {
            spw,
            num_spws: self.spws.len(),
        })
    }

    fn has_column(&self, column: DataColumn) -> bool {
        match column {
            DataColumn::Data => true,
            DataColumn::ModelData => self.has_model_data,
            DataColumn::CorrectedData => self.has_corrected_data,
        }
    }

    fn field_id(&mut self, row: usize) -> Result<usize, DatasetError> {
        self.get(row).map(|r| r.field)
    }

    fn field_name(&self, pointing: usize) -> Option<&str> {
        self.fields.get(pointing).map(|f| f.name.as_str())
    }

    fn read_row(&mut self, row: usize, column: DataColumn) -> Result<VisRow, DatasetError> {
        self.row(row, column)
    }

    fn write_row(
        &mut self,
        row: usize,
        column: DataColumn,
        vis_row: &VisRow,
    ) -> Result<(), DatasetError> {
        if !self.has_column(column) {
            return Err(DatasetError::MissingColumn(column));
        }
        let (num_chans, num_pols) = self.get(row)?.data.dim();
        self.check_field(vis_row.field)?;
        check_shapes(row, vis_row, num_chans, num_pols)?;

        // Everything is validated; nothing below can fail.
        let r = &mut self.rows[row];
        if let Some(vis) = r.column_mut(column) {
            vis.assign(&vis_row.vis);
        }
        r.flags.assign(&vis_row.flags);
        r.weights.copy_from_slice(&vis_row.weights);
        r.field = vis_row.field;
        Ok(())
    }
}
