// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to interface with CASA measurement sets.
//!
//! More info: https://casa.nrao.edu/Memos/229.html#SECTION00060000000000000000

mod error;

pub use error::MsDatasetError;

use std::path::{Path, PathBuf};

use log::{debug, trace};
use marlu::{c32, rubbl_casatables, RADec, UVW};
use ndarray::prelude::*;
use rubbl_casatables::{Table, TableOpenMode};

use super::{DataColumn, DatasetError, VisDataset, VisRow};

/// Open a measurement set table. If `table` is `None`, then open the base
/// table.
fn open_table(
    ms: &Path,
    table: Option<&str>,
    mode: TableOpenMode,
) -> Result<Table, MsDatasetError> {
    let t = Table::open(format!("{}/{}", ms.display(), table.unwrap_or("")), mode)?;
    Ok(t)
}

fn to_index(column: &'static str, row: usize, value: i32) -> Result<usize, MsDatasetError> {
    usize::try_from(value).map_err(|_| MsDatasetError::NegativeId { column, row, value })
}

/// A CASA measurement set. Metadata (fields, spectral windows and data
/// descriptions) are read once when the measurement set is opened; rows are
/// read and written on demand.
pub struct MsDataset {
    path: PathBuf,
    main_table: Table,
    read_only: bool,

    num_rows: usize,
    col_names: Vec<String>,

    field_names: Vec<String>,
    phase_centres: Vec<RADec>,

    /// Channel frequencies for each spectral window \[Hz\]
    chan_freqs: Vec<Vec<f64>>,

    /// The spectral window of each data description.
    ddid_to_spw: Vec<usize>,
}

impl MsDataset {
    /// Open a measurement set for reading.
    pub fn open<P: AsRef<Path>>(ms: P) -> Result<MsDataset, MsDatasetError> {
        Self::open_inner(ms.as_ref(), true)
    }

    /// Open a measurement set for reading and writing.
    pub fn open_rw<P: AsRef<Path>>(ms: P) -> Result<MsDataset, MsDatasetError> {
        Self::open_inner(ms.as_ref(), false)
    }

    fn open_inner(ms: &Path, read_only: bool) -> Result<MsDataset, MsDatasetError> {
        debug!(
            "Using measurement set: {} ({})",
            ms.display(),
            if read_only { "read only" } else { "read/write" }
        );
        if !ms.exists() {
            return Err(MsDatasetError::BadFile(ms.to_path_buf()));
        }

        let mode = if read_only {
            TableOpenMode::Read
        } else {
            TableOpenMode::ReadWrite
        };
        let mut main_table = open_table(ms, None, mode)?;
        let num_rows = main_table.n_rows() as usize;
        let col_names = main_table.column_names()?;
        trace!("Main table columns: {col_names:?}");

        let (field_names, phase_centres) = {
            let mut field_table = open_table(ms, Some("FIELD"), TableOpenMode::Read)?;
            let num_fields = field_table.n_rows() as usize;
            if num_fields == 0 {
                return Err(MsDatasetError::NoFields);
            }
            let names: Vec<String> = field_table.get_col_as_vec("NAME")?;
            let mut phase_centres = Vec::with_capacity(num_fields);
            for i_field in 0..num_fields {
                let phase_vec: Vec<f64> =
                    field_table.get_cell_as_vec("PHASE_DIR", i_field as u64)?;
                if phase_vec.len() < 2 {
                    return Err(MsDatasetError::BadPhaseDir {
                        field: i_field,
                        len: phase_vec.len(),
                    });
                }
                phase_centres.push(RADec::from_radians(phase_vec[0], phase_vec[1]));
            }
            (names, phase_centres)
        };

        let chan_freqs = {
            let mut spw_table = open_table(ms, Some("SPECTRAL_WINDOW"), TableOpenMode::Read)?;
            let num_spws = spw_table.n_rows();
            if num_spws == 0 {
                return Err(MsDatasetError::NoSpectralWindows);
            }
            (0..num_spws)
                .map(|i_spw| spw_table.get_cell_as_vec("CHAN_FREQ", i_spw))
                .collect::<Result<Vec<Vec<f64>>, _>>()?
        };

        let ddid_to_spw = {
            let mut ddid_table = open_table(ms, Some("DATA_DESCRIPTION"), TableOpenMode::Read)?;
            let spw_ids: Vec<i32> = ddid_table.get_col_as_vec("SPECTRAL_WINDOW_ID")?;
            spw_ids
                .into_iter()
                .enumerate()
                .map(|(i_ddid, spw)| to_index("SPECTRAL_WINDOW_ID", i_ddid, spw))
                .collect::<Result<Vec<_>, _>>()?
        };

        debug!(
            "Measurement set has {num_rows} rows, {} fields and {} spectral windows",
            phase_centres.len(),
            chan_freqs.len()
        );

        Ok(MsDataset {
            path: ms.to_path_buf(),
            main_table,
            read_only,
            num_rows,
            col_names,
            field_names,
            phase_centres,
            chan_freqs,
            ddid_to_spw,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_row(&self, row: usize) -> Result<u64, DatasetError> {
        if row >= self.num_rows {
            return Err(DatasetError::RowOutOfRange {
                row,
                num_rows: self.num_rows,
            });
        }
        Ok(row as u64)
    }

    fn check_writable(&self) -> Result<(), MsDatasetError> {
        if self.read_only {
            return Err(MsDatasetError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }
}

impl VisDataset for MsDataset {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_pointings(&self) -> usize {
        self.phase_centres.len()
    }

    fn phase_centre(&self, pointing: usize) -> Result<RADec, DatasetError> {
        self.phase_centres
            .get(pointing)
            .copied()
            .ok_or(DatasetError::BadPointing {
                pointing,
                num_pointings: self.phase_centres.len(),
            })
    }

    fn set_phase_centre(&mut self, pointing: usize, radec: RADec) -> Result<(), DatasetError> {
        self.check_writable()?;
        if pointing >= self.phase_centres.len() {
            return Err(DatasetError::BadPointing {
                pointing,
                num_pointings: self.phase_centres.len(),
            });
        }

        let mut field_table = open_table(&self.path, Some("FIELD"), TableOpenMode::ReadWrite)?;
        let dir = array![[radec.ra, radec.dec]];
        for col_name in ["PHASE_DIR", "REFERENCE_DIR", "DELAY_DIR"] {
            field_table
                .put_cell(col_name, pointing as u64, &dir)
                .map_err(MsDatasetError::from)?;
        }
        debug!(
            "Set the phase centre of field {pointing} to ({:.4}°, {:.4}°) in {}",
            radec.ra.to_degrees(),
            radec.dec.to_degrees(),
            self.path.display()
        );
        self.phase_centres[pointing] = radec;
        Ok(())
    }

    fn num_spws(&self) -> usize {
        self.chan_freqs.len()
    }

    fn chan_freqs(&self, spw: usize) -> Result<Vec<f64>, DatasetError> {
        self.chan_freqs.get(spw).cloned().ok_or(DatasetError::BadSpw {
            spw,
            num_spws: self.chan_freqs.len(),
        })
    }

    fn has_column(&self, column: DataColumn) -> bool {
        self.col_names.iter().any(|c| c == column.col_name())
    }

    fn field_id(&mut self, row: usize) -> Result<usize, DatasetError> {
        let r = self.check_row(row)?;
        let field: i32 = self
            .main_table
            .get_cell("FIELD_ID", r)
            .map_err(MsDatasetError::from)?;
        Ok(to_index("FIELD_ID", row, field)?)
    }

    fn field_name(&self, pointing: usize) -> Option<&str> {
        self.field_names.get(pointing).map(|n| n.as_str())
    }

    fn read_row(&mut self, row: usize, column: DataColumn) -> Result<VisRow, DatasetError> {
        if !self.has_column(column) {
            return Err(DatasetError::MissingColumn(column));
        }
        let r = self.check_row(row)?;
        let table = &mut self.main_table;

        let uvw: Vec<f64> = table.get_cell_as_vec("UVW", r).map_err(MsDatasetError::from)?;
        let uvw = match uvw.as_slice() {
            &[u, v, w] => UVW { u, v, w },
            _ => return Err(MsDatasetError::BadUvw { row, len: uvw.len() }.into()),
        };
        let field: i32 = table.get_cell("FIELD_ID", r).map_err(MsDatasetError::from)?;
        let ddid: i32 = table
            .get_cell("DATA_DESC_ID", r)
            .map_err(MsDatasetError::from)?;
        let vis: Array2<c32> = table
            .get_cell(column.col_name(), r)
            .map_err(MsDatasetError::from)?;
        let flags: Array2<bool> = table.get_cell("FLAG", r).map_err(MsDatasetError::from)?;
        let weights: Vec<f32> = table
            .get_cell_as_vec("WEIGHT", r)
            .map_err(MsDatasetError::from)?;

        let field = to_index("FIELD_ID", row, field)?;
        let ddid = to_index("DATA_DESC_ID", row, ddid)?;
        let spw = *self
            .ddid_to_spw
            .get(ddid)
            .ok_or(MsDatasetError::BadDataDescId {
                row,
                ddid,
                num_ddids: self.ddid_to_spw.len(),
            })?;

        if flags.dim() != vis.dim() {
            return Err(DatasetError::ShapeMismatch {
                row,
                what: "flags",
                expected: vis.shape().to_vec(),
                got: flags.shape().to_vec(),
            });
        }
        if weights.len() != vis.len_of(Axis(1)) {
            return Err(DatasetError::ShapeMismatch {
                row,
                what: "weights",
                expected: vec![vis.len_of(Axis(1))],
                got: vec![weights.len()],
            });
        }

        Ok(VisRow {
            uvw,
            field,
            spw,
            vis,
            flags,
            weights,
        })
    }

    fn write_row(
        &mut self,
        row: usize,
        column: DataColumn,
        vis_row: &VisRow,
    ) -> Result<(), DatasetError> {
        self.check_writable()?;
        if !self.has_column(column) {
            return Err(DatasetError::MissingColumn(column));
        }
        let r = self.check_row(row)?;
        if vis_row.field >= self.phase_centres.len() {
            return Err(DatasetError::BadPointing {
                pointing: vis_row.field,
                num_pointings: self.phase_centres.len(),
            });
        }

        // Validate against what's already there before writing anything.
        let existing_flags: Array2<bool> = self
            .main_table
            .get_cell("FLAG", r)
            .map_err(MsDatasetError::from)?;
        let expected = existing_flags.shape().to_vec();
        for (what, got) in [
            ("visibilities", vis_row.vis.shape()),
            ("flags", vis_row.flags.shape()),
        ] {
            if got != expected.as_slice() {
                return Err(DatasetError::ShapeMismatch {
                    row,
                    what,
                    expected,
                    got: got.to_vec(),
                });
            }
        }
        if vis_row.weights.len() != expected[1] {
            return Err(DatasetError::ShapeMismatch {
                row,
                what: "weights",
                expected: vec![expected[1]],
                got: vec![vis_row.weights.len()],
            });
        }

        let table = &mut self.main_table;
        table
            .put_cell(column.col_name(), r, &vis_row.vis)
            .map_err(MsDatasetError::from)?;
        table
            .put_cell("FLAG", r, &vis_row.flags)
            .map_err(MsDatasetError::from)?;
        table
            .put_cell("WEIGHT", r, &vis_row.weights)
            .map_err(MsDatasetError::from)?;
        table
            .put_cell("FIELD_ID", r, &(vis_row.field as i32))
            .map_err(MsDatasetError::from)?;
        Ok(())
    }
}
