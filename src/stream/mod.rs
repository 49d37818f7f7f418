// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chunked streaming of visibilities.
//!
//! A [`VisStream`] reads a [`VisDataset`] a [`Chunk`] at a time, and writes
//! the outputs of processed chunks to an optional output dataset. The caller
//! calls [`VisStream::read_chunk`] until it returns 0:
//!
//! ```no_run
//! # use vis_stacker::{io::MemoryDataset, stream::{StreamConfig, VisStream}};
//! # fn f(input: MemoryDataset, output: MemoryDataset) -> Result<(), vis_stacker::stream::VisStreamError> {
//! let mut stream = VisStream::open(input, Some(output), StreamConfig::default())?;
//! let mut chunk = stream.new_chunk();
//! while stream.read_chunk(&mut chunk)? > 0 {
//!     chunk.copy_inputs_to_outputs();
//!     stream.write_chunk(&chunk)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! If the stream is aligning pointings, chunks are cut short so that every
//! chunk (but the last) only contains rows from a single pointing.

mod error;

pub use error::{DatasetRole, VisStreamError};

use std::{str::FromStr, sync::Arc};

use log::{debug, trace, warn};
use marlu::RADec;
use serde::{Deserialize, Serialize};

use crate::{
    chunk::Chunk,
    constants::{ALIGNMENT_BREAKS_BEFORE_WARNING, DEFAULT_CHUNK_CAPACITY, DEFAULT_DATASET_ID},
    io::{DataColumn, DatasetError, FieldSelection, VisDataset},
};

/// How a [`VisStream`] reads and writes. This can't be changed once a stream
/// is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// The column to read visibilities from and write them to.
    pub data_column: DataColumn,

    /// Only stream rows with fields matching this expression, e.g. `0,2~4`.
    pub field_selection: Option<String>,

    /// Don't let a chunk span more than one pointing.
    pub align_pointings: bool,

    /// The default capacity of chunks made by [`VisStream::new_chunk`].
    pub chunk_capacity: usize,

    /// Stamped onto every chunk that is read.
    pub dataset_id: i32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            data_column: DataColumn::Data,
            field_selection: None,
            align_pointings: false,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            dataset_id: DEFAULT_DATASET_ID,
        }
    }
}

pub struct VisStream<D: VisDataset> {
    input: D,
    output: Option<D>,
    config: StreamConfig,

    /// The dataset rows to stream, if a field selection is in use. Otherwise
    /// every row is streamed.
    rows: Option<Vec<usize>>,

    /// The next (logical) row to read.
    cursor: usize,

    alignment_breaks_in_a_row: usize,
    /// How many times unsorted pointings have been warned about (at most 1).
    alignment_warnings: usize,

    /// Channel frequencies, one table per spectral window.
    freq_tables: Vec<Arc<[f64]>>,

    aborted: bool,
}

fn check_column<D: VisDataset>(
    dataset: &D,
    column: DataColumn,
    role: DatasetRole,
) -> Result<(), VisStreamError> {
    if dataset.has_column(column) {
        return Ok(());
    }
    Err(match column {
        DataColumn::Data => VisStreamError::NoDataColumn(role),
        DataColumn::ModelData => VisStreamError::NoModelDataColumn(role),
        DataColumn::CorrectedData => VisStreamError::NoCorrectedDataColumn(role),
    })
}

impl<D: VisDataset> VisStream<D> {
    /// Open a stream. Visibilities are read from `input`; if `output` is
    /// given, written chunks go there, otherwise writing does nothing.
    pub fn open(
        mut input: D,
        output: Option<D>,
        config: StreamConfig,
    ) -> Result<VisStream<D>, VisStreamError> {
        if config.chunk_capacity == 0 {
            return Err(VisStreamError::ZeroCapacity);
        }
        check_column(&input, config.data_column, DatasetRole::Input)?;
        if let Some(output) = output.as_ref() {
            check_column(output, config.data_column, DatasetRole::Output)?;
            if output.num_rows() != input.num_rows() {
                return Err(VisStreamError::OutputRowMismatch {
                    input: input.num_rows(),
                    output: output.num_rows(),
                });
            }
        }

        let rows = match config.field_selection.as_deref() {
            None => None,
            Some(expr) => {
                let selection = FieldSelection::from_str(expr).map_err(|err| {
                    VisStreamError::InvalidSelection {
                        expr: expr.to_string(),
                        err,
                    }
                })?;
                let mut rows = vec![];
                for row in 0..input.num_rows() {
                    let field = input.field_id(row)?;
                    if selection.matches(field, input.field_name(field)) {
                        rows.push(row);
                    }
                }
                if rows.is_empty() {
                    return Err(VisStreamError::SelectionEmpty(expr.to_string()));
                }
                debug!(
                    "Field selection '{expr}' matched {} of {} rows",
                    rows.len(),
                    input.num_rows()
                );
                Some(rows)
            }
        };

        let freq_tables = (0..input.num_spws())
            .map(|spw| input.chan_freqs(spw).map(Arc::from))
            .collect::<Result<Vec<Arc<[f64]>>, _>>()?;

        debug!(
            "Opened a visibility stream: {} rows, {} pointings, {} spectral windows, column {}, {}",
            rows.as_ref().map(|r| r.len()).unwrap_or(input.num_rows()),
            input.num_pointings(),
            freq_tables.len(),
            config.data_column,
            if output.is_some() {
                "with output"
            } else {
                "read only"
            }
        );

        Ok(VisStream {
            input,
            output,
            config,
            rows,
            cursor: 0,
            alignment_breaks_in_a_row: 0,
            alignment_warnings: 0,
            freq_tables,
            aborted: false,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// The number of rows that will be streamed.
    pub fn num_rows(&self) -> usize {
        match self.rows.as_ref() {
            Some(rows) => rows.len(),
            None => self.input.num_rows(),
        }
    }

    /// The number of rows read so far.
    pub fn rows_read(&self) -> usize {
        self.cursor.min(self.num_rows())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.num_rows()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn num_pointings(&self) -> usize {
        self.input.num_pointings()
    }

    /// The phase centres of the input dataset's pointings.
    pub fn phase_centres(&self) -> Result<Vec<RADec>, VisStreamError> {
        Ok(self.input.phase_centres()?)
    }

    /// Make a chunk with the configured capacity.
    pub fn new_chunk(&self) -> Chunk {
        Chunk::new(self.config.chunk_capacity)
    }

    pub fn input(&self) -> &D {
        &self.input
    }

    pub fn output(&self) -> Option<&D> {
        self.output.as_ref()
    }

    /// Give back the datasets.
    pub fn into_datasets(self) -> (D, Option<D>) {
        (self.input, self.output)
    }

    fn physical_row(&self, logical_row: usize) -> usize {
        match self.rows.as_ref() {
            Some(rows) => rows[logical_row],
            None => logical_row,
        }
    }

    /// Read the next rows into `chunk`, returning how many were read. 0 means
    /// there is nothing left; reading again keeps returning 0.
    pub fn read_chunk(&mut self, chunk: &mut Chunk) -> Result<usize, VisStreamError> {
        if self.aborted {
            return Err(VisStreamError::Aborted);
        }
        if chunk.capacity() == 0 {
            return Err(VisStreamError::ZeroCapacity);
        }
        chunk.reset_size();
        chunk.set_dataset_id(self.config.dataset_id);

        let total = self.num_rows();
        if self.cursor >= total {
            chunk.set_size(0);
            return Ok(0);
        }
        let mut size = chunk.capacity().min(total - self.cursor);

        // Nothing about the stream changes until every row has been read, so
        // a failed read can be retried.
        let mut broken_by_pointing = false;
        if self.config.align_pointings {
            let first_row = self.physical_row(self.cursor);
            let pointing = self.input.field_id(first_row).map_err(|e| {
                chunk.set_size(0);
                e
            })?;
            let mut run = 1;
            while run < size {
                let row = self.physical_row(self.cursor + run);
                let field = self.input.field_id(row).map_err(|e| {
                    chunk.set_size(0);
                    e
                })?;
                if field != pointing {
                    break;
                }
                run += 1;
            }
            if run < size {
                trace!("Pointing {pointing} ends {run} rows into the chunk");
                size = run;
                broken_by_pointing = true;
            }
        }

        let start = self.cursor;
        let column = self.config.data_column;
        let mut rows = Vec::with_capacity(size);
        for logical_row in start..start + size {
            let index = self.physical_row(logical_row);
            let row = match self.input.read_row(index, column) {
                Ok(row) => row,
                Err(e) => {
                    debug!("Couldn't read row {index}; the chunk is left empty");
                    chunk.set_size(0);
                    return Err(e.into());
                }
            };
            let freqs = match self.freq_tables.get(row.spw) {
                Some(f) => Arc::clone(f),
                None => {
                    chunk.set_size(0);
                    return Err(DatasetError::BadSpw {
                        spw: row.spw,
                        num_spws: self.freq_tables.len(),
                    }
                    .into());
                }
            };
            rows.push((index, row, freqs));
        }

        if self.config.align_pointings {
            if broken_by_pointing {
                self.alignment_breaks_in_a_row += 1;
                if self.alignment_breaks_in_a_row > ALIGNMENT_BREAKS_BEFORE_WARNING
                    && self.alignment_warnings == 0
                {
                    warn!("Chunks are being cut short by pointing changes; the dataset doesn't appear to be sorted by pointing. This is slow");
                    self.alignment_warnings += 1;
                }
            } else {
                self.alignment_breaks_in_a_row = 0;
            }
        }
        self.cursor += size;
        chunk.set_size(size);

        let max_chans = rows.iter().map(|(_, r, _)| r.num_chans()).max().unwrap_or(0);
        let max_pols = rows.iter().map(|(_, r, _)| r.num_pols()).max().unwrap_or(0);
        chunk.reshape(max_chans, max_pols);
        for (i, (index, row, freqs)) in rows.into_iter().enumerate() {
            chunk.fill(i, index, &row, freqs);
        }

        trace!(
            "Read rows {start}..{} into a chunk of shape ({max_chans}, {max_pols})",
            start + size
        );
        Ok(size)
    }

    /// Write the outputs of `chunk` to the output dataset. Does nothing if the
    /// stream has no output dataset. If anything can't be written, the stream
    /// is aborted.
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<(), VisStreamError> {
        if self.aborted {
            return Err(VisStreamError::Aborted);
        }
        let output = match self.output.as_mut() {
            Some(o) => o,
            None => return Ok(()),
        };

        let column = self.config.data_column;
        for rec in chunk.outputs() {
            let vis_row = rec.to_vis_row();
            if let Err(err) = output.write_row(rec.index, column, &vis_row) {
                self.aborted = true;
                return Err(VisStreamError::Write {
                    row: rec.index,
                    err,
                });
            }
        }
        Ok(())
    }

    /// Change the phase centre of a pointing in the output dataset. Does
    /// nothing if the stream has no output dataset.
    pub fn set_phase_centre(
        &mut self,
        pointing: usize,
        radec: RADec,
    ) -> Result<(), VisStreamError> {
        if let Some(output) = self.output.as_mut() {
            output.set_phase_centre(pointing, radec)?;
        }
        Ok(())
    }
}
