// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reusable batches of visibility records.
//!
//! A [`Chunk`] has a fixed capacity and holds that many pairs of input and
//! output [`VisRecord`]s. A stream fills the inputs and mirrors their
//! metadata into the outputs; processing code reads inputs and writes
//! outputs, then hands the chunk back to the stream to be written.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use marlu::{c32, UVW};
use ndarray::Array2;

use crate::io::VisRow;

/// A single row of visibilities inside a [`Chunk`].
///
/// Samples and flags are flattened with the layout `pol * num_chans + chan`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisRecord {
    /// The row of the dataset that this record came from.
    pub index: usize,

    /// \[metres\]
    pub uvw: UVW,

    pub pointing: usize,

    pub spw: usize,

    /// The channel frequencies of this record's spectral window \[Hz\]. This
    /// is shared with every other record of the same spectral window.
    pub freqs: Arc<[f64]>,

    pub num_chans: usize,

    pub num_pols: usize,

    pub data: Vec<c32>,

    /// `true` means flagged.
    pub flags: Vec<bool>,

    /// One per polarisation.
    pub weights: Vec<f32>,
}

impl VisRecord {
    fn empty() -> VisRecord {
        VisRecord {
            index: 0,
            uvw: UVW {
                u: 0.0,
                v: 0.0,
                w: 0.0,
            },
            pointing: 0,
            spw: 0,
            freqs: Arc::from(Vec::new()),
            num_chans: 0,
            num_pols: 0,
            data: vec![],
            flags: vec![],
            weights: vec![],
        }
    }

    /// The flat index of a (polarisation, channel) pair.
    #[inline]
    pub fn flat_index(&self, pol: usize, chan: usize) -> usize {
        pol * self.num_chans + chan
    }

    pub fn vis(&self, pol: usize, chan: usize) -> c32 {
        self.data[self.flat_index(pol, chan)]
    }

    pub fn flag(&self, pol: usize, chan: usize) -> bool {
        self.flags[self.flat_index(pol, chan)]
    }

    fn reserve(&mut self, num_elements: usize, num_pols: usize) {
        self.data.reserve(num_elements.saturating_sub(self.data.len()));
        self.flags
            .reserve(num_elements.saturating_sub(self.flags.len()));
        self.weights
            .reserve(num_pols.saturating_sub(self.weights.len()));
    }

    /// Populate this record from a dataset row.
    fn fill(&mut self, index: usize, row: &VisRow, freqs: Arc<[f64]>) {
        let num_chans = row.num_chans();
        let num_pols = row.num_pols();
        self.index = index;
        self.uvw = row.uvw;
        self.pointing = row.field;
        self.spw = row.spw;
        self.freqs = freqs;
        self.num_chans = num_chans;
        self.num_pols = num_pols;

        self.data.clear();
        self.flags.clear();
        for pol in 0..num_pols {
            self.data.extend(row.vis.column(pol).iter());
            self.flags.extend(row.flags.column(pol).iter());
        }
        self.weights.clear();
        self.weights.extend_from_slice(&row.weights);
    }

    /// Copy everything but the samples from `other`; samples are zeroed.
    fn mirror(&mut self, other: &VisRecord) {
        self.index = other.index;
        self.uvw = other.uvw;
        self.pointing = other.pointing;
        self.spw = other.spw;
        self.freqs = Arc::clone(&other.freqs);
        self.num_chans = other.num_chans;
        self.num_pols = other.num_pols;

        self.data.clear();
        self.data.resize(other.data.len(), c32::default());
        self.flags.clear();
        self.flags.extend_from_slice(&other.flags);
        self.weights.clear();
        self.weights.extend_from_slice(&other.weights);
    }

    /// Copy the samples, flags and weights of `other` into this record.
    pub fn copy_samples_from(&mut self, other: &VisRecord) {
        self.data.clear();
        self.data.extend_from_slice(&other.data);
        self.flags.clear();
        self.flags.extend_from_slice(&other.flags);
        self.weights.clear();
        self.weights.extend_from_slice(&other.weights);
    }

    /// Assemble a dataset row from this record.
    pub fn to_vis_row(&self) -> VisRow {
        let shape = (self.num_chans, self.num_pols);
        VisRow {
            uvw: self.uvw,
            field: self.pointing,
            spw: self.spw,
            vis: Array2::from_shape_fn(shape, |(chan, pol)| self.vis(pol, chan)),
            flags: Array2::from_shape_fn(shape, |(chan, pol)| self.flag(pol, chan)),
            weights: self.weights.clone(),
        }
    }
}

/// A batch of up to `capacity` input/output record pairs.
#[derive(Debug, Clone)]
pub struct Chunk {
    capacity: usize,

    /// The number of records in use. Never more than `capacity`.
    size: usize,

    dataset_id: i32,

    /// The largest (num_chans, num_pols) of the records in use.
    max_chans: usize,
    max_pols: usize,

    inputs: Vec<VisRecord>,
    outputs: Vec<VisRecord>,
}

impl Chunk {
    pub fn new(capacity: usize) -> Chunk {
        Chunk {
            capacity,
            size: capacity,
            dataset_id: 0,
            max_chans: 0,
            max_pols: 0,
            inputs: vec![VisRecord::empty(); capacity],
            outputs: vec![VisRecord::empty(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of records in use.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Use every record of the chunk.
    pub fn reset_size(&mut self) {
        self.size = self.capacity;
    }

    /// Use only the first `size` records. The capacity is not changed.
    pub fn set_size(&mut self, size: usize) {
        self.size = size.min(self.capacity);
    }

    pub fn dataset_id(&self) -> i32 {
        self.dataset_id
    }

    pub fn set_dataset_id(&mut self, dataset_id: i32) {
        self.dataset_id = dataset_id;
    }

    /// The largest (num_chans, num_pols) that records currently hold.
    pub fn shape(&self) -> (usize, usize) {
        (self.max_chans, self.max_pols)
    }

    /// Prepare every record to hold up to `max_chans * max_pols` samples.
    /// Buffers only ever grow.
    pub fn reshape(&mut self, max_chans: usize, max_pols: usize) {
        self.max_chans = max_chans;
        self.max_pols = max_pols;
        let num_elements = max_chans * max_pols;
        for rec in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            rec.reserve(num_elements, max_pols);
        }
    }

    /// Fill the input record `i` from a dataset row, and mirror it into the
    /// output record `i`.
    pub(crate) fn fill(&mut self, i: usize, index: usize, row: &VisRow, freqs: Arc<[f64]>) {
        let input = &mut self.inputs[i];
        input.fill(index, row, freqs);
        self.outputs[i].mirror(input);
    }

    pub fn inputs(&self) -> &[VisRecord] {
        &self.inputs[..self.size]
    }

    pub fn outputs(&self) -> &[VisRecord] {
        &self.outputs[..self.size]
    }

    pub fn outputs_mut(&mut self) -> &mut [VisRecord] {
        &mut self.outputs[..self.size]
    }

    /// Get the in-use inputs and outputs at the same time.
    pub fn split_mut(&mut self) -> (&[VisRecord], &mut [VisRecord]) {
        (&self.inputs[..self.size], &mut self.outputs[..self.size])
    }

    /// Make every in-use output a copy of its input.
    pub fn copy_inputs_to_outputs(&mut self) {
        let (inputs, outputs) = self.split_mut();
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            output.copy_samples_from(input);
        }
    }
}
