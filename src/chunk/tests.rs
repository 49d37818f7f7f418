// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use marlu::{c32, UVW};
use ndarray::prelude::*;

use super::*;

fn row(num_chans: usize, num_pols: usize) -> VisRow {
    VisRow {
        uvw: UVW {
            u: 10.0,
            v: 20.0,
            w: 30.0,
        },
        field: 2,
        spw: 1,
        vis: Array2::from_shape_fn((num_chans, num_pols), |(c, p)| {
            c32::new(c as f32, 10.0 * p as f32)
        }),
        flags: Array2::from_shape_fn((num_chans, num_pols), |(c, p)| c == 1 && p == 0),
        weights: (0..num_pols).map(|p| p as f32 + 0.5).collect(),
    }
}

#[test]
fn sizes_never_exceed_capacity() {
    let mut chunk = Chunk::new(4);
    assert_eq!(chunk.capacity(), 4);
    assert_eq!(chunk.len(), 4);
    chunk.set_size(2);
    assert_eq!(chunk.len(), 2);
    assert_eq!(chunk.inputs().len(), 2);
    assert_eq!(chunk.outputs().len(), 2);
    chunk.set_size(10);
    assert_eq!(chunk.len(), 4);
    chunk.set_size(0);
    assert!(chunk.is_empty());
    chunk.reset_size();
    assert_eq!(chunk.len(), 4);
    assert_eq!(chunk.capacity(), 4);
}

#[test]
fn records_use_pol_major_layout() {
    let mut chunk = Chunk::new(2);
    chunk.reshape(3, 2);
    assert_eq!(chunk.shape(), (3, 2));
    let freqs: Arc<[f64]> = Arc::from(vec![1e8, 2e8, 3e8]);
    let r = row(3, 2);
    chunk.fill(0, 17, &r, Arc::clone(&freqs));

    let input = &chunk.inputs()[0];
    assert_eq!(input.index, 17);
    assert_eq!(input.pointing, 2);
    assert_eq!(input.spw, 1);
    assert_eq!((input.num_chans, input.num_pols), (3, 2));
    assert_eq!(input.data.len(), 6);
    for pol in 0..2 {
        for chan in 0..3 {
            assert_eq!(input.data[pol * 3 + chan], r.vis[(chan, pol)]);
            assert_eq!(input.vis(pol, chan), r.vis[(chan, pol)]);
            assert_eq!(input.flag(pol, chan), r.flags[(chan, pol)]);
        }
    }
    assert!(!input.flags[4] && input.flags[1]);
    assert_eq!(input.weights, vec![0.5, 1.5]);
}

#[test]
fn outputs_mirror_inputs_with_zeroed_samples() {
    let mut chunk = Chunk::new(1);
    chunk.reshape(4, 4);
    let freqs: Arc<[f64]> = Arc::from(vec![1.0, 2.0, 3.0, 4.0]);
    chunk.fill(0, 3, &row(4, 4), Arc::clone(&freqs));

    let input = &chunk.inputs()[0];
    let output = &chunk.outputs()[0];
    assert_eq!(output.index, input.index);
    assert_eq!(output.uvw, input.uvw);
    assert_eq!(output.pointing, input.pointing);
    assert_eq!(output.spw, input.spw);
    assert_eq!(output.flags, input.flags);
    assert_eq!(output.weights, input.weights);
    assert_eq!(output.data.len(), input.data.len());
    assert!(output.data.iter().all(|v| *v == c32::default()));

    // Frequencies are shared, not copied.
    assert!(Arc::ptr_eq(&input.freqs, &freqs));
    assert!(Arc::ptr_eq(&output.freqs, &freqs));
    assert_eq!(Arc::strong_count(&freqs), 3);
}

#[test]
fn identity_processing_round_trips() {
    let mut chunk = Chunk::new(2);
    chunk.reshape(5, 2);
    let freqs: Arc<[f64]> = Arc::from(vec![0.0; 5]);
    let r = row(5, 2);
    chunk.fill(0, 0, &r, Arc::clone(&freqs));
    chunk.fill(1, 1, &row(5, 2), freqs);
    chunk.copy_inputs_to_outputs();

    for (input, output) in chunk.inputs().iter().zip(chunk.outputs()) {
        assert_eq!(input, output);
    }
    assert_eq!(chunk.outputs()[0].to_vis_row(), r);
}

#[test]
fn records_can_have_fewer_channels_than_the_chunk_shape() {
    let mut chunk = Chunk::new(2);
    chunk.reshape(8, 4);
    let freqs: Arc<[f64]> = Arc::from(vec![0.0; 2]);
    chunk.fill(0, 0, &row(2, 1), Arc::clone(&freqs));
    chunk.fill(1, 1, &row(8, 4), freqs);

    let small = &chunk.inputs()[0];
    assert_eq!(small.data.len(), 2);
    assert_eq!(small.flat_index(0, 1), 1);
    assert!(small.data.capacity() >= 32);
    assert_eq!(chunk.inputs()[1].data.len(), 32);

    let out = &mut chunk.outputs_mut()[0];
    out.data[1] = c32::new(1.0, 1.0);
    let vis_row = chunk.outputs()[0].to_vis_row();
    assert_eq!(vis_row.vis.dim(), (2, 1));
    assert_eq!(vis_row.vis[(1, 0)], c32::new(1.0, 1.0));
}
