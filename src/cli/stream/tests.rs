// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use indoc::indoc;
use marlu::{c32, RADec, UVW};
use ndarray::prelude::*;
use tempfile::TempDir;

use super::*;
use crate::io::{Field, MemoryDataset, VisRow};

fn dataset(fields: &[usize], blank: bool) -> MemoryDataset {
    let mut ds = MemoryDataset::new(
        vec![
            Field::new("a", RADec::from_degrees(0.0, -27.0)),
            Field::new("b", RADec::from_degrees(5.0, -27.0)),
            Field::new("c", RADec::from_degrees(10.0, -27.0)),
        ],
        vec![vec![150e6, 151e6, 152e6]],
    );
    for (i, &field) in fields.iter().enumerate() {
        let vis = if blank {
            Array2::default((3, 4))
        } else {
            Array2::from_shape_fn((3, 4), |(c, p)| c32::new(i as f32, (c * 4 + p) as f32))
        };
        ds.push_row(VisRow {
            uvw: UVW {
                u: i as f64,
                v: 0.0,
                w: 0.0,
            },
            field,
            spw: 0,
            vis,
            flags: Array2::from_elem((3, 4), false),
            weights: vec![1.0; 4],
        })
        .unwrap();
    }
    ds
}

fn args(stream_args: StreamCliArgs) -> StreamArgs {
    StreamArgs {
        args_file: None,
        stream_args,
    }
}

#[test]
fn aligned_streams_are_summarised() {
    let fields = [0, 0, 0, 1, 1, 0, 0, 0, 0, 2];
    let config = StreamConfig {
        align_pointings: true,
        chunk_capacity: 4,
        ..Default::default()
    };
    let mut stream = VisStream::open(
        dataset(&fields, false),
        Some(dataset(&fields, true)),
        config,
    )
    .unwrap();
    let progress = ProgressBar::hidden();
    let summary = stream_identity(&mut stream, &progress).unwrap();
    assert_eq!(
        summary,
        StreamSummary {
            num_rows: 10,
            num_chunks: 4,
            smallest_chunk: 1,
            largest_chunk: 4,
            num_short_chunks: 2,
        }
    );
    assert_eq!(progress.position(), 10);

    let (input, output) = stream.into_datasets();
    let output = output.unwrap();
    for row in 0..fields.len() {
        assert_eq!(
            input.row(row, DataColumn::Data).unwrap(),
            output.row(row, DataColumn::Data).unwrap()
        );
    }
}

#[test]
fn empty_selections_never_get_summarised() {
    let config = StreamConfig {
        field_selection: Some("2".to_string()),
        ..Default::default()
    };
    let result = VisStream::open(dataset(&[0, 1], false), None, config);
    assert!(result.is_err());

    let mut stream = VisStream::open(dataset(&[0, 1], false), None, StreamConfig::default()).unwrap();
    let summary = stream_identity(&mut stream, &ProgressBar::hidden()).unwrap();
    assert_eq!(summary.num_chunks, 1);
    assert_eq!(summary.smallest_chunk, 2);
    assert_eq!(summary.num_short_chunks, 0);
    // Reading again gives nothing.
    let summary = stream_identity(&mut stream, &ProgressBar::hidden()).unwrap();
    assert_eq!(summary, StreamSummary::default());
}

#[test]
fn stream_args_have_defaults() {
    let (data, output, config) = args(StreamCliArgs {
        data: Some(PathBuf::from("in.ms")),
        ..Default::default()
    })
    .parse()
    .unwrap();
    assert_eq!(data, PathBuf::from("in.ms"));
    assert!(output.is_none());
    assert_eq!(config, StreamConfig::default());

    let (_, output, config) = args(StreamCliArgs {
        data: Some(PathBuf::from("in.ms")),
        output_data: Some(PathBuf::from("out.ms")),
        data_column: Some("CORRECTED_DATA".to_string()),
        field: Some("0~2".to_string()),
        align_pointings: true,
        chunk_size: Some(16),
        dataset_id: Some(-3),
    })
    .parse()
    .unwrap();
    assert_eq!(output, Some(PathBuf::from("out.ms")));
    assert_eq!(
        config,
        StreamConfig {
            data_column: DataColumn::CorrectedData,
            field_selection: Some("0~2".to_string()),
            align_pointings: true,
            chunk_capacity: 16,
            dataset_id: -3,
        }
    );
}

#[test]
fn bad_stream_args_are_reported() {
    let result = args(StreamCliArgs::default()).parse();
    assert!(matches!(result, Err(StackerError::Stream(_))));

    let result = args(StreamCliArgs {
        data: Some(PathBuf::from("in.ms")),
        output_data: Some(PathBuf::from("in.ms")),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(StackerError::Stream(_))));

    let result = args(StreamCliArgs {
        data: Some(PathBuf::from("in.ms")),
        data_column: Some("flags".to_string()),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(StackerError::VisRead(_))));

    let tmp = TempDir::new().unwrap();
    let result = args(StreamCliArgs {
        data: Some(tmp.path().join("missing.ms")),
        ..Default::default()
    })
    .run(false);
    assert!(matches!(result, Err(StackerError::VisRead(_))));
}

#[test]
fn dry_runs_dont_open_anything() {
    let tmp = TempDir::new().unwrap();
    let result = args(StreamCliArgs {
        data: Some(tmp.path().join("missing.ms")),
        ..Default::default()
    })
    .run(true);
    assert!(result.is_ok());
}

#[test]
fn stream_arg_files_are_merged() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("stream.toml");
    let mut f = File::create(&path).unwrap();
    f.write_all(
        indoc! {r#"
            [stream]
            data = "file.ms"
            data_column = "model_data"
            align_pointings = true
            chunk_size = 100
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    let merged = StreamArgs {
        args_file: Some(path),
        stream_args: StreamCliArgs {
            data: Some(PathBuf::from("cli.ms")),
            chunk_size: Some(5),
            ..Default::default()
        },
    }
    .merge()
    .unwrap();
    assert_eq!(
        merged,
        args(StreamCliArgs {
            data: Some(PathBuf::from("cli.ms")),
            output_data: None,
            data_column: Some("model_data".to_string()),
            field: None,
            align_pointings: true,
            chunk_size: Some(5),
            dataset_id: None,
        })
    );
}
