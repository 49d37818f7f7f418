// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stream a measurement set through chunks, copying inputs to outputs.

#[cfg(test)]
mod tests;

use std::{borrow::Cow, path::PathBuf, str::FromStr};

use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP, DATA_COLUMN_HELP};
use crate::{
    constants::{DEFAULT_CHUNK_CAPACITY, DEFAULT_DATASET_ID},
    io::{DataColumn, MsDataset, VisDataset, DATA_COLUMNS_COMMA_SEPARATED},
    stream::{StreamConfig, VisStream},
    StackerError, PROGRESS_BARS,
};

#[derive(Error, Debug)]
pub(super) enum StreamArgsError {
    #[error("No input measurement set was supplied")]
    NoData,

    #[error("The output measurement set can't be the same as the input")]
    SameOutput,

    #[error("Unrecognised data column '{0}'; supported columns are: {}", *DATA_COLUMNS_COMMA_SEPARATED)]
    BadDataColumn(String),
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StreamCliArgs {
    /// The input measurement set.
    #[clap(short, long, parse(from_os_str))]
    data: Option<PathBuf>,

    /// A measurement set to write chunk outputs to. It must have the same
    /// number of rows as the input. If not given, nothing is written.
    #[clap(short, long, parse(from_os_str))]
    output_data: Option<PathBuf>,

    #[clap(long, help = DATA_COLUMN_HELP.as_str())]
    data_column: Option<String>,

    /// Only stream rows of matching fields. Fields are given as IDs, inclusive
    /// ID ranges or names, separated by commas, e.g. 0,2~4,CenA
    #[clap(long)]
    field: Option<String>,

    /// Don't let a chunk span more than one pointing.
    #[clap(long)]
    #[serde(default)]
    align_pointings: bool,

    /// The maximum number of rows in a chunk. Default: 10000
    #[clap(long)]
    chunk_size: Option<usize>,

    /// The ID stamped onto every chunk. Default: 0
    #[clap(long, allow_hyphen_values = true)]
    dataset_id: Option<i32>,
}

impl StreamCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            data: self.data.or(other.data),
            output_data: self.output_data.or(other.output_data),
            data_column: self.data_column.or(other.data_column),
            field: self.field.or(other.field),
            align_pointings: self.align_pointings || other.align_pointings,
            chunk_size: self.chunk_size.or(other.chunk_size),
            dataset_id: self.dataset_id.or(other.dataset_id),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct StreamArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "stream")]
    #[serde(default)]
    stream_args: StreamCliArgs,
}

/// What happened over a whole stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct StreamSummary {
    pub(super) num_rows: usize,
    pub(super) num_chunks: usize,
    pub(super) smallest_chunk: usize,
    pub(super) largest_chunk: usize,

    /// Chunks with fewer rows than the chunk capacity. The last chunk is not
    /// counted.
    pub(super) num_short_chunks: usize,
}

/// Read every chunk of `stream`, copy its inputs to its outputs and write it.
pub(super) fn stream_identity<D: VisDataset>(
    stream: &mut VisStream<D>,
    progress: &ProgressBar,
) -> Result<StreamSummary, StackerError> {
    let mut summary = StreamSummary {
        smallest_chunk: usize::MAX,
        ..Default::default()
    };
    let mut chunk = stream.new_chunk();
    let mut previous_was_short = false;
    loop {
        let n = stream.read_chunk(&mut chunk)?;
        if n == 0 {
            break;
        }
        if previous_was_short {
            summary.num_short_chunks += 1;
        }
        previous_was_short = n < chunk.capacity();

        chunk.copy_inputs_to_outputs();
        stream.write_chunk(&chunk)?;

        summary.num_rows += n;
        summary.num_chunks += 1;
        summary.smallest_chunk = summary.smallest_chunk.min(n);
        summary.largest_chunk = summary.largest_chunk.max(n);
        progress.inc(n as u64);
    }
    if summary.num_chunks == 0 {
        summary.smallest_chunk = 0;
    }
    Ok(summary)
}

impl StreamArgs {
    /// Merge the CLI arguments with an arguments file, preferring the CLI
    /// arguments.
    pub(super) fn merge(self) -> Result<StreamArgs, StackerError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let StreamArgs {
                args_file: _,
                stream_args,
            } = unpack_arg_file!(arg_file);

            Ok(StreamArgs {
                args_file: None,
                stream_args: cli_args.stream_args.merge(stream_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<(PathBuf, Option<PathBuf>, StreamConfig), StackerError> {
        let StreamCliArgs {
            data,
            output_data,
            data_column,
            field,
            align_pointings,
            chunk_size,
            dataset_id,
        } = self.stream_args;

        let data = data.ok_or(StreamArgsError::NoData)?;
        if output_data.as_ref() == Some(&data) {
            return Err(StreamArgsError::SameOutput.into());
        }
        let data_column = match data_column {
            None => DataColumn::default(),
            Some(c) => DataColumn::from_str(&c).map_err(|_| StreamArgsError::BadDataColumn(c))?,
        };
        if output_data.is_none() {
            "No output measurement set was given; chunks will be read but not written".warn();
        }

        Ok((
            data,
            output_data,
            StreamConfig {
                data_column,
                field_selection: field,
                align_pointings,
                chunk_capacity: chunk_size.unwrap_or(DEFAULT_CHUNK_CAPACITY),
                dataset_id: dataset_id.unwrap_or(DEFAULT_DATASET_ID),
            },
        ))
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), StackerError> {
        debug!("{:#?}", self);

        let (data, output_data, config) = self.parse()?;

        let mut printer = InfoPrinter::new("Stream info".into());
        printer.push_line(format!("Input: {}", data.display()).into());
        match output_data.as_ref() {
            Some(o) => printer.push_line(format!("Output: {}", o.display()).into()),
            None => printer.push_line("No output; chunks are only read".into()),
        }
        let mut block: Vec<Cow<'static, str>> = vec![
            format!("Column: {}", config.data_column.col_name()).into(),
            format!("Chunk capacity: {} rows", config.chunk_capacity).into(),
            format!("Dataset ID: {}", config.dataset_id).into(),
        ];
        if let Some(f) = config.field_selection.as_ref() {
            block.push(format!("Field selection: {f}").into());
        }
        if config.align_pointings {
            block.push("Chunks are aligned to pointings".into());
        }
        printer.push_block(block);
        printer.display();
        display_warnings();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let input = MsDataset::open(&data)?;
        let output = output_data.as_ref().map(MsDataset::open_rw).transpose()?;
        let mut stream = VisStream::open(input, output, config)?;
        info!(
            "Streaming {} rows over {} pointings",
            stream.num_rows(),
            stream.num_pointings()
        );

        let progress = ProgressBar::with_draw_target(
            Some(stream.num_rows() as u64),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} rows ({elapsed_precise}<{eta_precise})")
                .map_err(|e| StackerError::Generic(e.to_string()))?
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Streaming");

        let summary = match stream_identity(&mut stream, &progress) {
            Ok(s) => {
                progress.finish();
                s
            }
            Err(e) => {
                progress.abandon_with_message("Failed");
                return Err(e);
            }
        };

        let mut printer = InfoPrinter::new("Stream summary".into());
        printer.push_line(
            format!(
                "{} rows in {} chunks",
                summary.num_rows, summary.num_chunks
            )
            .into(),
        );
        printer.push_line(
            format!(
                "Chunk sizes: {} to {} rows",
                summary.smallest_chunk, summary.largest_chunk
            )
            .into(),
        );
        if summary.num_short_chunks > 0 {
            printer.push_line(
                format!(
                    "{} chunks were cut short by pointing changes",
                    summary.num_short_chunks
                )
                .into(),
            );
        }
        printer.display();

        Ok(())
    }
}
