// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Build a stacking model from a catalog, and optionally write it out.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use marlu::RADec;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::{
    display_warnings, BeamArgs, InfoPrinter, Warn, ARG_FILE_HELP, CATALOG_HELP,
    STACK_MODES_COMMA_SEPARATED, STACK_MODE_HELP,
};
use crate::{
    io::{MsDataset, VisDataset},
    model::{StackMode, StackingModel},
    srclist::read_catalog_file,
    StackerError,
};

lazy_static::lazy_static! {
    static ref MODEL_OUTPUT_TYPES_COMMA_SEPARATED: String = ModelOutputType::iter().join(", ");

    static ref OUTPUT_HELP: String =
        format!("Write the stacking model to this file. Supported formats: {}", *MODEL_OUTPUT_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Clone, Copy, strum_macros::Display, strum_macros::EnumIter)]
enum ModelOutputType {
    #[strum(serialize = "json")]
    Json,

    #[strum(serialize = "yaml")]
    Yaml,
}

impl ModelOutputType {
    fn from_path(path: &Path) -> Option<ModelOutputType> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Some(ModelOutputType::Json),
            Some("yaml" | "yml") => Some(ModelOutputType::Yaml),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub(super) enum ModelArgsError {
    #[error("No catalog was supplied")]
    NoCatalog,

    #[error("No phase centres were supplied; use --data or --phase-centre")]
    NoPhaseCentres,

    #[error("Phase centres were given with --phase-centre and --data; use only one")]
    BothPhaseCentreSources,

    #[error("Phase centres need an RA and a Dec each, but {0} numbers were given")]
    OddPhaseCentre(usize),

    #[error("Unrecognised stacking mode '{got}'; supported modes are: {}", *STACK_MODES_COMMA_SEPARATED)]
    BadMode { got: String },

    #[error("Can't write a stacking model to '{}'; supported formats are: {}", .path.display(), *MODEL_OUTPUT_TYPES_COMMA_SEPARATED)]
    BadOutputExtension { path: PathBuf },

    #[error("Couldn't serialise the stacking model: {0}")]
    Serialise(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ModelCliArgs {
    #[clap(short, long, help = CATALOG_HELP.as_str(), parse(from_os_str))]
    catalog: Option<PathBuf>,

    /// A measurement set; the phase centres of its fields are used as the
    /// pointings.
    #[clap(short, long, parse(from_os_str))]
    data: Option<PathBuf>,

    /// A pointing phase centre [degrees]. May be given multiple times.
    #[clap(
        long = "phase-centre",
        number_of_values = 2,
        multiple_occurrences(true),
        allow_hyphen_values = true,
        value_names = &["RA_DEG", "DEC_DEG"]
    )]
    phase_centres: Option<Vec<f64>>,

    #[clap(long, help = STACK_MODE_HELP.as_str())]
    mode: Option<String>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), parse(from_os_str))]
    output: Option<PathBuf>,
}

impl ModelCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            catalog: self.catalog.or(other.catalog),
            data: self.data.or(other.data),
            phase_centres: self.phase_centres.or(other.phase_centres),
            mode: self.mode.or(other.mode),
            output: self.output.or(other.output),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct ModelArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "model")]
    #[serde(default)]
    model_args: ModelCliArgs,

    #[clap(flatten)]
    #[serde(rename = "beam")]
    #[serde(default)]
    beam_args: BeamArgs,
}

/// Turn a flat list of (RA, Dec) pairs \[degrees\] into phase centres.
fn parse_phase_centres(radecs: &[f64]) -> Result<Vec<RADec>, ModelArgsError> {
    if radecs.len() % 2 != 0 {
        return Err(ModelArgsError::OddPhaseCentre(radecs.len()));
    }
    Ok(radecs
        .chunks_exact(2)
        .map(|pair| RADec::from_degrees(pair[0], pair[1]))
        .collect())
}

fn write_model(model: &StackingModel, path: &Path) -> Result<(), ModelArgsError> {
    let output_type =
        ModelOutputType::from_path(path).ok_or_else(|| ModelArgsError::BadOutputExtension {
            path: path.to_path_buf(),
        })?;
    let mut f = BufWriter::new(File::create(path)?);
    match output_type {
        ModelOutputType::Json => serde_json::to_writer_pretty(&mut f, model)
            .map_err(|e| ModelArgsError::Serialise(e.to_string()))?,
        ModelOutputType::Yaml => serde_yaml::to_writer(&mut f, model)
            .map_err(|e| ModelArgsError::Serialise(e.to_string()))?,
    }
    f.flush()?;
    Ok(())
}

impl ModelArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct, preferring CLI arguments.
    pub(super) fn merge(self) -> Result<ModelArgs, StackerError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let ModelArgs {
                args_file: _,
                model_args,
                beam_args,
            } = unpack_arg_file!(arg_file);

            Ok(ModelArgs {
                args_file: None,
                model_args: cli_args.model_args.merge(model_args),
                beam_args: cli_args.beam_args.merge(beam_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), StackerError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            model_args:
                ModelCliArgs {
                    catalog,
                    data,
                    phase_centres,
                    mode,
                    output,
                },
            beam_args,
        } = self;

        let catalog_path = catalog.ok_or(ModelArgsError::NoCatalog)?;
        let mode = match mode {
            None => StackMode::default(),
            Some(m) => StackMode::from_str(&m).map_err(|_| ModelArgsError::BadMode { got: m })?,
        };
        if let Some(output) = output.as_deref() {
            if ModelOutputType::from_path(output).is_none() {
                return Err(ModelArgsError::BadOutputExtension {
                    path: output.to_path_buf(),
                }
                .into());
            }
        }

        let phase_centres = match (data, phase_centres) {
            (Some(_), Some(_)) => return Err(ModelArgsError::BothPhaseCentreSources.into()),
            (None, None) => return Err(ModelArgsError::NoPhaseCentres.into()),
            (None, Some(radecs)) => parse_phase_centres(&radecs)?,
            (Some(data), None) => {
                let ms = MsDataset::open(&data)?;
                let mut printer = InfoPrinter::new("Input data".into());
                printer.push_line(format!("Measurement set: {}", data.display()).into());
                printer.push_line(format!("{} rows", ms.num_rows()).into());
                printer.display();
                ms.phase_centres()?
            }
        };
        if phase_centres.is_empty() {
            return Err(ModelArgsError::NoPhaseCentres.into());
        }

        let catalog = read_catalog_file(&catalog_path)?;
        let counts = catalog.get_counts();
        let mut printer = InfoPrinter::new("Catalog info".into());
        printer.push_line(format!("File: {}", catalog_path.display()).into());
        printer.push_block(vec![
            format!(
                "{} components over {} sources",
                catalog.num_components(),
                catalog.len()
            )
            .into(),
            format!(
                "{} points, {} gaussians, {} disks",
                counts.num_points, counts.num_gaussians, counts.num_disks
            )
            .into(),
        ]);
        printer.push_line(format!("Total flux density: {} Jy", catalog.total_flux()).into());
        printer.display();

        let beam = beam_args.parse()?;

        let mut printer = InfoPrinter::new("Pointings".into());
        for (i, pc) in phase_centres.iter().enumerate() {
            printer.push_line(
                format!(
                    "{i}: RA {:.4}°, Dec {:.4}°",
                    pc.ra.to_degrees(),
                    pc.dec.to_degrees()
                )
                .into(),
            );
        }
        printer.display();

        display_warnings();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let model = StackingModel::build(&catalog, &phase_centres, &*beam, mode);
        let num_points = model.num_points();
        for (i, &n) in num_points.iter().enumerate() {
            if n == 0 {
                format!("Pointing {i} has no catalog components inside its beam").warn();
            }
        }

        let mut printer = InfoPrinter::new("Stacking model".into());
        printer.push_line(format!("Mode: {mode}").into());
        printer.push_line(
            format!(
                "Components per pointing: [{}]",
                num_points.iter().join(", ")
            )
            .into(),
        );
        if let Some(output) = output.as_deref() {
            printer.push_line(format!("Writing to {}", output.display()).into());
        }
        printer.display();
        display_warnings();

        if let Some(output) = output {
            write_model(&model, &output)?;
            info!("Stacking model written to {}", output.display());
        }

        Ok(())
    }
}
