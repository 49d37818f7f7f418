// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. e.g. the `model` subcommand
//! needs a beam, and every subcommand can take its arguments from a file.

mod beam;
mod printers;

pub(super) use beam::BeamArgs;
pub(super) use printers::{display_warnings, InfoPrinter, Warn};

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    beam::BEAM_TYPES_COMMA_SEPARATED, io::DATA_COLUMNS_COMMA_SEPARATED, model::StackMode,
    srclist::CATALOG_FILE_TYPES_COMMA_SEPARATED,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref CATALOG_HELP: String =
        format!("Path to the sky-model catalog. Supported formats: {}", *CATALOG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref BEAM_TYPE_HELP: String =
        format!("The primary beam used to decide which catalog components are visible in each pointing. Supported types: {}. Default: none", *BEAM_TYPES_COMMA_SEPARATED);

    pub(super) static ref STACK_MODES_COMMA_SEPARATED: String = StackMode::iter().join(", ");

    pub(super) static ref STACK_MODE_HELP: String =
        format!("Whether catalog flux densities are subtracted from or added to the data. Supported modes: {}. Default: {}", *STACK_MODES_COMMA_SEPARATED, StackMode::default());

    pub(super) static ref DATA_COLUMN_HELP: String =
        format!("The visibility column to stream. Supported columns: {}. Default: data", *DATA_COLUMNS_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Read a subcommand's arguments out of a toml or json file. The file type is
/// determined by the extension. Any errors are returned as
/// [`StackerError::ArgFile`](crate::cli::StackerError::ArgFile) from the
/// calling function.
macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(StackerError::ArgFile(format!(
                            "Couldn't decode toml structure from {}:\n{err}",
                            $arg_file.display()
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(StackerError::ArgFile(format!(
                            "Couldn't decode json structure from {}:\n{err}",
                            $arg_file.display()
                        )))
                    }
                }
            }

            None => {
                return Err(StackerError::ArgFile(format!(
                    "Argument file '{}' doesn't have a recognised file extension! Valid extensions are: {}",
                    $arg_file.display(),
                    *ARG_FILE_TYPES_COMMA_SEPARATED
                )))
            }
        }
    });
}
