// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all stacker-related errors. This should be the *only* error
//! enum that is publicly visible from the binary.

use thiserror::Error;

use super::{model::ModelArgsError, stream::StreamArgsError};
use crate::{
    beam::BeamError,
    io::{DatasetError, MsDatasetError},
    srclist::ReadCatalogError,
    stream::VisStreamError,
};

/// The *only* publicly visible error from the `stacker` binary. Each category
/// says which part of a run went wrong.
#[derive(Error, Debug)]
pub enum StackerError {
    /// Generic error surrounding catalogs.
    #[error("{0}\n\nCatalogs are YAML or JSON maps of source names to lists of components")]
    Srclist(String),

    /// An error related to beam code.
    #[error("{0}")]
    Beam(String),

    /// An error related to building a stacking model.
    #[error("{0}")]
    Model(String),

    /// An error related to reading visibilities.
    #[error("{0}")]
    VisRead(String),

    /// An error related to writing visibilities.
    #[error("{0}")]
    VisWrite(String),

    /// An error related to streaming visibilities.
    #[error("{0}")]
    Stream(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<ModelArgsError> for StackerError {
    fn from(e: ModelArgsError) -> Self {
        let s = e.to_string();
        match e {
            ModelArgsError::NoCatalog => Self::Srclist(s),
            ModelArgsError::NoPhaseCentres
            | ModelArgsError::BothPhaseCentreSources
            | ModelArgsError::BadMode { .. }
            | ModelArgsError::OddPhaseCentre(_)
            | ModelArgsError::BadOutputExtension { .. } => Self::Model(s),
            ModelArgsError::Serialise(_) => Self::Generic(s),
            ModelArgsError::IO(e) => Self::from(e),
        }
    }
}

impl From<StreamArgsError> for StackerError {
    fn from(e: StreamArgsError) -> Self {
        let s = e.to_string();
        match e {
            StreamArgsError::NoData | StreamArgsError::SameOutput => Self::Stream(s),
            StreamArgsError::BadDataColumn(_) => Self::VisRead(s),
        }
    }
}

impl From<ReadCatalogError> for StackerError {
    fn from(e: ReadCatalogError) -> Self {
        Self::Srclist(e.to_string())
    }
}

impl From<BeamError> for StackerError {
    fn from(e: BeamError) -> Self {
        Self::Beam(e.to_string())
    }
}

impl From<DatasetError> for StackerError {
    fn from(e: DatasetError) -> Self {
        Self::VisRead(e.to_string())
    }
}

impl From<MsDatasetError> for StackerError {
    fn from(e: MsDatasetError) -> Self {
        let s = e.to_string();
        match e {
            MsDatasetError::ReadOnly(_) => Self::VisWrite(s),
            _ => Self::VisRead(s),
        }
    }
}

impl From<VisStreamError> for StackerError {
    fn from(e: VisStreamError) -> Self {
        let s = e.to_string();
        match e {
            VisStreamError::Write { .. } | VisStreamError::Aborted => Self::VisWrite(s),
            VisStreamError::Dataset(e) => Self::from(e),
            VisStreamError::NoDataColumn(_)
            | VisStreamError::NoModelDataColumn(_)
            | VisStreamError::NoCorrectedDataColumn(_)
            | VisStreamError::ZeroCapacity
            | VisStreamError::InvalidSelection { .. }
            | VisStreamError::SelectionEmpty(_)
            | VisStreamError::OutputRowMismatch { .. } => Self::Stream(s),
        }
    }
}

impl From<std::io::Error> for StackerError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for StackerError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(e.to_string())
    }
}
