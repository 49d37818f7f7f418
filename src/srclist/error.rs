// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with reading in a catalog.
#[derive(Error, Debug)]
pub enum ReadCatalogError {
    #[error(
        "Catalog error: Source {source_name} has RA {ra}°, but this is out of range (0° <= RA < 360°)"
    )]
    InvalidRa { source_name: String, ra: f64 },

    #[error(
        "Catalog error: Source {source_name} has Dec {dec}°, but this is out of range (-90° <= Dec <= 90°)"
    )]
    InvalidDec { source_name: String, dec: f64 },

    #[error("Source {source_name}: A component has a non-finite flux density. This is not allowed.")]
    NonFiniteFlux { source_name: String },

    #[error("Source {source_name}: A {shape} component needs a size, but none was given")]
    MissingSize {
        source_name: String,
        shape: super::ShapeKind,
    },

    #[error("Source {source_name}: A component has a negative or non-finite size ({size} arcsec)")]
    InvalidSize { source_name: String, size: f64 },

    #[error("Could not deserialise the contents as yaml or json.\n\nyaml error: {yaml_err}\n\njson error: {json_err}")]
    FailedToDeserialise { yaml_err: String, json_err: String },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
