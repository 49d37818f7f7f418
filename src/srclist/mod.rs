// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for sky-model catalogs.
//!
//! A catalog maps source names to a list of components. On disk, it is a yaml
//! or json map, e.g.
//!
//! ```yaml
//! cluster_a:
//! - ra: 10.5
//!   dec: -27.0
//!   flux: 1.2
//!   shape: gaussian
//!   size: 30.0
//! ```
//!
//! Positions are in degrees, flux densities in Jy and sizes in arcseconds.
//! Components without a recognised shape are treated as points.

mod error;
mod read;
mod types;

pub use error::ReadCatalogError;
pub use read::{catalog_from_json, catalog_from_yaml, read_catalog_file};
pub use types::*;

use itertools::Itertools;
use strum::IntoEnumIterator;

/// All of the possible file extensions that a catalog can have.
#[derive(
    Debug, Clone, Copy, strum_macros::Display, strum_macros::EnumIter, strum_macros::EnumString,
)]
pub(crate) enum CatalogFileType {
    #[strum(serialize = "yaml")]
    Yaml,

    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    pub(crate) static ref CATALOG_FILE_TYPES_COMMA_SEPARATED: String = CatalogFileType::iter().join(", ");
}
