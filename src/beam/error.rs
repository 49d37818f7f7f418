// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam calculations.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BeamError {
    #[error("Unrecognised beam type '{got}'; supported types are: {supported}")]
    Unrecognised { got: String, supported: String },

    #[error("A Gaussian beam needs a full width at half maximum, but none was given")]
    NoFwhm,

    #[error("The Gaussian beam FWHM ({0}°) must be positive and finite")]
    BadFwhm(f64),
}
