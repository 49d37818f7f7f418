// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract primary-beam responses.
//!
//! [`PrimaryBeam`] is a trait detailing how to get a beam response for a
//! tangent-plane offset from a pointing's phase centre. By making this trait,
//! we can neatly abstract over multiple beam codes, including a simple
//! [`NoBeam`] type (which just returns 1 everywhere). Any closure of the form
//! `Fn(f64, f64) -> f64` is also a [`PrimaryBeam`].
//!
//! Beam responses are only used as a filter predicate when building a
//! stacking model; they are never used as weights.

mod error;

pub use error::BeamError;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::constants::LN_2;

lazy_static::lazy_static! {
    /// The beam types that can be requested by name.
    pub static ref BEAM_TYPES_COMMA_SEPARATED: String = BeamType::iter()
        .filter(|t| *t != BeamType::Custom)
        .join(", ");
}

/// Supported beam types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum BeamType {
    /// a.k.a. [`NoBeam`]. Only returns 1.
    #[strum(serialize = "none")]
    None,

    /// A circularly-symmetric Gaussian.
    #[strum(serialize = "gaussian")]
    Gaussian,

    /// A user-supplied response function. Can't be made from a name.
    #[strum(serialize = "custom")]
    Custom,
}

/// A trait abstracting beam code functions.
pub trait PrimaryBeam {
    /// Get the type of beam.
    fn get_beam_type(&self) -> BeamType;

    /// Get the beam response for a direction offset `(dx, dy)` from the phase
    /// centre. The result is in \[0, 1\].
    fn response(&self, dx: f64, dy: f64) -> f64;
}

impl<F> PrimaryBeam for F
where
    F: Fn(f64, f64) -> f64,
{
    fn get_beam_type(&self) -> BeamType {
        BeamType::Custom
    }

    fn response(&self, dx: f64, dy: f64) -> f64 {
        self(dx, dy)
    }
}

/// A beam implementation that returns only 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBeam;

impl PrimaryBeam for NoBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::None
    }

    fn response(&self, _dx: f64, _dy: f64) -> f64 {
        1.0
    }
}

/// A circularly-symmetric Gaussian beam, peaking at 1 at the phase centre.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBeam {
    /// Full width at half maximum \[radians\]
    fwhm_rad: f64,

    /// `4 ln 2 / fwhm^2`; saves a division per response.
    exp_factor: f64,
}

impl GaussianBeam {
    /// Create a new Gaussian beam. The FWHM must be positive and finite.
    pub fn new(fwhm_rad: f64) -> Result<GaussianBeam, BeamError> {
        if !fwhm_rad.is_finite() || fwhm_rad <= 0.0 {
            return Err(BeamError::BadFwhm(fwhm_rad.to_degrees()));
        }
        Ok(GaussianBeam {
            fwhm_rad,
            exp_factor: 4.0 * LN_2 / (fwhm_rad * fwhm_rad),
        })
    }

    pub fn fwhm_rad(&self) -> f64 {
        self.fwhm_rad
    }
}

impl PrimaryBeam for GaussianBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::Gaussian
    }

    fn response(&self, dx: f64, dy: f64) -> f64 {
        (-self.exp_factor * (dx * dx + dy * dy)).exp()
    }
}

/// Create a "no beam" object.
pub fn create_no_beam_object() -> Box<dyn PrimaryBeam> {
    Box::new(NoBeam)
}

/// Create a Gaussian beam object with the specified FWHM \[degrees\].
pub fn create_gaussian_beam_object(fwhm_deg: f64) -> Result<Box<dyn PrimaryBeam>, BeamError> {
    Ok(Box::new(GaussianBeam::new(fwhm_deg.to_radians())?))
}
