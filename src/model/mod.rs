// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to build stacking models.
//!
//! A stacking model holds, for each pointing of a dataset, the catalog
//! components that are visible in that pointing's primary beam, along with
//! the phase-gradient and shape-kernel parameters needed to shift each
//! component to the phase centre.

#[cfg(test)]
mod tests;

use log::{debug, trace};
use marlu::RADec;
use serde::{Deserialize, Serialize};

use crate::{
    beam::PrimaryBeam,
    constants::{BEAM_RESPONSE_THRESHOLD, LN_2, PI, TAU, VEL_C},
    io::{DatasetError, VisDataset},
    srclist::{ComponentShape, SkyCatalog, SkyComponent},
};

/// How catalog flux densities are applied to visibilities.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum StackMode {
    /// Component flux densities are used as-is.
    #[default]
    #[strum(serialize = "subtract")]
    Subtract,

    /// Component flux densities are negated.
    #[strum(serialize = "add")]
    Add,
}

impl StackMode {
    fn apply(self, flux: f64) -> f64 {
        match self {
            StackMode::Subtract => flux,
            StackMode::Add => -flux,
        }
    }
}

/// A catalog component, transformed for a single pointing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StackingPoint {
    #[serde(flatten)]
    pub radec: RADec,

    /// \[Jy\]; negated for [`StackMode::Add`].
    pub flux: f64,

    pub shape: ComponentShape,

    /// Tangent-plane offset from the phase centre.
    pub dx: f64,
    pub dy: f64,

    /// Phase-gradient angular frequencies \[radians s / m\]
    pub omega_x: f64,
    pub omega_y: f64,
    pub omega_z: f64,

    /// The shape kernel. 0 for points.
    pub omega_size: f64,
}

/// Per-pointing lists of [`StackingPoint`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackingModel {
    mode: StackMode,

    /// The sum of the flux densities of every catalog component \[Jy\]
    total_flux: f64,

    /// The phase centre of each pointing.
    phase_centres: Vec<RADec>,

    /// One list per pointing.
    points: Vec<Vec<StackingPoint>>,
}

impl StackingModel {
    /// Build a stacking model from a catalog. A component is kept for a
    /// pointing only if the beam response at its offset from that pointing's
    /// phase centre is strictly larger than [`BEAM_RESPONSE_THRESHOLD`].
    pub fn build(
        catalog: &SkyCatalog,
        phase_centres: &[RADec],
        beam: &dyn PrimaryBeam,
        mode: StackMode,
    ) -> StackingModel {
        let components: Vec<&SkyComponent> = catalog.components().collect();
        let total_flux = components.iter().map(|c| c.flux).sum();
        debug!(
            "Building a stacking model from {} components over {} pointings ({} beam, {} mode)",
            components.len(),
            phase_centres.len(),
            beam.get_beam_type(),
            mode
        );

        // First pass: find which components survive the beam cut.
        let accepted: Vec<Vec<usize>> = phase_centres
            .iter()
            .map(|&phase_centre| {
                components
                    .iter()
                    .enumerate()
                    .filter(|(_, comp)| {
                        let (dx, dy) = tangent_plane_offset(comp.radec, phase_centre);
                        beam.response(dx, dy) > BEAM_RESPONSE_THRESHOLD
                    })
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        // Second pass: transform the survivors.
        let points: Vec<Vec<StackingPoint>> = phase_centres
            .iter()
            .zip(accepted)
            .enumerate()
            .map(|(i_pointing, (&phase_centre, indices))| {
                trace!(
                    "Pointing {i_pointing}: {} of {} components accepted",
                    indices.len(),
                    components.len()
                );
                indices
                    .into_iter()
                    .map(|i| StackingPoint::new(components[i], phase_centre, mode))
                    .collect()
            })
            .collect();

        debug!("Total catalog flux density: {total_flux} Jy");
        StackingModel {
            mode,
            total_flux,
            phase_centres: phase_centres.to_vec(),
            points,
        }
    }

    /// Build a stacking model using the phase centres of every pointing in a
    /// dataset.
    pub fn from_dataset<D: VisDataset + ?Sized>(
        catalog: &SkyCatalog,
        dataset: &D,
        beam: &dyn PrimaryBeam,
        mode: StackMode,
    ) -> Result<StackingModel, DatasetError> {
        let phase_centres = dataset.phase_centres()?;
        Ok(Self::build(catalog, &phase_centres, beam, mode))
    }

    pub fn mode(&self) -> StackMode {
        self.mode
    }

    pub fn total_flux(&self) -> f64 {
        self.total_flux
    }

    pub fn num_pointings(&self) -> usize {
        self.points.len()
    }

    pub fn phase_centres(&self) -> &[RADec] {
        &self.phase_centres
    }

    /// The points for a single pointing. `None` if the pointing doesn't exist.
    pub fn points(&self, pointing: usize) -> Option<&[StackingPoint]> {
        self.points.get(pointing).map(|p| p.as_slice())
    }

    /// The number of points in each pointing.
    pub fn num_points(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.len()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[StackingPoint]> {
        self.points.iter().map(|p| p.as_slice())
    }
}

impl StackingPoint {
    fn new(comp: &SkyComponent, phase_centre: RADec, mode: StackMode) -> StackingPoint {
        let (dx, dy) = tangent_plane_offset(comp.radec, phase_centre);
        StackingPoint {
            radec: comp.radec,
            flux: mode.apply(comp.flux),
            shape: comp.shape,
            dx,
            dy,
            omega_x: TAU * dx.sin() / VEL_C,
            omega_y: TAU * dy.sin() / VEL_C,
            // Components ~90° from the phase centre can round below 0.
            omega_z: TAU * ((1.0 - dx * dx - dy * dy).max(0.0).sqrt() - 1.0) / VEL_C,
            omega_size: shape_kernel(comp.shape),
        }
    }
}

/// The offset of `radec` from `phase_centre` on the tangent plane.
pub fn tangent_plane_offset(radec: RADec, phase_centre: RADec) -> (f64, f64) {
    let (s_ra, c_ra) = (radec.ra - phase_centre.ra).sin_cos();
    let (s_dec, c_dec) = radec.dec.sin_cos();
    let (s_dec_p, c_dec_p) = phase_centre.dec.sin_cos();
    let dx = s_ra * c_dec;
    let dy = s_dec * c_dec_p - c_dec * s_dec_p * c_ra;
    (dx, dy)
}

fn shape_kernel(shape: ComponentShape) -> f64 {
    match shape {
        ComponentShape::Point => 0.0,
        ComponentShape::Gaussian { size } => {
            let a = PI * size / VEL_C;
            a * a / (4.0 * LN_2)
        }
        ComponentShape::Disk { size } => PI * size / VEL_C,
    }
}
