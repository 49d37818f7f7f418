// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types for sky-model components and catalogs.

use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use marlu::RADec;
use serde::{Deserialize, Serialize, Serializer};

/// The kinds of component shapes that can be stacked.
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
pub enum ShapeKind {
    #[strum(serialize = "point")]
    Point,

    #[strum(serialize = "gaussian")]
    Gaussian,

    #[strum(serialize = "disk")]
    Disk,
}

/// The shape of a sky-model component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentShape {
    Point,

    Gaussian {
        /// Major axis size \[radians\]
        #[serde(serialize_with = "radians_to_arcsecs")]
        size: f64,
    },

    Disk {
        /// Diameter \[radians\]
        #[serde(serialize_with = "radians_to_arcsecs")]
        size: f64,
    },
}

fn radians_to_arcsecs<S: Serializer>(num: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(num.to_degrees() * 3600.0)
}

impl ComponentShape {
    /// Create a shape from its kind and size \[radians\]. The size of a point
    /// is always 0.
    pub fn new(kind: ShapeKind, size: f64) -> ComponentShape {
        match kind {
            ShapeKind::Point => ComponentShape::Point,
            ShapeKind::Gaussian => ComponentShape::Gaussian { size },
            ShapeKind::Disk => ComponentShape::Disk { size },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ComponentShape::Point => ShapeKind::Point,
            ComponentShape::Gaussian { .. } => ShapeKind::Gaussian,
            ComponentShape::Disk { .. } => ShapeKind::Disk,
        }
    }

    /// The angular extent of the shape \[radians\]. Points have no extent.
    pub fn size(&self) -> f64 {
        match self {
            ComponentShape::Point => 0.0,
            ComponentShape::Gaussian { size } | ComponentShape::Disk { size } => *size,
        }
    }

    // The following functions save the caller from using pattern matching to
    // determine the enum variant.

    /// Is this a point source?
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point)
    }

    /// Is this a gaussian source?
    pub fn is_gaussian(&self) -> bool {
        matches!(self, Self::Gaussian { .. })
    }

    /// Is this a disk source?
    pub fn is_disk(&self) -> bool {
        matches!(self, Self::Disk { .. })
    }
}

/// Information on a sky-model component.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkyComponent {
    /// Coordinates struct associated with the component.
    #[serde(flatten)]
    pub radec: RADec,

    /// Stokes I flux density \[Jy\]
    pub flux: f64,

    /// The shape of the component.
    pub shape: ComponentShape,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShapeCounts {
    pub num_points: usize,
    pub num_gaussians: usize,
    pub num_disks: usize,
}

/// An [`IndexMap`] of source names for keys and their components for values.
/// The order of sources (and their components) is the order they were read
/// in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SkyCatalog(IndexMap<String, Vec<SkyComponent>>);

impl SkyCatalog {
    /// Create an empty [`SkyCatalog`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over every component of every source, in order.
    pub fn components(&self) -> impl Iterator<Item = &SkyComponent> {
        self.0.values().flatten()
    }

    pub fn num_components(&self) -> usize {
        self.0.values().map(|comps| comps.len()).sum()
    }

    /// Get counts of each of the component shapes.
    pub fn get_counts(&self) -> ShapeCounts {
        let mut counts = ShapeCounts::default();
        for comp in self.components() {
            match comp.shape.kind() {
                ShapeKind::Point => counts.num_points += 1,
                ShapeKind::Gaussian => counts.num_gaussians += 1,
                ShapeKind::Disk => counts.num_disks += 1,
            }
        }
        counts
    }

    /// The sum of all component flux densities \[Jy\].
    pub fn total_flux(&self) -> f64 {
        self.components().map(|comp| comp.flux).sum()
    }
}

impl From<IndexMap<String, Vec<SkyComponent>>> for SkyCatalog {
    fn from(cat: IndexMap<String, Vec<SkyComponent>>) -> Self {
        Self(cat)
    }
}

impl<const N: usize> From<[(String, Vec<SkyComponent>); N]> for SkyCatalog {
    fn from(value: [(String, Vec<SkyComponent>); N]) -> Self {
        Self(IndexMap::from(value))
    }
}

impl Deref for SkyCatalog {
    type Target = IndexMap<String, Vec<SkyComponent>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SkyCatalog {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, Vec<SkyComponent>)> for SkyCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<SkyComponent>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The on-disk representation of a component. Positions are in degrees and
/// sizes in arcseconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(super) struct TmpComponent {
    pub(super) ra: f64,
    pub(super) dec: f64,
    pub(super) flux: f64,
    #[serde(default)]
    pub(super) shape: Option<String>,
    #[serde(default)]
    pub(super) size: Option<f64>,
}

pub(super) type TmpCatalog = IndexMap<String, Vec<TmpComponent>>;
