// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stacking-model generation and chunked visibility streaming for radio
//! interferometric data.
//!
//! A [`model::StackingModel`] is built from a [`srclist::SkyCatalog`], a set
//! of pointing phase centres and a [`beam::PrimaryBeam`]. Visibilities are
//! read from and written to a [`io::VisDataset`] one [`chunk::Chunk`] at a
//! time by a [`stream::VisStream`].

pub mod beam;
pub mod chunk;
mod cli;
pub mod constants;
pub mod io;
pub mod model;
pub mod srclist;
pub mod stream;

use crossbeam_utils::atomic::AtomicCell;

/// Draw progress bars? Set by the CLI; off by default.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use cli::{Stacker, StackerError};
