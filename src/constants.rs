// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Stacking parameters are derived in
double precision and only narrowed by whatever consumes them.
 */

pub use std::f64::consts::{LN_2, PI, TAU};

/// The speed of light \[metres per second\].
pub use marlu::constants::VEL_C;

/// Catalog components with a primary-beam response at or below this value
/// are not included in a pointing's stacking points. This is a hard cutoff.
pub const BEAM_RESPONSE_THRESHOLD: f64 = 0.01;

/// The number of pointing-alignment breaks in a row that are tolerated before
/// warning that the dataset isn't sorted by pointing.
pub const ALIGNMENT_BREAKS_BEFORE_WARNING: usize = 1;

/// The default number of visibility rows in a chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 10_000;

/// The default identifier stamped onto chunks.
pub const DEFAULT_DATASET_ID: i32 = 0;
