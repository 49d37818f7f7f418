// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use clap::Parser;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{InfoPrinter, Warn, BEAM_TYPE_HELP};
use crate::beam::{
    create_gaussian_beam_object, create_no_beam_object, BeamError, BeamType, PrimaryBeam,
    BEAM_TYPES_COMMA_SEPARATED,
};

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct BeamArgs {
    #[clap(long, help = BEAM_TYPE_HELP.as_str(), help_heading = "BEAM")]
    pub(crate) beam_type: Option<String>,

    /// The full width at half maximum of a Gaussian beam [degrees].
    #[clap(long, help_heading = "BEAM")]
    pub(crate) beam_fwhm: Option<f64>,
}

impl BeamArgs {
    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            beam_type: self.beam_type.or(other.beam_type),
            beam_fwhm: self.beam_fwhm.or(other.beam_fwhm),
        }
    }

    pub(crate) fn parse(self) -> Result<Box<dyn PrimaryBeam>, BeamError> {
        let Self {
            beam_type,
            beam_fwhm,
        } = self;
        debug!("Beam type: {beam_type:?}, FWHM: {beam_fwhm:?}");

        let beam_type = match beam_type.as_deref() {
            None => BeamType::None,
            Some(s) => BeamType::from_str(s).map_err(|_| BeamError::Unrecognised {
                got: s.to_string(),
                supported: BEAM_TYPES_COMMA_SEPARATED.clone(),
            })?,
        };

        let mut printer = InfoPrinter::new("Beam info".into());
        let beam = match beam_type {
            BeamType::None => {
                printer.push_line("Not using any beam responses".into());
                if beam_fwhm.is_some() {
                    "A beam FWHM was given, but no beam is in use; ignoring it".warn();
                }
                create_no_beam_object()
            }

            BeamType::Gaussian => {
                let fwhm = beam_fwhm.ok_or(BeamError::NoFwhm)?;
                let beam = create_gaussian_beam_object(fwhm)?;
                printer.push_block(vec![
                    "Type: Gaussian".into(),
                    format!("FWHM: {fwhm}°").into(),
                ]);
                beam
            }

            // Only code can supply a response function.
            BeamType::Custom => {
                return Err(BeamError::Unrecognised {
                    got: beam_type.to_string(),
                    supported: BEAM_TYPES_COMMA_SEPARATED.clone(),
                })
            }
        };
        printer.display();

        Ok(beam)
    }
}
