// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read in catalogs.

use std::{
    fs::File,
    io::{BufRead, BufReader, Seek},
    path::Path,
    str::FromStr,
};

use log::{debug, trace, warn};
use marlu::RADec;

use super::{
    types::{TmpCatalog, TmpComponent},
    CatalogFileType, ComponentShape, ReadCatalogError, ShapeKind, SkyCatalog, SkyComponent,
};

/// Read a catalog from a file. yaml and json are detected from the file
/// extension; otherwise both are attempted.
pub fn read_catalog_file<P: AsRef<Path>>(path: P) -> Result<SkyCatalog, ReadCatalogError> {
    fn inner(path: &Path) -> Result<SkyCatalog, ReadCatalogError> {
        debug!("Attempting to read catalog {}", path.display());
        let mut buf = BufReader::new(File::open(path)?);
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| match e.to_lowercase().as_str() {
                "yml" => Some(CatalogFileType::Yaml),
                other => CatalogFileType::from_str(other).ok(),
            });

        let catalog = match file_type {
            Some(CatalogFileType::Yaml) => catalog_from_yaml(&mut buf)?,
            Some(CatalogFileType::Json) => catalog_from_json(&mut buf)?,
            None => {
                // Unknown extension. Try json first, as it's stricter.
                match catalog_from_json(&mut buf) {
                    Ok(c) => c,
                    Err(json_err) => {
                        buf.rewind()?;
                        match catalog_from_yaml(&mut buf) {
                            Ok(c) => c,
                            Err(yaml_err) => {
                                return Err(ReadCatalogError::FailedToDeserialise {
                                    yaml_err: yaml_err.to_string(),
                                    json_err: json_err.to_string(),
                                })
                            }
                        }
                    }
                }
            }
        };

        let counts = catalog.get_counts();
        debug!(
            "Catalog has {} sources ({} points, {} gaussians, {} disks)",
            catalog.len(),
            counts.num_points,
            counts.num_gaussians,
            counts.num_disks
        );
        if catalog.is_empty() {
            warn!("Catalog {} has no sources", path.display());
        }
        Ok(catalog)
    }
    inner(path.as_ref())
}

/// Convert yaml to a [`SkyCatalog`].
pub fn catalog_from_yaml<T: BufRead>(buf: &mut T) -> Result<SkyCatalog, ReadCatalogError> {
    let tmp: TmpCatalog = serde_yaml::from_reader(buf)?;
    convert(tmp)
}

/// Convert json to a [`SkyCatalog`].
pub fn catalog_from_json<T: BufRead>(buf: &mut T) -> Result<SkyCatalog, ReadCatalogError> {
    let tmp: TmpCatalog = serde_json::from_reader(buf)?;
    convert(tmp)
}

// Complain if we spot something wrong, and convert units to radians.
fn convert(tmp: TmpCatalog) -> Result<SkyCatalog, ReadCatalogError> {
    tmp.into_iter()
        .map(|(source_name, comps)| -> Result<_, ReadCatalogError> {
            let comps = comps
                .into_iter()
                .map(|c| convert_component(&source_name, c))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((source_name, comps))
        })
        .collect()
}

fn convert_component(
    source_name: &str,
    TmpComponent {
        ra,
        dec,
        flux,
        shape,
        size,
    }: TmpComponent,
) -> Result<SkyComponent, ReadCatalogError> {
    if !(0.0..360.0).contains(&ra) {
        return Err(ReadCatalogError::InvalidRa {
            source_name: source_name.to_string(),
            ra,
        });
    }
    if !(-90.0..=90.0).contains(&dec) {
        return Err(ReadCatalogError::InvalidDec {
            source_name: source_name.to_string(),
            dec,
        });
    }
    if !flux.is_finite() {
        return Err(ReadCatalogError::NonFiniteFlux {
            source_name: source_name.to_string(),
        });
    }

    let kind = match shape.as_deref() {
        None => ShapeKind::Point,
        Some(s) => match ShapeKind::from_str(s.trim()) {
            Ok(k) => k,
            Err(_) => {
                trace!("Source {source_name}: unrecognised shape '{s}'; treating it as a point");
                ShapeKind::Point
            }
        },
    };
    let size = match (kind, size) {
        (ShapeKind::Point, _) => 0.0,
        (_, None) => {
            return Err(ReadCatalogError::MissingSize {
                source_name: source_name.to_string(),
                shape: kind,
            })
        }
        (_, Some(s)) if !s.is_finite() || s < 0.0 => {
            return Err(ReadCatalogError::InvalidSize {
                source_name: source_name.to_string(),
                size: s,
            })
        }
        (_, Some(s)) => (s / 3600.0).to_radians(),
    };

    Ok(SkyComponent {
        radec: RADec::from_degrees(ra, dec),
        flux,
        shape: ComponentShape::new(kind, size),
    })
}
