// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use approx::assert_abs_diff_eq;
use marlu::RADec;

use super::*;
use crate::{
    beam::{create_gaussian_beam_object, NoBeam},
    io::{Field, MemoryDataset},
    srclist::SkyComponent,
};

fn comp(ra_deg: f64, dec_deg: f64, flux: f64, shape: ComponentShape) -> SkyComponent {
    SkyComponent {
        radec: RADec::from_degrees(ra_deg, dec_deg),
        flux,
        shape,
    }
}

fn catalog(comps: Vec<SkyComponent>) -> SkyCatalog {
    SkyCatalog::from([("src".to_string(), comps)])
}

#[test]
fn point_source_at_phase_centre() {
    let phase_centre = RADec::from_degrees(60.0, -27.0);
    let catalog = catalog(vec![comp(60.0, -27.0, 1.0, ComponentShape::Point)]);
    let model = StackingModel::build(&catalog, &[phase_centre], &NoBeam, StackMode::Subtract);

    assert_eq!(model.num_pointings(), 1);
    let points = model.points(0).unwrap();
    assert_eq!(points.len(), 1);
    let p = points[0];
    assert_abs_diff_eq!(p.flux, 1.0);
    assert_abs_diff_eq!(p.dx, 0.0);
    assert_abs_diff_eq!(p.dy, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(p.omega_x, 0.0);
    assert_abs_diff_eq!(p.omega_y, 0.0, epsilon = 1e-20);
    assert_abs_diff_eq!(p.omega_z, 0.0, epsilon = 1e-20);
    assert_abs_diff_eq!(p.omega_size, 0.0);
    assert_abs_diff_eq!(model.total_flux(), 1.0);
}

#[test]
fn gaussian_shape_kernel() {
    let size = 1e-6;
    let catalog = catalog(vec![comp(0.0, 0.0, 1.0, ComponentShape::Gaussian { size })]);
    let model = StackingModel::build(
        &catalog,
        &[RADec::from_degrees(0.0, 0.0)],
        &NoBeam,
        StackMode::Subtract,
    );
    let p = model.points(0).unwrap()[0];
    let expected = (PI * 1e-6 / VEL_C).powi(2) / (4.0 * LN_2);
    assert_abs_diff_eq!(p.omega_size, expected, epsilon = expected * 1e-12);
}

#[test]
fn disk_shape_kernel() {
    let size = 2e-5;
    let catalog = catalog(vec![comp(0.0, 0.0, 1.0, ComponentShape::Disk { size })]);
    let model = StackingModel::build(
        &catalog,
        &[RADec::from_degrees(0.0, 0.0)],
        &NoBeam,
        StackMode::Subtract,
    );
    let p = model.points(0).unwrap()[0];
    assert_abs_diff_eq!(p.omega_size, PI * size / VEL_C);
}

#[test]
fn responses_at_the_threshold_are_excluded() {
    let catalog = catalog(vec![
        comp(10.0, -20.0, 1.0, ComponentShape::Point),
        comp(11.0, -20.0, 1.0, ComponentShape::Point),
    ]);
    let phase_centre = [RADec::from_degrees(10.0, -20.0)];

    let at_threshold = |_dx: f64, _dy: f64| BEAM_RESPONSE_THRESHOLD;
    let model = StackingModel::build(&catalog, &phase_centre, &at_threshold, StackMode::Subtract);
    assert_eq!(model.num_points(), vec![0]);

    let above_threshold = |_dx: f64, _dy: f64| BEAM_RESPONSE_THRESHOLD + 1e-12;
    let model = StackingModel::build(
        &catalog,
        &phase_centre,
        &above_threshold,
        StackMode::Subtract,
    );
    assert_eq!(model.num_points(), vec![2]);
}

#[test]
fn add_mode_negates_flux() {
    let catalog = catalog(vec![
        comp(10.0, -20.0, 2.5, ComponentShape::Point),
        comp(10.5, -20.5, -0.5, ComponentShape::Point),
    ]);
    let phase_centre = [RADec::from_degrees(10.0, -20.0)];
    let subtract = StackingModel::build(&catalog, &phase_centre, &NoBeam, StackMode::Subtract);
    let add = StackingModel::build(&catalog, &phase_centre, &NoBeam, StackMode::Add);
    for (s, a) in subtract
        .points(0)
        .unwrap()
        .iter()
        .zip(add.points(0).unwrap())
    {
        assert_abs_diff_eq!(s.flux, -a.flux);
        assert_abs_diff_eq!(s.omega_x, a.omega_x);
        assert_abs_diff_eq!(s.omega_z, a.omega_z);
    }
    assert_abs_diff_eq!(subtract.points(0).unwrap()[0].flux, 2.5);
    assert_abs_diff_eq!(add.points(0).unwrap()[1].flux, 0.5);
    // The diagnostic total is the catalog total, whatever the mode.
    assert_abs_diff_eq!(add.total_flux(), 2.0);
}

#[test]
fn omega_z_uses_the_exact_form() {
    // Historically, the small-angle form cos(sqrt(dx^2 + dy^2)) was also used
    // for omega_z. Make sure we use the exact one.
    let phase_centre = RADec::from_degrees(30.0, -40.0);
    let catalog = catalog(vec![comp(42.0, -35.0, 1.0, ComponentShape::Point)]);
    let model = StackingModel::build(&catalog, &[phase_centre], &NoBeam, StackMode::Subtract);
    let p = model.points(0).unwrap()[0];

    let r2 = p.dx * p.dx + p.dy * p.dy;
    let exact = TAU * ((1.0 - r2).sqrt() - 1.0) / VEL_C;
    let small_angle = TAU * (r2.sqrt().cos() - 1.0) / VEL_C;
    assert_abs_diff_eq!(p.omega_z, exact);
    assert!((p.omega_z - small_angle).abs() > exact.abs() * 1e-4);
}

#[test]
fn omega_z_is_finite_on_the_horizon() {
    // Each component is 90° from its phase centre (over the pole), so
    // dx^2 + dy^2 is 1 give or take rounding.
    for dec in (-85..=85).step_by(5) {
        let dec = f64::from(dec);
        let phase_centre = RADec::from_degrees(0.0, dec);
        let catalog = catalog(vec![comp(180.0, 90.0 - dec, 1.0, ComponentShape::Point)]);
        let model = StackingModel::build(&catalog, &[phase_centre], &NoBeam, StackMode::Subtract);
        let p = model.points(0).unwrap()[0];
        assert_abs_diff_eq!(p.dx * p.dx + p.dy * p.dy, 1.0, epsilon = 1e-12);
        assert!(p.omega_z.is_finite(), "omega_z is {} at dec {dec}", p.omega_z);
        assert_abs_diff_eq!(p.omega_z, -TAU / VEL_C, epsilon = 1e-14);
    }
}

#[test]
fn stored_offsets_are_reproducible() {
    let phase_centres = [
        RADec::from_degrees(0.0, -27.0),
        RADec::from_degrees(359.0, -26.0),
    ];
    let catalog = catalog(vec![
        comp(0.5, -27.5, 1.0, ComponentShape::Point),
        comp(358.0, -25.0, 3.0, ComponentShape::Gaussian { size: 1e-4 }),
        comp(1.0, -30.0, 0.2, ComponentShape::Disk { size: 5e-5 }),
    ]);
    let model = StackingModel::build(&catalog, &phase_centres, &NoBeam, StackMode::Subtract);
    for (points, &phase_centre) in model.iter().zip(phase_centres.iter()) {
        assert_eq!(points.len(), 3);
        for p in points {
            let (dx, dy) = tangent_plane_offset(p.radec, phase_centre);
            assert_eq!(dx, p.dx);
            assert_eq!(dy, p.dy);
            assert_eq!(TAU * dx.sin() / VEL_C, p.omega_x);
            assert_eq!(TAU * dy.sin() / VEL_C, p.omega_y);
            assert_eq!(TAU * ((1.0 - dx * dx - dy * dy).sqrt() - 1.0) / VEL_C, p.omega_z);
        }
    }
}

#[test]
fn gaussian_beam_filters_per_pointing() {
    let beam = create_gaussian_beam_object(10.0).unwrap();
    let phase_centres = [
        RADec::from_degrees(0.0, 0.0),
        RADec::from_degrees(90.0, 0.0),
    ];
    let catalog = catalog(vec![
        // Near the first pointing.
        comp(1.0, 0.0, 1.0, ComponentShape::Point),
        comp(2.0, 1.0, 1.0, ComponentShape::Point),
        // Near the second pointing.
        comp(89.0, 0.0, 1.0, ComponentShape::Point),
        // Far from both.
        comp(200.0, 60.0, 1.0, ComponentShape::Point),
    ]);
    let model = StackingModel::build(&catalog, &phase_centres, beam.as_ref(), StackMode::Subtract);

    for (i_pointing, &phase_centre) in phase_centres.iter().enumerate() {
        let expected = catalog
            .components()
            .filter(|c| {
                let (dx, dy) = tangent_plane_offset(c.radec, phase_centre);
                beam.response(dx, dy) > BEAM_RESPONSE_THRESHOLD
            })
            .count();
        assert_eq!(model.points(i_pointing).unwrap().len(), expected);
    }
    assert_eq!(model.num_points(), vec![2, 1]);
    assert_abs_diff_eq!(model.points(1).unwrap()[0].radec.ra, 89.0_f64.to_radians());
}

#[test]
fn empty_catalog_gives_empty_pointings() {
    let model = StackingModel::build(
        &SkyCatalog::new(),
        &[RADec::from_degrees(0.0, 0.0), RADec::from_degrees(1.0, 1.0)],
        &NoBeam,
        StackMode::Add,
    );
    assert_eq!(model.num_pointings(), 2);
    assert_eq!(model.num_points(), vec![0, 0]);
    assert_abs_diff_eq!(model.total_flux(), 0.0);
    assert!(model.points(2).is_none());
}

#[test]
fn model_from_dataset_phase_centres() {
    let dataset = MemoryDataset::new(
        vec![
            Field::new("a", RADec::from_degrees(0.0, -27.0)),
            Field::new("b", RADec::from_degrees(0.0, -26.9)),
        ],
        vec![vec![150e6]],
    );
    let catalog = catalog(vec![comp(0.0, -27.0, 1.0, ComponentShape::Point)]);
    let model =
        StackingModel::from_dataset(&catalog, &dataset, &NoBeam, StackMode::Subtract).unwrap();
    assert_eq!(model.num_points(), vec![1, 1]);
    assert_eq!(model.phase_centres()[1], RADec::from_degrees(0.0, -26.9));
    let p0 = model.points(0).unwrap()[0];
    let p1 = model.points(1).unwrap()[0];
    assert_abs_diff_eq!(p0.dy, 0.0, epsilon = 1e-15);
    assert!(p1.dy < 0.0);
}

#[test]
fn stack_modes_parse() {
    assert_eq!(StackMode::from_str("subtract").unwrap(), StackMode::Subtract);
    assert_eq!(StackMode::from_str("ADD").unwrap(), StackMode::Add);
    assert!(StackMode::from_str("multiply").is_err());
    assert_eq!(StackMode::default(), StackMode::Subtract);
}
