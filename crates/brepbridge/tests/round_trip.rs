//! End-to-end interchange scenarios: export from one context, carry the
//! neutral arrays through a simulated transport, import into an independent
//! target context.

use approx::assert_relative_eq;
use brepbridge::{
    audit_brep, export_brep, import_brep, repair_brep, Brep, IssueFlags, NeutralBrep,
    ToleranceContext, TrimKind, UnitSystem,
};

fn mm_ctx() -> ToleranceContext {
    ToleranceContext::new(1e-6, 1e-2, UnitSystem::Millimeters)
}

#[test]
fn unit_cube_round_trip_preserves_topology_and_volume() {
    let ctx = mm_ctx();
    let mut cube = Brep::box_solid(1.0, 1.0, 1.0);
    let (neutral, report) = export_brep(&mut cube, &ctx).unwrap();
    assert!(!report.has_errors());

    let (restored, report) = import_brep(&neutral, &ctx).unwrap();
    assert!(!report.has_errors());
    assert_eq!(restored.vertex_count(), 8);
    assert_eq!(restored.edge_count(), 12);
    assert_eq!(restored.face_count(), 6);
    assert_eq!(restored.loop_count(), 6);
    assert_eq!(restored.trim_count(), 24);
    assert_relative_eq!(restored.volume, 1.0, max_relative = 1e-6);
}

#[test]
fn box_survives_transport_into_independent_context() {
    // Export a 10x10x10 millimeter box.
    let source_ctx = mm_ctx();
    let mut solid = Brep::box_solid(10.0, 10.0, 10.0);
    let (neutral, _) = export_brep(&mut solid, &source_ctx).unwrap();

    // Deep-copy the neutral arrays through JSON, the way a transport
    // collaborator would move the bytes between applications.
    let wire = neutral.to_json().unwrap();
    drop(neutral);
    let received = NeutralBrep::from_json(&wire).unwrap();
    assert_eq!(received.provenance, "brepbridge-native");

    // Import into an independently constructed target context.
    let target_ctx = ToleranceContext::new(1e-6, 1e-2, UnitSystem::Millimeters);
    let (restored, report) = import_brep(&received, &target_ctx).unwrap();
    assert!(!report.has_errors());
    assert!(restored.is_closed);
    assert!(restored.is_valid().is_ok(), "{:?}", restored.is_valid());
    assert_relative_eq!(restored.volume, 1000.0, max_relative = 1e-6);
    assert_relative_eq!(restored.area, 600.0, max_relative = 1e-6);
}

#[test]
fn sphere_patch_round_trips_the_singular_branch() {
    let ctx = mm_ctx();
    let mut patch = Brep::sphere_patch(5.0);
    let (neutral, report) = export_brep(&mut patch, &ctx).unwrap();
    assert!(!report.has_errors());

    let (restored, report) = import_brep(&neutral, &ctx).unwrap();
    assert!(!report.has_errors());
    assert_eq!(restored.face_count(), 1);
    assert_eq!(restored.edge_count(), 3);
    assert_eq!(restored.trim_count(), 4);
    // The polar trim stayed singular — no edge was invented for it.
    let singular: Vec<_> = restored
        .trims
        .values()
        .filter(|t| t.kind == TrimKind::Singular)
        .collect();
    assert_eq!(singular.len(), 1);
    assert!(singular[0].edge.is_none());
    assert!(restored.is_valid().is_ok(), "{:?}", restored.is_valid());
}

#[test]
fn repair_is_idempotent_on_clean_breps() {
    let ctx = mm_ctx();
    let mut cube = Brep::box_solid(2.0, 2.0, 2.0);
    assert!(audit_brep(&cube, &ctx).is_empty());

    let counts = (
        cube.vertex_count(),
        cube.edge_count(),
        cube.face_count(),
        cube.trim_count(),
    );
    let valid_before = cube.is_valid().is_ok();
    assert!(repair_brep(&mut cube, IssueFlags::NOTHING, &ctx) == valid_before);
    assert_eq!(
        counts,
        (
            cube.vertex_count(),
            cube.edge_count(),
            cube.face_count(),
            cube.trim_count(),
        )
    );
}

#[test]
fn millimeter_export_imports_into_meter_document() {
    let mut solid = Brep::box_solid(100.0, 100.0, 100.0);
    let (neutral, _) = export_brep(&mut solid, &mm_ctx()).unwrap();
    assert_eq!(neutral.units, "mm");

    let meters = ToleranceContext::new(1e-6, 1e-2, UnitSystem::Meters);
    let (restored, report) = import_brep(&neutral, &meters).unwrap();
    assert!(!report.has_errors());
    // A 0.1 m cube.
    assert_relative_eq!(restored.volume, 0.001, max_relative = 1e-6);
    assert_relative_eq!(restored.bbox.diagonal(), 0.1 * 3.0f64.sqrt(), max_relative = 1e-6);
}
