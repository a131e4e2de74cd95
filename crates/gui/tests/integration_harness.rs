//! Integration tests for TestHarness.
//!
//! Drives design edits, scene sync, pointer gestures and export through the
//! headless harness API.

use std::time::{Duration, Instant};

use glam::Vec3;
use shared::{ShapeKind, Side};
use tee_designer_lib::harness::TestHarness;
use tee_designer_lib::interaction::PointerOutcome;
use tee_designer_lib::state::ExportSettings;

fn small_export() -> ExportSettings {
    ExportSettings {
        width: 96,
        height: 96,
        transparent_background: true,
    }
}

#[test]
fn test_harness_renderables_follow_current_side() {
    let mut h = TestHarness::new().unwrap();
    h.add_text("ONE");
    h.add_shape(ShapeKind::Circle);
    h.set_side(Side::Back);
    h.add_shape(ShapeKind::Triangle);
    h.sync();

    assert_eq!(h.renderable_count(), h.design.overlay_count_on(Side::Back));
    h.set_side(Side::Front);
    h.sync();
    assert_eq!(h.renderable_count(), h.design.overlay_count_on(Side::Front));
    assert_eq!(h.renderable_count(), 2);
}

#[test]
fn test_harness_hello_scenario() {
    let mut h = TestHarness::new().unwrap();
    h.add_shape(ShapeKind::Star);
    h.sync();
    let before = h.renderable_count();

    let hello = h.add_text("HELLO");
    h.sync();
    assert_eq!(h.renderable_count(), before + 1);
    assert!(h.renderable_ids().contains(&hello.id));

    h.set_side(Side::Back);
    h.sync();
    assert!(!h.renderable_ids().contains(&hello.id));
    assert_eq!(h.renderable_count(), 0);
}

#[test]
fn test_harness_toggle_side_twice_is_stable() {
    let mut h = TestHarness::new().unwrap();
    h.add_text("FRONT");
    h.add_shape(ShapeKind::Hexagon);
    h.set_side(Side::Back);
    h.add_text("BACK");
    h.set_side(Side::Front);
    h.sync();

    let ids = h.renderable_ids();
    let live = h.live_resources();
    h.toggle_side();
    h.sync();
    h.toggle_side();
    h.sync();
    assert_eq!(h.renderable_ids(), ids);
    assert_eq!(h.live_resources(), live);
}

#[test]
fn test_harness_drag_to_target_position() {
    let mut h = TestHarness::new().unwrap();
    let r = h.add_picture([0, 200, 0, 255]);
    assert!(h.sync_until_loaded());
    assert_eq!(h.position_of(&r), Some([0.0, 0.0, 0.11]));

    assert_eq!(h.press_at(Vec3::new(0.0, 0.0, 0.11)), PointerOutcome::Selected(r.clone()));
    assert!(!h.scene.camera().is_enabled());
    h.drag_to(Vec3::new(0.5, -0.3, 0.11));
    assert_eq!(h.release(), PointerOutcome::DragEnded(r.clone()));
    assert!(h.scene.camera().is_enabled());

    let [x, y, z] = h.position_of(&r).unwrap();
    assert!((x - 0.5).abs() < 1e-3, "x = {x}");
    assert!((y + 0.3).abs() < 1e-3, "y = {y}");
    assert_eq!(z, 0.11);
}

#[test]
fn test_harness_drag_keeps_z_and_side() {
    let mut h = TestHarness::new().unwrap();
    h.set_side(Side::Back);
    let r = h.add_shape(ShapeKind::Square);
    h.sync();
    let [_, _, z] = h.position_of(&r).unwrap();

    h.press_at(Vec3::new(0.0, 0.0, z));
    for step in 1..=5 {
        let t = step as f32 * 0.1;
        h.drag_to(Vec3::new(-t, t, z));
    }
    h.release();

    assert_eq!(h.position_of(&r).unwrap()[2], z);
    assert_eq!(h.design.image(&r.id).unwrap().common.side, Side::Back);
}

#[test]
fn test_harness_drag_creates_no_textures() {
    let mut h = TestHarness::new().unwrap();
    h.add_text("MOVE ME");
    h.sync();
    let created = h.textures_created();

    h.press_at(Vec3::new(0.0, 0.0, 0.11));
    h.drag_to(Vec3::new(0.4, 0.2, 0.11));
    h.sync();
    h.drag_to(Vec3::new(0.6, 0.1, 0.11));
    h.sync();
    h.release();
    assert_eq!(h.textures_created(), created);
}

#[test]
fn test_harness_overlapping_nearest_wins() {
    let mut h = TestHarness::new().unwrap();
    let far = h.add_shape_at(ShapeKind::Square, [0.2, 0.2, 0.11]);
    let near = h.add_shape_at(ShapeKind::Square, [0.2, 0.2, 0.4]);
    h.sync();

    let outcome = h.press_at(Vec3::new(0.2, 0.2, 0.4));
    assert_eq!(outcome, PointerOutcome::Selected(near.clone()));
    assert_ne!(h.design.selection(), Some(&far));
}

#[test]
fn test_harness_deselect_removes_one_outline() {
    let mut h = TestHarness::new().unwrap();
    h.add_shape_at(ShapeKind::Circle, [-0.7, 0.8, 0.11]);
    let picked = h.add_shape_at(ShapeKind::Circle, [0.7, -0.8, 0.11]);
    h.design.clear_selection();
    h.sync();

    h.press_at(Vec3::new(0.7, -0.8, 0.11));
    h.release();
    h.sync();
    assert_eq!(h.outlined(), vec![picked.id.clone()]);

    // Empty space on the garment
    assert_eq!(h.press_at(Vec3::new(0.0, 0.0, 0.11)), PointerOutcome::Deselected);
    let report = h.sync();
    assert!(h.design.selection().is_none());
    assert!(h.outlined().is_empty());
    assert_eq!(report.outlines_removed, 1);
}

#[test]
fn test_harness_late_load_for_deleted_overlay() {
    let mut h = TestHarness::new().unwrap();
    let r = h.add_picture([10, 20, 30, 255]);
    h.sync();
    h.remove(&r);
    h.sync();

    let deadline = Instant::now() + Duration::from_secs(5);
    while h.scene.stale_loads_discarded() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
        h.sync();
    }
    assert_eq!(h.scene.stale_loads_discarded(), 1);
    assert_eq!(h.renderable_count(), 0);
    assert_eq!(h.live_resources(), 1);
}

#[test]
fn test_harness_two_exports_identical() {
    let mut h = TestHarness::new().unwrap();
    h.add_text("SAME");
    h.add_shape(ShapeKind::Heart);
    let a = h.export_with(&small_export()).unwrap();
    let b = h.export_with(&small_export()).unwrap();
    assert_eq!(a.png, b.png);
}

#[test]
fn test_harness_export_restores_view() {
    let mut h = TestHarness::new().unwrap();
    h.add_shape(ShapeKind::Star);
    h.sync();
    h.scene.camera_mut().rotate(30.0, -10.0);
    h.scene.set_viewport(640, 360);
    let camera = h.scene.camera().snapshot();
    let selection = h.design.selection().cloned();

    let out = h.export_with(&small_export()).unwrap();
    assert_eq!((out.width, out.height), (96, 96));
    assert_eq!(h.scene.camera().snapshot(), camera);
    assert_eq!(h.scene.viewport(), [640, 360]);
    assert_eq!(h.design.selection().cloned(), selection);
}

#[test]
fn test_harness_export_failure_restores_view() {
    let mut h = TestHarness::new().unwrap();
    h.scene.set_viewport(500, 300);
    let camera = h.scene.camera().snapshot();
    let bad = ExportSettings {
        height: 0,
        ..small_export()
    };
    assert!(h.export_with(&bad).is_err());
    assert_eq!(h.scene.camera().snapshot(), camera);
    assert_eq!(h.scene.viewport(), [500, 300]);
}

#[test]
fn test_harness_export_uses_active_side() {
    let mut h = TestHarness::new().unwrap();
    h.set_side(Side::Back);
    h.add_text("BACK");
    let out = h.export_with(&small_export()).unwrap();
    assert_eq!(out.side, Side::Back);
    assert!(out.suggested_file_name(42).starts_with("tshirt-design-back-"));
}

#[test]
fn test_harness_overlay_added_to_hidden_side_is_not_selected() {
    let mut h = TestHarness::new().unwrap();
    h.set_side(Side::Back);
    let front = h.add_image(tee_designer_lib::fixtures::shape_on(Side::Front, ShapeKind::Square));
    h.sync();

    assert!(h.design.selection().is_none());
    assert!(!h.design.select(front));
    assert!(h.design.selection().is_none());
    assert_eq!(h.renderable_count(), 0);
    assert!(h.outlined().is_empty());
}
