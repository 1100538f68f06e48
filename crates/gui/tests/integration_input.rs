//! Integration tests for the event-adapter input mapping: interaction
//! mode precedence and the key binding table.

use shapeview_gui_lib::harness::TestHarness;
use shapeview_gui_lib::viewer::selection::Granularity;
use shapeview_gui_lib::viewer::DisplayMode;
use shapeview_gui_lib::widget::input::{
    apply_action, lookup_key, resolve_drag_mode, DragMode, ModifierState, PointerButtons,
    ViewerAction, KEY_BINDINGS,
};

fn state(left: bool, middle: bool, right: bool, shift: bool) -> (PointerButtons, ModifierState) {
    (
        PointerButtons { left, middle, right },
        ModifierState { shift },
    )
}

#[test]
fn test_mode_precedence_table() {
    let cases = [
        (state(true, false, false, true), DragMode::AreaSelect),
        (state(false, false, true, true), DragMode::AreaZoom),
        (state(true, false, false, false), DragMode::Rotate),
        (state(false, false, true, false), DragMode::DynamicZoom),
        (state(false, true, false, false), DragMode::Pan),
        (state(false, true, false, true), DragMode::Pan),
        (state(false, false, false, false), DragMode::Hover),
        (state(false, false, false, true), DragMode::Hover),
    ];
    for ((buttons, modifiers), expected) in cases {
        assert_eq!(
            resolve_drag_mode(buttons, modifiers),
            expected,
            "buttons={buttons:?} modifiers={modifiers:?}"
        );
    }
}

#[test]
fn test_area_select_wins_over_everything() {
    // Left+shift resolves to area-select regardless of other buttons
    let (buttons, modifiers) = state(true, true, true, true);
    assert_eq!(resolve_drag_mode(buttons, modifiers), DragMode::AreaSelect);
}

#[test]
fn test_default_key_bindings() {
    let expected = [
        (egui::Key::W, ViewerAction::Wireframe),
        (egui::Key::S, ViewerAction::Shaded),
        (egui::Key::A, ViewerAction::EnableAntialiasing),
        (egui::Key::B, ViewerAction::DisableAntialiasing),
        (egui::Key::H, ViewerAction::HiddenLine),
        (egui::Key::F, ViewerAction::FitAll),
        (egui::Key::G, ViewerAction::ToggleSolidOnly),
    ];
    assert_eq!(KEY_BINDINGS.len(), expected.len());
    for (key, action) in expected {
        assert_eq!(lookup_key(key), Some(action), "{key:?}");
    }
}

#[test]
fn test_unmapped_keys_dispatch_nothing() {
    for key in [egui::Key::Q, egui::Key::Z, egui::Key::Num0, egui::Key::Space] {
        assert_eq!(lookup_key(key), None, "{key:?}");
    }
}

#[test]
fn test_key_actions_drive_viewer() {
    let mut h = TestHarness::new();
    h.display_box(2.0);

    apply_action(&mut h.viewer, ViewerAction::Wireframe);
    assert_eq!(h.viewer.display_mode(), DisplayMode::Wireframe);

    apply_action(&mut h.viewer, ViewerAction::Shaded);
    assert_eq!(h.viewer.display_mode(), DisplayMode::Shaded);

    apply_action(&mut h.viewer, ViewerAction::HiddenLine);
    assert_eq!(h.viewer.display_mode(), DisplayMode::HiddenLine);

    apply_action(&mut h.viewer, ViewerAction::EnableAntialiasing);
    assert_eq!(h.viewer.rendering_params().msaa_samples, 4);
    assert!(h.viewer.rendering_params().antialiasing);

    apply_action(&mut h.viewer, ViewerAction::DisableAntialiasing);
    assert_eq!(h.viewer.rendering_params().msaa_samples, 0);
}

#[test]
fn test_fit_all_action_frames_offset_scene() {
    let mut h = TestHarness::new();
    h.display_point(20.0, 0.0, 0.0);

    apply_action(&mut h.viewer, ViewerAction::FitAll);
    assert!((h.viewer.camera.target.x - 20.0).abs() < 1e-3);
}

#[test]
fn test_solid_only_action_respects_selection() {
    let mut h = TestHarness::new();
    h.display_box(2.0);

    // Without a selection the toggle leaves solid-only disarmed
    apply_action(&mut h.viewer, ViewerAction::ToggleSolidOnly);
    assert!(!h.viewer.selection_state().solid_only());
    assert_eq!(
        h.viewer.selection_state().active_granularities(),
        &[Granularity::Vertex, Granularity::Edge, Granularity::Face]
    );

    // With one: arms solid-only picking
    h.viewer.set_selection_mode_solid();
    let center = h.center();
    h.click(center);
    apply_action(&mut h.viewer, ViewerAction::ToggleSolidOnly);
    assert!(h.viewer.selection_state().solid_only());
}
