//! Pure input mapping: pointer state to interaction mode, key codes to
//! viewer operations. Kept free of widget state so it is testable.

use crate::viewer::Viewer3d;

/// Pointer buttons currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerButtons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

/// Modifier keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub shift: bool,
}

/// Interaction derived from transient button/modifier state on each
/// pointer-move event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    AreaSelect,
    AreaZoom,
    Rotate,
    DynamicZoom,
    Pan,
    Hover,
}

/// Fixed precedence: left+shift, right+shift, left, right, middle, none
pub fn resolve_drag_mode(buttons: PointerButtons, modifiers: ModifierState) -> DragMode {
    if buttons.left && modifiers.shift {
        DragMode::AreaSelect
    } else if buttons.right && modifiers.shift {
        DragMode::AreaZoom
    } else if buttons.left {
        DragMode::Rotate
    } else if buttons.right {
        DragMode::DynamicZoom
    } else if buttons.middle {
        DragMode::Pan
    } else {
        DragMode::Hover
    }
}

/// Zero-argument viewer operations available on key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Wireframe,
    Shaded,
    EnableAntialiasing,
    DisableAntialiasing,
    HiddenLine,
    FitAll,
    ToggleSolidOnly,
}

/// Default key bindings
pub const KEY_BINDINGS: &[(egui::Key, ViewerAction)] = &[
    (egui::Key::W, ViewerAction::Wireframe),
    (egui::Key::S, ViewerAction::Shaded),
    (egui::Key::A, ViewerAction::EnableAntialiasing),
    (egui::Key::B, ViewerAction::DisableAntialiasing),
    (egui::Key::H, ViewerAction::HiddenLine),
    (egui::Key::F, ViewerAction::FitAll),
    (egui::Key::G, ViewerAction::ToggleSolidOnly),
];

/// Look up the action bound to a key, if any
pub fn lookup_key(key: egui::Key) -> Option<ViewerAction> {
    KEY_BINDINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, action)| *action)
}

/// Execute a bound action against the viewer
pub fn apply_action(viewer: &mut Viewer3d, action: ViewerAction) {
    match action {
        ViewerAction::Wireframe => viewer.set_mode_wireframe(),
        ViewerAction::Shaded => viewer.set_mode_shaded(),
        ViewerAction::EnableAntialiasing => viewer.enable_antialiasing(),
        ViewerAction::DisableAntialiasing => viewer.disable_antialiasing(),
        ViewerAction::HiddenLine => viewer.set_mode_hidden_line(),
        ViewerAction::FitAll => viewer.fit_all(),
        ViewerAction::ToggleSolidOnly => viewer.toggle_solid_only(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::DisplayMode;

    fn buttons(left: bool, middle: bool, right: bool) -> PointerButtons {
        PointerButtons { left, middle, right }
    }

    const SHIFT: ModifierState = ModifierState { shift: true };
    const PLAIN: ModifierState = ModifierState { shift: false };

    #[test]
    fn test_left_shift_is_area_select() {
        assert_eq!(
            resolve_drag_mode(buttons(true, false, false), SHIFT),
            DragMode::AreaSelect
        );
        // Regardless of other buttons
        assert_eq!(
            resolve_drag_mode(buttons(true, true, true), SHIFT),
            DragMode::AreaSelect
        );
    }

    #[test]
    fn test_right_shift_is_area_zoom() {
        assert_eq!(
            resolve_drag_mode(buttons(false, false, true), SHIFT),
            DragMode::AreaZoom
        );
    }

    #[test]
    fn test_left_alone_rotates() {
        assert_eq!(
            resolve_drag_mode(buttons(true, false, false), PLAIN),
            DragMode::Rotate
        );
    }

    #[test]
    fn test_right_alone_zooms() {
        assert_eq!(
            resolve_drag_mode(buttons(false, false, true), PLAIN),
            DragMode::DynamicZoom
        );
    }

    #[test]
    fn test_middle_pans_with_any_modifier() {
        assert_eq!(
            resolve_drag_mode(buttons(false, true, false), PLAIN),
            DragMode::Pan
        );
        assert_eq!(
            resolve_drag_mode(buttons(false, true, false), SHIFT),
            DragMode::Pan
        );
    }

    #[test]
    fn test_no_buttons_hovers() {
        assert_eq!(resolve_drag_mode(buttons(false, false, false), PLAIN), DragMode::Hover);
        assert_eq!(resolve_drag_mode(buttons(false, false, false), SHIFT), DragMode::Hover);
    }

    #[test]
    fn test_every_binding_resolves() {
        for (key, action) in KEY_BINDINGS {
            assert_eq!(lookup_key(*key), Some(*action));
        }
    }

    #[test]
    fn test_unmapped_key_yields_nothing() {
        assert_eq!(lookup_key(egui::Key::Q), None);
        assert_eq!(lookup_key(egui::Key::Escape), None);
    }

    #[test]
    fn test_apply_action_dispatches_once() {
        let mut v = Viewer3d::new();
        apply_action(&mut v, ViewerAction::Wireframe);
        assert_eq!(v.display_mode(), DisplayMode::Wireframe);
        apply_action(&mut v, ViewerAction::HiddenLine);
        assert_eq!(v.display_mode(), DisplayMode::HiddenLine);
        apply_action(&mut v, ViewerAction::EnableAntialiasing);
        assert_eq!(v.rendering_params().msaa_samples, 4);
    }
}
