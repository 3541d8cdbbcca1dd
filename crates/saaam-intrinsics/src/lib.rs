//! The three frozen intrinsic catalogues the SAAAM compiler knows about.
//!
//! These are immutable, process-wide constants built once at compile time by
//! `phf`: intrinsic variables, intrinsic functions, and the subset of
//! intrinsics the emitter rewrites to a host-namespaced form. No catalogue is
//! ever mutated at runtime, so sharing one compiler instance's catalogues
//! across threads needs no locking — only the diagnostics sink and symbol
//! table are per-compile state.
//!
//! The rewrite table is intentionally partial. Per the design's open
//! question: the canonical set of rewritten names is exactly the host
//! members documented for `H`; any other intrinsic — `mouse_check`,
//! `stop_sound`, `create_object`, and friends — is emitted verbatim. Adding
//! a name here is a deliberate interface change, not something to infer from
//! usage.

/// Intrinsic variables recognised by the analyser and left untouched by the
/// emitter (none of them appear in [`REWRITE_TABLE`] except `delta_time` and
/// `current_time`, which the emitter does rewrite).
pub static VARIABLES: phf::Set<&'static str> = phf::phf_set! {
    "position", "velocity", "size", "color", "rotation", "scale", "visible",
    "active", "tag", "components", "GRAVITY", "FRICTION", "MAX_FALL_SPEED",
    "delta_time", "current_time", "game_time",
    "vk_left", "vk_right", "vk_up", "vk_down",
    "vk_space", "vk_enter", "vk_escape", "vk_shift",
};

/// Intrinsic functions recognised by the analyser. Lifecycle functions
/// (`create`, `step`, `draw`, `on_collision`) are included here because the
/// analyser treats their names as pre-declared; the emitter's lifecycle
/// epilogue is driven separately, by which of them the program actually
/// declares.
pub static FUNCTIONS: phf::Set<&'static str> = phf::phf_set! {
    "create", "step", "draw", "on_collision",
    "keyboard_check", "keyboard_check_pressed", "keyboard_check_released",
    "mouse_check", "mouse_check_pressed", "mouse_check_released",
    "draw_sprite", "draw_text", "draw_rectangle", "draw_circle", "draw_line",
    "play_sound", "play_music", "stop_sound", "stop_music",
    "vec2", "vec3", "point_distance", "check_collision",
    "create_object", "destroy_object", "find_object", "find_nearest",
};

/// The four lifecycle function names the emitter's epilogue registers.
pub const LIFECYCLE_FUNCTIONS: &[&str] = &["create", "step", "draw", "on_collision"];

/// Maps an intrinsic identifier to the exact text the emitter prints in its
/// place. Identifiers absent from this map pass through verbatim.
pub static REWRITE_TABLE: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "keyboard_check" => "H.keyboardCheck",
    "keyboard_check_pressed" => "H.keyboardCheckPressed",
    "keyboard_check_released" => "H.keyboardCheckReleased",
    "draw_sprite" => "H.drawSprite",
    "draw_text" => "H.drawText",
    "draw_rectangle" => "H.drawRectangle",
    "draw_circle" => "H.drawCircle",
    "draw_line" => "H.drawLine",
    "play_sound" => "H.playSound",
    "play_music" => "H.playMusic",
    "check_collision" => "H.checkCollision",
    "point_distance" => "H.pointDistance",
    "delta_time" => "H.deltaTime",
    "current_time" => "H.currentTime",
    "vk_left" => "H.vk.left",
    "vk_right" => "H.vk.right",
    "vk_up" => "H.vk.up",
    "vk_down" => "H.vk.down",
    "vk_space" => "H.vk.space",
    "vk_enter" => "H.vk.enter",
    "vk_escape" => "H.vk.escape",
    "vk_shift" => "H.vk.shift",
};

/// Per §4.4: `keyboard_check*` intrinsics expect exactly one argument.
pub fn expects_exactly_one_arg(name: &str) -> bool {
    matches!(name, "keyboard_check" | "keyboard_check_pressed" | "keyboard_check_released")
}

/// Per §4.4: `draw_sprite`/`draw_text` expect at least three arguments.
pub fn expects_at_least_three_args(name: &str) -> bool {
    matches!(name, "draw_sprite" | "draw_text")
}

/// Rewrite an intrinsic identifier to its emitted host-namespaced form, if
/// the rewrite table has an entry for it.
pub fn rewrite(name: &str) -> Option<&'static str> {
    REWRITE_TABLE.get(name).copied()
}

pub fn is_intrinsic(name: &str) -> bool {
    VARIABLES.contains(name) || FUNCTIONS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_identifiers() {
        assert_eq!(rewrite("keyboard_check"), Some("H.keyboardCheck"));
        assert_eq!(rewrite("vk_space"), Some("H.vk.space"));
        assert_eq!(rewrite("mouse_check"), None);
    }

    #[test]
    fn recognises_intrinsics() {
        assert!(is_intrinsic("position"));
        assert!(is_intrinsic("draw_sprite"));
        assert!(!is_intrinsic("player_health"));
    }

    #[test]
    fn virtual_key_constants_are_recognised_intrinsics() {
        for name in ["vk_left", "vk_right", "vk_up", "vk_down", "vk_space", "vk_enter", "vk_escape", "vk_shift"] {
            assert!(is_intrinsic(name), "{name} should be a recognised intrinsic");
            assert!(rewrite(name).is_some(), "{name} should have a rewrite entry");
        }
    }
}
