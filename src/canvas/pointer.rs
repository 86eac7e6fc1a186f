use egui::{InputState, PointerButton, Pos2};

/// Normalized pointer sample: one shape for mouse and touch input.
///
/// Touch coordinates arrive through egui's pointer emulation, which tracks
/// the first contact point only. Additional fingers are not distinguished.
#[derive(Copy, Clone, Debug)]
pub struct PointerSample {
    pub pos: Pos2,
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
    pub shift: bool,
    pub alt: bool,
    pub touch: bool,
}

impl PointerSample {
    /// Snapshot the input state at a press. Button flags report what went
    /// down this frame.
    pub fn from_input(input: &InputState, fallback: Pos2) -> Self {
        Self {
            pos: input.pointer.latest_pos().unwrap_or(fallback),
            primary: input.pointer.button_pressed(PointerButton::Primary),
            secondary: input.pointer.button_pressed(PointerButton::Secondary),
            middle: input.pointer.button_pressed(PointerButton::Middle),
            shift: input.modifiers.shift,
            alt: input.modifiers.alt,
            touch: input.any_touches(),
        }
    }
}

/// Viewport-to-canvas conversion. Input positions are reported in window
/// coordinates; the interaction core works relative to the canvas origin
/// supplied by the host panel. Kept at the boundary so nothing inside the
/// core knows about window layout.
pub fn to_canvas_local(pos: Pos2, canvas_origin: Pos2) -> Pos2 {
    pos - canvas_origin.to_vec2()
}
