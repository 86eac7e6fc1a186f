use egui::Pos2;

use super::pointer::PointerSample;
use super::transform::ViewTransform;
use crate::store::graph::{ChronicleStore, NodeId, NodeKind};

/// Current toolbar mode. Add modes are one-shot: the next canvas press
/// places a card and the mode reverts to `View`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    AddCharacter,
    AddEvent,
    Link,
}

impl Mode {
    pub fn add_kind(self) -> Option<NodeKind> {
        match self {
            Mode::AddCharacter => Some(NodeKind::Character),
            Mode::AddEvent => Some(NodeKind::Event),
            _ => None,
        }
    }

    pub fn is_add(self) -> bool {
        self.add_kind().is_some()
    }
}

/// Everything a press dispatch rule is allowed to look at.
#[derive(Copy, Clone, Debug)]
pub struct PressContext {
    pub pos: Pos2,
    pub hit: Option<NodeId>,
    pub mode: Mode,
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
    pub shift: bool,
    pub alt: bool,
    pub touch: bool,
}

impl PressContext {
    pub fn new(sample: PointerSample, pos: Pos2, hit: Option<NodeId>, mode: Mode) -> Self {
        Self {
            pos,
            hit,
            mode,
            primary: sample.primary,
            secondary: sample.secondary,
            middle: sample.middle,
            shift: sample.shift,
            alt: sample.alt,
            touch: sample.touch,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PressAction {
    Link,
    Pan,
    Drag,
    Place,
    Deselect,
}

fn wants_link(c: &PressContext) -> bool {
    c.hit.is_some()
        && ((!c.touch && (c.alt || c.secondary || c.mode == Mode::Link))
            || (c.touch && c.mode == Mode::Link))
}

fn wants_pan(c: &PressContext) -> bool {
    c.middle || (c.primary && c.shift) || (c.touch && c.hit.is_none())
}

fn wants_drag(c: &PressContext) -> bool {
    c.hit.is_some() && !c.mode.is_add()
}

fn wants_place(c: &PressContext) -> bool {
    c.hit.is_none() && c.mode.is_add()
}

fn wants_deselect(c: &PressContext) -> bool {
    c.hit.is_none()
}

/// Ordered press dispatch table; the first matching rule wins. A node press
/// in an add mode matches nothing and is ignored.
pub const PRESS_RULES: &[(PressAction, fn(&PressContext) -> bool)] = &[
    (PressAction::Link, wants_link),
    (PressAction::Pan, wants_pan),
    (PressAction::Drag, wants_drag),
    (PressAction::Place, wants_place),
    (PressAction::Deselect, wants_deselect),
];

pub fn classify_press(ctx: &PressContext) -> Option<PressAction> {
    PRESS_RULES
        .iter()
        .find(|(_, applies)| applies(ctx))
        .map(|(action, _)| *action)
}

/// What the current pointer gesture means. Exactly one variant is ever
/// active; a new press replaces whatever was in flight.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        anchor: Pos2,
    },
    Dragging {
        node: NodeId,
        anchor: Pos2,
        origin: Pos2,
    },
    Linking {
        source: NodeId,
        current: Pos2,
    },
}

/// A completed link gesture awaiting user classification. Becomes a real
/// edge only once a relation kind and label are chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkDraft {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PressOutcome {
    Ignored,
    PanStarted,
    DragStarted(NodeId),
    LinkStarted(NodeId),
    Place { kind: NodeKind, world: Pos2 },
    Deselect,
}

/// Owns the gesture state and applies pointer events to it. The store and
/// transform are passed in per call; this type never holds them.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, InteractionState::Panning { .. })
    }

    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.state {
            InteractionState::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Source node and current pointer position of an active link gesture,
    /// for the rubber-band preview.
    pub fn linking_preview(&self) -> Option<(NodeId, Pos2)> {
        match self.state {
            InteractionState::Linking { source, current } => Some((source, current)),
            _ => None,
        }
    }

    /// Dispatch a press. Any in-flight gesture is dropped first; the press
    /// context decides what the new gesture is.
    pub fn on_press(
        &mut self,
        ctx: &PressContext,
        transform: &ViewTransform,
        store: &ChronicleStore,
    ) -> PressOutcome {
        self.state = InteractionState::Idle;
        match classify_press(ctx) {
            Some(PressAction::Pan) => {
                self.state = InteractionState::Panning { anchor: ctx.pos };
                PressOutcome::PanStarted
            }
            Some(PressAction::Link) => match ctx.hit {
                Some(source) => {
                    self.state = InteractionState::Linking {
                        source,
                        current: ctx.pos,
                    };
                    PressOutcome::LinkStarted(source)
                }
                None => PressOutcome::Ignored,
            },
            Some(PressAction::Drag) => {
                let Some(node) = ctx.hit.and_then(|id| store.node(id)) else {
                    // Hit id with no backing node: stale reference, skip
                    return PressOutcome::Ignored;
                };
                self.state = InteractionState::Dragging {
                    node: node.id,
                    anchor: ctx.pos,
                    origin: Pos2::new(node.x, node.y),
                };
                PressOutcome::DragStarted(node.id)
            }
            Some(PressAction::Place) => match ctx.mode.add_kind() {
                Some(kind) => PressOutcome::Place {
                    kind,
                    world: transform.screen_to_world(ctx.pos),
                },
                None => PressOutcome::Ignored,
            },
            Some(PressAction::Deselect) => PressOutcome::Deselect,
            None => PressOutcome::Ignored,
        }
    }

    /// Advance the active gesture to a new pointer position. Returns true
    /// when the store was mutated (a node moved). Moves with no active
    /// gesture are no-ops.
    pub fn on_move(
        &mut self,
        pos: Pos2,
        transform: &mut ViewTransform,
        store: &mut ChronicleStore,
    ) -> bool {
        match &mut self.state {
            InteractionState::Idle => false,
            InteractionState::Panning { anchor } => {
                // Incremental: apply the delta and move the anchor along,
                // so pan distance never depends on gesture history
                let delta = pos - *anchor;
                transform.pan_by(delta);
                *anchor = pos;
                false
            }
            InteractionState::Dragging {
                node,
                anchor,
                origin,
            } => {
                // Screen delta since the press, unscaled into world units.
                // The anchor stays fixed; position is always origin + delta.
                let delta = transform.screen_delta_to_world(pos - *anchor);
                if let Some(n) = store.node_mut(*node) {
                    n.x = origin.x + delta.x;
                    n.y = origin.y + delta.y;
                    true
                } else {
                    false
                }
            }
            InteractionState::Linking { current, .. } => {
                *current = pos;
                false
            }
        }
    }

    /// Release anywhere ends the gesture. A link released over a different
    /// node yields a draft; released over the source node or empty canvas it
    /// is discarded silently.
    pub fn on_release(&mut self, hit: Option<NodeId>) -> Option<LinkDraft> {
        let finished = std::mem::take(&mut self.state);
        if let InteractionState::Linking { source, .. } = finished
            && let Some(target) = hit
            && target != source
        {
            return Some(LinkDraft { source, target });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(hit: Option<NodeId>, mode: Mode) -> PressContext {
        PressContext {
            pos: Pos2::ZERO,
            hit,
            mode,
            primary: true,
            secondary: false,
            middle: false,
            shift: false,
            alt: false,
            touch: false,
        }
    }

    #[test]
    fn shift_press_pans_even_over_nodes() {
        let id = uuid::Uuid::now_v7();
        let mut ctx = press(Some(id), Mode::View);
        ctx.shift = true;
        assert_eq!(classify_press(&ctx), Some(PressAction::Pan));
    }

    #[test]
    fn alt_press_on_node_links() {
        let id = uuid::Uuid::now_v7();
        let mut ctx = press(Some(id), Mode::View);
        ctx.alt = true;
        assert_eq!(classify_press(&ctx), Some(PressAction::Link));
    }

    #[test]
    fn touch_on_node_drags_unless_link_mode() {
        let id = uuid::Uuid::now_v7();
        let mut ctx = press(Some(id), Mode::View);
        ctx.touch = true;
        ctx.primary = false;
        assert_eq!(classify_press(&ctx), Some(PressAction::Drag));
        ctx.mode = Mode::Link;
        assert_eq!(classify_press(&ctx), Some(PressAction::Link));
    }

    #[test]
    fn node_press_in_add_mode_matches_no_rule() {
        let id = uuid::Uuid::now_v7();
        let ctx = press(Some(id), Mode::AddEvent);
        assert_eq!(classify_press(&ctx), None);
    }
}
