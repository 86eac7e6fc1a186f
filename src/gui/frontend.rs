use std::time::{Duration, Instant};

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, RichText, Sense, Stroke, StrokeKind,
    pos2, vec2,
};

use super::theme;
use crate::canvas::geometry;
use crate::canvas::interaction::{
    InteractionController, LinkDraft, Mode, PressContext, PressOutcome,
};
use crate::canvas::layout;
use crate::canvas::pointer::{self, PointerSample};
use crate::canvas::transform::ViewTransform;
use crate::persistence::persist::{self, AppStateFile, SaveGate};
use crate::store::graph::{ChronicleStore, EdgeId, Node, NodeId, NodeKind, RelationKind};

const EDGE_HIT_THRESHOLD: f32 = 6.0;
const STATUS_VISIBLE: Duration = Duration::from_secs(3);

pub struct ChronicleApp {
    store: ChronicleStore,
    view: ViewTransform,
    controller: InteractionController,
    mode: Mode,
    selected: Option<NodeId>,
    editor_open: bool,
    // Link awaiting its relation kind + label, and the label buffer
    pending_link: Option<LinkDraft>,
    link_label: String,
    tag_input: String,
    show_help: bool,
    confirm_delete: Option<NodeId>,
    confirm_reset: bool,
    // persistence
    gate: SaveGate,
    dirty: bool,
    save_error: Option<String>,
    status: Option<String>,
    status_time: Option<Instant>,
}

impl ChronicleApp {
    pub fn new(store: ChronicleStore) -> Self {
        let mut gate = SaveGate::default();
        gate.mark_loaded();
        Self {
            store,
            view: ViewTransform::default(),
            controller: InteractionController::new(),
            mode: Mode::View,
            selected: None,
            editor_open: false,
            pending_link: None,
            link_label: String::new(),
            tag_input: String::new(),
            show_help: false,
            confirm_delete: None,
            confirm_reset: false,
            gate,
            dirty: false,
            save_error: None,
            status: None,
            status_time: None,
        }
    }

    pub fn from_state(state: AppStateFile) -> Self {
        let (store, view) = state.into_runtime();
        let mut app = Self::new(store);
        app.view = view;
        app
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
        self.status_time = Some(Instant::now());
    }

    fn save_now(&mut self) {
        let state = AppStateFile::from_runtime(&self.store, self.view);
        match persist::save_active(&state) {
            Ok(_) => {
                self.dirty = false;
                self.save_error = None;
            }
            Err(e) => {
                log::error!("autosave failed: {e:#}");
                self.save_error = Some(format!("Save failed: {}", e));
            }
        }
    }

    fn select(&mut self, id: NodeId) {
        self.selected = Some(id);
        self.editor_open = true;
    }

    fn deselect(&mut self) {
        self.selected = None;
        self.editor_open = false;
    }

    fn node_screen_rect(&self, node: &Node) -> Rect {
        let min = self.view.world_to_screen(pos2(node.x, node.y));
        Rect::from_min_size(min, geometry::card_size(node.kind) * self.view.scale)
    }

    // Topmost card under a canvas-local point; later cards render on top
    fn hit_node(&self, local: Pos2) -> Option<NodeId> {
        self.store
            .nodes
            .iter()
            .rev()
            .find(|n| self.node_screen_rect(n).contains(local))
            .map(|n| n.id)
    }

    fn edge_near(&self, local: Pos2, threshold: f32) -> Option<EdgeId> {
        let mut best: Option<(EdgeId, f32)> = None;
        for edge in &self.store.edges {
            let Some(path) = geometry::edge_path_in(&self.store, edge) else {
                continue;
            };
            let points: Vec<Pos2> = path
                .flatten(24)
                .into_iter()
                .map(|p| self.view.world_to_screen(p))
                .collect();
            let d = geometry::distance_to_polyline(local, &points);
            if d <= threshold {
                match best {
                    None => best = Some((edge.id, d)),
                    Some((_, bd)) if d < bd => best = Some((edge.id, d)),
                    _ => {}
                }
            }
        }
        best.map(|(id, _)| id)
    }

    fn create_node_at(&mut self, kind: NodeKind, world: Pos2) {
        let id = self.store.add_node(kind, world.x, world.y);
        self.select(id);
        self.mark_dirty();
    }

    fn apply_timeline_layout(&mut self) {
        if let Some(view) = layout::timeline_layout(&mut self.store) {
            self.view = view;
            self.mark_dirty();
            self.set_status("Cards arranged along the timeline");
        }
    }

    fn export_backup(&mut self) {
        match persist::export_backup(&self.store) {
            Ok(path) => self.set_status(format!("Backup written to {}", path.display())),
            Err(e) => {
                log::error!("backup export failed: {e:#}");
                self.save_error = Some(format!("Export failed: {}", e));
            }
        }
    }

    fn reset_world(&mut self) {
        if let Err(e) = persist::clear_active() {
            log::error!("failed to clear autosave: {e:#}");
        }
        self.store = ChronicleStore::starter();
        self.view = ViewTransform::default();
        self.controller = InteractionController::new();
        self.mode = Mode::View;
        self.deselect();
        self.pending_link = None;
        self.dirty = false;
        self.set_status("The world was reset");
    }

    fn handle_canvas_input(&mut self, ui: &egui::Ui, canvas: Rect, bg_resp: &egui::Response) {
        let origin = canvas.min;

        // Wheel zoom anchored at the cursor
        if bg_resp.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0
                && let Some(pos) = ui.input(|i| i.pointer.latest_pos())
            {
                self.view
                    .zoom_about(pointer::to_canvas_local(pos, origin), scroll);
            }
        }

        let (any_pressed, any_released, latest) = ui.input(|i| {
            (
                i.pointer.any_pressed(),
                i.pointer.any_released(),
                i.pointer.latest_pos(),
            )
        });

        if any_pressed
            && let Some(pos) = latest
            && canvas.contains(pos)
        {
            let sample = ui.input(|i| PointerSample::from_input(i, pos));
            let local = pointer::to_canvas_local(sample.pos, origin);
            let hit = self.hit_node(local);
            let press = PressContext::new(sample, local, hit, self.mode);
            match self.controller.on_press(&press, &self.view, &self.store) {
                PressOutcome::Place { kind, world } => {
                    self.create_node_at(kind, world);
                    // placement is one-shot
                    self.mode = Mode::View;
                }
                PressOutcome::DragStarted(id) => self.select(id),
                PressOutcome::Deselect => self.deselect(),
                PressOutcome::PanStarted
                | PressOutcome::LinkStarted(_)
                | PressOutcome::Ignored => {}
            }
        }

        // Moves only matter while a gesture is in flight
        if let Some(pos) = latest
            && !self.controller.is_idle()
        {
            let local = pointer::to_canvas_local(pos, origin);
            if self.controller.on_move(local, &mut self.view, &mut self.store) {
                self.mark_dirty();
            }
        }

        // Release anywhere ends the gesture, even off-canvas
        if any_released {
            let hit = latest.and_then(|p| self.hit_node(pointer::to_canvas_local(p, origin)));
            if let Some(draft) = self.controller.on_release(hit)
                && self.store.node(draft.source).is_some()
                && self.store.node(draft.target).is_some()
            {
                self.link_label.clear();
                self.pending_link = Some(draft);
            }
        }

        // Double-click: clear an edge under the cursor, else conjure a
        // character on empty ground. Cards swallow their own double-clicks.
        if bg_resp.double_clicked()
            && let Some(pos) = ui.input(|i| i.pointer.interact_pos())
        {
            let local = pointer::to_canvas_local(pos, origin);
            if self.hit_node(local).is_none() {
                if let Some(edge_id) = self.edge_near(local, EDGE_HIT_THRESHOLD) {
                    self.store.remove_edge(edge_id);
                    self.mark_dirty();
                } else {
                    let world = self.view.screen_to_world(local);
                    self.create_node_at(NodeKind::Character, world);
                }
            }
        }
    }

    fn paint_canvas(&self, painter: &egui::Painter, canvas: Rect) {
        let origin = canvas.min;
        let to_window = |world: Pos2| -> Pos2 { origin + self.view.world_to_screen(world).to_vec2() };
        let scale = self.view.scale;

        // Dot grid, skipped when zoomed far out
        let step = 40.0 * scale;
        if step >= 12.0 {
            let mut x = origin.x + (self.view.x % step + step) % step;
            while x < canvas.max.x {
                let mut y = origin.y + (self.view.y % step + step) % step;
                while y < canvas.max.y {
                    painter.circle_filled(pos2(x, y), 1.0, theme::CANVAS_DOT);
                    y += step;
                }
                x += step;
            }
        }

        // Edges under cards
        for edge in &self.store.edges {
            let Some(path) = geometry::edge_path_in(&self.store, edge) else {
                continue;
            };
            let style = theme::relation_style(edge.kind);
            let stroke = Stroke::new(style.width, style.color);
            let points: Vec<Pos2> = path.flatten(24).into_iter().map(to_window).collect();
            if style.dashed {
                painter.extend(egui::Shape::dashed_line(&points, stroke, 5.0, 5.0));
            } else {
                painter.add(egui::Shape::line(points, stroke));
            }
            if !edge.label.is_empty() {
                painter.text(
                    to_window(path.midpoint()) + vec2(0.0, -6.0 * scale),
                    Align2::CENTER_CENTER,
                    &edge.label,
                    FontId::proportional((10.0 * scale).max(8.0)),
                    theme::EDGE_LABEL,
                );
            }
        }

        // Rubber-band preview while linking
        if let Some((source, current)) = self.controller.linking_preview()
            && let Some(node) = self.store.node(source)
        {
            let from = to_window(geometry::card_center(node));
            let to = origin + current.to_vec2();
            painter.extend(egui::Shape::dashed_line(
                &[from, to],
                Stroke::new(2.0, theme::LINK_PREVIEW),
                4.0,
                4.0,
            ));
        }

        // Cards, in insertion order so later ones sit on top
        for node in &self.store.nodes {
            let rect = Rect::from_min_size(
                to_window(pos2(node.x, node.y)),
                geometry::card_size(node.kind) * scale,
            );
            if !canvas.intersects(rect) {
                continue;
            }
            let pal = theme::palette(node.attrs.palette);
            let is_event = node.kind == NodeKind::Event;
            let rounding = CornerRadius::same(if is_event { 2 } else { 8 });
            painter.rect(rect, rounding, pal.bg, Stroke::new(2.0, pal.border), StrokeKind::Inside);
            if self.selected == Some(node.id) {
                painter.rect_stroke(
                    rect.expand(3.0),
                    rounding,
                    Stroke::new(3.0, theme::SELECTION_RING),
                    StrokeKind::Outside,
                );
            }

            let glyph = theme::icon_glyph(&node.attrs.icon);
            if is_event {
                painter.text(
                    rect.left_center() + vec2(22.0 * scale, 0.0),
                    Align2::CENTER_CENTER,
                    glyph,
                    FontId::proportional(20.0 * scale),
                    pal.text,
                );
                if !node.attrs.date.is_empty() {
                    painter.text(
                        rect.center_top() + vec2(12.0 * scale, 16.0 * scale),
                        Align2::CENTER_CENTER,
                        &node.attrs.date,
                        FontId::monospace(9.0 * scale),
                        pal.text,
                    );
                }
                painter.text(
                    rect.center() + vec2(12.0 * scale, 0.0),
                    Align2::CENTER_CENTER,
                    &node.attrs.name,
                    FontId::proportional(13.0 * scale),
                    pal.text,
                );
            } else {
                painter.text(
                    rect.center_top() + vec2(0.0, 34.0 * scale),
                    Align2::CENTER_CENTER,
                    glyph,
                    FontId::proportional(30.0 * scale),
                    pal.text,
                );
                painter.text(
                    rect.center_top() + vec2(0.0, 72.0 * scale),
                    Align2::CENTER_CENTER,
                    &node.attrs.name,
                    FontId::proportional(13.0 * scale),
                    pal.text,
                );
                if !node.attrs.title.is_empty() {
                    painter.text(
                        rect.center_top() + vec2(0.0, 92.0 * scale),
                        Align2::CENTER_CENTER,
                        &node.attrs.title,
                        FontId::proportional(10.0 * scale),
                        pal.text,
                    );
                }
                if !node.attrs.date.is_empty() {
                    painter.text(
                        rect.center_top() + vec2(0.0, 108.0 * scale),
                        Align2::CENTER_CENTER,
                        &node.attrs.date,
                        FontId::monospace(9.0 * scale),
                        pal.text,
                    );
                }
            }
            if !node.attrs.tags.is_empty() {
                let line = node
                    .attrs
                    .tags
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" · ");
                painter.text(
                    rect.center_bottom() - vec2(0.0, 10.0 * scale),
                    Align2::CENTER_CENTER,
                    line,
                    FontId::proportional(8.0 * scale),
                    pal.text,
                );
            }
        }
    }

    fn editor_panel(&mut self, ctx: &egui::Context) {
        let Some(id) = self.selected else {
            return;
        };
        if !self.editor_open || self.store.node(id).is_none() {
            return;
        }

        let mut close = false;
        let mut delete = false;
        let mut tag_to_add: Option<String> = None;
        let mut tag_to_remove: Option<String> = None;
        let mut changed = false;

        egui::SidePanel::right("editor_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                let tag_input = &mut self.tag_input;
                let Some(node) = self.store.nodes.iter_mut().find(|n| n.id == id) else {
                    return;
                };
                let is_character = node.kind == NodeKind::Character;
                ui.horizontal(|ui| {
                    ui.heading(if is_character {
                        "Character file"
                    } else {
                        "Event record"
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✖").clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();
                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    ui.label("Name");
                    changed |= ui.text_edit_singleline(&mut node.attrs.name).changed();

                    ui.add_space(6.0);
                    ui.label("Timeline date");
                    let hint = if is_character {
                        "birth year, e.g. 1980"
                    } else {
                        "when it happened, e.g. 1998.05.02"
                    };
                    changed |= ui
                        .add(egui::TextEdit::singleline(&mut node.attrs.date).hint_text(hint))
                        .changed();

                    if is_character {
                        ui.add_space(6.0);
                        ui.label("Title");
                        changed |= ui.text_edit_singleline(&mut node.attrs.title).changed();
                    }

                    ui.add_space(6.0);
                    ui.label("Tags");
                    ui.horizontal_wrapped(|ui| {
                        for tag in &node.attrs.tags {
                            if ui.small_button(format!("{} ✖", tag)).clicked() {
                                tag_to_remove = Some(tag.clone());
                            }
                        }
                    });
                    let resp = ui.add(
                        egui::TextEdit::singleline(tag_input).hint_text("type a tag, press Enter"),
                    );
                    if resp.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && !tag_input.trim().is_empty()
                    {
                        tag_to_add = Some(tag_input.trim().to_string());
                        tag_input.clear();
                    }

                    ui.add_space(6.0);
                    ui.label("Style");
                    ui.horizontal_wrapped(|ui| {
                        for (idx, pal) in theme::PALETTES.iter().enumerate() {
                            let selected = node.attrs.palette == idx;
                            let stroke = if selected {
                                Stroke::new(2.0, theme::SELECTION_RING)
                            } else {
                                Stroke::new(1.0, pal.border)
                            };
                            let btn = egui::Button::new("  ").fill(pal.bg).stroke(stroke);
                            if ui.add(btn).on_hover_text(pal.name).clicked() {
                                node.attrs.palette = idx;
                                changed = true;
                            }
                        }
                    });
                    ui.horizontal_wrapped(|ui| {
                        for (key, icon) in theme::ICONS.iter() {
                            let selected = node.attrs.icon == *key;
                            let text = if selected {
                                RichText::new(icon.glyph).strong()
                            } else {
                                RichText::new(icon.glyph)
                            };
                            if ui.button(text).on_hover_text(icon.label).clicked() {
                                node.attrs.icon = key.to_string();
                                changed = true;
                            }
                        }
                    });

                    ui.add_space(6.0);
                    ui.label("Notes");
                    changed |= ui
                        .add(
                            egui::TextEdit::multiline(&mut node.attrs.notes)
                                .desired_rows(4)
                                .desired_width(f32::INFINITY),
                        )
                        .changed();

                    ui.add_space(10.0);
                    ui.separator();
                    if ui
                        .button(RichText::new("🗑 Delete card").color(Color32::RED))
                        .clicked()
                    {
                        delete = true;
                    }
                });
            });

        if let Some(tag) = tag_to_add
            && self.store.add_tag(id, &tag)
        {
            changed = true;
        }
        if let Some(tag) = tag_to_remove
            && self.store.remove_tag(id, &tag)
        {
            changed = true;
        }
        if changed {
            self.mark_dirty();
        }
        if close {
            self.deselect();
        }
        if delete {
            self.confirm_delete = Some(id);
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let add_char = ui
                    .selectable_label(self.mode == Mode::AddCharacter, "👤 Character")
                    .on_hover_text("Then click an empty spot on the canvas");
                if add_char.clicked() {
                    self.mode = if self.mode == Mode::AddCharacter {
                        Mode::View
                    } else {
                        Mode::AddCharacter
                    };
                }
                let add_event = ui
                    .selectable_label(self.mode == Mode::AddEvent, "📜 Event")
                    .on_hover_text("Then click an empty spot on the canvas");
                if add_event.clicked() {
                    self.mode = if self.mode == Mode::AddEvent {
                        Mode::View
                    } else {
                        Mode::AddEvent
                    };
                }
                ui.separator();
                if ui
                    .selectable_label(self.mode == Mode::Link, "🔗 Link")
                    .on_hover_text("Drag from one card to another")
                    .clicked()
                {
                    self.mode = if self.mode == Mode::Link {
                        Mode::View
                    } else {
                        Mode::Link
                    };
                }
                if ui.button("⏳ Timeline sort").clicked() {
                    self.apply_timeline_layout();
                }
                ui.separator();
                if ui.button("💾 Export").clicked() {
                    self.export_backup();
                }
                if ui.button("❓ Help").clicked() {
                    self.show_help = true;
                }
                ui.separator();
                if ui.button("−").on_hover_text("Zoom out").clicked() {
                    self.view.zoom_step(0.8);
                }
                if ui.button("100%").on_hover_text("Reset view").clicked() {
                    self.view.reset();
                }
                if ui.button("＋").on_hover_text("Zoom in").clicked() {
                    self.view.zoom_step(1.2);
                }
                ui.separator();
                if ui
                    .button(RichText::new("🗑 Reset").color(Color32::RED))
                    .on_hover_text("Destroy the timeline and start over")
                    .clicked()
                {
                    self.confirm_reset = true;
                }

                ui.separator();
                ui.small(format!(
                    "N:{} E:{}",
                    self.store.node_count(),
                    self.store.edge_count()
                ));
                if let Some(err) = &self.save_error {
                    ui.separator();
                    ui.colored_label(Color32::RED, err);
                }
            });
        });
    }

    fn pending_link_dialog(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.pending_link else {
            return;
        };
        let mut chosen: Option<RelationKind> = None;
        let mut cancel = false;
        egui::Window::new("Forge a bond")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Relation label");
                ui.add(
                    egui::TextEdit::singleline(&mut self.link_label)
                        .hint_text("e.g. mentor, sworn enemy…"),
                );
                ui.add_space(6.0);
                ui.label("Relation kind");
                for kind in theme::RELATION_CHOICES {
                    let style = theme::relation_style(*kind);
                    if ui
                        .button(RichText::new(format!("● {}", style.label)).color(style.color))
                        .clicked()
                    {
                        chosen = Some(*kind);
                    }
                }
                ui.add_space(6.0);
                if ui.button("Discard link").clicked() {
                    cancel = true;
                }
            });
        if let Some(kind) = chosen {
            // add_edge re-checks the endpoints; a stale draft creates nothing
            if self
                .store
                .add_edge(draft.source, draft.target, kind, self.link_label.trim().to_string())
                .is_some()
            {
                self.mark_dirty();
            }
            self.pending_link = None;
        } else if cancel {
            self.pending_link = None;
        }
    }

    fn confirm_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(id) = self.confirm_delete {
            egui::Window::new("Delete card")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Delete this card and every relation attached to it?");
                    ui.label("This cannot be undone.");
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui
                            .button(RichText::new("Delete").color(Color32::RED))
                            .clicked()
                        {
                            if self.store.remove_node(id) {
                                self.mark_dirty();
                            }
                            self.deselect();
                            self.confirm_delete = None;
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_delete = None;
                        }
                    });
                });
        }

        if self.confirm_reset {
            egui::Window::new("Reset the world")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("This destroys the whole timeline and restarts from the starter chronicle.");
                    ui.label("The autosave file is removed. This cannot be undone.");
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui
                            .button(RichText::new("Reset everything").color(Color32::RED))
                            .clicked()
                        {
                            self.reset_world();
                            self.confirm_reset = false;
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_reset = false;
                        }
                    });
                });
        }
    }

    fn help_window(&mut self, ctx: &egui::Context) {
        if !self.show_help {
            return;
        }
        let mut open = true;
        egui::Window::new("How to use Chronicle")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("• Pan: drag with the middle button, or hold Shift and drag.");
                ui.label("• Zoom: mouse wheel, anchored at the cursor.");
                ui.label("• Add cards: pick Character or Event below, then click empty canvas.");
                ui.label("• Link cards: toggle Link (or hold Alt / use the right button) and drag from one card to another.");
                ui.label("• Double-click a relation line to remove it.");
                ui.label("• Timeline sort arranges every card by its date.");
                ui.add_space(8.0);
                ui.small("Even the best wizards consult their textbooks sometimes.");
            });
        self.show_help = open;
    }

    fn mode_hint(&self, ctx: &egui::Context) {
        let hint = match self.mode {
            Mode::View => return,
            Mode::AddCharacter => "Click an empty spot to place the character…",
            Mode::AddEvent => "Click an empty spot to place the event…",
            Mode::Link => "Drag from one card to another to link them",
        };
        egui::Area::new("mode_hint".into())
            .anchor(Align2::CENTER_TOP, vec2(0.0, 10.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(Color32::from_rgb(139, 69, 19))
                    .show(ui, |ui| {
                        ui.label(RichText::new(hint).color(Color32::from_rgb(253, 246, 227)));
                    });
            });
    }

    fn status_toast(&self, ctx: &egui::Context) {
        if let (Some(msg), Some(when)) = (&self.status, self.status_time)
            && when.elapsed() <= STATUS_VISIBLE
        {
            egui::Area::new("status_toast".into())
                .anchor(Align2::RIGHT_BOTTOM, vec2(-12.0, -12.0))
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.small(msg);
                    });
                });
        }
    }
}

impl eframe::App for ChronicleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.toolbar(ctx);
        self.editor_panel(ctx);

        let modal_open = self.pending_link.is_some()
            || self.show_help
            || self.confirm_reset
            || self.confirm_delete.is_some();

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::CANVAS_BG))
            .show(ctx, |ui| {
                let canvas = ui.available_rect_before_wrap();
                let bg_resp = ui.allocate_rect(canvas, Sense::click_and_drag());
                // Block canvas input while an overlay owns the pointer
                if !modal_open {
                    self.handle_canvas_input(ui, canvas, &bg_resp);
                }
                let painter = ui.painter_at(canvas);
                self.paint_canvas(&painter, canvas);
            });

        self.mode_hint(ctx);
        self.pending_link_dialog(ctx);
        self.confirm_dialogs(ctx);
        self.help_window(ctx);
        self.status_toast(ctx);

        // Fire-and-forget autosave, gated until the initial load completed
        if self.gate.permits(self.dirty) {
            self.save_now();
        }
    }
}
