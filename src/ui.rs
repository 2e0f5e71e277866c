//! Screen layout, input mapping and scene construction for the picker.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::config::{
    Color, PickerConfig, ACCENT, BACKGROUND, DANGER, PANEL, PANEL_BORDER, TEXT, TEXT_DIM,
    TEXT_MUTED, WHITE,
};
use crate::confetti::Confetti;
use crate::entries::display_label;
use crate::render::{Align, DrawCommand, Scene};
use crate::session::Session;
use crate::spin::{PickCount, SessionState};
use crate::store::EntryStore;

const HEADER_HEIGHT: i32 = 64;
const PAD: i32 = 24;
const STATUS_HEIGHT: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px < (self.x + self.w) as f64
            && py < (self.y + self.h) as f64
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// Every interactive region, derived from the framebuffer size.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub pick_one: Rect,
    pub pick_two: Rect,
    pub reset: Rect,
    pub panel: Rect,
    pub remove_all: Rect,
    pub text_area: Rect,
    pub wheel_cx: i32,
    pub wheel_cy: i32,
    pub wheel_radius: i32,
    pub hub_radius: i32,
    pub status_y: i32,
    pub modal: Rect,
    pub modal_remove: Rect,
    pub modal_keep: Rect,
}

impl Layout {
    pub fn new(width: usize, height: usize, config: &PickerConfig) -> Self {
        let width = width as i32;
        let height = height as i32;

        let reset = Rect::new(width - PAD - 96, 14, 96, 36);
        let pick_two = Rect::new(reset.x - 12 - 88, 14, 88, 36);
        let pick_one = Rect::new(pick_two.x - 4 - 88, 14, 88, 36);

        let panel_w = (width as f64 * 0.32) as i32;
        let panel = Rect::new(PAD, HEADER_HEIGHT + 8, panel_w, height - HEADER_HEIGHT - 8 - PAD);
        let remove_all = Rect::new(panel.x + panel.w - 16 - 116, panel.y + 14, 116, 32);
        let text_area = Rect::new(
            panel.x + 16,
            panel.y + 60,
            panel.w - 32,
            (panel.h - 60 - 48).max(0),
        );

        let area_x = panel.x + panel.w + PAD;
        let area_w = (width - area_x - PAD - config.pointer_size).max(0);
        let area_h = (height - HEADER_HEIGHT - STATUS_HEIGHT - PAD).max(0);
        let side = area_w.min(area_h);
        let wheel_cx = area_x + area_w / 2;
        let wheel_cy = HEADER_HEIGHT + area_h / 2;
        let wheel_radius = (side / 2 - config.wheel_margin).max(0);

        let modal_w = 480.min(width - 2 * PAD);
        let modal_h = 380.min(height - 2 * PAD);
        let modal = Rect::new((width - modal_w) / 2, (height - modal_h) / 2, modal_w, modal_h);
        let button_w = modal.w - 80;
        let modal_keep = Rect::new(modal.x + 40, modal.y + modal.h - 40 - 52, button_w, 52);
        let modal_remove = Rect::new(modal.x + 40, modal_keep.y - 16 - 60, button_w, 60);

        Self {
            width,
            height,
            pick_one,
            pick_two,
            reset,
            panel,
            remove_all,
            text_area,
            wheel_cx,
            wheel_cy,
            wheel_radius,
            hub_radius: config.hub_radius,
            status_y: wheel_cy + side / 2 + STATUS_HEIGHT / 2,
            modal,
            modal_remove,
            modal_keep,
        }
    }

    fn in_hub(&self, x: f64, y: f64) -> bool {
        let dx = x - self.wheel_cx as f64;
        let dy = y - self.wheel_cy as f64;
        (dx * dx + dy * dy).sqrt() <= self.hub_radius as f64
    }
}

/// Edits to the roster text. The caret always sits at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKey {
    Insert(String),
    Backspace,
    Newline,
    ClearLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    PickOne,
    PickTwo,
    Reset,
    RemoveAll,
    Spin,
    RemoveWinners,
    KeepWinners,
    Dismiss,
    Edit(EditKey),
}

/// Keys the picker reacts to, decoupled from the windowing backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Enter,
    Escape,
    Backspace,
    Text(String),
}

/// Map a click to an action, given what is on screen.
pub fn hit_test(layout: &Layout, state: SessionState, x: f64, y: f64) -> Option<UiAction> {
    if state == SessionState::Celebrating {
        if layout.modal_remove.contains(x, y) {
            return Some(UiAction::RemoveWinners);
        }
        if layout.modal_keep.contains(x, y) {
            return Some(UiAction::KeepWinners);
        }
        if !layout.modal.contains(x, y) {
            return Some(UiAction::Dismiss);
        }
        return None;
    }

    if layout.pick_one.contains(x, y) {
        Some(UiAction::PickOne)
    } else if layout.pick_two.contains(x, y) {
        Some(UiAction::PickTwo)
    } else if layout.reset.contains(x, y) {
        Some(UiAction::Reset)
    } else if layout.remove_all.contains(x, y) {
        Some(UiAction::RemoveAll)
    } else if layout.in_hub(x, y) {
        Some(UiAction::Spin)
    } else {
        None
    }
}

/// Map a key press to an action. `command` is Ctrl or Cmd held down,
/// `repeat` marks an auto-repeat from a held key.
pub fn key_action(
    state: SessionState,
    key: &KeyInput,
    command: bool,
    repeat: bool,
) -> Option<UiAction> {
    if repeat && matches!(key, KeyInput::Enter | KeyInput::Escape) {
        return None;
    }
    match (state, key) {
        (_, KeyInput::Enter) if command => Some(UiAction::Spin),
        (SessionState::Celebrating, KeyInput::Enter) => Some(UiAction::RemoveWinners),
        (SessionState::Celebrating, KeyInput::Escape) => Some(UiAction::KeepWinners),
        (SessionState::Idle, KeyInput::Enter) => Some(UiAction::Edit(EditKey::Newline)),
        (SessionState::Idle, KeyInput::Backspace) if command => {
            Some(UiAction::Edit(EditKey::ClearLine))
        }
        (SessionState::Idle, KeyInput::Backspace) => Some(UiAction::Edit(EditKey::Backspace)),
        (SessionState::Idle, KeyInput::Text(text)) if !command => {
            let printable: String = text.chars().filter(|c| !c.is_control()).collect();
            if printable.is_empty() {
                None
            } else {
                Some(UiAction::Edit(EditKey::Insert(printable)))
            }
        }
        _ => None,
    }
}

/// Apply an edit to the end of `text`.
pub fn edit_text(text: &str, key: &EditKey) -> String {
    let mut out = text.to_string();
    match key {
        EditKey::Insert(s) => out.push_str(s),
        EditKey::Newline => out.push('\n'),
        EditKey::Backspace => {
            out.pop();
        }
        EditKey::ClearLine => {
            if out.ends_with('\n') {
                out.pop();
            } else {
                let keep = out.rfind('\n').map_or(0, |i| i + 1);
                out.truncate(keep);
            }
        }
    }
    out
}

/// Route an action into the session. Returns whether anything changed.
pub fn dispatch<S: EntryStore, R: Rng + ?Sized>(
    session: &mut Session<S>,
    action: &UiAction,
    rng: &mut R,
) -> bool {
    debug!(?action, "ui action");
    match action {
        UiAction::PickOne => session.set_pick_count(PickCount::One),
        UiAction::PickTwo => session.set_pick_count(PickCount::Two),
        UiAction::Reset => session.reset(),
        UiAction::RemoveAll => session.clear_all(),
        UiAction::Spin => session.spin(rng),
        UiAction::RemoveWinners => session.remove_winners(),
        UiAction::KeepWinners | UiAction::Dismiss => session.keep_winners(),
        UiAction::Edit(key) => {
            if session.state() != SessionState::Idle {
                return false;
            }
            let next = edit_text(session.text(), key);
            session.set_text(next)
        }
    }
}

pub fn status_line(state: SessionState, pick: PickCount) -> String {
    match state {
        SessionState::Idle => match pick {
            PickCount::One => "Ready to pick 1 student".to_string(),
            PickCount::Two => "Ready to pick 2 students".to_string(),
        },
        _ => "Spinning...".to_string(),
    }
}

/// Label size shrinks as the wheel fills up.
pub fn label_font_size(segment_count: usize) -> f32 {
    (24.0 - segment_count as f32 / 2.0).max(12.0)
}

// ============================================================================
// SCENE CONSTRUCTION
// ============================================================================

pub fn build_scene<S: EntryStore>(
    layout: &Layout,
    session: &Session<S>,
    confetti: &Confetti,
    config: &PickerConfig,
) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(BACKGROUND));

    add_header(&mut scene, layout, session, config);
    add_list_panel(&mut scene, layout, session, config);
    add_wheel(&mut scene, layout, session, config);

    scene.add_command(DrawCommand::Text {
        x: layout.wheel_cx,
        y: layout.status_y,
        text: status_line(session.state(), session.pick_count()),
        font_size: 16.0,
        color: TEXT_DIM,
        align: Align::Center,
    });

    if session.state() == SessionState::Celebrating {
        add_winner_modal(&mut scene, layout, session, confetti, config);
    }
    scene
}

fn add_button(
    scene: &mut Scene,
    rect: Rect,
    label: &str,
    fill: Color,
    text: Color,
    font_size: f32,
) {
    scene.add_command(DrawCommand::Rect {
        x: rect.x,
        y: rect.y,
        w: rect.w,
        h: rect.h,
        color: fill,
        alpha: 1.0,
    });
    scene.add_command(DrawCommand::RectOutline {
        x: rect.x,
        y: rect.y,
        w: rect.w,
        h: rect.h,
        thickness: 1,
        color: PANEL_BORDER,
    });
    let (x, y) = rect.center();
    scene.add_command(DrawCommand::Text {
        x,
        y,
        text: label.to_string(),
        font_size,
        color: text,
        align: Align::Center,
    });
}

fn add_header<S: EntryStore>(
    scene: &mut Scene,
    layout: &Layout,
    session: &Session<S>,
    config: &PickerConfig,
) {
    scene.add_command(DrawCommand::Text {
        x: PAD,
        y: HEADER_HEIGHT / 2,
        text: config.title.clone(),
        font_size: 28.0,
        color: TEXT,
        align: Align::Left,
    });

    let spinning = session.state() == SessionState::Spinning;
    for (rect, label, pick) in [
        (layout.pick_one, "Pick 1", PickCount::One),
        (layout.pick_two, "Pick 2", PickCount::Two),
    ] {
        let selected = session.pick_count() == pick;
        let fill = if selected { ACCENT } else { PANEL };
        let text = if spinning {
            TEXT_DIM
        } else if selected {
            WHITE
        } else {
            TEXT_MUTED
        };
        add_button(scene, rect, label, fill, text, config.button_font_size);
    }
    let reset_text = if spinning { TEXT_DIM } else { TEXT };
    add_button(scene, layout.reset, "Reset", PANEL, reset_text, config.button_font_size);
}

fn add_list_panel<S: EntryStore>(
    scene: &mut Scene,
    layout: &Layout,
    session: &Session<S>,
    config: &PickerConfig,
) {
    let panel = layout.panel;
    scene.add_command(DrawCommand::Rect {
        x: panel.x,
        y: panel.y,
        w: panel.w,
        h: panel.h,
        color: PANEL,
        alpha: 0.5,
    });
    scene.add_command(DrawCommand::RectOutline {
        x: panel.x,
        y: panel.y,
        w: panel.w,
        h: panel.h,
        thickness: 1,
        color: PANEL_BORDER,
    });
    scene.add_command(DrawCommand::Text {
        x: panel.x + 16,
        y: panel.y + 30,
        text: format!("Class List ({})", session.segments().len()),
        font_size: 20.0,
        color: TEXT,
        align: Align::Left,
    });

    let can_clear = !session.segments().is_empty() && session.state() != SessionState::Spinning;
    add_button(
        scene,
        layout.remove_all,
        "Remove All",
        PANEL,
        if can_clear { DANGER } else { TEXT_DIM },
        14.0,
    );

    let area = layout.text_area;
    scene.add_command(DrawCommand::Rect {
        x: area.x,
        y: area.y,
        w: area.w,
        h: area.h,
        color: BACKGROUND,
        alpha: 0.6,
    });

    // Show the tail of the text; the caret lives at the end.
    let line_height = (config.list_font_size * 1.4) as i32;
    let max_lines = ((area.h - 16) / line_height.max(1)).max(0) as usize;
    let max_chars = ((area.w - 24) as f32 / (config.list_font_size * 0.6)).max(4.0) as usize;
    let editable = session.state() == SessionState::Idle;
    let mut lines: Vec<String> = session.text().split('\n').map(str::to_string).collect();
    if editable {
        if let Some(last) = lines.last_mut() {
            last.push('_');
        }
    }
    let skip = lines.len().saturating_sub(max_lines);
    let text_color = if editable { TEXT_MUTED } else { TEXT_DIM };
    for (row, line) in lines.iter().skip(skip).enumerate() {
        scene.add_command(DrawCommand::Text {
            x: area.x + 12,
            y: area.y + 8 + line_height / 2 + row as i32 * line_height,
            text: display_label(line, max_chars),
            font_size: config.list_font_size,
            color: text_color,
            align: Align::Left,
        });
    }

    scene.add_command(DrawCommand::Text {
        x: panel.x + 16,
        y: panel.y + panel.h - 24,
        text: "Shortcut: Ctrl+Enter to spin".to_string(),
        font_size: 13.0,
        color: TEXT_DIM,
        align: Align::Left,
    });
}

fn add_wheel<S: EntryStore>(
    scene: &mut Scene,
    layout: &Layout,
    session: &Session<S>,
    config: &PickerConfig,
) {
    let (cx, cy, radius) = (layout.wheel_cx, layout.wheel_cy, layout.wheel_radius);
    let segments = session.segments();

    if segments.is_empty() {
        scene.add_command(DrawCommand::Disc {
            cx,
            cy,
            radius,
            color: PANEL,
        });
        scene.add_command(DrawCommand::Ring {
            cx,
            cy,
            radius,
            thickness: 4,
            color: PANEL_BORDER,
        });
        scene.add_command(DrawCommand::Text {
            x: cx,
            y: cy,
            text: "Add names to start!".to_string(),
            font_size: 20.0,
            color: TEXT_MUTED,
            align: Align::Center,
        });
        return;
    }

    let rotation = session.rotation();
    let per_segment = TAU / segments.len() as f64;
    scene.add_command(DrawCommand::Wheel {
        cx,
        cy,
        r: radius,
        rotation,
        colors: segments.iter().map(|s| s.color).collect(),
    });

    if segments.len() > 1 {
        for i in 0..segments.len() {
            let angle = i as f64 * per_segment + rotation;
            scene.add_command(DrawCommand::Line {
                x0: cx,
                y0: cy,
                x1: cx + (angle.cos() * radius as f64).round() as i32,
                y1: cy + (angle.sin() * radius as f64).round() as i32,
                thickness: 2.0,
                color: WHITE,
                alpha: 0.2,
            });
        }
    }

    let font_size = label_font_size(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        scene.add_command(DrawCommand::RadialText {
            cx,
            cy,
            angle: i as f64 * per_segment + rotation + per_segment / 2.0,
            end_radius: radius as f64 - config.label_inset,
            text: display_label(&segment.text, config.label_max_chars),
            font_size,
            color: WHITE,
        });
    }

    // Hub doubles as the spin button.
    scene.add_command(DrawCommand::Disc {
        cx,
        cy,
        radius: layout.hub_radius,
        color: BACKGROUND,
    });
    let enabled = session.can_spin();
    let (fill, ring, text) = if enabled {
        (WHITE, ACCENT, BACKGROUND)
    } else {
        (PANEL, PANEL_BORDER, TEXT_DIM)
    };
    let button_radius = (layout.hub_radius - 6).max(1);
    scene.add_command(DrawCommand::Disc {
        cx,
        cy,
        radius: button_radius,
        color: fill,
    });
    scene.add_command(DrawCommand::Ring {
        cx,
        cy,
        radius: button_radius,
        thickness: 4,
        color: ring,
    });
    let label = if session.state() == SessionState::Spinning {
        "..."
    } else {
        "SPIN"
    };
    scene.add_command(DrawCommand::Text {
        x: cx,
        y: cy,
        text: label.to_string(),
        font_size: 22.0,
        color: text,
        align: Align::Center,
    });

    scene.add_command(DrawCommand::Pointer {
        tip_x: cx + radius - config.pointer_size / 2,
        tip_y: cy,
        size: config.pointer_size,
        color: WHITE,
    });
}

fn add_winner_modal<S: EntryStore>(
    scene: &mut Scene,
    layout: &Layout,
    session: &Session<S>,
    confetti: &Confetti,
    config: &PickerConfig,
) {
    scene.add_command(DrawCommand::Rect {
        x: 0,
        y: 0,
        w: layout.width,
        h: layout.height,
        color: BACKGROUND,
        alpha: 0.9,
    });

    for particle in confetti.particles() {
        let ((x0, y0), (x1, y1)) = particle.stroke();
        scene.add_command(DrawCommand::Line {
            x0: x0.round() as i32,
            y0: y0.round() as i32,
            x1: x1.round() as i32,
            y1: y1.round() as i32,
            thickness: particle.size as f32,
            color: particle.color,
            alpha: 1.0,
        });
    }

    let modal = layout.modal;
    scene.add_command(DrawCommand::Rect {
        x: modal.x,
        y: modal.y,
        w: modal.w,
        h: modal.h,
        color: PANEL,
        alpha: 1.0,
    });
    scene.add_command(DrawCommand::RectOutline {
        x: modal.x,
        y: modal.y,
        w: modal.w,
        h: modal.h,
        thickness: 1,
        color: PANEL_BORDER,
    });

    let winners = session.winners();
    let heading = if winners.len() > 1 {
        "SELECTED STUDENTS"
    } else {
        "SELECTED STUDENT"
    };
    let (mid_x, _) = modal.center();
    scene.add_command(DrawCommand::Text {
        x: mid_x,
        y: modal.y + 40,
        text: heading.to_string(),
        font_size: 16.0,
        color: ACCENT,
        align: Align::Center,
    });

    let names: Vec<&str> = winners.iter().map(|w| w.text.as_str()).collect();
    let name_size = if names.len() > 1 {
        config.winner_font_size * 0.7
    } else {
        config.winner_font_size
    };
    let name_top = modal.y + 70;
    let name_bottom = layout.modal_remove.y - 16;
    let step = (name_bottom - name_top) / names.len().max(1) as i32;
    for (i, name) in names.iter().enumerate() {
        let label = if i + 1 < names.len() {
            format!("{name} &")
        } else {
            name.to_string()
        };
        scene.add_command(DrawCommand::Text {
            x: mid_x,
            y: name_top + step * i as i32 + step / 2,
            text: label,
            font_size: name_size,
            color: WHITE,
            align: Align::Center,
        });
    }

    add_button(
        scene,
        layout.modal_remove,
        "Remove & Spin Again",
        ACCENT,
        WHITE,
        config.button_font_size + 2.0,
    );
    add_button(
        scene,
        layout.modal_keep,
        "Keep in List",
        PANEL_BORDER,
        TEXT,
        config.button_font_size,
    );
}
