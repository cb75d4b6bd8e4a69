use egui::{Color32, FontId, Rounding, Stroke, Visuals};
use factory_timeline::model::TaskStatus;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_ROW_EVEN: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 6);
/// Wash over the lane under the pointer while a task is being dragged.
pub const BG_ROW_HOVER: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 14);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

// Ghost bar while a gesture is in flight.
pub const PREVIEW_FILL: Color32 = Color32::from_rgba_premultiplied(120, 170, 240, 70);
pub const PREVIEW_STROKE: Color32 = Color32::from_rgb(150, 190, 245);
pub const INVALID_FILL: Color32 = Color32::from_rgba_premultiplied(200, 50, 50, 80);
pub const INVALID_STROKE: Color32 = Color32::from_rgb(235, 90, 90);
pub const DONE_OVERLAY: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 70);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const ROW_HEIGHT: f32 = 30.0;
pub const ROW_GAP: f32 = 2.0;
pub const HEADER_HEIGHT: f32 = 44.0;
pub const HANDLE_WIDTH: f32 = 7.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 3.0;
/// Space below the last row of a lane.
pub const LANE_GAP: f32 = 6.0;
/// Strip above the first row holding the factory name.
pub const LANE_LABEL_HEIGHT: f32 = 16.0;
pub const STATUS_BAR_HEIGHT: f32 = 24.0;
pub const SIDE_PANEL_WIDTH: f32 = 280.0;
pub const DIALOG_WIDTH: f32 = 340.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_status() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_lane() -> FontId {
    FontId::proportional(11.0)
}

// ── Status colors ────────────────────────────────────────────────────────────

/// Dot and label color for a workflow status. Finished states are green and
/// teal so gated tasks can be told apart at a glance.
pub fn status_color(status: TaskStatus) -> Color32 {
    match status {
        TaskStatus::Pending => TEXT_SECONDARY,
        TaskStatus::InProgress => ACCENT,
        TaskStatus::Completed => Color32::from_rgb(52, 168, 83),
        TaskStatus::Approved => Color32::from_rgb(0, 188, 212),
        TaskStatus::Rejected => Color32::from_rgb(229, 57, 53),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

const WIDGET_ROUNDING: f32 = 4.0;

fn style_widget(widget: &mut egui::style::WidgetVisuals, fill: Color32, border: Color32, text: Stroke) {
    widget.bg_fill = fill;
    widget.weak_bg_fill = fill;
    widget.bg_stroke = Stroke::new(1.0, border);
    widget.fg_stroke = text;
    widget.rounding = Rounding::same(WIDGET_ROUNDING);
}

/// Dark planning-board look shared by every panel and dialog.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28);
    visuals.faint_bg_color = BG_ROW_EVEN;
    visuals.striped = false;

    let w = &mut visuals.widgets;
    style_widget(&mut w.noninteractive, BG_PANEL, BORDER_SUBTLE, Stroke::new(1.0, TEXT_SECONDARY));
    style_widget(&mut w.inactive, Color32::from_rgb(42, 44, 56), BORDER_SUBTLE, Stroke::new(1.0, TEXT_PRIMARY));
    style_widget(&mut w.hovered, Color32::from_rgb(52, 54, 68), ACCENT, Stroke::new(1.0, TEXT_PRIMARY));
    style_widget(&mut w.active, Color32::from_rgb(60, 62, 76), ACCENT, Stroke::new(2.0, Color32::WHITE));
    style_widget(&mut w.open, Color32::from_rgb(50, 52, 66), ACCENT, Stroke::new(1.0, TEXT_PRIMARY));

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    ctx.set_visuals(visuals);
    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 4.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
    });
}
