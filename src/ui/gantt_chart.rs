use std::time::Instant;

use crate::ui::theme;
use chrono::{Datelike, NaiveDate};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use factory_timeline::engine::{
    layout_lanes, FactorySelection, InteractionEngine, Outcome, Preview, ResizeEdge,
};
use factory_timeline::model::{
    Factory, FactoryId, Plan, Task, TaskId, TaskStore, TimelineScale, TimelineViewport,
};

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

/// Result details from interactions in the chart.
#[derive(Debug, Default)]
pub struct ChartInteraction {
    /// Set on the frame a drag or resize was released.
    pub outcome: Option<Outcome>,
}

/// One factory band, positioned relative to the chart origin.
struct Lane {
    factory_id: FactoryId,
    name: String,
    kind: &'static str,
    color: Color32,
    top: f32,
    rows: usize,
}

impl Lane {
    fn height(&self) -> f32 {
        theme::LANE_LABEL_HEIGHT + self.rows as f32 * (ROW_HEIGHT + ROW_PADDING) + theme::LANE_GAP
    }

    fn row_y(&self, row: usize) -> f32 {
        self.top + theme::LANE_LABEL_HEIGHT + row as f32 * (ROW_HEIGHT + ROW_PADDING)
    }

    fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.top + self.height()
    }
}

enum GestureStart {
    Drag(TaskId, f32),
    Resize(TaskId, ResizeEdge),
}

/// Render the factory lanes (central panel) and route pointer gestures
/// through the interaction engine.
pub fn show_gantt_chart(
    plan: &mut Plan,
    viewport: &mut TimelineViewport,
    engine: &mut InteractionEngine,
    selection: &FactorySelection,
    selected_task: &mut Option<TaskId>,
    max_rows: usize,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let now = Instant::now();

    // Handle zoom with scroll wheel
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            viewport.zoom_in();
        } else if scroll_delta.y < 0.0 {
            viewport.zoom_out();
        }
    }

    // An empty selection shows every lane.
    let visible: Vec<Factory> = plan
        .factories
        .iter()
        .filter(|f| selection.is_empty() || selection.contains(f.id))
        .cloned()
        .collect();
    let layout = layout_lanes(&visible, &plan.tasks, max_rows);

    let mut lanes = Vec::with_capacity(visible.len());
    let mut top = HEADER_HEIGHT;
    for factory in &visible {
        let lane = Lane {
            factory_id: factory.id,
            name: factory.name.clone(),
            kind: factory.factory_type.label(),
            color: factory.color,
            top,
            rows: layout.row_count(factory.id),
        };
        top += lane.height();
        lanes.push(lane);
    }

    let available = ui.available_size();
    let chart_width = viewport.total_width().max(available.x);
    let chart_height = top + 40.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let canvas_height = response.rect.height();
            let suppress_click = engine.should_suppress_click(now);
            let mut consumed_click = false;
            let mut gesture_start = None;

            let pointer = ui.input(|i| i.pointer.interact_pos());
            let hovered_factory = pointer.and_then(|p| {
                lanes
                    .iter()
                    .find(|lane| lane.contains_y(p.y - origin.y))
                    .map(|lane| lane.factory_id)
            });

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            for (i, lane) in lanes.iter().enumerate() {
                let drop_target = engine.is_dragging() && hovered_factory == Some(lane.factory_id);
                draw_lane(&painter, origin, lane, chart_width, i, drop_target);
            }

            draw_timeline_header(&painter, origin, viewport, chart_width, canvas_height);
            draw_today_line(&painter, origin, viewport, canvas_height);

            let active_task = engine.active_task_id();

            for lane in &lanes {
                for task in plan.tasks_in(lane.factory_id) {
                    let y = origin.y + lane.row_y(layout.row_of(task)) + ROW_PADDING;
                    let is_selected = *selected_task == Some(task.id);
                    let is_active = active_task == Some(task.id);
                    let bar_rect = draw_task_bar(
                        &painter,
                        origin,
                        viewport,
                        task,
                        lane.color,
                        y,
                        is_selected,
                        is_active,
                    );

                    let bar_response = ui.interact(
                        bar_rect,
                        ui.make_persistent_id(("task-bar", task.id)),
                        Sense::click_and_drag(),
                    );
                    let left_handle_rect = Rect::from_min_max(
                        Pos2::new(bar_rect.left() - HANDLE_WIDTH * 0.5, bar_rect.top()),
                        Pos2::new(bar_rect.left() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
                    );
                    let right_handle_rect = Rect::from_min_max(
                        Pos2::new(bar_rect.right() - HANDLE_WIDTH * 0.5, bar_rect.top()),
                        Pos2::new(bar_rect.right() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
                    );
                    let left_response = ui.interact(
                        left_handle_rect.expand(4.0),
                        ui.make_persistent_id(("task-resize-left", task.id)),
                        Sense::drag(),
                    );
                    let right_response = ui.interact(
                        right_handle_rect.expand(4.0),
                        ui.make_persistent_id(("task-resize-right", task.id)),
                        Sense::drag(),
                    );

                    if bar_response.clicked() && !suppress_click {
                        *selected_task = Some(task.id);
                        consumed_click = true;
                    }

                    if left_response.drag_started() {
                        gesture_start = Some(GestureStart::Resize(task.id, ResizeEdge::Start));
                    } else if right_response.drag_started() {
                        gesture_start = Some(GestureStart::Resize(task.id, ResizeEdge::End));
                    } else if bar_response.drag_started() {
                        let press_x = ui
                            .input(|i| i.pointer.press_origin())
                            .or_else(|| bar_response.interact_pointer_pos())
                            .map_or(bar_rect.left(), |p| p.x);
                        gesture_start = Some(GestureStart::Drag(task.id, press_x - origin.x));
                    }

                    // Handle affordances
                    let on_handle = left_response.hovered() || right_response.hovered();
                    if is_selected || on_handle {
                        if on_handle {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                        }
                        let handle_h = bar_rect.height() * 0.55;
                        let handle_y = bar_rect.center().y - handle_h / 2.0;
                        let lh = Rect::from_min_size(
                            Pos2::new(bar_rect.left() - 1.5, handle_y),
                            Vec2::new(4.0, handle_h),
                        );
                        let rh = Rect::from_min_size(
                            Pos2::new(bar_rect.right() - 2.5, handle_y),
                            Vec2::new(4.0, handle_h),
                        );
                        painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
                        painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
                    } else if bar_response.hovered() && engine.is_idle() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }

                    // Tooltip on hover
                    if engine.is_idle() && (bar_response.hovered() || on_handle) {
                        egui::show_tooltip_at_pointer(
                            ui.ctx(),
                            ui.layer_id(),
                            egui::Id::new(("task-tip", task.id)),
                            |ui| {
                                ui.strong(&task.title);
                                ui.label(format!("{} · {}", task.factory_name, lane.kind));
                                ui.label(format!(
                                    "{} → {}",
                                    task.start.format("%d/%m/%Y"),
                                    task.end.format("%d/%m/%Y"),
                                ));
                                ui.label(
                                    egui::RichText::new(task.status.label())
                                        .color(theme::status_color(task.status)),
                                );
                            },
                        );
                    }
                }
            }

            match gesture_start {
                Some(GestureStart::Drag(id, x)) => {
                    *selected_task = Some(id);
                    engine.start_drag(id, x, &*plan, now);
                }
                Some(GestureStart::Resize(id, edge)) => {
                    *selected_task = Some(id);
                    engine.start_resize(id, edge, &*plan, now);
                }
                None => {}
            }

            let (released, down) =
                ui.input(|i| (i.pointer.primary_released(), i.pointer.primary_down()));
            if let Some(p) = pointer {
                let x = p.x - origin.x;
                if engine.is_dragging() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    if released {
                        interaction.outcome =
                            Some(engine.end_drag(x, hovered_factory, &mut *plan, viewport, now));
                    } else {
                        engine.update_drag(x, hovered_factory, &*plan, viewport, now);
                    }
                } else if engine.is_resizing() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                    if released {
                        interaction.outcome = Some(engine.end_resize(&mut *plan, now));
                    } else {
                        engine.update_resize(x, &*plan, viewport, now);
                    }
                }
            }
            // The button went up somewhere we never saw.
            if (engine.is_dragging() || engine.is_resizing()) && !down && !released {
                engine.cancel();
            }

            if let Some(preview) = engine.preview() {
                if let Some(lane) = lanes.iter().find(|l| l.factory_id == preview.factory_id) {
                    let row = plan
                        .task(preview.task_id)
                        .filter(|t| t.factory_id == preview.factory_id)
                        .map_or(0, |t| layout.row_of(t));
                    let y = origin.y + lane.row_y(row) + ROW_PADDING;
                    draw_preview(&painter, origin, viewport, preview, y);
                }
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new("preview-tip"),
                    |ui| {
                        let color = if preview.compatible {
                            theme::TEXT_PRIMARY
                        } else {
                            theme::INVALID_STROKE
                        };
                        ui.label(egui::RichText::new(&preview.tooltip).color(color));
                    },
                );
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click && !suppress_click {
                *selected_task = None;
            }
        });

    interaction
}

fn draw_lane(
    painter: &egui::Painter,
    origin: Pos2,
    lane: &Lane,
    width: f32,
    index: usize,
    drop_target: bool,
) {
    let rect = Rect::from_min_size(
        Pos2::new(origin.x, origin.y + lane.top),
        Vec2::new(width, lane.height()),
    );
    let fill = if index % 2 == 0 {
        theme::BG_PANEL
    } else {
        theme::BG_DARK
    };
    painter.rect_filled(rect, 0.0, fill);
    if drop_target {
        painter.rect_filled(rect, 0.0, theme::BG_ROW_HOVER);
    }

    // Accent stripe + name
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(3.0, rect.height())),
        0.0,
        lane.color,
    );
    painter.text(
        Pos2::new(rect.left() + 8.0, rect.top() + theme::LANE_LABEL_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        format!("{}  ·  {}", lane.name, lane.kind),
        theme::font_lane(),
        theme::TEXT_SECONDARY,
    );

    painter.line_segment(
        [
            Pos2::new(rect.left(), rect.bottom()),
            Pos2::new(rect.right(), rect.bottom()),
        ],
        Stroke::new(0.5, theme::BORDER_SUBTLE),
    );
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let grid_line = |x: f32| {
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    };

    let mut date = viewport.start;
    let end = viewport.end;

    match viewport.scale {
        TimelineScale::Days => {
            for &date in viewport.calendar_days() {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                if viewport.pixels_per_day >= 20.0 {
                    let is_weekend = date.weekday().num_days_from_monday() >= 5;
                    let day_color = if is_weekend {
                        theme::TEXT_DIM
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 28.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%d").to_string(),
                        theme::font_sub(),
                        day_color,
                    );
                }

                if date.day() == 1 || date == viewport.start {
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 12.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }
            }
        }
        TimelineScale::Weeks => {
            let weekday = date.weekday().num_days_from_monday();
            date -= chrono::Duration::days(i64::from(weekday));

            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );

                if date.day() <= 7 {
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 12.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }

                date += chrono::Duration::days(7);
            }
        }
        TimelineScale::Months => {
            date = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);

            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid_line(x);

                painter.text(
                    Pos2::new(x + 5.0, origin.y + 18.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("%b %Y").to_string(),
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );

                date = date
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap_or(end + chrono::Duration::days(1));
            }
        }
    }
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, viewport: &TimelineViewport, height: f32) {
    let today = chrono::Local::now().date_naive();
    if today < viewport.start || today > viewport.end {
        return;
    }
    let x = origin.x + viewport.date_to_x(today) + viewport.pixels_per_day / 2.0;

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

/// Screen rect covering `start..=end` on a row whose top is `y`.
fn span_rect(origin: Pos2, viewport: &TimelineViewport, start: NaiveDate, end: NaiveDate, y: f32) -> Rect {
    let x_start = origin.x + viewport.date_to_x(start);
    let x_end = origin.x + viewport.date_to_x(end) + viewport.pixels_per_day;
    let inset = theme::BAR_INSET;
    Rect::from_min_size(
        Pos2::new(x_start, y + inset),
        Vec2::new((x_end - x_start).max(6.0), ROW_HEIGHT - inset * 2.0),
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_task_bar(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    task: &Task,
    color: Color32,
    y: f32,
    is_selected: bool,
    is_active: bool,
) -> Rect {
    let bar_rect = span_rect(origin, viewport, task.start, task.end, y);
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    // The bar being moved stays in place, dimmed, under its preview.
    let fill = if is_active { color.gamma_multiply(0.45) } else { color };

    let shadow_rect = bar_rect.translate(Vec2::new(1.0, 2.0));
    painter.rect_filled(shadow_rect, rounding, Color32::from_black_alpha(35));

    painter.rect_filled(bar_rect, rounding, fill);
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if task.status.is_done() {
        painter.rect_filled(bar_rect, rounding, theme::DONE_OVERLAY);
    }

    // Status dot
    painter.circle_filled(
        Pos2::new(bar_rect.right() - 7.0, bar_rect.center().y),
        3.0,
        theme::status_color(task.status),
    );

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Title on bar (single line, clipped to bar bounds)
    if bar_rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(task.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect.shrink2(Vec2::new(12.0, 0.0)));
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

/// Ghost bar for the in-flight gesture, tinted red when a drop would be
/// refused or shifted.
fn draw_preview(painter: &egui::Painter, origin: Pos2, viewport: &TimelineViewport, preview: &Preview, y: f32) {
    let rect = span_rect(origin, viewport, preview.range.start, preview.range.end, y);
    let (fill, stroke) = if preview.is_valid() {
        (theme::PREVIEW_FILL, theme::PREVIEW_STROKE)
    } else {
        (theme::INVALID_FILL, theme::INVALID_STROKE)
    };
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    painter.rect_filled(rect, rounding, fill);
    painter.rect_stroke(rect, rounding, Stroke::new(1.5, stroke));
}
