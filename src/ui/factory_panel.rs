use std::time::Instant;

use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;
use factory_timeline::engine::{FactorySelection, InteractionEngine};
use factory_timeline::model::{FactoryId, Plan};

/// Actions that the factory panel can request.
pub enum FactoryPanelAction {
    None,
    AddTask,
}

/// Render the factory list. Pressing a checkbox and dragging over other rows
/// selects (or deselects) every row passed over; the ticked factories filter
/// the lanes on the timeline.
pub fn show_factory_panel(
    plan: &Plan,
    selection: &mut FactorySelection,
    engine: &mut InteractionEngine,
    now: Instant,
    ui: &mut Ui,
) -> FactoryPanelAction {
    let mut action = FactoryPanelAction::None;

    // Header area
    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Factories")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        let shown = if selection.is_empty() {
            "all shown".to_string()
        } else {
            format!("{} of {}", selection.len(), plan.factories.len())
        };
        ui.label(RichText::new(shown).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(
        RichText::new(format!("{}  Add Task", icons::PLUS))
            .color(Color32::WHITE)
            .size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = FactoryPanelAction::AddTask;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    let (pointer, pressed, down) = ui.input(|i| {
        (
            i.pointer.interact_pos(),
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
        )
    });
    let mut hovered_row: Option<FactoryId> = None;

    for (i, factory) in plan.factories.iter().enumerate() {
        let is_selected = selection.contains(factory.id);
        let row_bg = if is_selected {
            theme::BG_SELECTED
        } else if i % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_DARK
        };

        let frame = egui::Frame {
            fill: row_bg,
            rounding: egui::Rounding::same(4.0),
            inner_margin: egui::Margin::symmetric(6.0, 4.0),
            outer_margin: egui::Margin::ZERO,
            stroke: egui::Stroke::NONE,
            shadow: egui::epaint::Shadow::NONE,
        };

        let frame_resp = frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;
                let check = if is_selected {
                    icons::CHECK_SQUARE
                } else {
                    icons::SQUARE
                };
                ui.label(RichText::new(check).size(14.0).color(theme::TEXT_SECONDARY));

                let (dot_rect, _) =
                    ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                ui.painter().circle_filled(dot_rect.center(), 3.0, factory.color);

                ui.add(
                    egui::Label::new(
                        RichText::new(&factory.name)
                            .size(12.0)
                            .color(theme::TEXT_PRIMARY),
                    )
                    .truncate(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let count = plan.tasks_in(factory.id).count();
                    ui.label(
                        RichText::new(format!("{count}"))
                            .size(10.0)
                            .color(theme::TEXT_DIM),
                    );
                    ui.label(
                        RichText::new(factory.factory_type.label())
                            .size(10.0)
                            .color(theme::TEXT_SECONDARY),
                    );
                });
            });
        });

        if pointer.is_some_and(|p| frame_resp.response.rect.contains(p)) {
            hovered_row = Some(factory.id);
        }
        ui.add_space(1.0);
    }

    if let Some(row) = hovered_row {
        if pressed && engine.is_idle() {
            engine.start_select(row, selection, now);
        } else if down && engine.is_selecting() {
            engine.update_select(row, selection, now);
        }
    }
    if engine.is_selecting() && !down {
        engine.end_select();
    }

    if !selection.is_empty() {
        ui.add_space(4.0);
        if ui
            .add(egui::Button::new(RichText::new("Show all").size(11.0)).frame(false))
            .clicked()
        {
            selection.clear();
        }
    }

    action
}
