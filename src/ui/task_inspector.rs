use crate::ui::theme;
use egui::{RichText, Ui};
use egui_phosphor::regular as icons;
use factory_timeline::engine::gating;
use factory_timeline::model::{Task, TaskId, TaskStatus};

/// Actions the inspector can request.
pub enum InspectorAction {
    None,
    Renamed,
    SetStatus(TaskId, TaskStatus),
    Delete(TaskId),
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Render the inspector for the selected task. Dates and lane are changed on
/// the timeline; status changes go through completion gating in the app.
pub fn show_task_inspector(task: &mut Task, all_tasks: &[Task], ui: &mut Ui) -> InspectorAction {
    let mut action = InspectorAction::None;

    ui.add_space(6.0);
    ui.label(
        RichText::new("Task")
            .strong()
            .size(13.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        field_label(ui, "Title");
        let title_edit = ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut task.title)
                .font(egui::FontId::proportional(12.0)),
        );
        if title_edit.changed() {
            action = InspectorAction::Renamed;
        }

        field_label(ui, "Factory");
        ui.label(RichText::new(&task.factory_name).size(12.0));
        if !task.task_type.is_empty() {
            ui.label(RichText::new(&task.task_type).size(11.0).color(theme::TEXT_SECONDARY));
        }

        field_label(ui, "Dates");
        ui.label(
            RichText::new(format!(
                "{} → {}  ({} days)",
                task.start.format("%d/%m/%Y"),
                task.end.format("%d/%m/%Y"),
                task.duration_days() + 1,
            ))
            .size(12.0),
        );

        // ── Status ───────────────────────────────────────────────────
        field_label(ui, "Status");
        let blocking = gating::blocking_tasks(task, all_tasks);
        let mut chosen = task.status;
        egui::ComboBox::from_id_salt("status_combo")
            .selected_text(
                RichText::new(task.status.label())
                    .size(11.0)
                    .color(theme::status_color(task.status)),
            )
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for status in TaskStatus::ALL {
                    let gated = !blocking.is_empty()
                        && !matches!(status, TaskStatus::Pending | TaskStatus::Rejected);
                    let label = if gated {
                        format!("{} {}", icons::LOCK, status.label())
                    } else {
                        status.label().to_string()
                    };
                    ui.selectable_value(&mut chosen, status, label);
                }
            });
        if chosen != task.status {
            action = InspectorAction::SetStatus(task.id, chosen);
        }

        // ── Prerequisites ────────────────────────────────────────────
        if !task.depends_on.is_empty() {
            field_label(ui, "Waits on");
            for dep in task
                .depends_on
                .iter()
                .filter_map(|id| all_tasks.iter().find(|t| t.id == *id))
            {
                let (icon, color) = if dep.status.is_done() {
                    (icons::CHECK_CIRCLE, theme::status_color(dep.status))
                } else {
                    (icons::HOURGLASS, theme::TEXT_DIM)
                };
                ui.label(
                    RichText::new(format!("{icon} {} ({})", dep.title, dep.factory_name))
                        .size(11.0)
                        .color(color),
                );
            }
        }

        ui.add_space(4.0);
        if ui
            .button(RichText::new(format!("{} Delete task", icons::TRASH)).size(11.0))
            .clicked()
        {
            action = InspectorAction::Delete(task.id);
        }
    });

    action
}
