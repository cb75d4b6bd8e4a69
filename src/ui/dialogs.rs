use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Render the "Add Task" dialog. The requested start is only a wish: the
/// task lands on the first free range in the chosen factory.
pub fn show_add_task_dialog(app: &mut PlannerApp, ctx: &Context) {
    let mut should_close = false;
    let mut should_create = false;
    Window::new(RichText::new("Add Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("add_task_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut app.draft.title)
                            .hint_text("Task title..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut app.draft.task_type)
                            .hint_text("Moulding, Packing..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Factory").color(theme::TEXT_SECONDARY));
                    let current = app
                        .draft
                        .factory_id
                        .and_then(|id| app.plan.factories.iter().find(|f| f.id == id))
                        .map_or_else(|| "Select...".to_string(), |f| f.name.clone());
                    egui::ComboBox::from_id_salt("dlg_factory")
                        .selected_text(current)
                        .width(220.0)
                        .show_ui(ui, |ui| {
                            for factory in &app.plan.factories {
                                ui.selectable_value(
                                    &mut app.draft.factory_id,
                                    Some(factory.id),
                                    format!("{} ({})", factory.name, factory.factory_type.label()),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(
                        egui_extras::DatePickerButton::new(&mut app.draft.start)
                            .id_salt("dlg_dp_start"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Duration").color(theme::TEXT_SECONDARY));
                    ui.add(
                        egui::DragValue::new(&mut app.draft.duration_days)
                            .range(0..=365)
                            .suffix(" days"),
                    );
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui
                    .add_enabled(app.draft.factory_id.is_some(), create_btn)
                    .clicked()
                {
                    should_create = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_create {
        app.create_task_from_dialog();
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_add_task = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PlannerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH * 0.8, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Factory Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Plan factory work on a Gantt timeline.");
                ui.label("Drag bars between lanes of the same type,");
                ui.label("drag edges to resize, Escape to cancel.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
