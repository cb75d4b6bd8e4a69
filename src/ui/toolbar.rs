use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use factory_timeline::model::TimelineScale;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{} New Plan", icons::FILE)).clicked() {
                app.new_plan();
                ui.close_menu();
            }
            if ui.button(format!("{} Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_plan();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{} Save          Ctrl+S", icons::FLOPPY_DISK)).clicked() {
                app.save_plan();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_plan_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{} Export CSV...", icons::EXPORT)).clicked() {
                app.export_csv();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Plan  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{} Add Task...", icons::PLUS)).clicked() {
                app.open_add_task();
                ui.close_menu();
            }
            let can_delete = app.selected_task.is_some() && app.engine.is_idle();
            if ui
                .add_enabled(can_delete, egui::Button::new(format!("{} Delete Task     Del", icons::TRASH)))
                .clicked()
            {
                if let Some(id) = app.selected_task {
                    app.delete_task(id);
                }
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.viewport.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.viewport.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for (scale, label) in [
                (TimelineScale::Days, "Days"),
                (TimelineScale::Weeks, "Weeks"),
                (TimelineScale::Months, "Months"),
            ] {
                if ui.radio_value(&mut app.viewport.scale, scale, label).clicked() {
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Remember Zoom").clicked() {
                app.save_settings();
                ui.close_menu();
            }
            if ui.button("  Open Settings Folder").clicked() {
                if let Some(dir) = factory_timeline::Settings::default_path()
                    .as_deref()
                    .and_then(std::path::Path::parent)
                {
                    if let Err(e) = open::that(dir) {
                        tracing::warn!(error = %e, "could not open settings folder");
                    }
                }
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned plan name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.plan.name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
