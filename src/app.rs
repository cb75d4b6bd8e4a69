use std::path::PathBuf;
use std::time::Instant;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use factory_timeline::engine::{
    schedule_new_task, FactorySelection, InteractionEngine, Outcome,
};
use factory_timeline::io::{csv_export, file};
use factory_timeline::model::{
    DateRange, Factory, FactoryId, FactoryType, NewTask, Plan, TaskId, TaskStatus, TaskStore,
    TimelineViewport,
};
use factory_timeline::{EngineError, Settings};

use crate::ui;

/// Fields of the "Add Task" dialog.
pub struct TaskDraft {
    pub title: String,
    pub task_type: String,
    pub factory_id: Option<FactoryId>,
    pub start: NaiveDate,
    pub duration_days: i64,
}

impl TaskDraft {
    fn new(factory_id: Option<FactoryId>) -> Self {
        Self {
            title: String::new(),
            task_type: String::new(),
            factory_id,
            start: chrono::Local::now().date_naive(),
            duration_days: 3,
        }
    }
}

/// Main application state.
pub struct PlannerApp {
    pub plan: Plan,
    pub viewport: TimelineViewport,
    pub settings: Settings,
    pub engine: InteractionEngine,
    pub selection: FactorySelection,
    pub file_path: Option<PathBuf>,
    pub selected_task: Option<TaskId>,

    // Dialog state
    pub show_add_task: bool,
    pub show_about: bool,
    pub draft: TaskDraft,

    pub status_message: String,
}

impl PlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut settings: Settings) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let plan = Self::sample_plan();
        let (start, end) = Self::visible_range(&plan);
        let first_factory = plan.factories.first().map(|f| f.id);
        let viewport = TimelineViewport::new(start, end, settings.pixels_per_day);
        if viewport.pixels_per_day != settings.pixels_per_day {
            warn!(
                requested = settings.pixels_per_day,
                used = viewport.pixels_per_day,
                "pixels_per_day outside zoom bounds"
            );
            settings.pixels_per_day = viewport.pixels_per_day;
        }

        Self {
            viewport,
            engine: InteractionEngine::new(settings.engine),
            settings,
            plan,
            selection: FactorySelection::default(),
            file_path: None,
            selected_task: None,
            show_add_task: false,
            show_about: false,
            draft: TaskDraft::new(first_factory),
            status_message: "Ready".to_string(),
        }
    }

    /// A small demonstration plan: two moulding plants, a container yard and
    /// a packing line, with a prerequisite chain.
    fn sample_plan() -> Plan {
        let today = chrono::Local::now().date_naive();
        let mut plan = Plan::new("Sample Plan");

        let north = plan.add_factory(Factory::new("North Plant", FactoryType::Manufacturing));
        let south = plan.add_factory(Factory::new("South Plant", FactoryType::Manufacturing));
        let yard = plan.add_factory(Factory::new("Harbour Yard", FactoryType::Container));
        let packing = plan.add_factory(Factory::new("Packing Line", FactoryType::Packaging));

        let mut add = |title: &str, task_type: &str, factory: FactoryId, from: i64, days: i64| {
            let mut new_task = NewTask::new(
                title,
                factory,
                DateRange::with_duration(today + Duration::days(from), days),
            );
            new_task.task_type = task_type.to_string();
            plan.add_task(new_task).id
        };

        let tooling = add("Tooling setup", "Setup", north, -4, 3);
        let housings = add("Moulded housings", "Moulding", north, 0, 8);
        add("Gaskets", "Moulding", north, 3, 5);
        add("Brackets", "Machining", south, 1, 6);
        add("Container stuffing", "Logistics", yard, 10, 2);
        let boxing = add("Retail boxing", "Packing", packing, 9, 4);

        for task in &mut plan.tasks {
            if task.id == housings {
                task.depends_on.push(tooling);
                task.status = TaskStatus::InProgress;
            } else if task.id == boxing {
                task.depends_on.push(housings);
            } else if task.id == tooling {
                task.status = TaskStatus::Completed;
            }
        }
        plan
    }

    fn visible_range(plan: &Plan) -> (NaiveDate, NaiveDate) {
        let today = chrono::Local::now().date_naive();
        let start = plan.tasks.iter().map(|t| t.start).min().unwrap_or(today) - Duration::days(7);
        let end = plan.tasks.iter().map(|t| t.end).max().unwrap_or(today) + Duration::days(30);
        (start, end)
    }

    // --- File operations ---

    pub fn new_plan(&mut self) {
        self.engine.cancel();
        self.plan = Plan::default();
        self.file_path = None;
        self.selected_task = None;
        self.selection.clear();
        self.status_message = "New plan created".to_string();
    }

    pub fn open_plan(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Factory Plan", &["plan.json", "json"])
            .pick_file()
        {
            match file::load_plan(&path) {
                Ok(plan) => {
                    self.engine.cancel();
                    self.plan = plan;
                    self.file_path = Some(path);
                    self.selected_task = None;
                    self.selection.retain_known(&self.plan.factories);
                    self.recalculate_viewport();
                    self.status_message = "Plan loaded".to_string();
                }
                Err(e) => {
                    warn!(error = %e, "failed to open plan");
                    self.status_message = format!("Error loading: {e}");
                }
            }
        }
    }

    pub fn save_plan(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_plan(path);
        } else {
            self.save_plan_as();
        }
    }

    pub fn save_plan_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Factory Plan", &["plan.json", "json"])
            .set_file_name(format!("{}.plan.json", self.plan.name))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.write_plan(path);
        }
    }

    fn write_plan(&mut self, path: PathBuf) {
        self.plan.touch();
        match file::save_plan(&self.plan, &path) {
            Ok(()) => self.status_message = "Plan saved".to_string(),
            Err(e) => {
                warn!(error = %e, "failed to save plan");
                self.status_message = format!("Error saving: {e}");
            }
        }
    }

    pub fn export_csv(&mut self) {
        if self.plan.tasks.is_empty() {
            self.status_message = "Nothing to export, the plan has no tasks".to_string();
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", self.plan.name))
            .save_file()
        {
            match csv_export::export_csv(&self.plan, &path) {
                Ok(count) => self.status_message = format!("Exported {count} tasks to CSV"),
                Err(e) => {
                    warn!(error = %e, "CSV export failed");
                    self.status_message = format!("CSV export failed: {e}");
                }
            }
        }
    }

    /// Persist the current zoom so the next session opens at the same scale.
    pub fn save_settings(&mut self) {
        self.settings.pixels_per_day = self.viewport.pixels_per_day;
        match self.settings.save() {
            Ok(path) => {
                info!(path = %path.display(), "settings saved");
                self.status_message = "Settings saved".to_string();
            }
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                self.status_message = format!("Could not save settings: {e}");
            }
        }
    }

    // --- Task operations ---

    pub fn open_add_task(&mut self) {
        let factory = self
            .draft
            .factory_id
            .filter(|id| self.plan.factories.iter().any(|f| f.id == *id))
            .or_else(|| self.plan.factories.first().map(|f| f.id));
        self.draft = TaskDraft::new(factory);
        self.show_add_task = true;
    }

    /// Create the drafted task at the first free slot at or after the
    /// requested start.
    pub fn create_task_from_dialog(&mut self) {
        let Some(factory_id) = self.draft.factory_id else {
            self.status_message = "Pick a factory first".to_string();
            return;
        };
        let title = if self.draft.title.trim().is_empty() {
            "New Task".to_string()
        } else {
            self.draft.title.trim().to_string()
        };

        let desired = self.draft.start;
        let mut new_task = NewTask::new(
            title,
            factory_id,
            DateRange::with_duration(desired, self.draft.duration_days),
        );
        new_task.task_type = self.draft.task_type.trim().to_string();

        let (task, slot) = schedule_new_task(
            &mut self.plan,
            new_task,
            self.settings.engine.slot_search_horizon,
        );
        info!(task_id = %task.id, %factory_id, start = %task.start, end = %task.end, "task created");

        self.selected_task = Some(task.id);
        self.status_message = match slot.warning() {
            Some(warning) => warning.to_string(),
            None if slot.was_displaced(desired) => format!(
                "'{}' moved to {} to avoid overlapping work",
                task.title,
                task.start.format("%Y-%m-%d")
            ),
            None => format!("Added '{}'", task.title),
        };
        self.show_add_task = false;
    }

    pub fn delete_task(&mut self, id: TaskId) {
        if let Some(task) = self.plan.delete_task(id) {
            if self.selected_task == Some(id) {
                self.selected_task = None;
            }
            self.status_message = format!("Deleted '{}'", task.title);
        }
    }

    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) {
        match self.plan.set_status(id, status) {
            Ok(()) => self.status_message = format!("Status set to {}", status.label()),
            Err(e) => self.report(&e),
        }
    }

    /// Turn the result of a finished gesture into a status line.
    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Committed { task, notice } => {
                self.selected_task = Some(task.id);
                self.status_message = match notice {
                    Some(notice) => notice.to_string(),
                    None => format!(
                        "Updated '{}' in {} ({} → {})",
                        task.title,
                        task.factory_name,
                        task.start.format("%Y-%m-%d"),
                        task.end.format("%Y-%m-%d")
                    ),
                };
            }
            Outcome::Rejected(e) => self.report(&e),
            Outcome::Discarded => {}
        }
    }

    fn report(&mut self, error: &EngineError) {
        if error.is_user_facing() {
            self.status_message = error.to_string();
        }
    }

    fn recalculate_viewport(&mut self) {
        let (start, end) = Self::visible_range(&self.plan);
        self.viewport.set_range(start, end);
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        let now = Instant::now();

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let typing = ctx.wants_keyboard_input();
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        let should_cancel = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let should_delete = !typing && ctx.input(|i| i.key_pressed(egui::Key::Delete));
        if should_save {
            self.save_plan();
        }
        if should_cancel && self.engine.cancel() {
            self.status_message = "Gesture cancelled".to_string();
        }
        if should_delete && self.engine.is_idle() {
            if let Some(id) = self.selected_task {
                self.delete_task(id);
            }
        }

        if self.engine.expire_stale(now) {
            self.status_message = "Gesture timed out".to_string();
        }
        if !self.engine.is_idle() {
            ctx.request_repaint_after(self.engine.config().stuck_timeout());
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.plan.tasks.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!(
                                "Zoom: {:.0}%",
                                self.viewport.pixels_per_day / self.settings.pixels_per_day * 100.0
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: factory list + inspector
        let mut panel_action = ui::factory_panel::FactoryPanelAction::None;
        let mut inspector_action = ui::task_inspector::InspectorAction::None;
        egui::SidePanel::left("factory_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(ui::theme::SIDE_PANEL_WIDTH * 0.75)
            .max_width(ui::theme::SIDE_PANEL_WIDTH * 2.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                panel_action = ui::factory_panel::show_factory_panel(
                    &self.plan,
                    &mut self.selection,
                    &mut self.engine,
                    now,
                    ui,
                );

                if let Some(sel_id) = self.selected_task {
                    ui.add_space(4.0);
                    ui.separator();
                    let snapshot = self.plan.tasks.clone();
                    if let Some(task) = self.plan.tasks.iter_mut().find(|t| t.id == sel_id) {
                        inspector_action =
                            ui::task_inspector::show_task_inspector(task, &snapshot, ui);
                    }
                }
            });

        match panel_action {
            ui::factory_panel::FactoryPanelAction::AddTask => self.open_add_task(),
            ui::factory_panel::FactoryPanelAction::None => {}
        }
        match inspector_action {
            ui::task_inspector::InspectorAction::Renamed => self.plan.touch(),
            ui::task_inspector::InspectorAction::SetStatus(id, status) => self.set_status(id, status),
            ui::task_inspector::InspectorAction::Delete(id) => self.delete_task(id),
            ui::task_inspector::InspectorAction::None => {}
        }

        // Central panel: factory lanes
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let mut outcome = None;
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            outcome = ui::gantt_chart::show_gantt_chart(
                &mut self.plan,
                &mut self.viewport,
                &mut self.engine,
                &self.selection,
                &mut self.selected_task,
                self.settings.engine.max_rows,
                ui,
            )
            .outcome;
        });
        if let Some(outcome) = outcome {
            self.apply_outcome(outcome);
        }

        // Dialogs
        if self.show_add_task {
            ui::dialogs::show_add_task_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
