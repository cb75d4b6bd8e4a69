pub mod dialogs;
pub mod factory_panel;
pub mod gantt_chart;
pub mod task_inspector;
pub mod theme;
pub mod toolbar;
