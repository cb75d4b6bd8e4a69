use chrono::NaiveDate;
use factory_timeline::io::csv_export::export_csv;
use factory_timeline::io::file::{load_plan, save_plan};
use factory_timeline::model::{
    DateRange, Factory, FactoryType, NewTask, Plan, TaskStatus, TaskStore,
};
use factory_timeline::PlanFileError;
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn two_lane_plan() -> Plan {
    let mut plan = Plan::new("Spring run");
    let press = plan.add_factory(Factory::new("Press Shop", FactoryType::Manufacturing));
    let pack = plan.add_factory(Factory::new("Pack Line", FactoryType::Packaging));

    let mut late = NewTask::new("Stamp panels", press, DateRange::new(d(2025, 4, 10), d(2025, 4, 14)));
    late.task_type = "Stamping".to_string();
    plan.add_task(late);

    let mut early = NewTask::new("Trial run", press, DateRange::new(d(2025, 4, 1), d(2025, 4, 2)));
    early.task_type = "Trial".to_string();
    let early = plan.add_task(early);

    let mut boxes = NewTask::new("Box it", pack, DateRange::new(d(2025, 4, 3), d(2025, 4, 3)));
    boxes.task_type = "Packing".to_string();
    boxes.depends_on.push(early.id);
    plan.add_task(boxes);

    plan.set_status(early.id, TaskStatus::Completed).unwrap();
    plan
}

#[test]
fn plan_survives_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    let plan = two_lane_plan();

    save_plan(&plan, &path).unwrap();
    let loaded = load_plan(&path).unwrap();

    assert_eq!(loaded.name, plan.name);
    assert_eq!(loaded.tasks, plan.tasks);
    assert_eq!(loaded.factories.len(), 2);
    for (a, b) in loaded.factories.iter().zip(&plan.factories) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.factory_type, b.factory_type);
        assert_eq!(a.color, b.color);
    }
}

#[test]
fn load_refreshes_factory_names_on_tasks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("renamed.json");
    let mut plan = two_lane_plan();
    plan.factories[0].name = "Stamping Hall".to_string();

    save_plan(&plan, &path).unwrap();
    let loaded = load_plan(&path).unwrap();

    let press = loaded.factories[0].id;
    assert!(loaded
        .tasks()
        .iter()
        .filter(|t| t.factory_id == press)
        .all(|t| t.factory_name == "Stamping Hall"));
}

#[test]
fn inverted_dates_in_file_are_clamped_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inverted.json");
    let mut plan = two_lane_plan();
    let id = plan.tasks[0].id;
    plan.tasks[0].start = d(2025, 4, 20);
    assert!(plan.tasks[0].start > plan.tasks[0].end);

    save_plan(&plan, &path).unwrap();
    let loaded = load_plan(&path).unwrap();

    let task = loaded.task(id).unwrap();
    assert_eq!((task.start, task.end), (d(2025, 4, 20), d(2025, 4, 20)));
    assert!(loaded.tasks.iter().all(|t| t.start <= t.end));
}

#[test]
fn missing_file_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");

    let err = load_plan(&path).unwrap_err();
    assert!(matches!(&err, PlanFileError::Io { path: p, .. } if *p == path));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn garbage_file_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not a plan").unwrap();

    assert!(matches!(load_plan(&path), Err(PlanFileError::Json(_))));
}

#[test]
fn csv_export_groups_by_lane_then_start() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    let plan = two_lane_plan();

    let written = export_csv(&plan, &path).unwrap();
    assert_eq!(written, 3);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Factory;Task;Type;Start;End;Status",
            "Press Shop;Trial run;Trial;2025-04-01;2025-04-02;Completed",
            "Press Shop;Stamp panels;Stamping;2025-04-10;2025-04-14;Pending",
            "Pack Line;Box it;Packing;2025-04-03;2025-04-03;Pending",
        ]
    );
}

#[test]
fn csv_export_of_empty_plan_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");

    assert_eq!(export_csv(&Plan::new("empty"), &path).unwrap(), 0);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.trim_end(), "Factory;Task;Type;Start;End;Status");
}
