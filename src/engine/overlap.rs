use crate::model::Task;

/// Whether two tasks in the same factory intersect in time.
///
/// Tasks in different factories never overlap, and a task never overlaps
/// itself. Date ranges are closed, so a task ending on the day another one
/// starts does overlap it.
pub fn overlaps(a: &Task, b: &Task) -> bool {
    if a.factory_id != b.factory_id || a.id == b.id {
        return false;
    }
    a.range().overlaps(&b.range())
}
