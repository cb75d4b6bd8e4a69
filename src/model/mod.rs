pub mod factory;
pub mod ids;
pub mod plan;
pub mod range;
pub mod task;
pub mod timeline;

pub use factory::{Factory, FactoryType};
pub use ids::{FactoryId, ProjectId, TaskId};
pub use plan::{FactoryRegistry, Plan, TaskStore};
pub use range::DateRange;
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
pub use timeline::{TimelineScale, TimelineViewport};
