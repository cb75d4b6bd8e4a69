//! Factory work planning on a Gantt timeline.
//!
//! [`model`] holds plans, factories and tasks; [`engine`] packs lanes into
//! rows, searches for free slots and runs the drag / resize / select state
//! machine. [`config`] and [`io`] cover settings and plan files. The desktop
//! host lives in the binary.

pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod model;

pub use config::{ConfigError, EngineConfig, Settings};
pub use error::{EngineError, ErrorKind};
pub use io::PlanFileError;
