//! Factory compatibility: a task may only move between factories of the same
//! type. Lookups are by id; a factory the registry does not know about never
//! blocks a move.

use crate::error::EngineError;
use crate::model::{Factory, FactoryId};

fn lookup(factories: &[Factory], id: FactoryId) -> Option<&Factory> {
    factories.iter().find(|f| f.id == id)
}

pub fn is_compatible(source: FactoryId, target: FactoryId, factories: &[Factory]) -> bool {
    match (lookup(factories, source), lookup(factories, target)) {
        (Some(from), Some(to)) => from.factory_type == to.factory_type,
        _ => true,
    }
}

/// Human-readable reason a move is refused, or `None` when it is allowed.
pub fn explain_incompatibility(
    source: FactoryId,
    target: FactoryId,
    factories: &[Factory],
) -> Option<String> {
    let from = lookup(factories, source)?;
    let to = lookup(factories, target)?;
    (from.factory_type != to.factory_type).then(|| {
        format!(
            "Cannot move work from {} ({}) to {} ({}): factory types differ",
            from.name,
            from.factory_type.label(),
            to.name,
            to.factory_type.label(),
        )
    })
}

/// # Errors
///
/// [`EngineError::IncompatibleFactory`] when both factories are known and
/// their types differ.
pub fn check_compatibility(
    source: FactoryId,
    target: FactoryId,
    factories: &[Factory],
) -> Result<(), EngineError> {
    match explain_incompatibility(source, target, factories) {
        Some(message) => Err(EngineError::IncompatibleFactory {
            from_factory: source,
            to_factory: target,
            message,
        }),
        None => Ok(()),
    }
}
