//! Commands built into the binary.

mod flag_probe;
mod help;
mod list;

use apify_framework::{CollisionPolicy, CommandRegistry, RegistryError};
use std::sync::Arc;

/// Every built-in command; key collisions between them are rejected.
pub fn registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::with_policy(CollisionPolicy::Reject);
    registry.register(Arc::new(help::HelpCommand::new()))?;
    registry.register(Arc::new(list::ListCommands::new()))?;
    registry.register(Arc::new(flag_probe::FlagProbe::new()))?;
    Ok(registry)
}
