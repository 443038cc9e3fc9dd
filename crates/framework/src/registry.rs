//! Lookup table from command names, aliases and `"<namespace> <subcommand>"`
//! keys to commands.
//!
//! The registry is built once at startup and handed to the dispatcher by
//! reference. Every spelling of a namespace is combined with every spelling
//! of each subcommand, so any alias path resolves to the same command as the
//! canonical path.

use crate::command::CommandRef;
use crate::error::DescriptorError;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// What happens when a key is registered twice for different commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later registration wins.
    #[default]
    Overwrite,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Canonical,
    Alias,
    HiddenAlias,
}

#[derive(Clone)]
pub struct RegistryEntry {
    command: CommandRef,
    path: String,
    parent: Option<String>,
    kind: KeyKind,
}

impl RegistryEntry {
    pub fn command(&self) -> &CommandRef {
        &self.command
    }

    /// Canonical path, e.g. `key-value-stores get-value`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical name of the owning namespace, for subcommand keys.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Whether the key may appear in help and suggestions.
    pub fn is_listed(&self) -> bool {
        self.kind != KeyKind::HiddenAlias && !self.command.descriptor().is_hidden()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),
    #[error("'{key}' is already registered for '{existing}', cannot register it for '{incoming}'")]
    Collision {
        key: String,
        existing: String,
        incoming: String,
    },
}

#[derive(Default)]
pub struct CommandRegistry {
    entries: IndexMap<String, RegistryEntry>,
    policy: CollisionPolicy,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            policy,
        }
    }

    /// Register a command under all of its keys.
    ///
    /// The descriptor is validated first; nothing is inserted when
    /// validation or a collision check fails. Under [`CollisionPolicy::Reject`]
    /// registering an identical declaration again is a no-op and any other
    /// clash is an error. Under [`CollisionPolicy::Overwrite`] an earlier
    /// command of the same name is removed with all of its keys.
    pub fn register(&mut self, command: CommandRef) -> Result<(), RegistryError> {
        let descriptor = command.descriptor();
        descriptor.validate()?;

        let name = descriptor.name().to_string();
        let parent_keys = spellings(
            &name,
            descriptor.aliases(),
            descriptor.hidden_aliases(),
        );

        let mut pending = Vec::new();
        for (key, kind) in &parent_keys {
            pending.push((
                key.clone(),
                RegistryEntry {
                    command: Arc::clone(&command),
                    path: name.clone(),
                    parent: None,
                    kind: *kind,
                },
            ));
        }

        for sub in descriptor.subcommands() {
            let sub_descriptor = sub.descriptor();
            let path = format!("{name} {}", sub_descriptor.name());
            let sub_keys = spellings(
                sub_descriptor.name(),
                sub_descriptor.aliases(),
                sub_descriptor.hidden_aliases(),
            );
            for (parent_key, parent_kind) in &parent_keys {
                for (sub_key, sub_kind) in &sub_keys {
                    pending.push((
                        format!("{parent_key} {sub_key}"),
                        RegistryEntry {
                            command: Arc::clone(sub),
                            path: path.clone(),
                            parent: Some(name.clone()),
                            kind: combine(*parent_kind, *sub_kind),
                        },
                    ));
                }
            }
        }

        match self.policy {
            CollisionPolicy::Reject => {
                if let Some(existing) = self.entries.get(&name) {
                    if existing.parent.is_none() && same_command(&existing.command, &command) {
                        tracing::debug!(path = %name, "command already registered");
                        return Ok(());
                    }
                }
                for (key, entry) in &pending {
                    if let Some(existing) = self.entries.get(key) {
                        return Err(RegistryError::Collision {
                            key: key.clone(),
                            existing: existing.path.clone(),
                            incoming: entry.path.clone(),
                        });
                    }
                }
            }
            CollisionPolicy::Overwrite => {
                let replaced = self.replaced_roots(&name, &pending);
                self.entries.retain(|key, entry| {
                    let root = entry.parent.as_deref().unwrap_or(entry.path.as_str());
                    let keep = !replaced.contains(root);
                    if !keep {
                        tracing::debug!(key = %key, path = %entry.path, "dropping replaced command key");
                    }
                    keep
                });
            }
        }

        for (key, entry) in pending {
            tracing::debug!(key = %key, path = %entry.path, "registering command key");
            if let Some(previous) = self.entries.insert(key.clone(), entry) {
                tracing::debug!(key = %key, previous = %previous.path, "overwrote command key");
            }
        }
        Ok(())
    }

    /// Top-level commands an overwriting registration of `name` replaces as a
    /// whole: the earlier `name` and any command whose canonical key is taken.
    fn replaced_roots(&self, name: &str, pending: &[(String, RegistryEntry)]) -> HashSet<String> {
        let mut roots = HashSet::from([name.to_string()]);
        for (key, _) in pending {
            if let Some(existing) = self.entries.get(key) {
                if existing.parent.is_none() && existing.kind == KeyKind::Canonical {
                    roots.insert(existing.path.clone());
                }
            }
        }
        roots
    }

    pub fn get(&self, key: &str) -> Option<&CommandRef> {
        self.entries.get(key).map(|e| &e.command)
    }

    pub fn entry(&self, key: &str) -> Option<&RegistryEntry> {
        let entry = self.entries.get(key);
        tracing::debug!(key, found = entry.is_some(), "registry lookup");
        entry
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Every key in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Canonical top-level entries, in registration order.
    pub fn top_level(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries
            .values()
            .filter(|e| e.parent.is_none() && e.kind == KeyKind::Canonical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn spellings(name: &str, aliases: &[String], hidden: &[String]) -> Vec<(String, KeyKind)> {
    let mut keys = vec![(name.to_string(), KeyKind::Canonical)];
    keys.extend(aliases.iter().map(|a| (a.clone(), KeyKind::Alias)));
    keys.extend(hidden.iter().map(|a| (a.clone(), KeyKind::HiddenAlias)));
    keys
}

fn same_command(a: &CommandRef, b: &CommandRef) -> bool {
    Arc::ptr_eq(a, b) || a.descriptor().declares_same(b.descriptor())
}

fn combine(parent: KeyKind, sub: KeyKind) -> KeyKind {
    match (parent, sub) {
        (KeyKind::HiddenAlias, _) | (_, KeyKind::HiddenAlias) => KeyKind::HiddenAlias,
        (KeyKind::Canonical, KeyKind::Canonical) => KeyKind::Canonical,
        _ => KeyKind::Alias,
    }
}
