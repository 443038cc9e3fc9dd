//! Command trait and static command metadata.

use crate::args::ArgDescriptor;
use crate::config::CliConfig;
use crate::error::DescriptorError;
use crate::flags::{self, FlagDescriptor, FlagKind};
use crate::help::HelpRenderer;
use crate::invocation::ParsedInvocation;
use crate::registry::CommandRegistry;
use crate::stdin::StdinSnapshot;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// A runnable command.
///
/// Implementors hold a [`CommandDescriptor`] built once and return it from
/// [`Command::descriptor`]; the dispatcher binds argv against it before
/// calling [`Command::run`].
pub trait Command: Send + Sync {
    fn descriptor(&self) -> &CommandDescriptor;

    fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()>;
}

pub type CommandRef = Arc<dyn Command>;

/// Static metadata of a command or namespace.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    hidden_aliases: Vec<String>,
    short_description: String,
    description: String,
    args: IndexMap<String, ArgDescriptor>,
    flags: IndexMap<String, FlagDescriptor>,
    subcommands: Vec<CommandRef>,
    hidden: bool,
    strict: bool,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subcommands: Vec<&str> = self
            .subcommands
            .iter()
            .map(|c| c.descriptor().name())
            .collect();
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("hidden_aliases", &self.hidden_aliases)
            .field("args", &self.args)
            .field("flags", &self.flags)
            .field("subcommands", &subcommands)
            .field("hidden", &self.hidden)
            .field("strict", &self.strict)
            .finish()
    }
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            hidden_aliases: Vec::new(),
            short_description: String::new(),
            description: String::new(),
            args: IndexMap::new(),
            flags: IndexMap::new(),
            subcommands: Vec::new(),
            hidden: false,
            strict: true,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Resolves like an alias but is never shown in help or suggestions.
    pub fn hidden_alias(mut self, alias: impl Into<String>) -> Self {
        self.hidden_aliases.push(alias.into());
        self
    }

    pub fn short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = text.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn arg(mut self, name: impl Into<String>, arg: ArgDescriptor) -> Self {
        self.args.insert(name.into(), arg);
        self
    }

    pub fn flag(mut self, name: impl Into<String>, flag: FlagDescriptor) -> Self {
        self.flags.insert(name.into(), flag);
        self
    }

    pub fn subcommand(mut self, command: CommandRef) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Non-strict commands ignore unknown flags and extra positionals.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Adds the shared `--json` output flag.
    pub fn enable_json_flag(mut self) -> Self {
        self.flags.insert("json".to_string(), flags::json_flag());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_slice()
    }

    pub fn hidden_aliases(&self) -> &[String] {
        self.hidden_aliases.as_slice()
    }

    pub fn short_description_text(&self) -> &str {
        &self.short_description
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    /// One-line summary: the short description, else the first line of
    /// the description.
    pub fn summary(&self) -> &str {
        if !self.short_description.is_empty() {
            return &self.short_description;
        }
        self.description.lines().next().unwrap_or_default()
    }

    pub fn args(&self) -> &IndexMap<String, ArgDescriptor> {
        &self.args
    }

    pub fn flags(&self) -> &IndexMap<String, FlagDescriptor> {
        &self.flags
    }

    pub fn subcommands(&self) -> &[CommandRef] {
        self.subcommands.as_slice()
    }

    pub fn is_namespace(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Same name, spellings, texts, parameters and subcommands. Two commands
    /// declaring the same thing count as one registration.
    pub fn declares_same(&self, other: &Self) -> bool {
        self.name == other.name
            && self.aliases == other.aliases
            && self.hidden_aliases == other.hidden_aliases
            && self.short_description == other.short_description
            && self.description == other.description
            && self.args == other.args
            && self.flags == other.flags
            && self.hidden == other.hidden
            && self.strict == other.strict
            && self.subcommands.len() == other.subcommands.len()
            && self
                .subcommands
                .iter()
                .zip(&other.subcommands)
                .all(|(a, b)| a.descriptor().declares_same(b.descriptor()))
    }

    /// Check the declaration for mistakes that would only surface at parse
    /// time otherwise.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let command = self.name.clone();
        if self.name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        if self.is_namespace() {
            if !self.args.is_empty() || !self.flags.is_empty() {
                return Err(DescriptorError::NamespaceWithParameters { command });
            }
            for sub in &self.subcommands {
                let sub = sub.descriptor();
                if sub.is_namespace() {
                    return Err(DescriptorError::NestedNamespace {
                        command,
                        subcommand: sub.name.clone(),
                    });
                }
                sub.validate()?;
            }
            return Ok(());
        }

        let mut spellings: HashMap<&str, &str> = HashMap::new();
        let mut shorts: HashMap<char, &str> = HashMap::new();
        for (name, flag) in &self.flags {
            if flag.is_required() && flag.default_value().is_some() {
                return Err(DescriptorError::RequiredWithDefault {
                    command,
                    flag: name.clone(),
                });
            }
            if flag.default_value().is_some_and(|v| !flag.kind().accepts(v)) {
                return Err(DescriptorError::DefaultKindMismatch {
                    command,
                    flag: name.clone(),
                });
            }
            if flag.choice_values().iter().any(|v| !flag.kind().accepts(v))
                || (flag.kind() == FlagKind::Boolean && !flag.choice_values().is_empty())
            {
                return Err(DescriptorError::ChoiceKindMismatch {
                    command,
                    flag: name.clone(),
                });
            }
            for target in flag.exclusive_with() {
                if !self.flags.contains_key(target) {
                    return Err(DescriptorError::UnknownExclusiveTarget {
                        command,
                        flag: name.clone(),
                        target: target.clone(),
                    });
                }
            }
            if let Some(short) = flag.short_char() {
                if let Some(first) = shorts.insert(short, name) {
                    return Err(DescriptorError::DuplicateShortFlag {
                        command,
                        short,
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
            }
            let own = std::iter::once(name.as_str()).chain(flag.aliases().iter().map(String::as_str));
            for spelling in own {
                match spellings.insert(spelling, name) {
                    Some(first) if first != name => {
                        return Err(DescriptorError::DuplicateFlagSpelling {
                            command,
                            spelling: spelling.to_string(),
                            first: first.to_string(),
                            second: name.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }

        let mut seen_optional = false;
        let count = self.args.len();
        for (index, (name, arg)) in self.args.iter().enumerate() {
            if arg.is_catch_all() && index + 1 != count {
                return Err(DescriptorError::CatchAllNotLast {
                    command,
                    arg: name.clone(),
                });
            }
            if arg.is_required() && arg.default_value().is_some() {
                return Err(DescriptorError::RequiredWithDefault {
                    command,
                    flag: name.clone(),
                });
            }
            if arg.is_required() && seen_optional {
                return Err(DescriptorError::RequiredAfterOptional {
                    command,
                    arg: name.clone(),
                });
            }
            seen_optional |= !arg.is_required();
        }

        Ok(())
    }
}

/// Everything a running command can reach.
pub struct CommandContext<'a> {
    pub(crate) invocation: ParsedInvocation,
    pub(crate) path: String,
    pub(crate) descriptor: &'a CommandDescriptor,
    pub(crate) registry: &'a CommandRegistry,
    pub(crate) config: &'a CliConfig,
    pub(crate) stdin: &'a StdinSnapshot,
    pub(crate) stdout: &'a mut dyn Write,
    pub(crate) stderr: &'a mut dyn Write,
    pub(crate) exit_code: i32,
}

impl<'a> CommandContext<'a> {
    pub fn invocation(&self) -> &ParsedInvocation {
        &self.invocation
    }

    /// Canonical command path, e.g. `key-value-stores get-value`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        self.descriptor
    }

    pub fn registry(&self) -> &'a CommandRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a CliConfig {
        self.config
    }

    pub fn stdin(&self) -> &'a StdinSnapshot {
        self.stdin
    }

    pub fn stdout(&mut self) -> &mut dyn Write {
        &mut *self.stdout
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        &mut *self.stderr
    }

    pub fn help_renderer(&self) -> HelpRenderer<'a> {
        HelpRenderer::new(self.registry, self.config)
    }

    /// Exit code used when `run` returns `Ok`.
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

/// A namespace: groups subcommands and prints its own help when run alone.
pub struct NamespaceCommand {
    descriptor: CommandDescriptor,
}

impl NamespaceCommand {
    pub fn new(descriptor: CommandDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Command for NamespaceCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        let help = ctx.help_renderer().render(ctx.path(), &self.descriptor);
        writeln!(ctx.stdout(), "{help}")?;
        Ok(())
    }
}
