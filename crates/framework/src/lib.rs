//! Command declaration, argument binding, help rendering and dispatch for the
//! Apify CLI.
//!
//! A command is a value implementing [`Command`]: a static
//! [`CommandDescriptor`] (built with the [`flags`] and [`args`] DSL) plus a
//! `run` method. Commands are collected in a [`CommandRegistry`] and driven by
//! the [`Dispatcher`], which resolves the command from argv, binds its flags
//! and args through [`bind`], runs it and maps failures to exit codes.
//!
//! ```no_run
//! use apify_framework::{
//!     CliConfig, Command, CommandContext, CommandDescriptor, CommandRegistry, Dispatcher,
//!     StdinSnapshot, flags,
//! };
//! use std::io::Write;
//! use std::sync::Arc;
//!
//! struct Hello(CommandDescriptor);
//!
//! impl Command for Hello {
//!     fn descriptor(&self) -> &CommandDescriptor {
//!         &self.0
//!     }
//!
//!     fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
//!         let name = ctx.invocation().flag_str("name").unwrap_or("world").to_string();
//!         writeln!(ctx.stdout(), "hello {name}")?;
//!         Ok(())
//!     }
//! }
//!
//! let hello = CommandDescriptor::new("hello").flag("name", flags::string().char('n'));
//! let mut registry = CommandRegistry::new();
//! registry.register(Arc::new(Hello(hello))).unwrap();
//!
//! let config = CliConfig::from_env();
//! let dispatcher = Dispatcher::new(&registry, &config, StdinSnapshot::global());
//! let argv: Vec<String> = std::env::args().skip(1).collect();
//! let code = dispatcher.run(&argv, &mut std::io::stdout(), &mut std::io::stderr());
//! std::process::exit(code);
//! ```

pub mod args;
pub mod binder;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod help;
pub mod invocation;
pub mod output;
pub mod registry;
pub mod stdin;
pub mod suggest;

pub use args::ArgDescriptor;
pub use binder::bind;
pub use command::{Command, CommandContext, CommandDescriptor, CommandRef, NamespaceCommand};
pub use config::CliConfig;
pub use dispatch::Dispatcher;
pub use error::{CommandError, CommandErrorCode, DescriptorError, Diagnostics, ExitCode};
pub use flags::{FlagDescriptor, FlagKind, StdinMode};
pub use help::{HelpRenderer, SelectiveRenderOptions};
pub use help::table::{ColumnAlignment, ResponsiveTable, TableStyle};
pub use invocation::{ParsedInvocation, Value};
pub use registry::{CollisionPolicy, CommandRegistry, RegistryEntry, RegistryError};
pub use stdin::{StdinSnapshot, StdinState};
