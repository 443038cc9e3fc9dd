//! Entrypoint driver: argv in, exit code out.

use crate::binder::bind;
use crate::command::{CommandContext, CommandDescriptor};
use crate::config::CliConfig;
use crate::error::{CommandError, CommandErrorCode, Diagnostics, ExitCode};
use crate::help::{HelpRenderer, SelectiveRenderOptions};
use crate::output::{self, bright, gray};
use crate::registry::{CommandRegistry, RegistryEntry};
use crate::stdin::StdinSnapshot;
use crate::suggest::suggest_commands;
use apify_argparse::ParseArgsError;
use std::io::Write;

pub struct Dispatcher<'a> {
    registry: &'a CommandRegistry,
    config: &'a CliConfig,
    stdin: &'a StdinSnapshot,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a CommandRegistry, config: &'a CliConfig, stdin: &'a StdinSnapshot) -> Self {
        Self {
            registry,
            config,
            stdin,
        }
    }

    /// Run one invocation. `argv` excludes the program name.
    pub fn run(&self, argv: &[String], stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32 {
        tracing::debug!(?argv, "dispatching");

        let Some(first) = argv.first() else {
            return self.print_main_help(stdout);
        };
        if first.starts_with('-') {
            if argv.iter().any(|a| is_version_flag(a)) {
                output::emit(stdout, &format!("{}\n", self.config.full_version()));
                return 0;
            }
            return self.print_main_help(stdout);
        }

        let Some((entry, consumed)) = self.resolve(argv) else {
            self.report_unknown_command(first, stderr);
            return 1;
        };
        let descriptor = entry.command().descriptor();
        let rest = &argv[consumed..];
        tracing::debug!(path = entry.path(), ?rest, "resolved command");

        if wants_help(rest) {
            let help = self.help().render(entry.path(), descriptor);
            output::emit(stdout, &format!("{help}\n"));
            return 0;
        }

        if descriptor.is_namespace() {
            if let Some(sub) = rest.first().filter(|a| !a.starts_with('-')) {
                self.report_unknown_subcommand(entry, first, sub, stderr);
                return 1;
            }
        }

        let invocation = match bind(descriptor, rest, self.stdin) {
            Ok(invocation) => invocation,
            Err(err) => {
                self.report(&err, argv, entry.path(), descriptor, stderr);
                return 1;
            }
        };
        tracing::debug!(?invocation, "bound invocation");

        let (result, exit_code) = {
            let mut ctx = CommandContext {
                invocation,
                path: entry.path().to_string(),
                descriptor,
                registry: self.registry,
                config: self.config,
                stdin: self.stdin,
                stdout: &mut *stdout,
                stderr: &mut *stderr,
                exit_code: 0,
            };
            let result = entry.command().run(&mut ctx);
            (result, ctx.exit_code)
        };
        let _ = stdout.flush();

        match result {
            Ok(()) => exit_code,
            Err(err) => self.handle_failure(err, argv, entry.path(), descriptor, stderr),
        }
    }

    /// Longest registered prefix of argv: `"<namespace> <subcommand>"` first.
    fn resolve(&self, argv: &[String]) -> Option<(&'a RegistryEntry, usize)> {
        if let [first, second, ..] = argv {
            if let Some(entry) = self.registry.entry(&format!("{first} {second}")) {
                return Some((entry, 2));
            }
        }
        self.registry.entry(&argv[0]).map(|entry| (entry, 1))
    }

    fn help(&self) -> HelpRenderer<'a> {
        HelpRenderer::new(self.registry, self.config)
    }

    fn print_main_help(&self, stdout: &mut dyn Write) -> i32 {
        output::emit(stdout, &format!("{}\n", self.help().render_main()));
        0
    }

    fn diagnostics(&self, argv: &[String]) -> Diagnostics {
        Diagnostics {
            argv: argv.to_vec(),
            cli_version: self.config.full_version(),
            debug: self.config.debug,
            stdin_has_data: self.stdin.has_data(),
        }
    }

    fn handle_failure(
        &self,
        err: anyhow::Error,
        argv: &[String],
        path: &str,
        descriptor: &CommandDescriptor,
        stderr: &mut dyn Write,
    ) -> i32 {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            tracing::debug!(code, "command requested exit code");
            return *code;
        }
        if err.is::<CommandError>() || err.is::<ParseArgsError>() {
            let err = CommandError::into_command_error(err);
            self.report(&err, argv, path, descriptor, stderr);
            return 1;
        }

        tracing::debug!(error = ?err, "command failed");
        output::error(stderr, &gray(format!("{err:#}")));
        1
    }

    fn report(
        &self,
        err: &CommandError,
        argv: &[String],
        path: &str,
        descriptor: &CommandDescriptor,
        stderr: &mut dyn Write,
    ) {
        tracing::debug!(code = %err.code(), metadata = ?err.metadata(), "command error");
        let mut message = err.pretty_message(&self.diagnostics(argv));
        if err.code() == CommandErrorCode::MissingArgument {
            let usage = self
                .help()
                .selective_render(path, descriptor, SelectiveRenderOptions::usage_only());
            message.push_str(&format!("\n{}\n\n{usage}", gray("  See more help with --help")));
        }
        output::error(stderr, &message);
    }

    fn report_unknown_command(&self, name: &str, stderr: &mut dyn Write) {
        output::error(stderr, &command_not_found(self.registry, name));
    }

    /// `typed` is the namespace spelling from argv, so suggestions keep the
    /// user's alias.
    fn report_unknown_subcommand(
        &self,
        entry: &RegistryEntry,
        typed: &str,
        sub: &str,
        stderr: &mut dyn Write,
    ) {
        let mut message = format!("{}{}", gray("Nonexistent subcommand: "), bright(sub));
        push_suggestions(
            &mut message,
            &suggest_commands(self.registry, &format!("{typed} {sub}")),
        );

        let options = SelectiveRenderOptions {
            usage: true,
            subcommands: true,
            ..SelectiveRenderOptions::default()
        };
        let help = self
            .help()
            .selective_render(entry.path(), entry.command().descriptor(), options);
        message.push_str(&format!("\n\n{help}"));
        output::error(stderr, &message);
    }
}

/// `Command <name> not found`, followed by the closest registered commands.
pub fn command_not_found(registry: &CommandRegistry, name: &str) -> String {
    let mut message = format!("{}{}{}", gray("Command "), bright(name), gray(" not found"));
    push_suggestions(&mut message, &suggest_commands(registry, name));
    message
}

fn push_suggestions(message: &mut String, suggestions: &[String]) {
    if suggestions.is_empty() {
        return;
    }
    let listed: Vec<String> = suggestions.iter().map(bright).collect();
    message.push_str("\n  ");
    message.push_str(&gray("Did you mean: "));
    message.push_str(&listed.join(gray(", ").as_str()));
    message.push_str(&gray("?"));
}

fn is_version_flag(arg: &str) -> bool {
    arg == "-v" || arg == "--version"
}

/// `-h`/`--help` anywhere before `--`.
fn wants_help(rest: &[String]) -> bool {
    rest.iter()
        .take_while(|a| a.as_str() != "--")
        .any(|a| a == "-h" || a == "--help")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandDescriptor};
    use crate::registry::tests::sample_registry;
    use crate::{args, flags};
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Echo(CommandDescriptor);

    impl Command for Echo {
        fn descriptor(&self) -> &CommandDescriptor {
            &self.0
        }

        fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
            let json = serde_json::to_string(ctx.invocation())?;
            writeln!(ctx.stdout(), "{json}")?;
            Ok(())
        }
    }

    struct Failing(CommandDescriptor, fn() -> anyhow::Error);

    impl Command for Failing {
        fn descriptor(&self) -> &CommandDescriptor {
            &self.0
        }

        fn run(&self, _ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
            Err((self.1)())
        }
    }

    struct SetsCode(CommandDescriptor);

    impl Command for SetsCode {
        fn descriptor(&self) -> &CommandDescriptor {
            &self.0
        }

        fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
            ctx.set_exit_code(4);
            Ok(())
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = sample_registry();
        registry
            .register(Arc::new(Echo(
                CommandDescriptor::new("call")
                    .description("Runs an Actor.")
                    .arg("actorId", args::string().required().description("Actor to run."))
                    .flag("build", flags::string().char('b'))
                    .flag("token", flags::string().required()),
            )))
            .unwrap();
        registry
            .register(Arc::new(Failing(CommandDescriptor::new("boom"), || {
                anyhow!("request failed")
            })))
            .unwrap();
        registry
            .register(Arc::new(Failing(CommandDescriptor::new("quit"), || {
                ExitCode(3).into()
            })))
            .unwrap();
        registry
            .register(Arc::new(Failing(CommandDescriptor::new("twice"), || {
                CommandError::provided_multiple_times("input").into()
            })))
            .unwrap();
        registry
            .register(Arc::new(SetsCode(CommandDescriptor::new("partial"))))
            .unwrap();
        registry
    }

    fn dispatch(argv: &[&str]) -> (i32, String, String) {
        console::set_colors_enabled(false);
        let registry = registry();
        let config = CliConfig {
            max_line_width: Some(80),
            ..CliConfig::default()
        };
        let stdin = StdinSnapshot::interactive();
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = Dispatcher::new(&registry, &config, &stdin).run(&argv, &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
        )
    }

    #[test]
    fn no_arguments_prints_main_help() {
        let (code, out, err) = dispatch(&[]);
        assert_eq!(code, 0);
        assert!(out.contains("USAGE\n  $ apify <command> [options]"), "{out}");
        assert!(err.is_empty());

        let (code, help_out, _) = dispatch(&["--help"]);
        assert_eq!(code, 0);
        assert_eq!(help_out, out);
    }

    #[test]
    fn version_flag_prints_full_version() {
        let (code, out, _) = dispatch(&["--version"]);
        assert_eq!(code, 0);
        assert_eq!(out, format!("{}\n", CliConfig::default().full_version()));
    }

    #[test]
    fn unknown_command_suggests_alternatives() {
        let (code, out, err) = dispatch(&["hlp"]);
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(err, "Error: Command hlp not found\n  Did you mean: help?\n");
    }

    #[test]
    fn namespace_alone_prints_its_help() {
        let (code, out, _) = dispatch(&["kvs"]);
        assert_eq!(code, 0);
        assert!(out.contains("SUBCOMMANDS\n  key-value-stores get-value"), "{out}");
    }

    #[test]
    fn unknown_subcommand_lists_the_namespace() {
        let (code, _, err) = dispatch(&["kvs", "get-values"]);
        assert_eq!(code, 1);
        assert!(err.starts_with(
            "Error: Nonexistent subcommand: get-values\n  Did you mean: kvs get-value, kvs set-value?\n\n"
        ), "{err}");
        assert!(err.contains("SUBCOMMANDS"));
    }

    #[test]
    fn alias_path_runs_the_subcommand() {
        let (code, out, err) = dispatch(&["kvs", "get-value"]);
        assert_eq!((code, out.as_str(), err.as_str()), (0, "", ""));
    }

    #[test]
    fn help_flag_before_separator_prints_command_help() {
        let (code, out, _) = dispatch(&["call", "x", "--help"]);
        assert_eq!(code, 0);
        assert!(out.starts_with("Runs an Actor.\n\nUSAGE\n  $ apify call <actorId>"), "{out}");

        let (code, _, err) = dispatch(&["call", "x", "--", "--help"]);
        assert_eq!(code, 1);
        assert!(err.contains("Unexpected argument --help."), "{err}");
    }

    #[test]
    fn bound_invocation_reaches_the_command() {
        let (code, out, err) = dispatch(&["call", "my-actor", "--token", "t", "-b", "latest"]);
        assert_eq!(code, 0, "{err}");
        let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(json["args"]["actorId"], "my-actor");
        assert_eq!(json["flags"]["build"], "latest");
        assert_eq!(json["flags"]["token"], "t");
    }

    #[test]
    fn missing_flag_is_reported() {
        let (code, out, err) = dispatch(&["call", "my-actor"]);
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "Error: Flag '--token' is required, but was not provided.\n"
        );
    }

    #[test]
    fn missing_argument_includes_usage() {
        let (code, _, err) = dispatch(&["call", "--token", "t"]);
        assert_eq!(code, 1);
        assert!(err.starts_with("Error: Missing 1 required argument:\n  actorId  Actor to run."), "{err}");
        assert!(err.contains("See more help with --help\n\nUSAGE\n  $ apify call <actorId>"), "{err}");
    }

    #[test]
    fn unknown_flag_suggests_declared_flags() {
        let (code, _, err) = dispatch(&["call", "x", "--token", "t", "--buidl", "1"]);
        assert_eq!(code, 1);
        assert!(err.starts_with("Error: Nonexistent flag: --buidl\nDid you mean: --build?"), "{err}");
    }

    #[test]
    fn handler_errors_map_to_exit_codes() {
        let (code, _, err) = dispatch(&["boom"]);
        assert_eq!((code, err.as_str()), (1, "Error: request failed\n"));

        let (code, _, err) = dispatch(&["quit"]);
        assert_eq!((code, err.as_str()), (3, ""));

        let (code, _, err) = dispatch(&["twice"]);
        assert_eq!(code, 1);
        assert_eq!(err, "Error: Flag --input can only be specified once.\n");

        let (code, _, _) = dispatch(&["partial"]);
        assert_eq!(code, 4);
    }
}
