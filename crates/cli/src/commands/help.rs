use apify_framework::dispatch::command_not_found;
use apify_framework::{Command, CommandContext, CommandDescriptor, args, output};
use std::io::Write;

/// `apify help [command...]`.
pub struct HelpCommand {
    descriptor: CommandDescriptor,
}

impl HelpCommand {
    pub fn new() -> Self {
        let descriptor = CommandDescriptor::new("help")
            .description("Prints out help about a command, or all available commands.")
            .hidden()
            .arg(
                "commandString",
                args::string()
                    .catch_all()
                    .description("The command to get help for."),
            );
        Self { descriptor }
    }
}

/// Nothing requested, or `help` itself.
fn shows_main_menu(requested: &str) -> bool {
    requested.split_whitespace().next().is_none_or(|word| word == "help")
}

impl Command for HelpCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        let requested = ctx
            .invocation()
            .arg_str("commandString")
            .map(str::to_lowercase)
            .unwrap_or_default();

        let help = if shows_main_menu(&requested) {
            ctx.help_renderer().render_main()
        } else {
            match ctx.registry().entry(&requested) {
                Some(entry) => ctx
                    .help_renderer()
                    .render(entry.path(), entry.command().descriptor()),
                None => {
                    let message = command_not_found(ctx.registry(), &requested);
                    output::error(ctx.stderr(), &message);
                    ctx.set_exit_code(1);
                    return Ok(());
                }
            }
        };

        writeln!(ctx.stdout(), "{help}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_menu_only_for_empty_or_help() {
        assert!(shows_main_menu(""));
        assert!(shows_main_menu("help"));
        assert!(shows_main_menu("help commands"));
        assert!(!shows_main_menu("helpx"));
        assert!(!shows_main_menu("commands"));
    }
}
