use apify_framework::{Command, CommandContext, CommandDescriptor, StdinMode, flags};
use std::io::Write;

/// Hidden `_flag` command: binds a representative set of flags and prints
/// the result as JSON.
pub struct FlagProbe {
    descriptor: CommandDescriptor,
}

impl FlagProbe {
    pub fn new() -> Self {
        let descriptor = CommandDescriptor::new("_flag")
            .hidden()
            .description("Prints the bound flags as JSON.")
            .flag(
                "foo",
                flags::string()
                    .required()
                    .stdin(StdinMode::Stringified)
                    .description("Foo flag"),
            )
            .flag("bar", flags::string().description("Bar flag"))
            .flag("foo-bar", flags::string().description("Foo bar flag"))
            .flag(
                "choice",
                flags::string()
                    .alias("alias1")
                    .choices(["1", "2", "3"])
                    .description("Choices flag"),
            )
            .flag("int", flags::integer().default(1))
            .flag(
                "input",
                flags::string()
                    .char('i')
                    .exclusive(["input-file"])
                    .description("Inline input."),
            )
            .flag("input-file", flags::string().description("Input read from a file."))
            .flag("silent", flags::boolean().char('s').description("Silent flag"));
        Self { descriptor }
    }
}

impl Command for FlagProbe {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        let json = serde_json::to_string(ctx.invocation())?;
        writeln!(ctx.stdout(), "{json}")?;
        Ok(())
    }
}
