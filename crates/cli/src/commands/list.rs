use apify_framework::registry::KeyKind;
use apify_framework::{
    Command, CommandContext, CommandDescriptor, CommandRegistry, ResponsiveTable, TableStyle, flags,
};
use serde::Serialize;
use std::io::Write;

const STYLES: [&str; 3] = ["full", "compact", "console"];

/// `apify commands`: every visible command path in a table.
pub struct ListCommands {
    descriptor: CommandDescriptor,
}

impl ListCommands {
    pub fn new() -> Self {
        let descriptor = CommandDescriptor::new("commands")
            .alias("ls-commands")
            .short_description("Lists all available commands.")
            .description(
                "Lists all available commands and their aliases.\n\nNamespaces are listed together with each of their subcommands.",
            )
            .flag(
                "compact",
                flags::boolean()
                    .char('c')
                    .exclusive(["style"])
                    .description("Shorthand for --style=compact."),
            )
            .flag(
                "style",
                flags::string()
                    .choices(STYLES)
                    .default("full")
                    .description("Table style to render."),
            )
            .enable_json_flag();
        Self { descriptor }
    }
}

#[derive(Debug, Serialize)]
struct CommandRow {
    command: String,
    aliases: Vec<String>,
    kind: &'static str,
    description: String,
}

fn collect_rows(registry: &CommandRegistry) -> Vec<CommandRow> {
    let parent_hidden = |parent: Option<&str>| {
        parent
            .and_then(|p| registry.get(p))
            .is_some_and(|c| c.descriptor().is_hidden())
    };

    let mut rows: Vec<CommandRow> = registry
        .entries()
        .filter(|(_, e)| e.kind() == KeyKind::Canonical && e.is_listed())
        .filter(|(_, e)| !parent_hidden(e.parent()))
        .map(|(key, e)| {
            let d = e.command().descriptor();
            CommandRow {
                command: key.to_string(),
                aliases: d.aliases().to_vec(),
                kind: if d.is_namespace() { "namespace" } else { "command" },
                description: d.summary().to_string(),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.command.cmp(&b.command));
    rows
}

fn table_style(ctx: &CommandContext<'_>) -> TableStyle {
    let invocation = ctx.invocation();
    if invocation.flag_bool("compact") {
        return TableStyle::Compact;
    }
    match invocation.flag_str("style") {
        Some("compact") => TableStyle::Compact,
        Some("console") => TableStyle::Console,
        _ => TableStyle::Full,
    }
}

impl Command for ListCommands {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        let rows = collect_rows(ctx.registry());

        if ctx.invocation().json() {
            let json = serde_json::to_string_pretty(&rows)?;
            writeln!(ctx.stdout(), "{json}")?;
            return Ok(());
        }

        let mut table = ResponsiveTable::new(
            ["Command", "Aliases", "Kind", "Description"],
            ["Command", "Description"],
        );
        for row in &rows {
            table.push_row([
                ("Command", row.command.clone()),
                ("Aliases", row.aliases.join(", ")),
                ("Kind", row.kind.to_string()),
                ("Description", row.description.clone()),
            ]);
        }

        let rendered = table.render(table_style(ctx), ctx.config().terminal_columns());
        writeln!(ctx.stdout(), "{rendered}")?;
        Ok(())
    }
}
