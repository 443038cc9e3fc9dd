//! Help text for the main menu, commands and namespaces.
//!
//! All output is wrapped to [`CliConfig::line_width`] and measured with
//! ANSI escapes stripped, so styled fragments line up with plain ones.

pub mod table;

use crate::command::CommandDescriptor;
use crate::config::CliConfig;
use crate::flags::{FlagDescriptor, FlagKind};
use crate::output::{bold, underline};
use crate::registry::CommandRegistry;
use console::{Alignment, measure_text_width, pad_str};
use std::collections::{BTreeSet, HashSet};

pub const SUPPORT_LINE: &str = "For general support, reach out to us at https://apify.com/contact";
pub const BUG_REPORT_LINE: &str =
    "If you believe you are encountering a bug, file it at https://github.com/apify/apify-cli/issues/new";

/// Which sections [`HelpRenderer::selective_render`] emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectiveRenderOptions {
    pub short_description: bool,
    pub usage: bool,
    pub description: bool,
    pub subcommands: bool,
}

impl SelectiveRenderOptions {
    pub fn usage_only() -> Self {
        Self {
            usage: true,
            ..Self::default()
        }
    }
}

pub struct HelpRenderer<'a> {
    registry: &'a CommandRegistry,
    config: &'a CliConfig,
    width: usize,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(registry: &'a CommandRegistry, config: &'a CliConfig) -> Self {
        Self {
            registry,
            config,
            width: config.line_width(),
        }
    }

    /// Wrap to a fixed width instead of the terminal's.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Full help of the command at `path`.
    pub fn render(&self, path: &str, descriptor: &CommandDescriptor) -> String {
        let options = SelectiveRenderOptions {
            short_description: true,
            usage: !descriptor.is_namespace(),
            description: true,
            subcommands: descriptor.is_namespace(),
        };
        self.selective_render(path, descriptor, options)
    }

    pub fn selective_render(
        &self,
        path: &str,
        descriptor: &CommandDescriptor,
        options: SelectiveRenderOptions,
    ) -> String {
        let mut out = Vec::new();
        if options.short_description {
            self.push_short_description(&mut out, descriptor);
        }
        if options.usage && !descriptor.is_namespace() {
            self.push_usage(&mut out, path, descriptor);
        }
        if options.description {
            self.push_description(&mut out, descriptor);
        }
        if options.subcommands {
            self.push_subcommands(&mut out, path, descriptor);
        }
        out.join("\n").trim().to_string()
    }

    /// Top-level menu shown for a bare `apify` or `apify --help`.
    pub fn render_main(&self) -> String {
        let mut out = Vec::new();
        if !self.config.description.is_empty() {
            out.push(self.config.description.clone());
            out.push(String::new());
        }

        out.push(bold("VERSION"));
        out.push(format!("  {}", self.config.version));
        out.push(String::new());

        out.push(bold("USAGE"));
        out.push(format!("  $ {} <command> [options]", self.config.entrypoint));
        out.push(String::new());

        let mut listed: Vec<&CommandDescriptor> = self
            .registry
            .top_level()
            .map(|entry| entry.command().descriptor())
            .filter(|d| !d.is_hidden())
            .collect();
        listed.sort_by(|a, b| a.name().cmp(b.name()));
        let (topics, commands): (Vec<_>, Vec<_>) =
            listed.into_iter().partition(|d| d.is_namespace());

        for (title, group) in [("TOPICS", topics), ("COMMANDS", commands)] {
            if group.is_empty() {
                continue;
            }
            out.push(bold(title));
            let name_width = widest(group.iter().map(|d| d.name()));
            for d in group {
                out.push(self.two_columns(d.name(), name_width, d.summary()));
            }
            out.push(String::new());
        }

        out.push(bold("TROUBLESHOOTING"));
        out.push(format!("  {SUPPORT_LINE}"));
        out.push(String::new());
        out.push(format!("  {BUG_REPORT_LINE}"));
        out.join("\n").trim().to_string()
    }

    fn push_short_description(&self, out: &mut Vec<String>, descriptor: &CommandDescriptor) {
        let summary = descriptor.summary();
        if !summary.is_empty() {
            out.push(summary.to_string());
            out.push(String::new());
        }
    }

    fn push_description(&self, out: &mut Vec<String>, descriptor: &CommandDescriptor) {
        let description = descriptor.description_text();
        if description.is_empty() {
            return;
        }
        out.push(bold("DESCRIPTION"));
        for line in wrap(description, self.width.saturating_sub(2)) {
            out.push(indent(&line, 2));
        }
        out.push(String::new());
    }

    fn push_usage(&self, out: &mut Vec<String>, path: &str, descriptor: &CommandDescriptor) {
        out.push(bold("USAGE"));

        let base = format!("$ {} {}", self.config.entrypoint, path);
        let continuation = 2 + measure_text_width(&base) + 1;
        let mut lines = vec![format!("  {base}")];

        let mut items: Vec<String> = descriptor
            .args()
            .iter()
            .map(|(name, arg)| arg.usage_label(name))
            .collect();
        items.extend(flag_groups(descriptor));

        for item in items {
            let current = lines.last().map(|l| measure_text_width(l)).unwrap_or(0);
            if current + 1 + measure_text_width(&item) > self.width && current > continuation {
                lines.push(format!("{}{item}", " ".repeat(continuation)));
            } else if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(&item);
            }
        }
        out.extend(lines);
        out.push(String::new());

        self.push_arguments(out, descriptor);
        self.push_flags(out, descriptor);
    }

    fn push_arguments(&self, out: &mut Vec<String>, descriptor: &CommandDescriptor) {
        let args = descriptor.args();
        if args.is_empty() {
            return;
        }
        out.push(bold("ARGUMENTS"));
        let name_width = widest(args.keys().map(String::as_str));
        for (name, arg) in args {
            out.push(self.two_columns(name, name_width, arg.description_text()));
        }
        out.push(String::new());
    }

    fn push_flags(&self, out: &mut Vec<String>, descriptor: &CommandDescriptor) {
        let flags = sorted_visible_flags(descriptor);
        if flags.is_empty() {
            return;
        }
        out.push(bold("FLAGS"));

        let labels: Vec<String> = flags
            .iter()
            .map(|(name, flag)| {
                let label = flag.help_label(name);
                match label.rsplit_once('=') {
                    Some((head, value)) => format!("{head}={}", underline(value)),
                    None => label,
                }
            })
            .collect();
        let label_width = widest(labels.iter().map(String::as_str));

        for (label, (_, flag)) in labels.iter().zip(&flags) {
            let mut text = flag.description_text().to_string();
            if let Some(default) = flag.default_value() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&format!("[default: {default}]"));
            }
            if !flag.choice_values().is_empty() {
                let choices: Vec<String> =
                    flag.choice_values().iter().map(ToString::to_string).collect();
                text.push_str(&format!("\n<options: {}>", choices.join("|")));
            }
            out.push(self.two_columns(label, label_width, &text));
        }
        out.push(String::new());
    }

    fn push_subcommands(&self, out: &mut Vec<String>, path: &str, descriptor: &CommandDescriptor) {
        let subcommands: Vec<&CommandDescriptor> = descriptor
            .subcommands()
            .iter()
            .map(|c| c.descriptor())
            .filter(|d| !d.is_hidden())
            .collect();
        if subcommands.is_empty() {
            return;
        }
        out.push(bold("SUBCOMMANDS"));
        let names: Vec<String> = subcommands
            .iter()
            .map(|d| format!("{path} {}", d.name()))
            .collect();
        let name_width = widest(names.iter().map(String::as_str));
        for (name, d) in names.iter().zip(&subcommands) {
            out.push(self.two_columns(name, name_width, d.summary()));
        }
        out.push(String::new());
    }

    /// `  name  text`, with `text` wrapped and continuation lines aligned
    /// under its first character.
    fn two_columns(&self, name: &str, name_width: usize, text: &str) -> String {
        let prefix = 2 + name_width + 2;
        let text_width = self.width.saturating_sub(prefix).max(20);
        let mut lines = wrap(text, text_width).into_iter();
        let first = lines.next().unwrap_or_default();

        let mut rendered = format!(
            "  {}  {first}",
            pad_str(name, name_width, Alignment::Left, None)
        );
        for line in lines {
            rendered.push('\n');
            rendered.push_str(&indent(&line, prefix));
        }
        rendered.trim_end().to_string()
    }
}

/// Visible flags with required ones first, then by name.
fn sorted_visible_flags(descriptor: &CommandDescriptor) -> Vec<(&str, &FlagDescriptor)> {
    let mut flags: Vec<(&str, &FlagDescriptor)> = descriptor
        .flags()
        .iter()
        .filter(|(_, f)| !f.is_hidden())
        .map(|(n, f)| (n.as_str(), f))
        .collect();
    flags.sort_by(|(a_name, a), (b_name, b)| {
        b.is_required()
            .cmp(&a.is_required())
            .then_with(|| a_name.cmp(b_name))
    });
    flags
}

/// Usage items for flags; mutually exclusive flags share one `a | b` item.
fn flag_groups(descriptor: &CommandDescriptor) -> Vec<String> {
    let flags = sorted_visible_flags(descriptor);
    let visible: HashSet<&str> = flags.iter().map(|(n, _)| *n).collect();
    let mut grouped: HashSet<&str> = HashSet::new();
    let mut items = Vec::new();

    for (name, flag) in &flags {
        if grouped.contains(name) {
            continue;
        }
        let mut partners: BTreeSet<&str> = flag
            .exclusive_with()
            .iter()
            .map(String::as_str)
            .filter(|n| visible.contains(n))
            .collect();
        for (other, other_flag) in &flags {
            if other_flag.exclusive_with().iter().any(|t| t == name) {
                partners.insert(other);
            }
        }

        let mut required = flag.is_required();
        let mut parts = vec![usage_flag(name, flag)];
        for (other, other_flag) in flags.iter().filter(|(n, _)| partners.contains(n)) {
            if grouped.insert(other) {
                required |= other_flag.is_required();
                parts.push(usage_flag(other, other_flag));
            }
        }
        grouped.insert(name);

        let joined = parts.join(" | ");
        items.push(if required { joined } else { format!("[{joined}]") });
    }
    items
}

/// `-b <value>` or `--force`.
fn usage_flag(name: &str, flag: &FlagDescriptor) -> String {
    let main = match flag.short_char() {
        Some(c) => format!("-{c}"),
        None => format!("--{name}"),
    };
    match flag.kind() {
        FlagKind::Boolean => main,
        FlagKind::String | FlagKind::Integer => format!("{main} <value>"),
    }
}

fn widest<'s>(items: impl Iterator<Item = &'s str>) -> usize {
    items.map(measure_text_width).max().unwrap_or(0)
}

fn indent(line: &str, by: usize) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{line}", " ".repeat(by))
    }
}

/// Greedy word wrap that keeps explicit line breaks. Words wider than
/// `width` get a line of their own rather than being split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word_width = measure_text_width(word);
            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current);
    }
    lines
}
