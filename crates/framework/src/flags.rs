//! Flag declaration DSL.
//!
//! ```
//! use apify_framework::flags;
//!
//! let memory = flags::integer()
//!     .char('m')
//!     .description("Amount of memory allocated for the run, in megabytes.")
//!     .default(1024);
//! assert!(!memory.is_required());
//! ```

use crate::invocation::Value;
use apify_argparse::{OptionDef, OptionType};

/// Value kind of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Boolean,
    Integer,
}

impl FlagKind {
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Boolean)
    }

    pub(crate) fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Boolean, Value::Boolean(_))
                | (Self::Integer, Value::Integer(_))
        )
    }
}

/// How a flag or argument may be filled from piped stdin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdinMode {
    #[default]
    None,
    /// Hand over the bytes as read.
    Raw,
    /// Decode as UTF-8 text.
    Stringified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDescriptor {
    kind: FlagKind,
    char: Option<char>,
    aliases: Vec<String>,
    required: bool,
    default: Option<Value>,
    choices: Vec<Value>,
    exclusive: Vec<String>,
    stdin: StdinMode,
    hidden: bool,
    description: String,
}

pub fn string() -> FlagDescriptor {
    FlagDescriptor::new(FlagKind::String)
}

pub fn boolean() -> FlagDescriptor {
    FlagDescriptor::new(FlagKind::Boolean)
}

pub fn integer() -> FlagDescriptor {
    FlagDescriptor::new(FlagKind::Integer)
}

/// The `--json` flag commands opt into with
/// [`CommandDescriptor::enable_json_flag`](crate::CommandDescriptor::enable_json_flag).
pub(crate) fn json_flag() -> FlagDescriptor {
    boolean().description("Format the command output as JSON")
}

impl FlagDescriptor {
    pub fn new(kind: FlagKind) -> Self {
        Self {
            kind,
            char: None,
            aliases: Vec::new(),
            required: false,
            default: None,
            choices: Vec::new(),
            exclusive: Vec::new(),
            stdin: StdinMode::None,
            hidden: false,
            description: String::new(),
        }
    }

    pub fn char(mut self, short: char) -> Self {
        self.char = Some(short);
        self
    }

    /// Additional long spelling (`--input` for `--input-file`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Flags that must not be supplied together with this one.
    pub fn exclusive<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, mode: StdinMode) -> Self {
        self.stdin = mode;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn short_char(&self) -> Option<char> {
        self.char
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_slice()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn choice_values(&self) -> &[Value] {
        self.choices.as_slice()
    }

    pub fn exclusive_with(&self) -> &[String] {
        self.exclusive.as_slice()
    }

    pub fn stdin_mode(&self) -> StdinMode {
        self.stdin
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    /// Tokenizer entries for this flag declared as `canonical`.
    ///
    /// One entry per spelling (canonical name first, then aliases). Every
    /// entry tracks multiple occurrences so repeated flags can be reported
    /// instead of silently keeping the last value. The short char is only
    /// attached to the canonical entry.
    pub fn tokenizer_entries(&self, canonical: &str) -> Vec<(String, OptionDef)> {
        let kind = match self.kind {
            FlagKind::Boolean => OptionType::Boolean,
            FlagKind::String | FlagKind::Integer => OptionType::String,
        };

        let mut head = OptionDef::new(kind).multiple(true);
        if let Some(short) = self.char {
            head = head.short(short);
        }

        let mut entries = vec![(canonical.to_string(), head)];
        for alias in self.aliases.iter().filter(|a| a.as_str() != canonical) {
            entries.push((alias.clone(), OptionDef::new(kind).multiple(true)));
        }
        entries
    }

    /// `-c, --name=<value>` style label used by help.
    pub fn help_label(&self, canonical: &str) -> String {
        let short = match self.char {
            Some(c) => format!("-{c}, "),
            None => "    ".to_string(),
        };
        let value = match (self.kind.takes_value(), self.choices.is_empty()) {
            (false, _) => String::new(),
            (true, true) => "=<value>".to_string(),
            (true, false) => "=<option>".to_string(),
        };
        format!("{short}--{canonical}{value}")
    }
}
