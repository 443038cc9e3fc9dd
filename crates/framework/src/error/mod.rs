//! Error taxonomy for parsing and binding failures.
//!
//! Every failure detected while turning argv into a [`ParsedInvocation`]
//! becomes a [`CommandError`] with a closed [`CommandErrorCode`]. The
//! dispatcher is the only place these are caught; it prints
//! [`CommandError::pretty_message`] and exits non-zero.
//!
//! [`ParsedInvocation`]: crate::ParsedInvocation

mod extract;

pub use extract::FlagData;

use crate::config::DEBUG_ENV;
use crate::output::{bright, gray, highlight, red};
use apify_argparse::{ParseArgsError, ParseArgsErrorCode};
use serde_json::{Map, Value as JsonValue, json};
use std::fmt;

pub const ISSUES_URL: &str = "https://github.com/apify/apify-cli/issues";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandErrorCode {
    NodeParseArgsInvalidOptionValue,
    NodeParseArgsUnexpectedPositional,
    NodeParseArgsUnknownOption,
    FlagProvidedMultipleTimes,
    InvalidFlagIntegerValue,
    InvalidChoice,
    MissingFlag,
    MissingArgument,
    ExclusiveFlags,
    UnknownError,
}

impl CommandErrorCode {
    pub const ALL: [Self; 10] = [
        Self::NodeParseArgsInvalidOptionValue,
        Self::NodeParseArgsUnexpectedPositional,
        Self::NodeParseArgsUnknownOption,
        Self::FlagProvidedMultipleTimes,
        Self::InvalidFlagIntegerValue,
        Self::InvalidChoice,
        Self::MissingFlag,
        Self::MissingArgument,
        Self::ExclusiveFlags,
        Self::UnknownError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeParseArgsInvalidOptionValue => "NODEJS_ERR_PARSE_ARGS_INVALID_OPTION_VALUE",
            Self::NodeParseArgsUnexpectedPositional => "NODEJS_ERR_PARSE_ARGS_UNEXPECTED_POSITIONAL",
            Self::NodeParseArgsUnknownOption => "NODEJS_ERR_PARSE_ARGS_UNKNOWN_OPTION",
            Self::FlagProvidedMultipleTimes => "APIFY_FLAG_PROVIDED_MULTIPLE_TIMES",
            Self::InvalidFlagIntegerValue => "APIFY_INVALID_FLAG_INTEGER_VALUE",
            Self::InvalidChoice => "APIFY_INVALID_CHOICE",
            Self::MissingFlag => "APIFY_MISSING_FLAG",
            Self::MissingArgument => "APIFY_MISSING_ARGUMENT",
            Self::ExclusiveFlags => "APIFY_EXCLUSIVE_FLAGS",
            Self::UnknownError => "APIFY_UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for CommandErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ParseArgsErrorCode> for CommandErrorCode {
    fn from(code: ParseArgsErrorCode) -> Self {
        match code {
            ParseArgsErrorCode::InvalidOptionValue => Self::NodeParseArgsInvalidOptionValue,
            ParseArgsErrorCode::UnexpectedPositional => Self::NodeParseArgsUnexpectedPositional,
            ParseArgsErrorCode::UnknownOption => Self::NodeParseArgsUnknownOption,
        }
    }
}

/// Process facts included in the unknown-error report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub argv: Vec<String>,
    pub cli_version: String,
    pub debug: bool,
    pub stdin_has_data: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CommandError {
    code: CommandErrorCode,
    message: String,
    metadata: Map<String, JsonValue>,
    stack: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code,
            message: if message.is_empty() {
                code.name().to_string()
            } else {
                message
            },
            metadata: Map::new(),
            stack: std::backtrace::Backtrace::capture().to_string(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn code(&self) -> CommandErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Map<String, JsonValue> {
        &self.metadata
    }

    fn meta_str(&self, key: &str) -> &str {
        self.metadata
            .get(key)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    fn meta_list(&self, key: &str) -> Vec<&JsonValue> {
        self.metadata
            .get(key)
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default()
    }

    pub fn provided_multiple_times(flag: &str) -> Self {
        Self::new(
            CommandErrorCode::FlagProvidedMultipleTimes,
            format!("Flag --{flag} can only be specified once"),
        )
        .with_meta("flag", flag)
    }

    pub fn invalid_integer(flag: &str, value: &str) -> Self {
        Self::new(
            CommandErrorCode::InvalidFlagIntegerValue,
            format!("Invalid integer value for --{flag}: {value}"),
        )
        .with_meta("flag", flag)
        .with_meta("value", value)
    }

    pub fn invalid_choice(flag: &str, value: &str, choices: Vec<String>) -> Self {
        Self::new(
            CommandErrorCode::InvalidChoice,
            format!("Invalid value for --{flag}: {value}"),
        )
        .with_meta("flag", flag)
        .with_meta("value", value)
        .with_meta("choices", choices)
    }

    /// `matcher` is the alias actually typed, when it differs from `flag`.
    pub fn missing_flag(flag: &str, matcher: Option<&str>, provided_but_received_no_value: bool) -> Self {
        let mut err = Self::new(
            CommandErrorCode::MissingFlag,
            format!("Missing required flag --{flag}"),
        )
        .with_meta("flag", flag)
        .with_meta("providedButReceivedNoValue", provided_but_received_no_value);
        if let Some(matcher) = matcher {
            err = err.with_meta("matcher", matcher);
        }
        err
    }

    /// `arguments` are `(name, description)` pairs in declaration order.
    pub fn missing_arguments(arguments: &[(String, String)]) -> Self {
        let names: Vec<&str> = arguments.iter().map(|(n, _)| n.as_str()).collect();
        let listed: Vec<JsonValue> = arguments
            .iter()
            .map(|(name, description)| json!({ "name": name, "description": description }))
            .collect();
        Self::new(
            CommandErrorCode::MissingArgument,
            format!("Missing required arguments: {}", names.join(", ")),
        )
        .with_meta("arguments", listed)
    }

    /// `conflicts` are `(flag, representation, conflicting flags)` triples.
    pub fn exclusive_flags(conflicts: &[(String, String, Vec<String>)]) -> Self {
        let names: Vec<&str> = conflicts.iter().map(|(n, _, _)| n.as_str()).collect();
        let listed: Vec<JsonValue> = conflicts
            .iter()
            .map(|(flag, representation, with)| {
                json!({ "flag": flag, "representation": representation, "conflictsWith": with })
            })
            .collect();
        Self::new(
            CommandErrorCode::ExclusiveFlags,
            format!("Flags cannot be used together: {}", names.join(", ")),
        )
        .with_meta("flags", listed)
    }

    /// Normalize any error a command or the binder produced.
    ///
    /// `CommandError` passes through, tokenizer errors are re-wrapped with
    /// their matching code, anything else becomes
    /// [`CommandErrorCode::UnknownError`].
    pub fn into_command_error(err: anyhow::Error) -> Self {
        let err = match err.downcast::<CommandError>() {
            Ok(err) => return err,
            Err(err) => err,
        };
        match err.downcast::<ParseArgsError>() {
            Ok(err) => Self::from(err),
            Err(other) => Self::new(CommandErrorCode::UnknownError, format!("Unknown error: {other}")),
        }
    }

    /// Human readable message. Never fails: text that cannot be recovered
    /// from a tokenizer message yields a request to file a bug instead.
    pub fn pretty_message(&self, diagnostics: &Diagnostics) -> String {
        match self.code {
            CommandErrorCode::NodeParseArgsInvalidOptionValue => {
                match extract::invalid_option_value(&self.message) {
                    Some(data) => message_from_flag_data(&data),
                    None => unparsable(&self.message),
                }
            }
            CommandErrorCode::NodeParseArgsUnknownOption => match extract::unknown_option(&self.message) {
                Some(flag) => self.nonexistent_flag(&flag),
                None => unparsable(&self.message),
            },
            CommandErrorCode::NodeParseArgsUnexpectedPositional => {
                match extract::unexpected_positional(&self.message) {
                    Some(value) => format!(
                        "{}{}{}",
                        gray("Unexpected argument "),
                        bright(&value),
                        gray(". This command does not accept that many positional arguments."),
                    ),
                    None => unparsable(&self.message),
                }
            }
            CommandErrorCode::FlagProvidedMultipleTimes => format!(
                "{}{}{}",
                gray("Flag "),
                highlight(format!("--{}", self.meta_str("flag"))),
                gray(" can only be specified once."),
            ),
            CommandErrorCode::InvalidFlagIntegerValue => format!(
                "{}{}{}{}{}",
                gray("The provided value for the '"),
                highlight(format!("--{}", self.meta_str("flag"))),
                gray("' flag could not be processed as an integer. Received: "),
                bright(self.meta_str("value")),
                gray("."),
            ),
            CommandErrorCode::InvalidChoice => {
                let choices: Vec<String> = self
                    .meta_list("choices")
                    .into_iter()
                    .filter_map(JsonValue::as_str)
                    .map(bright)
                    .collect();
                format!(
                    "{}{}{}{}{}{}{}",
                    gray("Expected "),
                    highlight(format!("--{}", self.meta_str("flag"))),
                    gray(" to be one of the following: "),
                    choices.join(gray(", ").as_str()),
                    gray(". Received: "),
                    bright(self.meta_str("value")),
                    gray("."),
                )
            }
            CommandErrorCode::MissingFlag => self.missing_flag_message(),
            CommandErrorCode::MissingArgument => self.missing_arguments_message(),
            CommandErrorCode::ExclusiveFlags => self.exclusive_flags_message(),
            CommandErrorCode::UnknownError => self.report(diagnostics),
        }
    }

    fn nonexistent_flag(&self, flag: &str) -> String {
        let mut message = format!("{}{}", gray("Nonexistent flag: "), highlight(flag));
        let suggestions: Vec<String> = self
            .meta_list("suggestions")
            .into_iter()
            .filter_map(JsonValue::as_str)
            .map(highlight)
            .collect();
        if !suggestions.is_empty() {
            message.push('\n');
            message.push_str(&gray("Did you mean: "));
            message.push_str(&suggestions.join(gray(", ").as_str()));
            message.push_str(&gray("?"));
        }
        message
    }

    fn missing_flag_message(&self) -> String {
        let mut flag_name = format!(
            "'{}'",
            highlight(format!("--{}", self.meta_str("flag")))
        );
        if let Some(matcher) = self.metadata.get("matcher").and_then(JsonValue::as_str) {
            flag_name = format!(
                "{flag_name}{}{}{}",
                gray(" (alias used: '"),
                highlight(option_spelling(matcher)),
                gray("')"),
            );
        }

        let received_nothing = self
            .metadata
            .get("providedButReceivedNoValue")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        if received_nothing {
            format!(
                "{}{flag_name}{}",
                gray("Flag "),
                gray(
                    " was provided, but no value was received. Did you mean to pass the value as an argument or through standard input?"
                ),
            )
        } else {
            format!(
                "{}{flag_name}{}",
                gray("Flag "),
                gray(" is required, but was not provided.")
            )
        }
    }

    fn missing_arguments_message(&self) -> String {
        let arguments: Vec<(&str, &str)> = self
            .meta_list("arguments")
            .into_iter()
            .map(|a| {
                (
                    a.get("name").and_then(JsonValue::as_str).unwrap_or_default(),
                    a.get("description").and_then(JsonValue::as_str).unwrap_or_default(),
                )
            })
            .collect();
        let width = arguments.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let plural = if arguments.len() == 1 { "" } else { "s" };

        let mut message = gray(format!(
            "Missing {} required argument{plural}:",
            arguments.len()
        ));
        for (name, description) in arguments {
            message.push_str(&format!(
                "\n  {}  {}",
                highlight(format!("{name:width$}")),
                gray(description)
            ));
        }
        message
    }

    fn exclusive_flags_message(&self) -> String {
        let bullet = format!("  {}  ", red(">"));
        let mut lines = vec!["The following errors occurred:".to_string()];
        for entry in self.meta_list("flags") {
            let representation = entry
                .get("representation")
                .and_then(JsonValue::as_str)
                .unwrap_or_default();
            let with: Vec<String> = entry
                .get("conflictsWith")
                .and_then(JsonValue::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(JsonValue::as_str)
                        .map(|name| format!("--{name}"))
                        .collect()
                })
                .unwrap_or_default();
            lines.push(format!(
                "{bullet}{}",
                gray(format!(
                    "{representation} cannot also be provided when using {}",
                    with.join(", ")
                ))
            ));
        }
        lines.push(format!("{bullet}See more help with --help"));
        lines.join("\n")
    }

    fn report(&self, diagnostics: &Diagnostics) -> String {
        let metadata = serde_json::to_string(&self.metadata).unwrap_or_else(|_| "{}".to_string());
        let argv = serde_json::to_string(&diagnostics.argv).unwrap_or_else(|_| "[]".to_string());
        let enabled = |on: bool| if on { "Enabled" } else { "Disabled" };

        [
            "The CLI encountered an unhandled argument parsing error!".to_string(),
            format!(
                "Please report this issue at {ISSUES_URL}, and provide the following information:"
            ),
            String::new(),
            format!("- Error code: {}", self.code.name()),
            format!("- Error message: {}", self.message),
            format!("- Error metadata: {metadata}"),
            String::new(),
            format!("- Stack:\n{}", self.stack),
            String::new(),
            "- Arguments (!!!only provide these as is if there is no sensitive information!!!):"
                .to_string(),
            format!("  {argv}"),
            String::new(),
            format!("- CLI version: `{}`", diagnostics.cli_version),
            format!(
                "- CLI debug logs ({DEBUG_ENV}): {}",
                enabled(diagnostics.debug)
            ),
            format!(
                "- Stdin data? {}",
                if diagnostics.stdin_has_data { "Yes" } else { "No" }
            ),
        ]
        .join("\n")
    }
}

impl From<ParseArgsError> for CommandError {
    fn from(err: ParseArgsError) -> Self {
        Self::new(err.code().into(), err.message())
            .with_meta("tokenizerCode", err.code().as_str())
    }
}

/// Option spelling named by an unknown-option tokenizer message.
pub(crate) fn unknown_option_name(message: &str) -> Option<String> {
    extract::unknown_option(message)
}

/// `--name` for long spellings, `-n` for single characters.
fn option_spelling(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn message_from_flag_data(data: &FlagData) -> String {
    let mut parts = vec![format!("{}{}", gray("Flag "), highlight(format!("--{}", data.name)))];

    if data.ambiguous {
        parts.push(gray(
            "is ambiguous (meaning the provided value could be interpreted as a flag too).",
        ));
        match &data.ambiguous_message {
            Some(hint) => parts.push(gray(format!("\n{hint}"))),
            None => parts.push(gray(format!(
                "To solve this, provide the flag like this: --{}=<value>",
                data.name
            ))),
        }
    } else if data.expects_value {
        parts.push(gray("expects a value"));
    } else {
        parts.push(gray("does not take an argument"));
    }

    parts.join(" ")
}

fn unparsable(message: &str) -> String {
    format!(
        "Encountered unparsable error message from argument parser: {message}.\n\nPlease report this issue at {ISSUES_URL}"
    )
}

/// A command asking the dispatcher to exit with a specific code.
///
/// Returned from [`Command::run`](crate::Command::run); nothing is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("exit code {0}")]
pub struct ExitCode(pub i32);

/// Invalid command declarations, reported at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("command name cannot be empty")]
    EmptyName,
    #[error("flag --{flag} of '{command}' cannot be required and have a default")]
    RequiredWithDefault { command: String, flag: String },
    #[error("default of flag --{flag} of '{command}' does not match its kind")]
    DefaultKindMismatch { command: String, flag: String },
    #[error("choices of flag --{flag} of '{command}' do not match its kind")]
    ChoiceKindMismatch { command: String, flag: String },
    #[error("flag --{flag} of '{command}' is exclusive with undeclared flag --{target}")]
    UnknownExclusiveTarget {
        command: String,
        flag: String,
        target: String,
    },
    #[error("-{short} is declared by both --{first} and --{second} in '{command}'")]
    DuplicateShortFlag {
        command: String,
        short: char,
        first: String,
        second: String,
    },
    #[error("--{spelling} is declared by both --{first} and --{second} in '{command}'")]
    DuplicateFlagSpelling {
        command: String,
        spelling: String,
        first: String,
        second: String,
    },
    #[error("namespace '{command}' cannot declare its own flags or arguments")]
    NamespaceWithParameters { command: String },
    #[error("subcommand '{subcommand}' of '{command}' cannot declare subcommands")]
    NestedNamespace { command: String, subcommand: String },
    #[error("catch-all argument '{arg}' of '{command}' must be the last argument")]
    CatchAllNotLast { command: String, arg: String },
    #[error("required argument '{arg}' of '{command}' follows an optional one")]
    RequiredAfterOptional { command: String, arg: String },
}
