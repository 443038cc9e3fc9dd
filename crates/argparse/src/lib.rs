//! Minimal `parseArgs`-style option tokenizer.
//!
//! This crate is intentionally small and dependency-free. It knows nothing about
//! commands, defaults, required values or help text: it only splits `argv` into
//! option occurrences and positionals according to a declared option table.
//!
//! Everything above that (repeated flags, integer coercion, choices, stdin
//! fallbacks) is done by `apify-framework` on top of [`ParsedArgs`].
//!
//! Error messages follow the wording of the Node.js `util.parseArgs` tokenizer,
//! because the framework recovers structured data from them.

pub mod config {
    /// Value type of a declared option.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OptionType {
        /// Consumes a value (`--name value` or `--name=value`).
        String,
        /// Never consumes the following token.
        Boolean,
    }

    /// A single entry of the option table.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OptionDef {
        kind: OptionType,
        short: Option<char>,
        multiple: bool,
    }

    impl OptionDef {
        pub fn new(kind: OptionType) -> Self {
            Self {
                kind,
                short: None,
                multiple: false,
            }
        }

        pub fn string() -> Self {
            Self::new(OptionType::String)
        }

        pub fn boolean() -> Self {
            Self::new(OptionType::Boolean)
        }

        /// Single-character short form (`-b`).
        pub fn short(mut self, short: char) -> Self {
            self.short = Some(short);
            self
        }

        /// Keep every occurrence instead of only the last one.
        pub fn multiple(mut self, multiple: bool) -> Self {
            self.multiple = multiple;
            self
        }

        pub fn kind(&self) -> OptionType {
            self.kind
        }

        pub fn short_name(&self) -> Option<char> {
            self.short
        }

        pub fn is_multiple(&self) -> bool {
            self.multiple
        }

        pub fn takes_value(&self) -> bool {
            self.kind == OptionType::String
        }
    }

    /// Option table plus tokenizer mode switches.
    #[derive(Debug, Clone)]
    pub struct ParseArgsConfig {
        options: Vec<(String, OptionDef)>,
        strict: bool,
        allow_positionals: bool,
        reject_dash_values: bool,
    }

    impl Default for ParseArgsConfig {
        fn default() -> Self {
            Self {
                options: Vec::new(),
                strict: true,
                allow_positionals: false,
                reject_dash_values: true,
            }
        }
    }

    impl ParseArgsConfig {
        pub fn new() -> Self {
            Self::default()
        }

        /// Declare an option. A later declaration with the same name replaces
        /// the earlier one.
        pub fn option(mut self, name: impl Into<String>, def: OptionDef) -> Self {
            self.push_option(name, def);
            self
        }

        pub fn push_option(&mut self, name: impl Into<String>, def: OptionDef) {
            let name = name.into();
            if let Some(slot) = self.options.iter_mut().find(|(n, _)| *n == name) {
                slot.1 = def;
            } else {
                self.options.push((name, def));
            }
        }

        /// In strict mode unknown options, inline values on booleans and
        /// unexpected positionals are rejected.
        pub fn strict(mut self, strict: bool) -> Self {
            self.strict = strict;
            self
        }

        /// Reject a dash-prefixed token as the value of a value-taking
        /// option (`--foo --bar`). On by default, independent of `strict`.
        pub fn reject_dash_values(mut self, reject: bool) -> Self {
            self.reject_dash_values = reject;
            self
        }

        pub fn allow_positionals(mut self, allow: bool) -> Self {
            self.allow_positionals = allow;
            self
        }

        pub fn options(&self) -> &[(String, OptionDef)] {
            self.options.as_slice()
        }

        pub fn get(&self, name: &str) -> Option<&OptionDef> {
            self.options
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, def)| def)
        }

        pub fn is_strict(&self) -> bool {
            self.strict
        }

        pub fn allows_positionals(&self) -> bool {
            self.allow_positionals
        }

        pub fn rejects_dash_values(&self) -> bool {
            self.reject_dash_values
        }

        pub(crate) fn find_short(&self, short: char) -> Option<(&str, &OptionDef)> {
            self.options
                .iter()
                .find(|(_, def)| def.short == Some(short))
                .map(|(n, def)| (n.as_str(), def))
        }
    }
}

pub mod error {
    use std::fmt;

    /// Machine-readable tokenizer failure kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ParseArgsErrorCode {
        InvalidOptionValue,
        UnexpectedPositional,
        UnknownOption,
    }

    impl ParseArgsErrorCode {
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::InvalidOptionValue => "ERR_PARSE_ARGS_INVALID_OPTION_VALUE",
                Self::UnexpectedPositional => "ERR_PARSE_ARGS_UNEXPECTED_POSITIONAL",
                Self::UnknownOption => "ERR_PARSE_ARGS_UNKNOWN_OPTION",
            }
        }
    }

    impl fmt::Display for ParseArgsErrorCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ParseArgsError {
        code: ParseArgsErrorCode,
        message: String,
    }

    impl ParseArgsError {
        pub fn new(code: ParseArgsErrorCode, message: impl Into<String>) -> Self {
            Self {
                code,
                message: message.into(),
            }
        }

        pub fn code(&self) -> ParseArgsErrorCode {
            self.code
        }

        pub fn message(&self) -> &str {
            &self.message
        }

        /// `short_and_long` is the rendered option, e.g. `-f, --foo`.
        pub fn missing_value(short_and_long: &str) -> Self {
            Self::new(
                ParseArgsErrorCode::InvalidOptionValue,
                format!("Option '{short_and_long} <value>' argument missing"),
            )
        }

        pub fn unexpected_value(short_and_long: &str) -> Self {
            Self::new(
                ParseArgsErrorCode::InvalidOptionValue,
                format!("Option '{short_and_long}' does not take an argument"),
            )
        }

        pub fn ambiguous_value(short_and_long: &str, raw_name: &str, name: &str) -> Self {
            let example = if raw_name.starts_with("--") {
                format!("'--{name}=-XYZ'")
            } else {
                format!("'--{name}=-XYZ' or '{raw_name}-XYZ'")
            };
            Self::new(
                ParseArgsErrorCode::InvalidOptionValue,
                format!(
                    "Option '{short_and_long}' argument is ambiguous.\n\
                     Did you forget to specify the option argument for '{raw_name}'?\n\
                     To specify an option argument starting with a dash use {example}."
                ),
            )
        }

        pub fn unknown_option(raw_name: &str, allow_positionals: bool) -> Self {
            let message = if allow_positionals {
                format!(
                    "Unknown option '{raw_name}'. To specify a positional argument starting with a '-', \
                     place it at the end of the command after '--', as in '-- \"{raw_name}\""
                )
            } else {
                format!("Unknown option '{raw_name}'")
            };
            Self::new(ParseArgsErrorCode::UnknownOption, message)
        }

        pub fn unexpected_positional(value: &str) -> Self {
            Self::new(
                ParseArgsErrorCode::UnexpectedPositional,
                format!(
                    "Unexpected argument '{value}'. This command does not take positional arguments"
                ),
            )
        }
    }

    impl fmt::Display for ParseArgsError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for ParseArgsError {}
}

pub mod tokens {
    /// Value recorded for one option occurrence.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum OptionValue {
        Str(String),
        Bool(bool),
        /// A value-taking option was the last token, so nothing followed it.
        Missing,
    }

    impl OptionValue {
        pub fn as_str(&self) -> Option<&str> {
            match self {
                Self::Str(s) => Some(s.as_str()),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Token {
        Option {
            /// Index into argv of the token that introduced the option.
            index: usize,
            /// Table key (long name), or the bare short letter for unknown shorts.
            name: String,
            /// Spelling used on the command line, e.g. `-b` or `--build`.
            raw_name: String,
            value: OptionValue,
            inline_value: bool,
            known: bool,
        },
        Positional {
            index: usize,
            value: String,
        },
        Terminator {
            index: usize,
        },
    }

    /// Result of [`crate::parse_args`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ParsedArgs {
        values: Vec<(String, Vec<OptionValue>)>,
        positionals: Vec<String>,
        tokens: Vec<Token>,
    }

    impl ParsedArgs {
        /// Recorded values for an option key. Options declared without
        /// `multiple` only keep their last value.
        pub fn values(&self, name: &str) -> &[OptionValue] {
            self.values
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_slice())
                .unwrap_or(&[])
        }

        pub fn last(&self, name: &str) -> Option<&OptionValue> {
            self.values(name).last()
        }

        /// How many times the key occurred in argv, regardless of `multiple`.
        pub fn occurrences(&self, name: &str) -> usize {
            self.tokens
                .iter()
                .filter(|t| matches!(t, Token::Option { name: n, .. } if n == name))
                .count()
        }

        pub fn is_present(&self, name: &str) -> bool {
            self.values.iter().any(|(n, _)| n == name)
        }

        pub fn option_names(&self) -> impl Iterator<Item = &str> {
            self.values.iter().map(|(n, _)| n.as_str())
        }

        pub fn positionals(&self) -> &[String] {
            self.positionals.as_slice()
        }

        pub fn tokens(&self) -> &[Token] {
            self.tokens.as_slice()
        }
    }

    impl ParsedArgs {
        pub(crate) fn push_option(&mut self, token: Token, multiple: bool) {
            if let Token::Option { name, value, .. } = &token {
                match self.values.iter_mut().find(|(n, _)| n == name) {
                    Some((_, values)) if multiple => values.push(value.clone()),
                    Some((_, values)) => *values = vec![value.clone()],
                    None => self.values.push((name.clone(), vec![value.clone()])),
                }
            }
            self.tokens.push(token);
        }

        pub(crate) fn push_positional(&mut self, index: usize, value: &str) {
            self.positionals.push(value.to_string());
            self.tokens.push(Token::Positional {
                index,
                value: value.to_string(),
            });
        }

        pub(crate) fn push_terminator(&mut self, index: usize) {
            self.tokens.push(Token::Terminator { index });
        }
    }
}

pub use config::{OptionDef, OptionType, ParseArgsConfig};
pub use error::{ParseArgsError, ParseArgsErrorCode};
pub use tokens::{OptionValue, ParsedArgs, Token};

/// Render an option the way it appears in error messages (`-f, --foo`).
fn short_and_long(name: &str, def: &OptionDef) -> String {
    match def.short_name() {
        Some(short) => format!("-{short}, --{name}"),
        None => format!("--{name}"),
    }
}

/// Pull the value for a value-taking option out of the next argv token.
///
/// Whatever follows is consumed, unless it is dash-prefixed and the config
/// rejects dash values: then it is reported as ambiguous.
fn take_next_value(
    config: &ParseArgsConfig,
    argv: &[String],
    index: usize,
    name: &str,
    raw_name: &str,
    def: &OptionDef,
) -> Result<(OptionValue, usize), ParseArgsError> {
    let Some(next) = argv.get(index + 1) else {
        return Ok((OptionValue::Missing, 0));
    };
    if config.rejects_dash_values() && next.len() > 1 && next.starts_with('-') {
        return Err(ParseArgsError::ambiguous_value(
            &short_and_long(name, def),
            raw_name,
            name,
        ));
    }
    Ok((OptionValue::Str(next.clone()), 1))
}

/// Tokenize `argv` against the option table in `config`.
///
/// Supports `--name value`, `--name=value`, `-n value`, `-nvalue`, grouped
/// boolean shorts (`-abc`) and the `--` terminator. A lone `-` is a
/// positional. A value-taking option at the very end of argv is recorded as
/// [`OptionValue::Missing`]; deciding whether that is an error is left to the
/// caller.
pub fn parse_args(config: &ParseArgsConfig, argv: &[String]) -> Result<ParsedArgs, ParseArgsError> {
    let mut out = ParsedArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        if arg == "--" {
            out.push_terminator(i);
            for (offset, rest) in argv[i + 1..].iter().enumerate() {
                if config.is_strict() && !config.allows_positionals() {
                    return Err(ParseArgsError::unexpected_positional(rest));
                }
                out.push_positional(i + 1 + offset, rest);
            }
            break;
        }

        if let Some(body) = arg.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let raw_name = format!("--{name}");
            let mut skip = 0;

            let (value, known, multiple) = match config.get(name) {
                Some(def) if def.takes_value() => {
                    let value = match inline {
                        Some(v) => OptionValue::Str(v.to_string()),
                        None => {
                            let (value, consumed) =
                                take_next_value(config, argv, i, name, &raw_name, def)?;
                            skip = consumed;
                            value
                        }
                    };
                    (value, true, def.is_multiple())
                }
                Some(def) => {
                    let value = match inline {
                        Some(_) if config.is_strict() => {
                            return Err(ParseArgsError::unexpected_value(&short_and_long(
                                name, def,
                            )));
                        }
                        Some(v) => OptionValue::Str(v.to_string()),
                        None => OptionValue::Bool(true),
                    };
                    (value, true, def.is_multiple())
                }
                None if config.is_strict() => {
                    return Err(ParseArgsError::unknown_option(
                        &raw_name,
                        config.allows_positionals(),
                    ));
                }
                None => {
                    let value = match inline {
                        Some(v) => OptionValue::Str(v.to_string()),
                        None => OptionValue::Bool(true),
                    };
                    (value, false, false)
                }
            };

            out.push_option(
                Token::Option {
                    index: i,
                    name: name.to_string(),
                    raw_name,
                    value,
                    inline_value: inline.is_some(),
                    known,
                },
                multiple,
            );
            i += 1 + skip;
            continue;
        }

        if arg.len() > 1 && arg.starts_with('-') {
            let shorts: Vec<char> = arg[1..].chars().collect();
            let mut skip = 0;

            for (pos, short) in shorts.iter().copied().enumerate() {
                let raw_name = format!("-{short}");
                let Some((name, def)) = config.find_short(short) else {
                    if config.is_strict() {
                        return Err(ParseArgsError::unknown_option(
                            &raw_name,
                            config.allows_positionals(),
                        ));
                    }
                    out.push_option(
                        Token::Option {
                            index: i,
                            name: short.to_string(),
                            raw_name,
                            value: OptionValue::Bool(true),
                            inline_value: false,
                            known: false,
                        },
                        false,
                    );
                    continue;
                };

                if !def.takes_value() {
                    out.push_option(
                        Token::Option {
                            index: i,
                            name: name.to_string(),
                            raw_name,
                            value: OptionValue::Bool(true),
                            inline_value: false,
                            known: true,
                        },
                        def.is_multiple(),
                    );
                    continue;
                }

                // The rest of the group is this option's value (`-ovalue`).
                let attached: String = shorts[pos + 1..].iter().collect();
                let (value, inline_value) = if attached.is_empty() {
                    let (value, consumed) = take_next_value(config, argv, i, name, &raw_name, def)?;
                    skip = consumed;
                    (value, false)
                } else {
                    (OptionValue::Str(attached), true)
                };
                out.push_option(
                    Token::Option {
                        index: i,
                        name: name.to_string(),
                        raw_name,
                        value,
                        inline_value,
                        known: true,
                    },
                    def.is_multiple(),
                );
                break;
            }

            i += 1 + skip;
            continue;
        }

        if config.is_strict() && !config.allows_positionals() {
            return Err(ParseArgsError::unexpected_positional(arg));
        }
        out.push_positional(i, arg);
        i += 1;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn build_config() -> ParseArgsConfig {
        ParseArgsConfig::new()
            .allow_positionals(true)
            .option("build", OptionDef::string().short('b').multiple(true))
            .option("verbose", OptionDef::boolean().short('v').multiple(true))
            .option("quiet", OptionDef::boolean().short('q'))
    }

    #[test]
    fn parses_long_short_and_positionals() {
        let parsed = parse_args(
            &build_config(),
            &argv(&["--build", "1.2", "-v", "actor", "extra"]),
        )
        .unwrap();

        assert_eq!(parsed.last("build"), Some(&OptionValue::Str("1.2".into())));
        assert_eq!(parsed.last("verbose"), Some(&OptionValue::Bool(true)));
        assert_eq!(parsed.positionals(), &["actor".to_string(), "extra".to_string()]);
    }

    #[test]
    fn supports_inline_and_attached_values() {
        let parsed = parse_args(&build_config(), &argv(&["--build=latest", "-qvb0.1"])).unwrap();
        assert_eq!(
            parsed.values("build"),
            &[
                OptionValue::Str("latest".into()),
                OptionValue::Str("0.1".into())
            ]
        );
        assert!(parsed.is_present("quiet"));
        assert!(parsed.is_present("verbose"));
        assert_eq!(parsed.occurrences("build"), 2);
    }

    #[test]
    fn dash_value_is_consumed_when_allowed() {
        let config = build_config().reject_dash_values(false);
        let parsed = parse_args(&config, &argv(&["--build", "--verbose"])).unwrap();
        assert_eq!(
            parsed.last("build"),
            Some(&OptionValue::Str("--verbose".into()))
        );
        assert!(!parsed.is_present("verbose"));
    }

    #[test]
    fn dash_value_is_ambiguous_in_strict_mode() {
        let err = parse_args(&build_config(), &argv(&["-b", "-x"])).unwrap_err();
        assert_eq!(err.code(), ParseArgsErrorCode::InvalidOptionValue);
        assert!(
            err.message()
                .starts_with("Option '-b, --build' argument is ambiguous."),
            "unexpected message: {}",
            err.message()
        );
        assert!(err.message().contains("'--build=-XYZ' or '-b-XYZ'"));
    }

    #[test]
    fn dash_value_is_ambiguous_in_loose_mode_too() {
        let err = parse_args(&build_config().strict(false), &argv(&["--build", "--verbose"]))
            .unwrap_err();
        assert_eq!(err.code(), ParseArgsErrorCode::InvalidOptionValue);
        assert!(err.message().contains("'--build=-XYZ'"), "{}", err.message());
    }

    #[test]
    fn lone_dash_is_a_value() {
        let parsed = parse_args(&build_config(), &argv(&["--build", "-"])).unwrap();
        assert_eq!(parsed.last("build"), Some(&OptionValue::Str("-".into())));

        let parsed = parse_args(&build_config(), &argv(&["-"])).unwrap();
        assert_eq!(parsed.positionals(), &["-".to_string()]);
    }

    #[test]
    fn trailing_value_option_is_recorded_as_missing() {
        let parsed = parse_args(&build_config(), &argv(&["actor", "--build"])).unwrap();
        assert_eq!(parsed.last("build"), Some(&OptionValue::Missing));
        match &parsed.tokens()[1] {
            Token::Option { raw_name, .. } => assert_eq!(raw_name, "--build"),
            other => panic!("expected option token, got: {other:?}"),
        }
    }

    #[test]
    fn boolean_with_inline_value_is_rejected_when_strict() {
        let err = parse_args(&build_config(), &argv(&["--verbose=yes"])).unwrap_err();
        assert_eq!(err.code(), ParseArgsErrorCode::InvalidOptionValue);
        assert_eq!(
            err.message(),
            "Option '-v, --verbose' does not take an argument"
        );

        let parsed = parse_args(&build_config().strict(false), &argv(&["--verbose=yes"])).unwrap();
        assert_eq!(parsed.last("verbose"), Some(&OptionValue::Str("yes".into())));
    }

    #[test]
    fn unknown_options_depend_on_strictness() {
        let err = parse_args(&build_config(), &argv(&["--nope"])).unwrap_err();
        assert_eq!(err.code(), ParseArgsErrorCode::UnknownOption);
        assert!(err.message().starts_with("Unknown option '--nope'."));

        let parsed = parse_args(&build_config().strict(false), &argv(&["--nope", "-z"])).unwrap();
        assert!(parsed.is_present("nope"));
        assert!(parsed.is_present("z"));
        assert!(parsed.tokens().iter().all(|t| matches!(
            t,
            Token::Option { known: false, .. }
        )));
    }

    #[test]
    fn non_multiple_option_keeps_last_value_but_counts_occurrences() {
        let parsed = parse_args(&build_config(), &argv(&["-q", "--quiet"])).unwrap();
        assert_eq!(parsed.values("quiet"), &[OptionValue::Bool(true)]);
        assert_eq!(parsed.occurrences("quiet"), 2);
    }

    #[test]
    fn terminator_turns_everything_after_into_positionals() {
        let parsed = parse_args(&build_config(), &argv(&["--", "--build", "-v"])).unwrap();
        assert!(!parsed.is_present("build"));
        assert_eq!(
            parsed.positionals(),
            &["--build".to_string(), "-v".to_string()]
        );
    }

    #[test]
    fn positionals_rejected_when_not_allowed() {
        let config = ParseArgsConfig::new().option("quiet", OptionDef::boolean());
        let err = parse_args(&config, &argv(&["stray"])).unwrap_err();
        match err.code() {
            ParseArgsErrorCode::UnexpectedPositional => assert_eq!(
                err.message(),
                "Unexpected argument 'stray'. This command does not take positional arguments"
            ),
            other => panic!("expected UnexpectedPositional, got: {other:?}"),
        }
    }

    #[test]
    fn redeclaring_an_option_replaces_it() {
        let config = ParseArgsConfig::new()
            .option("x", OptionDef::boolean())
            .option("x", OptionDef::string());
        assert_eq!(config.options().len(), 1);
        assert!(config.get("x").is_some_and(OptionDef::takes_value));
    }
}
