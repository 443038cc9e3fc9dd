//! Bind argv against a command descriptor.
//!
//! The descriptor's flags are turned into a tokenizer option table (one entry
//! per spelling), argv is tokenized, and the result is post-processed in a
//! fixed order:
//!
//! 1. repeated flags
//! 2. integer coercion and choices
//! 3. stdin substitution for `-` and for value-less flags
//! 4. missing required flags and arguments, with stdin fallback
//! 5. mutual exclusion
//! 6. defaults
//!
//! Binding is all-or-nothing: the first failure is returned and no partial
//! [`ParsedInvocation`] escapes.

use crate::command::CommandDescriptor;
use crate::error::CommandError;
use crate::flags::{FlagDescriptor, FlagKind, StdinMode};
use crate::invocation::{ParsedInvocation, Value};
use crate::stdin::StdinSnapshot;
use crate::suggest;
use apify_argparse::{
    OptionValue, ParseArgsConfig, ParseArgsError, ParseArgsErrorCode, ParsedArgs, Token,
    parse_args,
};
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// First occurrence of a flag in argv.
struct Occurrence<'p> {
    raw_name: &'p str,
    value: &'p OptionValue,
}

/// Tokenizer keys owned by each canonical flag.
struct FlagKeys<'d> {
    keys: Vec<(&'d str, Vec<String>)>,
}

impl<'d> FlagKeys<'d> {
    fn new(descriptor: &'d CommandDescriptor) -> (Self, ParseArgsConfig) {
        let mut config = ParseArgsConfig::new()
            .strict(descriptor.is_strict())
            .allow_positionals(true);
        let mut keys = Vec::new();

        for (name, flag) in descriptor.flags() {
            let entries = flag.tokenizer_entries(name);
            let spelled: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
            for (key, def) in entries {
                config.push_option(key, def);
            }
            keys.push((name.as_str(), spelled));
        }

        (Self { keys }, config)
    }

    fn of(&self, name: &str) -> &[String] {
        self.keys
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, k)| k.as_slice())
            .unwrap_or(&[])
    }

    /// Declared spellings only; an undeclared `-a` on a loose command is not
    /// an occurrence of a flag named `a`.
    fn occurrences(&self, parsed: &ParsedArgs, name: &str) -> usize {
        let keys = self.of(name);
        parsed
            .tokens()
            .iter()
            .filter(|token| {
                matches!(token, Token::Option { name: key, known: true, .. } if keys.contains(key))
            })
            .count()
    }

    fn first<'p>(&self, parsed: &'p ParsedArgs, name: &str) -> Option<Occurrence<'p>> {
        let keys = self.of(name);
        parsed.tokens().iter().find_map(|token| match token {
            Token::Option {
                name: key,
                raw_name,
                value,
                known: true,
                ..
            } if keys.contains(key) => Some(Occurrence {
                raw_name: raw_name.as_str(),
                value,
            }),
            _ => None,
        })
    }
}

/// Stdin content is handed to at most one flag or argument.
struct StdinSource<'s> {
    snapshot: &'s StdinSnapshot,
    taken: Cell<bool>,
}

impl<'s> StdinSource<'s> {
    fn new(snapshot: &'s StdinSnapshot) -> Self {
        Self {
            snapshot,
            taken: Cell::new(false),
        }
    }

    /// Stdin as a value for `name`, coerced for `kind`.
    fn take(&self, name: &str, mode: StdinMode, kind: FlagKind) -> Result<Option<Value>, CommandError> {
        if mode == StdinMode::None || self.taken.get() {
            return Ok(None);
        }
        let Some(bytes) = self.snapshot.data() else {
            return Ok(None);
        };
        self.taken.set(true);
        tracing::debug!(name, ?mode, bytes = bytes.len(), "using stdin as value");

        let value = match (mode, kind) {
            (StdinMode::Raw, FlagKind::String) => Value::Bytes(bytes.to_vec()),
            (_, FlagKind::Integer) => {
                let text = String::from_utf8_lossy(bytes);
                Value::Integer(parse_integer(name, text.trim())?)
            }
            _ => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        };
        Ok(Some(value))
    }
}

/// Bind `argv` (the tokens after the command name) against `descriptor`.
pub fn bind(
    descriptor: &CommandDescriptor,
    argv: &[String],
    stdin: &StdinSnapshot,
) -> Result<ParsedInvocation, CommandError> {
    let (flag_keys, config) = FlagKeys::new(descriptor);
    tracing::debug!(
        command = descriptor.name(),
        options = ?config.options(),
        strict = config.is_strict(),
        "built tokenizer config"
    );

    let parsed = parse_args(&config, argv).map_err(|err| tokenizer_error(err, descriptor))?;
    let stdin = StdinSource::new(stdin);

    for (name, _) in descriptor.flags() {
        if flag_keys.occurrences(&parsed, name) > 1 {
            return Err(CommandError::provided_multiple_times(name));
        }
    }

    let mut flags: IndexMap<String, Option<Value>> = IndexMap::new();
    let mut supplied = Vec::new();
    for (name, flag) in descriptor.flags() {
        let key = name.to_lower_camel_case();
        let value = match flag_keys.first(&parsed, name) {
            Some(occurrence) => {
                supplied.push(name.clone());
                Some(supplied_value(name, flag, &occurrence, &stdin)?)
            }
            None => None,
        };
        if let Some(value) = &value {
            check_choice(name, flag, value)?;
        }
        flags.insert(key, value);
    }

    let args = bind_positionals(descriptor, parsed.positionals(), &stdin)?;

    for (name, flag) in descriptor.flags() {
        let key = name.to_lower_camel_case();
        let unresolved = flags.get(&key).is_none_or(Option::is_none);
        if !unresolved || !flag.is_required() || flag.default_value().is_some() {
            continue;
        }
        match stdin.take(name, flag.stdin_mode(), flag.kind())? {
            Some(value) => {
                check_choice(name, flag, &value)?;
                flags.insert(key, Some(value));
            }
            None => return Err(CommandError::missing_flag(name, None, false)),
        }
    }

    check_exclusive(descriptor, &supplied, &flags)?;

    for (name, flag) in descriptor.flags() {
        if let Some(slot) = flags.get_mut(&name.to_lower_camel_case()) {
            if slot.is_none() {
                *slot = flag.default_value().cloned();
            }
        }
    }

    Ok(ParsedInvocation {
        flags,
        args,
        supplied_flags: supplied,
    })
}

/// Re-wrap a tokenizer failure, adding close flag names for unknown options.
fn tokenizer_error(err: ParseArgsError, descriptor: &CommandDescriptor) -> CommandError {
    let code = err.code();
    let unknown = match code {
        ParseArgsErrorCode::UnknownOption => crate::error::unknown_option_name(err.message()),
        _ => None,
    };
    let wrapped = CommandError::from(err).with_meta("command", descriptor.name());

    let Some(unknown) = unknown else {
        return wrapped;
    };
    let candidates: Vec<String> = descriptor
        .flags()
        .iter()
        .filter(|(_, f)| !f.is_hidden())
        .flat_map(|(name, f)| {
            std::iter::once(format!("--{name}"))
                .chain(f.aliases().iter().map(|a| format!("--{a}")))
        })
        .collect();
    let suggestions: Vec<String> = suggest::closest(&unknown, candidates.iter().map(String::as_str))
        .into_iter()
        .map(str::to_string)
        .collect();
    wrapped.with_meta("suggestions", suggestions)
}

fn supplied_value(
    name: &str,
    flag: &FlagDescriptor,
    occurrence: &Occurrence<'_>,
    stdin: &StdinSource<'_>,
) -> Result<Value, CommandError> {
    let matcher = alias_used(name, occurrence.raw_name);
    let from_stdin = || -> Result<Value, CommandError> {
        stdin
            .take(name, flag.stdin_mode(), flag.kind())?
            .ok_or_else(|| CommandError::missing_flag(name, matcher, true))
    };

    match (flag.kind(), occurrence.value) {
        (FlagKind::Boolean, OptionValue::Str(raw)) => Ok(Value::Boolean(parse_bool(raw))),
        (FlagKind::Boolean, _) => Ok(Value::Boolean(true)),
        (_, OptionValue::Missing | OptionValue::Bool(_)) => from_stdin(),
        (_, OptionValue::Str(raw)) if raw == "-" && flag.stdin_mode() != StdinMode::None => {
            from_stdin()
        }
        (FlagKind::Integer, OptionValue::Str(raw)) => Ok(Value::Integer(parse_integer(name, raw)?)),
        (FlagKind::String, OptionValue::Str(raw)) => Ok(Value::String(raw.clone())),
    }
}

/// The spelling typed, without dashes, when it is not the canonical name.
fn alias_used<'a>(canonical: &str, raw_name: &'a str) -> Option<&'a str> {
    let bare = raw_name.trim_start_matches('-');
    (bare != canonical).then_some(bare)
}

fn parse_bool(raw: &str) -> bool {
    !matches!(raw.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off" | "")
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, CommandError> {
    raw.parse::<i64>()
        .map_err(|_| CommandError::invalid_integer(name, raw))
}

fn check_choice(name: &str, flag: &FlagDescriptor, value: &Value) -> Result<(), CommandError> {
    let choices = flag.choice_values();
    if choices.is_empty() || choices.contains(value) {
        return Ok(());
    }
    Err(CommandError::invalid_choice(
        name,
        &value.to_string(),
        choices.iter().map(Value::to_string).collect(),
    ))
}

fn bind_positionals(
    descriptor: &CommandDescriptor,
    positionals: &[String],
    stdin: &StdinSource<'_>,
) -> Result<IndexMap<String, Option<Value>>, CommandError> {
    let mut remaining = positionals.iter();
    let mut args: IndexMap<String, Option<Value>> = IndexMap::new();
    let mut missing: Vec<(String, String)> = Vec::new();

    for (name, arg) in descriptor.args() {
        let raw = if arg.is_catch_all() {
            let rest: Vec<&str> = remaining.by_ref().map(String::as_str).collect();
            (!rest.is_empty()).then(|| rest.join(" "))
        } else {
            remaining.next().cloned()
        };

        let mut value = match raw {
            Some(raw) if raw == "-" && arg.stdin_mode() != StdinMode::None => {
                stdin.take(name, arg.stdin_mode(), FlagKind::String)?
            }
            Some(raw) => Some(Value::String(raw)),
            None => None,
        };

        if value.is_none() && arg.is_required() {
            value = stdin.take(name, arg.stdin_mode(), FlagKind::String)?;
            if value.is_none() {
                missing.push((name.clone(), arg.description_text().to_string()));
            }
        }
        if value.is_none() {
            value = arg.default_value().cloned();
        }
        args.insert(name.to_lower_camel_case(), value);
    }

    if let Some(extra) = remaining.next() {
        if descriptor.is_strict() {
            return Err(CommandError::from(ParseArgsError::unexpected_positional(extra))
                .with_meta("command", descriptor.name()));
        }
        tracing::debug!(extra = %extra, "ignoring extra positionals");
    }

    if !missing.is_empty() {
        return Err(CommandError::missing_arguments(&missing));
    }
    Ok(args)
}

/// Symmetric closure of the declared exclusions: if `a` excludes `b`, `b`
/// excludes `a` too.
fn exclusion_graph(descriptor: &CommandDescriptor) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (name, flag) in descriptor.flags() {
        for other in flag.exclusive_with() {
            if other == name {
                continue;
            }
            graph.entry(name.as_str()).or_default().insert(other.as_str());
            graph.entry(other.as_str()).or_default().insert(name.as_str());
        }
    }
    graph
}

fn check_exclusive(
    descriptor: &CommandDescriptor,
    supplied: &[String],
    bound: &IndexMap<String, Option<Value>>,
) -> Result<(), CommandError> {
    let graph = exclusion_graph(descriptor);
    let mut conflicts = Vec::new();

    for name in supplied {
        let Some(excluded) = graph.get(name.as_str()) else {
            continue;
        };
        let with: Vec<String> = supplied
            .iter()
            .filter(|other| excluded.contains(other.as_str()))
            .cloned()
            .collect();
        if with.is_empty() {
            continue;
        }
        let representation = match bound.get(&name.to_lower_camel_case()) {
            Some(Some(Value::Boolean(_))) | Some(None) | None => format!("--{name}"),
            Some(Some(value)) => format!("--{name}={value}"),
        };
        conflicts.push((name.clone(), representation, with));
    }

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(CommandError::exclusive_flags(&conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandErrorCode;
    use crate::{args, flags};
    use pretty_assertions::assert_eq;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn bind_tty(descriptor: &CommandDescriptor, items: &[&str]) -> Result<ParsedInvocation, CommandError> {
        bind(descriptor, &argv(items), &StdinSnapshot::interactive())
    }

    fn call_command() -> CommandDescriptor {
        CommandDescriptor::new("call")
            .arg("actorId", args::string().description("Name or ID of the Actor."))
            .flag("build", flags::string().char('b'))
            .flag("memory", flags::integer().char('m'))
            .flag(
                "wait-for-finish",
                flags::integer().char('w').alias("wait"),
            )
            .flag(
                "input",
                flags::string()
                    .char('i')
                    .stdin(StdinMode::Stringified)
                    .exclusive(["input-file"]),
            )
            .flag("input-file", flags::string().alias("if"))
            .flag("silent", flags::boolean().char('s'))
            .flag("format", flags::string().choices(["json", "csv"]).default("json"))
    }

    fn flag_test_command() -> CommandDescriptor {
        CommandDescriptor::new("_flag")
            .flag("foo", flags::string().required().stdin(StdinMode::Stringified))
            .flag("bar", flags::string())
            .flag("choice", flags::string().alias("alias1").choices(["1", "2", "3"]))
            .flag("int", flags::integer().default(1))
    }

    #[test]
    fn binds_flags_args_and_defaults() {
        let inv = bind_tty(
            &call_command(),
            &["my-actor", "-b", "beta", "--memory", "512", "-s"],
        )
        .unwrap();

        assert_eq!(inv.arg_str("actorId"), Some("my-actor"));
        assert_eq!(inv.flag_str("build"), Some("beta"));
        assert_eq!(inv.flag_i64("memory"), Some(512));
        assert!(inv.flag_bool("silent"));
        assert_eq!(inv.flag_str("format"), Some("json"));
        assert_eq!(inv.flag("input"), None);
        assert_eq!(inv.supplied_flags(), ["build", "memory", "silent"]);
    }

    #[test]
    fn every_spelling_binds_to_the_same_camel_case_key() {
        for spelling in [
            &["--wait-for-finish", "5"][..],
            &["-w", "5"],
            &["--wait", "5"],
            &["--wait-for-finish=5"],
            &["-w5"],
        ] {
            let inv = bind_tty(&call_command(), spelling).unwrap();
            assert_eq!(
                inv.flags().get("waitForFinish"),
                Some(&Some(Value::Integer(5))),
                "spelling {spelling:?}"
            );
        }
    }

    #[test]
    fn repeated_flag_is_rejected_for_every_kind() {
        for items in [
            &["--build", "a", "--build", "b"][..],
            &["-b", "a", "--build", "b"],
            &["-s", "--silent"],
            &["--memory", "1", "-m", "2"],
            &["-w", "1", "--wait", "2"],
        ] {
            let err = bind_tty(&call_command(), items).unwrap_err();
            assert_eq!(
                err.code(),
                CommandErrorCode::FlagProvidedMultipleTimes,
                "argv {items:?}"
            );
        }
    }

    #[test]
    fn non_numeric_integer_names_flag_and_value() {
        let err = bind_tty(&call_command(), &["--memory", "abc"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::InvalidFlagIntegerValue);
        assert_eq!(err.metadata()["flag"], "memory");
        assert_eq!(err.metadata()["value"], "abc");
    }

    #[test]
    fn value_outside_choices_is_rejected() {
        let err = bind_tty(&call_command(), &["--format", "xml"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::InvalidChoice);
        assert_eq!(err.metadata()["choices"], serde_json::json!(["json", "csv"]));

        let inv = bind_tty(&flag_test_command(), &["--foo", "x", "--alias1", "2"]).unwrap();
        assert_eq!(inv.flag_str("choice"), Some("2"));
    }

    #[test]
    fn missing_required_flag() {
        let err = bind_tty(&flag_test_command(), &[]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::MissingFlag);
        assert_eq!(err.metadata()["providedButReceivedNoValue"], false);

        let err = bind_tty(&flag_test_command(), &["--foo"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::MissingFlag);
        assert_eq!(err.metadata()["flag"], "foo");
        assert_eq!(err.metadata()["providedButReceivedNoValue"], true);
        assert!(err.metadata().get("matcher").is_none());
    }

    #[test]
    fn missing_value_reports_alias_used() {
        let descriptor = CommandDescriptor::new("x").flag("input", flags::string().char('i').alias("in"));
        let err = bind_tty(&descriptor, &["--in"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::MissingFlag);
        assert_eq!(err.metadata()["matcher"], "in");

        let err = bind_tty(&descriptor, &["-i"]).unwrap_err();
        assert_eq!(err.metadata()["matcher"], "i");
    }

    #[test]
    fn required_flag_falls_back_to_stdin() {
        let stdin = StdinSnapshot::piped(b"{\"hello\":1}".to_vec());
        let inv = bind(&flag_test_command(), &[], &stdin).unwrap();
        assert_eq!(inv.flag_str("foo"), Some("{\"hello\":1}"));
        assert_eq!(inv.flag_i64("int"), Some(1));
        assert!(inv.supplied_flags().is_empty());

        let inv = bind(&flag_test_command(), &argv(&["--foo"]), &stdin).unwrap();
        assert_eq!(inv.flag_str("foo"), Some("{\"hello\":1}"));
    }

    #[test]
    fn dash_value_reads_stdin() {
        let stdin = StdinSnapshot::piped(b"payload".to_vec());
        let inv = bind(&call_command(), &argv(&["--input", "-"]), &stdin).unwrap();
        assert_eq!(inv.flag_str("input"), Some("payload"));

        let inv = bind(&call_command(), &argv(&["--build", "-"]), &stdin).unwrap();
        assert_eq!(inv.flag_str("build"), Some("-"));
    }

    #[test]
    fn raw_stdin_mode_keeps_bytes() {
        let descriptor = CommandDescriptor::new("set-value")
            .arg("key", args::string().required())
            .arg("value", args::string().stdin(StdinMode::Raw));
        let stdin = StdinSnapshot::piped(vec![0xff, 0x00]);
        let inv = bind(&descriptor, &argv(&["k", "-"]), &stdin).unwrap();
        assert_eq!(inv.arg("value"), Some(&Value::Bytes(vec![0xff, 0x00])));
        assert_eq!(
            inv.arg("key").and_then(Value::as_bytes),
            Some(b"k".as_slice())
        );
    }

    #[test]
    fn ambiguous_value_is_reported() {
        let err = bind_tty(&call_command(), &["--build", "--silent"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::NodeParseArgsInvalidOptionValue);
        console::set_colors_enabled(false);
        let message = err.pretty_message(&Default::default());
        assert!(message.contains("is ambiguous"), "{message}");
        assert!(!message.contains("expects a value"));
    }

    #[test]
    fn ambiguous_value_is_reported_for_loose_commands() {
        let descriptor = CommandDescriptor::new("x")
            .strict(false)
            .flag("foo", flags::string())
            .flag("bar", flags::boolean());
        let err = bind_tty(&descriptor, &["--foo", "--bar"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::NodeParseArgsInvalidOptionValue);
        assert!(err.to_string().contains("is ambiguous"), "{err}");

        let inv = bind_tty(&descriptor, &["--foo=--bar"]).unwrap();
        assert_eq!(inv.flag_str("foo"), Some("--bar"));
        assert_eq!(inv.flag("bar"), None);
    }

    #[test]
    fn undeclared_short_is_not_a_repeat_of_a_long_flag() {
        let descriptor = CommandDescriptor::new("x")
            .strict(false)
            .flag("a", flags::boolean());
        let inv = bind_tty(&descriptor, &["--a", "-a"]).unwrap();
        assert!(inv.flag_bool("a"));

        let err = bind_tty(&descriptor, &["--a", "--a"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::FlagProvidedMultipleTimes);
    }

    #[test]
    fn exclusive_flags_are_symmetric() {
        let err = bind_tty(&call_command(), &["--input-file", "a.json", "-i", "{}"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::ExclusiveFlags);
        let reported: Vec<&str> = err.metadata()["flags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["flag"].as_str().unwrap())
            .collect();
        assert_eq!(reported, ["input", "input-file"]);
        assert_eq!(err.metadata()["flags"][0]["representation"], "--input={}");
        assert_eq!(err.metadata()["flags"][1]["representation"], "--input-file=a.json");
    }

    #[test]
    fn n_way_exclusion_checks_each_declared_pair() {
        let descriptor = CommandDescriptor::new("x")
            .flag("a", flags::boolean().exclusive(["b", "c"]))
            .flag("b", flags::boolean())
            .flag("c", flags::boolean());

        assert!(bind_tty(&descriptor, &["--b", "--c"]).is_ok());
        let err = bind_tty(&descriptor, &["--c", "--a", "--b"]).unwrap_err();
        let flags = &err.metadata()["flags"];
        assert_eq!(flags.as_array().unwrap().len(), 3);
        assert_eq!(flags[0]["flag"], "a");
        assert_eq!(flags[0]["conflictsWith"], serde_json::json!(["b", "c"]));
    }

    #[test]
    fn unknown_flag_gets_suggestions() {
        let err = bind_tty(&call_command(), &["--buidl", "x"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::NodeParseArgsUnknownOption);
        assert_eq!(err.metadata()["suggestions"], serde_json::json!(["--build"]));
    }

    #[test]
    fn non_strict_command_ignores_unknown_flags_and_extra_args() {
        let descriptor = call_command().strict(false);
        let inv = bind_tty(&descriptor, &["actor", "extra", "--nope"]).unwrap();
        assert_eq!(inv.arg_str("actorId"), Some("actor"));
    }

    #[test]
    fn excess_positionals_fail_in_strict_mode() {
        let err = bind_tty(&call_command(), &["actor", "extra"]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::NodeParseArgsUnexpectedPositional);
    }

    #[test]
    fn missing_arguments_are_collected() {
        let descriptor = CommandDescriptor::new("get-value")
            .arg("store", args::string().required().description("Store ID."))
            .arg("key", args::string().required().description("Record key."));
        let err = bind_tty(&descriptor, &[]).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::MissingArgument);
        assert_eq!(err.metadata()["arguments"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn catch_all_joins_remaining_positionals() {
        let descriptor = CommandDescriptor::new("help").arg("command", args::string().catch_all());
        let inv = bind_tty(&descriptor, &["kvs", "get-value"]).unwrap();
        assert_eq!(inv.arg_str("command"), Some("kvs get-value"));

        let inv = bind_tty(&descriptor, &[]).unwrap();
        assert_eq!(inv.arg("command"), None);
    }

    #[test]
    fn stdin_is_handed_to_a_single_consumer() {
        let descriptor = CommandDescriptor::new("x")
            .flag("a", flags::string().required().stdin(StdinMode::Stringified))
            .flag("b", flags::string().required().stdin(StdinMode::Stringified));
        let stdin = StdinSnapshot::piped(b"data".to_vec());
        let err = bind(&descriptor, &[], &stdin).unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::MissingFlag);
    }
}
