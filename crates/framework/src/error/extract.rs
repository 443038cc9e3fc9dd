//! Recover structured data from tokenizer error messages.
//!
//! The tokenizer reports failures as prose; these patterns pull the offending
//! flag or value back out. Every pattern has fixtures below. A pattern that
//! fails to compile extracts nothing, which callers already report as an
//! unparsable message.

use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_OPTION_VALUE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)'(?:-[a-z0-9], )?--(?P<flag>[a-z0-9][a-z0-9-]*)(?: <value>)?' (?P<no_arg>does not take)?(?P<missing_arg>argument missing)?(?P<ambiguous>argument is ambiguous\.(?P<ambiguous_message>\s*.*\s*.*)?)?",
    )
    .ok()
});

static UNKNOWN_OPTION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^Unknown option '(?P<flag>[^']+)'").ok());

static UNEXPECTED_POSITIONAL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^Unexpected argument '(?P<value>.*)'\.").ok());

/// What an invalid-option-value message says about the flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagData {
    pub name: String,
    /// `false` when the flag was given a value it does not take.
    pub expects_value: bool,
    pub ambiguous: bool,
    /// Tokenizer hint that followed an ambiguity report, if any.
    pub ambiguous_message: Option<String>,
}

pub fn invalid_option_value(message: &str) -> Option<FlagData> {
    let caps = INVALID_OPTION_VALUE.as_ref()?.captures(message)?;
    let name = caps.name("flag")?.as_str().to_string();
    let ambiguous_message = caps
        .name("ambiguous_message")
        .map(|m| m.as_str().trim().to_string())
        .filter(|m| !m.is_empty());

    Some(FlagData {
        name,
        expects_value: caps.name("no_arg").is_none(),
        ambiguous: caps.name("ambiguous").is_some(),
        ambiguous_message,
    })
}

/// The option spelling from an unknown-option message (`--nope`, `-z`).
pub fn unknown_option(message: &str) -> Option<String> {
    UNKNOWN_OPTION
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps.name("flag"))
        .map(|m| m.as_str().to_string())
}

/// The rejected token from an unexpected-positional message.
pub fn unexpected_positional(message: &str) -> Option<String> {
    UNEXPECTED_POSITIONAL
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apify_argparse::ParseArgsError;

    #[test]
    fn patterns_compile() {
        assert!(INVALID_OPTION_VALUE.is_some());
        assert!(UNKNOWN_OPTION.is_some());
        assert!(UNEXPECTED_POSITIONAL.is_some());
    }

    #[test]
    fn missing_argument_with_short() {
        let data = invalid_option_value("Option '-f, --foo <value>' argument missing").unwrap();
        assert_eq!(data.name, "foo");
        assert!(data.expects_value);
        assert!(!data.ambiguous);
    }

    #[test]
    fn missing_argument_without_short() {
        let data = invalid_option_value("Option '--input-file <value>' argument missing").unwrap();
        assert_eq!(data.name, "input-file");
        assert!(data.expects_value);
    }

    #[test]
    fn does_not_take_an_argument() {
        let data = invalid_option_value("Option '--force' does not take an argument").unwrap();
        assert_eq!(data.name, "force");
        assert!(!data.expects_value);
        assert!(!data.ambiguous);
    }

    #[test]
    fn ambiguous_with_hint_lines() {
        let message = "Option '--foo' argument is ambiguous.\n\
                       Did you forget to specify the option argument for '--foo'?\n\
                       To specify an option argument starting with a dash use '--foo=-XYZ'.";
        let data = invalid_option_value(message).unwrap();
        assert_eq!(data.name, "foo");
        assert!(data.ambiguous);
        assert!(data.expects_value);
        let hint = data.ambiguous_message.unwrap();
        assert!(hint.starts_with("Did you forget"), "hint: {hint}");
        assert!(hint.contains("'--foo=-XYZ'"));
    }

    #[test]
    fn ambiguous_without_hint() {
        let data = invalid_option_value("Option '-b, --build' argument is ambiguous.").unwrap();
        assert_eq!(data.name, "build");
        assert!(data.ambiguous);
        assert_eq!(data.ambiguous_message, None);
    }

    #[test]
    fn matches_every_tokenizer_constructor() {
        let samples = [
            ParseArgsError::missing_value("-w, --wait-for-finish"),
            ParseArgsError::unexpected_value("--json"),
            ParseArgsError::ambiguous_value("-b, --build", "-b", "build"),
        ];
        for err in samples {
            assert!(
                invalid_option_value(err.message()).is_some(),
                "unparsed: {}",
                err.message()
            );
        }
        assert_eq!(
            unknown_option(ParseArgsError::unknown_option("--nope", true).message()).as_deref(),
            Some("--nope")
        );
        assert_eq!(
            unexpected_positional(ParseArgsError::unexpected_positional("x y").message())
                .as_deref(),
            Some("x y")
        );
    }

    #[test]
    fn unrelated_text_is_rejected() {
        assert_eq!(invalid_option_value("something went wrong"), None);
        assert_eq!(unknown_option("Option '--foo' does not take an argument"), None);
        assert_eq!(unexpected_positional("Unknown option '--x'"), None);
    }
}
