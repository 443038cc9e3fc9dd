use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A bound flag or argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    /// Raw stdin content for `StdinMode::Raw`.
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            Self::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// Result of binding argv against a command descriptor.
///
/// Keys are lowerCamelCase (`wait-for-finish` is stored as `waitForFinish`).
/// Lookups accept either spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInvocation {
    pub(crate) flags: IndexMap<String, Option<Value>>,
    pub(crate) args: IndexMap<String, Option<Value>>,
    pub(crate) supplied_flags: Vec<String>,
}

impl ParsedInvocation {
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags
            .get(&name.to_lower_camel_case())
            .and_then(Option::as_ref)
    }

    pub fn flag_str(&self, name: &str) -> Option<&str> {
        self.flag(name).and_then(Value::as_str)
    }

    /// Unset booleans read as `false`.
    pub fn flag_bool(&self, name: &str) -> bool {
        self.flag(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn flag_i64(&self, name: &str) -> Option<i64> {
        self.flag(name).and_then(Value::as_i64)
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args
            .get(&name.to_lower_camel_case())
            .and_then(Option::as_ref)
    }

    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(Value::as_str)
    }

    pub fn flags(&self) -> &IndexMap<String, Option<Value>> {
        &self.flags
    }

    pub fn args(&self) -> &IndexMap<String, Option<Value>> {
        &self.args
    }

    /// Canonical names of the flags given explicitly on the command line.
    pub fn supplied_flags(&self) -> &[String] {
        self.supplied_flags.as_slice()
    }

    /// Whether output should be JSON (`--json`).
    pub fn json(&self) -> bool {
        self.flag_bool("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_accept_kebab_and_camel_names() {
        let mut invocation = ParsedInvocation::default();
        invocation
            .flags
            .insert("waitForFinish".to_string(), Some(Value::Integer(5)));
        invocation.flags.insert("json".to_string(), None);

        assert_eq!(invocation.flag_i64("wait-for-finish"), Some(5));
        assert_eq!(invocation.flag_i64("waitForFinish"), Some(5));
        assert!(!invocation.json());
    }

    #[test]
    fn serializes_untagged_values() {
        let mut invocation = ParsedInvocation::default();
        invocation
            .flags
            .insert("foo".to_string(), Some(Value::from("bar")));
        invocation.flags.insert("count".to_string(), Some(Value::from(3)));
        invocation.flags.insert("unset".to_string(), None);
        invocation.supplied_flags.push("foo".to_string());

        let json = serde_json::to_value(&invocation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "flags": { "foo": "bar", "count": 3, "unset": null },
                "args": {},
                "suppliedFlags": ["foo"]
            })
        );
    }
}
