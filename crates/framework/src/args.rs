//! Positional argument declaration DSL.
//!
//! Arguments bind in declaration order. Only string arguments exist; integer
//! or boolean input is expected to go through flags.

use crate::flags::StdinMode;
use crate::invocation::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDescriptor {
    required: bool,
    default: Option<Value>,
    stdin: StdinMode,
    catch_all: bool,
    description: String,
}

pub fn string() -> ArgDescriptor {
    ArgDescriptor {
        required: false,
        default: None,
        stdin: StdinMode::None,
        catch_all: false,
        description: String::new(),
    }
}

impl ArgDescriptor {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(Value::String(value.into()));
        self
    }

    pub fn stdin(mut self, mode: StdinMode) -> Self {
        self.stdin = mode;
        self
    }

    /// Swallow every remaining positional, joined by a single space.
    /// Only valid on the last declared argument.
    pub fn catch_all(mut self) -> Self {
        self.catch_all = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn stdin_mode(&self) -> StdinMode {
        self.stdin
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    /// `<actorId>` or `[actorId]` in usage lines.
    pub fn usage_label(&self, name: &str) -> String {
        let name = if self.catch_all {
            format!("{name}...")
        } else {
            name.to_string()
        };
        if self.required {
            format!("<{name}>")
        } else {
            format!("[{name}]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_labels() {
        assert_eq!(string().required().usage_label("actorId"), "<actorId>");
        assert_eq!(string().usage_label("actorId"), "[actorId]");
        assert_eq!(string().catch_all().usage_label("command"), "[command...]");
    }
}
