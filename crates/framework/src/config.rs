use std::io::IsTerminal;

/// Default help width when stdout is not a terminal.
pub const DEFAULT_LINE_WIDTH: usize = 80;
/// Help is never wrapped narrower than this on a terminal.
pub const MIN_LINE_WIDTH: usize = 40;
/// Table width assumed when stdout has no size.
pub const UNSIZED_TABLE_COLUMNS: usize = 100;

pub const DEBUG_ENV: &str = "APIFY_CLI_DEBUG";
pub const MAX_LINE_WIDTH_ENV: &str = "APIFY_CLI_MAX_LINE_WIDTH";

/// Process-level settings the framework reads once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Binary name shown in usage lines (`$ apify ...`).
    pub entrypoint: String,
    pub version: String,
    pub description: String,
    pub debug: bool,
    pub max_line_width: Option<usize>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            entrypoint: "apify".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: String::new(),
            debug: false,
            max_line_width: None,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        let pairs: Vec<(String, String)> = std::env::vars()
            .filter(|(k, _)| k.starts_with("APIFY_CLI_"))
            .collect();
        Self::from_env_pairs(&pairs)
    }

    /// Same as [`CliConfig::from_env`] but reads from an explicit list.
    pub fn from_env_pairs(env: &[(String, String)]) -> Self {
        let lookup = |key: &str| {
            env.iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim())
        };

        Self {
            debug: lookup(DEBUG_ENV).is_some_and(is_truthy),
            max_line_width: lookup(MAX_LINE_WIDTH_ENV).and_then(|v| v.parse().ok()),
            ..Self::default()
        }
    }

    pub fn entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = entrypoint.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Version line printed by `--version`.
    pub fn full_version(&self) -> String {
        format!(
            "{}/{} {}-{}",
            self.entrypoint,
            self.version,
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }

    /// Width help text is wrapped to.
    pub fn line_width(&self) -> usize {
        let term = console::Term::stdout();
        let size = term.size_checked().map(|(_, cols)| cols as usize);
        self.resolve_line_width(std::io::stdout().is_terminal(), size)
    }

    pub fn resolve_line_width(&self, is_terminal: bool, terminal_columns: Option<usize>) -> usize {
        if let Some(width) = self.max_line_width {
            return width;
        }
        if !is_terminal {
            return DEFAULT_LINE_WIDTH;
        }
        terminal_columns
            .map(|cols| cols.max(MIN_LINE_WIDTH))
            .unwrap_or(DEFAULT_LINE_WIDTH)
    }

    /// Columns available to tables; unlike help this is not clamped.
    pub fn terminal_columns(&self) -> usize {
        console::Term::stdout()
            .size_checked()
            .map(|(_, cols)| cols as usize)
            .unwrap_or(UNSIZED_TABLE_COLUMNS)
    }
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}
