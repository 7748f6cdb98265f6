use crate::env::Env;
use crate::log::{parse_level, DEFAULT_LEVEL};
use log::LevelFilter;

/// Enables (or disables with `0`, `false`, `no`) the wrappers.
pub const ENABLED_VAR: &str = "WRAPPER_ENABLED";
/// Log level of the wrappers.
pub const VERBOSE_VAR: &str = "WRAPPER_VERBOSE";
/// Space separated script suffixes that are treated as application scripts.
pub const ALLOWED_VAR: &str = "WRAPPER_ALLOWED";
/// Any non-empty value prevents the python launcher from touching `PYTHONPATH`.
pub const SKIP_ENV_VAR: &str = "WRAPPER_SKIP_ENV";
/// Python version (`X.Y[.Z]`) used instead of querying the interpreter.
pub const PYTHON_VERSION_VAR: &str = "WRAPPER_PYTHON_VERSION";
/// Location of the bundled debugging helpers.
pub const HELPERS_VAR: &str = "WRAPPER_HELPERS";

/// Wrapper configuration, read once from the captured environment of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperConfig {
    /// Rewrite command lines at all.
    pub enabled: bool,
    /// Raw verbosity, if any.
    pub verbose: Option<String>,
    /// Additional application script suffixes.
    pub allowed: Vec<String>,
    pub skip_env: bool,
    pub python_version: Option<String>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: None,
            allowed: vec![],
            skip_env: false,
            python_version: None,
        }
    }
}

impl WrapperConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            enabled: is_enabled(env),
            verbose: env.get_non_empty(VERBOSE_VAR).map(ToOwned::to_owned),
            allowed: env
                .get(ALLOWED_VAR)
                .map(|v| v.split_whitespace().map(ToOwned::to_owned).collect())
                .unwrap_or_default(),
            skip_env: env.get_non_empty(SKIP_ENV_VAR).is_some(),
            python_version: env.get_non_empty(PYTHON_VERSION_VAR).map(ToOwned::to_owned),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.verbose
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// True when logging was raised above the default level.
    pub fn is_verbose(&self) -> bool {
        self.log_level() > DEFAULT_LEVEL
    }
}

/// Wrappers are enabled unless `WRAPPER_ENABLED` is one of `0`, `false`, `no`.
pub fn is_enabled(env: &Env) -> bool {
    match env.get(ENABLED_VAR) {
        None => true,
        Some(v) => !matches!(v, "0" | "false" | "no"),
    }
}
