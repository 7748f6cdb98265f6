use log::info;

/// Library launchers that load and execute user scripts directly.
pub const DEFAULT_ALLOWED: &[&str] = &["node_modules/.bin/next"];

/// Role of the script in a launch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// The user's program, debug flags must be installed here.
    Application,
    /// A package manager, reloader or other library script that spawns further node processes.
    Tool,
}

/// True if the script appears to be an application script, false for a library
/// (`node_modules`) script or `npm`.
pub fn is_application_script(path: &str) -> bool {
    !path.starts_with("node_modules/")
        && !path.contains("/node_modules/")
        && !path.ends_with("/bin/npm")
}

/// True if the script is an allowed library script, one that is or directly launches the
/// user's code.
///
/// # Arguments
///
/// * `path`: script path
/// * `allowed`: suffixes in addition to [`DEFAULT_ALLOWED`]
pub fn is_allowed_node_module(path: &str, allowed: &[String]) -> bool {
    let matched = DEFAULT_ALLOWED
        .iter()
        .copied()
        .chain(allowed.iter().map(String::as_str))
        .find(|suffix| path.ends_with(suffix));

    if let Some(suffix) = matched {
        info!(target: "node", "script {path:?} matches {suffix:?} from allowed node_modules");
        return true;
    }
    false
}

/// Classify a script. A missing script (stdin, `-e`, REPL) is treated as an application.
pub fn classify(script: Option<&str>, allowed: &[String]) -> ScriptKind {
    match script {
        None => ScriptKind::Application,
        Some(path) if is_application_script(path) || is_allowed_node_module(path, allowed) => {
            ScriptKind::Application
        }
        Some(_) => ScriptKind::Tool,
    }
}
