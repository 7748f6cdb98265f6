use log::{warn, LevelFilter};

/// Level used when `WRAPPER_VERBOSE` is unset, empty or unknown.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Parse a verbosity name. Accepts the level names of logrus-style tooling in addition to
/// the usual ones, so `fatal` and `panic` both map to the error level.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    let level = match name.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "panic" | "fatal" | "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return None,
    };
    Some(level)
}

/// Install the stderr logger. Safe to call more than once, only the first call installs.
///
/// # Arguments
///
/// * `verbose`: raw `WRAPPER_VERBOSE` value
pub fn init(verbose: Option<&str>) {
    let requested = verbose.filter(|v| !v.is_empty());
    let level = requested.and_then(parse_level);

    _ = env_logger::Builder::new()
        .filter_level(level.unwrap_or(DEFAULT_LEVEL))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();

    if let (Some(v), None) = (requested, level) {
        warn!(target: "wrapper", "unknown logging level: WRAPPER_VERBOSE={v}");
    }
}
