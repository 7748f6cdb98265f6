use crate::config::WrapperConfig;
use crate::env::Env;
use crate::error::Error;
use crate::exec::{CommandLine, Executor};
use log::{debug, warn};
use once_cell::sync;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Interpreter `major.minor` version, the part that selects a backend library build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl PythonVersion {
    /// Parse a version from strings like "3.9.14", "3.11" or "4.13.8888\n".
    pub fn parse(s: &str) -> Result<Self, Error> {
        static V_RE: sync::Lazy<Regex> =
            sync::Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)").expect("must compile"));

        let s = s.trim();
        let Some((_, [major, minor])) = V_RE.captures(s).map(|c| c.extract()) else {
            return Err(Error::VersionFormat(s.to_string()));
        };
        let major = major
            .parse()
            .map_err(|_| Error::VersionFormat(s.to_string()))?;
        let minor = minor
            .parse()
            .map_err(|_| Error::VersionFormat(s.to_string()))?;
        Ok(PythonVersion { major, minor })
    }

    /// Parse the banner printed by `python -V`, "Python 3.9.14".
    ///
    /// # Arguments
    ///
    /// * `interpreter`: program that printed the banner, for error reporting
    /// * `banner`: output of the version query
    pub fn parse_banner(interpreter: &str, banner: &str) -> Result<Self, Error> {
        let Some(version) = banner.strip_prefix("Python ") else {
            return Err(Error::NotPython(interpreter.to_string()));
        };
        Self::parse(version)
    }
}

/// Determine the version of `interpreter`, from the configured override or by running
/// `interpreter -V`.
pub fn detect(
    interpreter: &str,
    config: &WrapperConfig,
    env: &Env,
    executor: &dyn Executor,
) -> Result<PythonVersion, Error> {
    if let Some(version) = config.python_version.as_deref() {
        debug!(target: "python", "python version from environment: {version}");
        return PythonVersion::parse(version);
    }

    let query = CommandLine::new(interpreter, ["-V"], env.clone());
    let banner = executor.output(&query).map_err(|e| {
        warn!(target: "python", "'{query}' errored: {e}");
        Error::VersionQuery(interpreter.to_string(), Box::new(e))
    })?;
    debug!(target: "python", "'{query}' = {banner:?}");

    PythonVersion::parse_banner(interpreter, &banner)
}
